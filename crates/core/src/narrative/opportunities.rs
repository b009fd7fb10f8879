use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::opportunity::{Opportunity, OpportunityPlan, RiskLevel};
use crate::domain::params::UserType;
use crate::domain::region::Region;
use crate::narrative::contacts::generate_contacts;
use crate::synth::rng_from_keys;

pub const MAX_OPPORTUNITIES: usize = 3;
pub const CONTACTS_PER_OPPORTUNITY: usize = 2;

const BUYER_RATIONALES: [&str; 3] = [
    "{country} is reporting a production surplus in {commodity}, creating favorable sourcing conditions for buyers.",
    "Expanded harvest capacity in {country} has pushed {commodity} export offers below recent regional averages.",
    "New logistics corridors out of {country} ({region}) are lowering landed costs for {commodity} shipments.",
];

const SELLER_RATIONALES: [&str; 3] = [
    "{country} faces a domestic {commodity} supply gap, and import demand is rising.",
    "Food processors in {country} are looking for new {commodity} suppliers to diversify away from current partners.",
    "Changing consumption patterns across {region} are lifting {commodity} demand in {country}.",
];

/// Samples up to three diversification opportunities outside `region`.
///
/// Seeded from commodity and region, so the same inputs always yield the same plans.
pub fn plan_opportunities(commodity: &str, region: Region, user_type: UserType) -> Vec<OpportunityPlan> {
    let mut rng = rng_from_keys(&[commodity, region.name()]);

    let candidates = region.others();
    let targets: Vec<Region> = candidates
        .choose_multiple(&mut rng, MAX_OPPORTUNITIES.min(candidates.len()))
        .copied()
        .collect();

    targets
        .into_iter()
        .map(|target| {
            let country = target
                .countries()
                .choose(&mut rng)
                .copied()
                .unwrap_or(target.name())
                .to_string();
            let rationale_template = rng.gen_range(0..BUYER_RATIONALES.len());
            let (impact_pct, timeline_months) = match user_type {
                UserType::Buyer => (rng.gen_range(5..=25), rng.gen_range(1..=3)),
                UserType::Seller => (rng.gen_range(10..=30), rng.gen_range(2..=6)),
            };
            let risk_level = RiskLevel::ALL
                .choose(&mut rng)
                .copied()
                .unwrap_or(RiskLevel::Medium);
            let contacts = generate_contacts(&country, CONTACTS_PER_OPPORTUNITY);

            OpportunityPlan {
                commodity: commodity.to_string(),
                user_type,
                target_region: target,
                country,
                rationale_template,
                impact_pct,
                timeline_months,
                risk_level,
                contacts,
            }
        })
        .collect()
}

pub fn render_opportunity(plan: &OpportunityPlan) -> Opportunity {
    let templates = match plan.user_type {
        UserType::Buyer => &BUYER_RATIONALES,
        UserType::Seller => &SELLER_RATIONALES,
    };
    let template = templates[plan.rationale_template % templates.len()];
    let rationale = template
        .replace("{country}", &plan.country)
        .replace("{commodity}", &plan.commodity.to_lowercase())
        .replace("{region}", plan.target_region.name());

    let (title, description, potential_impact) = match plan.user_type {
        UserType::Buyer => (
            format!("Source {} from {}", plan.commodity, plan.country),
            format!(
                "Diversify {} sourcing by adding suppliers in {}, {}.",
                plan.commodity.to_lowercase(),
                plan.country,
                plan.target_region
            ),
            format!("{}% potential cost savings", plan.impact_pct),
        ),
        UserType::Seller => (
            format!("Export {} to {}", plan.commodity, plan.country),
            format!(
                "Open a new {} sales channel into {}, {}.",
                plan.commodity.to_lowercase(),
                plan.country,
                plan.target_region
            ),
            format!("{}% potential revenue increase", plan.impact_pct),
        ),
    };

    let unit = if plan.timeline_months == 1 { "month" } else { "months" };

    Opportunity {
        title,
        description,
        rationale,
        potential_impact,
        timeline: format!("{} {unit}", plan.timeline_months),
        risk_level: plan.risk_level,
        target_region: plan.target_region,
        country: plan.country.clone(),
        contacts: plan.contacts.clone(),
    }
}

pub fn generate_market_opportunities(
    commodity: &str,
    region: Region,
    user_type: UserType,
) -> Vec<Opportunity> {
    plan_opportunities(commodity, region, user_type)
        .iter()
        .map(render_opportunity)
        .collect()
}
