use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::params::UserType;
use crate::domain::region::Region;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// Structured outcome of the opportunity sampler, before any text is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityPlan {
    pub commodity: String,
    pub user_type: UserType,
    pub target_region: Region,
    pub country: String,
    /// Index into the role's rationale templates.
    pub rationale_template: usize,
    pub impact_pct: u32,
    pub timeline_months: u32,
    pub risk_level: RiskLevel,
    pub contacts: Vec<Contact>,
}

/// Rendered opportunity as shown to users and embedded in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub potential_impact: String,
    pub timeline: String,
    pub risk_level: RiskLevel,
    pub target_region: Region,
    pub country: String,
    pub contacts: Vec<Contact>,
}
