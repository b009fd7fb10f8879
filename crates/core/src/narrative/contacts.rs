use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::opportunity::Contact;
use crate::synth::rng_from_keys;

const DEFAULT_NAMES: &[(&str, &str)] = &[("Alex", "Morgan"), ("Sam", "Taylor")];

const COMMODITY_LABELS: &[&str] = &[
    "Grain", "Agri", "Harvest", "Commodities", "Produce", "Farms",
];

const POSITIONS: &[&str] = &[
    "Procurement Manager",
    "Sales Director",
    "Export Manager",
    "Supply Chain Lead",
    "Trading Manager",
    "Business Development Manager",
];

fn names_for(country: &str) -> &'static [(&'static str, &'static str)] {
    match country {
        "United States" => &[("John", "Smith"), ("Emily", "Johnson"), ("Michael", "Brown")],
        "Canada" => &[("Liam", "Tremblay"), ("Olivia", "Roy"), ("Noah", "Gagnon")],
        "Mexico" => &[("José", "Hernández"), ("María", "García"), ("Luis", "Martínez")],
        "Brazil" => &[("João", "Silva"), ("Ana", "Santos"), ("Pedro", "Oliveira")],
        "Argentina" => &[("Santiago", "González"), ("Valentina", "Rodríguez"), ("Mateo", "Fernández")],
        "Colombia" => &[("Andrés", "Gómez"), ("Camila", "López"), ("Felipe", "Ramírez")],
        "Peru" => &[("Diego", "Quispe"), ("Lucía", "Flores"), ("Jorge", "Mamani")],
        "France" => &[("Pierre", "Martin"), ("Sophie", "Bernard"), ("Louis", "Dubois")],
        "Germany" => &[("Lukas", "Müller"), ("Anna", "Schmidt"), ("Felix", "Schneider")],
        "Ukraine" => &[("Oleksandr", "Shevchenko"), ("Olena", "Kovalenko"), ("Andriy", "Bondarenko")],
        "Spain" => &[("Javier", "García"), ("Lucía", "Martínez"), ("Carlos", "Sánchez")],
        "Nigeria" => &[("Chinedu", "Okafor"), ("Aisha", "Bello"), ("Tunde", "Adeyemi")],
        "Kenya" => &[("Wanjiru", "Kamau"), ("Otieno", "Odhiambo"), ("Achieng", "Wanjala")],
        "South Africa" => &[("Thabo", "Nkosi"), ("Lerato", "Dlamini"), ("Pieter", "van der Merwe")],
        "Ethiopia" => &[("Abebe", "Bekele"), ("Hana", "Tesfaye"), ("Dawit", "Girma")],
        "India" => &[("Rahul", "Sharma"), ("Priya", "Patel"), ("Arjun", "Singh")],
        "China" => &[("Wei", "Zhang"), ("Li", "Wang"), ("Jing", "Liu")],
        "Vietnam" => &[("Minh", "Nguyen"), ("Lan", "Tran"), ("Huy", "Pham")],
        "Thailand" => &[("Somchai", "Suksawat"), ("Nattaya", "Chaiyaporn"), ("Anan", "Srisuk")],
        "Australia" => &[("Jack", "Wilson"), ("Charlotte", "Taylor"), ("Oliver", "Anderson")],
        "New Zealand" => &[("James", "Walker"), ("Isla", "Harris"), ("Tama", "Ngata")],
        _ => DEFAULT_NAMES,
    }
}

/// Deterministic contacts for `country`, seeded from the country string alone.
///
/// Names are drawn with replacement and may repeat within a batch.
pub fn generate_contacts(country: &str, count: usize) -> Vec<Contact> {
    let mut rng = rng_from_keys(&[country]);
    let names = names_for(country);

    (0..count)
        .map(|_| {
            let (first, last) = names.choose(&mut rng).copied().unwrap_or(DEFAULT_NAMES[0]);
            let label = COMMODITY_LABELS.choose(&mut rng).copied().unwrap_or("Agri");
            let position = POSITIONS.choose(&mut rng).copied().unwrap_or(POSITIONS[0]);
            let company = format!("{country} {label} Trading");
            let email = format!(
                "{}.{}@{}.com",
                first.to_lowercase(),
                last.to_lowercase().replace(' ', ""),
                company_slug(&company)
            );
            let phone = format!(
                "+{} {} {}",
                rng.gen_range(1..=99),
                rng.gen_range(100..=999),
                rng.gen_range(1_000_000..=9_999_999)
            );

            Contact {
                name: format!("{first} {last}"),
                company,
                position: position.to_string(),
                location: country.to_string(),
                email,
                phone,
            }
        })
        .collect()
}

fn company_slug(company: &str) -> String {
    company
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_country_same_contacts() {
        assert_eq!(generate_contacts("Brazil", 2), generate_contacts("Brazil", 2));
        assert_eq!(generate_contacts("Brazil", 5).len(), 5);
        assert!(generate_contacts("Brazil", 0).is_empty());
    }

    #[test]
    fn names_come_from_the_country_table() {
        let allowed: Vec<String> = names_for("Kenya")
            .iter()
            .map(|(f, l)| format!("{f} {l}"))
            .collect();
        for c in generate_contacts("Kenya", 10) {
            assert!(allowed.contains(&c.name), "unexpected name {}", c.name);
            assert_eq!(c.location, "Kenya");
        }
    }

    #[test]
    fn unknown_country_uses_default_names() {
        for c in generate_contacts("Atlantis", 4) {
            assert!(c.name == "Alex Morgan" || c.name == "Sam Taylor");
        }
    }

    #[test]
    fn email_is_lowercase_with_company_slug() {
        for c in generate_contacts("South Africa", 6) {
            let (local, domain) = c.email.split_once('@').unwrap();
            assert_eq!(local, local.to_lowercase());
            assert!(!domain.contains(' '));
            assert!(domain.starts_with("southafrica"));
            assert!(domain.ends_with("trading.com"));
        }
    }

    #[test]
    fn phone_has_three_digit_groups() {
        for c in generate_contacts("India", 6) {
            let groups: Vec<&str> = c.phone.trim_start_matches('+').split(' ').collect();
            assert_eq!(groups.len(), 3);
            assert_eq!(groups[1].len(), 3);
            assert_eq!(groups[2].len(), 7);
            assert!(groups.iter().all(|g| g.chars().all(|ch| ch.is_ascii_digit())));
        }
    }
}
