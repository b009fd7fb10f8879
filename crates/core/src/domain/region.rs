use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Europe,
        Region::Africa,
        Region::Asia,
        Region::Oceania,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Europe => "Europe",
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Oceania => "Oceania",
        }
    }

    /// A representative growing-area point used for weather and agronomic lookups.
    pub fn coordinates(self) -> Coordinates {
        let (latitude, longitude) = match self {
            Region::NorthAmerica => (41.88, -93.10),
            Region::SouthAmerica => (-15.78, -47.93),
            Region::Europe => (48.86, 2.35),
            Region::Africa => (-1.29, 36.82),
            Region::Asia => (28.61, 77.21),
            Region::Oceania => (-33.87, 151.21),
        };
        Coordinates {
            latitude,
            longitude,
        }
    }

    pub fn countries(self) -> &'static [&'static str] {
        match self {
            Region::NorthAmerica => &["United States", "Canada", "Mexico"],
            Region::SouthAmerica => &["Brazil", "Argentina", "Colombia", "Peru"],
            Region::Europe => &["France", "Germany", "Ukraine", "Spain"],
            Region::Africa => &["Nigeria", "Kenya", "South Africa", "Ethiopia"],
            Region::Asia => &["India", "China", "Vietnam", "Thailand"],
            Region::Oceania => &["Australia", "New Zealand"],
        }
    }

    /// Every region except `self`, in canonical order.
    pub fn others(self) -> Vec<Region> {
        Region::ALL.into_iter().filter(|r| *r != self).collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Region::ALL
            .into_iter()
            .find(|r| normalize(r.name()) == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown region: {s}"))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_loosely() {
        assert_eq!("North America".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!("south_america".parse::<Region>().unwrap(), Region::SouthAmerica);
        assert_eq!("ASIA".parse::<Region>().unwrap(), Region::Asia);
        assert!("Atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn others_excludes_self() {
        let others = Region::Asia.others();
        assert_eq!(others.len(), 5);
        assert!(!others.contains(&Region::Asia));
    }

    #[test]
    fn serializes_display_names() {
        let v = serde_json::to_value(Region::NorthAmerica).unwrap();
        assert_eq!(v, serde_json::json!("North America"));
    }
}
