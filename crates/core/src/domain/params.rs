use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Buyer,
    Seller,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Buyer => "Buyer",
            UserType::Seller => "Seller",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(UserType::Buyer),
            "seller" => Ok(UserType::Seller),
            _ => anyhow::bail!("user type must be Buyer or Seller (got {s})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::OneYear => "1y",
            TimeRange::TwoYears => "2y",
            TimeRange::FiveYears => "5y",
        }
    }

    pub fn months(self) -> usize {
        match self {
            TimeRange::OneYear => 12,
            TimeRange::TwoYears => 24,
            TimeRange::FiveYears => 60,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(TimeRange::OneYear),
            "2y" => Ok(TimeRange::TwoYears),
            "5y" => Ok(TimeRange::FiveYears),
            _ => anyhow::bail!("time range must be one of 1y, 2y, 5y (got {s})"),
        }
    }
}

/// Which analysis sections a dashboard request includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisToggles {
    pub price: bool,
    pub weather: bool,
    pub crop_health: bool,
    pub trade_flow: bool,
}

impl Default for AnalysisToggles {
    fn default() -> Self {
        Self {
            price: true,
            weather: true,
            crop_health: true,
            trade_flow: true,
        }
    }
}
