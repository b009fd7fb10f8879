use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    pub name: String,
    pub ticker: String,
    /// Reference price used to scale synthetic quotes when no live data is available.
    pub reference_price: f64,
}

impl Commodity {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>, reference_price: f64) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            reference_price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommodityCatalog {
    items: Vec<Commodity>,
}

impl Default for CommodityCatalog {
    fn default() -> Self {
        Self {
            items: vec![
                Commodity::new("Wheat", "ZW=F", 600.0),
                Commodity::new("Corn", "ZC=F", 450.0),
                Commodity::new("Soybeans", "ZS=F", 1200.0),
                Commodity::new("Rice", "ZR=F", 17.0),
                Commodity::new("Coffee", "KC=F", 220.0),
                Commodity::new("Sugar", "SB=F", 20.0),
                Commodity::new("Cotton", "CT=F", 80.0),
                Commodity::new("Cocoa", "CC=F", 5000.0),
            ],
        }
    }
}

impl CommodityCatalog {
    /// Builds a catalog from a `Name=TICKER[:price],...` list.
    ///
    /// Entries with an invalid ticker are skipped with a warning. If nothing valid remains the
    /// default catalog is used instead.
    pub fn from_custom(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        let mut items = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match parse_entry(part) {
                Ok(c) => items.push(c),
                Err(err) => {
                    tracing::warn!(entry = %part, error = %err, "ignoring custom commodity entry");
                }
            }
        }

        if items.is_empty() {
            tracing::warn!("no valid custom commodities; falling back to the default set");
            return Self::default();
        }

        Self { items }
    }

    pub fn all(&self) -> &[Commodity] {
        &self.items
    }

    pub fn find(&self, name: &str) -> Option<&Commodity> {
        let name = name.trim();
        self.items
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name) || c.ticker.eq_ignore_ascii_case(name))
    }

    pub fn require(&self, name: &str) -> anyhow::Result<&Commodity> {
        self.find(name)
            .ok_or_else(|| anyhow::anyhow!("unknown commodity: {name}"))
    }
}

fn parse_entry(entry: &str) -> anyhow::Result<Commodity> {
    let (name, rest) = entry
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected Name=TICKER"))?;
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "commodity name must be non-empty");

    let (ticker, price) = match rest.split_once(':') {
        Some((t, p)) => {
            let price = p
                .trim()
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("invalid reference price: {p}"))?;
            anyhow::ensure!(
                price.is_finite() && price > 0.0,
                "reference price must be positive (got {price})"
            );
            (t.trim(), price)
        }
        None => (rest.trim(), 100.0),
    };

    anyhow::ensure!(is_valid_ticker(ticker), "invalid ticker: {ticker:?}");
    Ok(Commodity::new(name, ticker.to_ascii_uppercase(), price))
}

pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= 12
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '.' | '-' | '^'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_finds_by_name_or_ticker() {
        let catalog = CommodityCatalog::default();
        assert_eq!(catalog.find("wheat").unwrap().ticker, "ZW=F");
        assert_eq!(catalog.find("KC=F").unwrap().name, "Coffee");
        assert!(catalog.find("Unobtainium").is_none());
    }

    #[test]
    fn custom_catalog_skips_invalid_tickers() {
        let catalog = CommodityCatalog::from_custom(Some("Oats=ZO=F:350, Bad=not a ticker!, Canola=RS=F"));
        let names: Vec<_> = catalog.all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Oats", "Canola"]);
        assert_eq!(catalog.find("Oats").unwrap().reference_price, 350.0);
    }

    #[test]
    fn custom_catalog_falls_back_when_nothing_is_valid() {
        let catalog = CommodityCatalog::from_custom(Some("Bad=###"));
        assert_eq!(catalog.all().len(), CommodityCatalog::default().all().len());
    }

    #[test]
    fn ticker_validation() {
        assert!(is_valid_ticker("ZW=F"));
        assert!(is_valid_ticker("^GSPC"));
        assert!(!is_valid_ticker(""));
        assert!(!is_valid_ticker("has space"));
        assert!(!is_valid_ticker("WAYTOOLONGTICKER"));
    }
}
