pub mod analysis;
pub mod dashboard;
pub mod domain;
pub mod ingest;
pub mod narrative;
pub mod report;
pub mod storage;
pub mod synth;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    pub const DEFAULT_PRICE_BASE_URL: &str = "https://query1.finance.yahoo.com";
    pub const DEFAULT_WEATHER_BASE_URL: &str = "https://archive-api.open-meteo.com";
    pub const DEFAULT_AGRO_BASE_URL: &str = "https://power.larc.nasa.gov";

    const DEFAULT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_RETRIES: u32 = 3;
    const DEFAULT_BACKOFF_MS: u64 = 1000;
    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub price_provider_base_url: String,
        pub weather_provider_base_url: String,
        pub agro_provider_base_url: String,
        pub request_timeout: Duration,
        pub retries: u32,
        pub backoff_base: Duration,
        pub cache_ttl: Duration,
        pub custom_commodities: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                price_provider_base_url: DEFAULT_PRICE_BASE_URL.to_string(),
                weather_provider_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
                agro_provider_base_url: DEFAULT_AGRO_BASE_URL.to_string(),
                request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                retries: DEFAULT_RETRIES,
                backoff_base: Duration::from_millis(DEFAULT_BACKOFF_MS),
                cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                custom_commodities: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                price_provider_base_url: env_string("PRICE_PROVIDER_BASE_URL")
                    .unwrap_or(defaults.price_provider_base_url),
                weather_provider_base_url: env_string("WEATHER_PROVIDER_BASE_URL")
                    .unwrap_or(defaults.weather_provider_base_url),
                agro_provider_base_url: env_string("AGRO_PROVIDER_BASE_URL")
                    .unwrap_or(defaults.agro_provider_base_url),
                request_timeout: env_parse::<u64>("DATA_PROVIDER_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.request_timeout),
                retries: env_parse::<u32>("DATA_PROVIDER_RETRIES")?
                    .unwrap_or(defaults.retries)
                    .max(1),
                backoff_base: env_parse::<u64>("DATA_PROVIDER_BACKOFF_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.backoff_base),
                cache_ttl: env_parse::<u64>("CACHE_TTL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache_ttl),
                custom_commodities: env_string("CUSTOM_COMMODITIES"),
            })
        }
    }

    fn env_string(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match env_string(key) {
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} has an invalid value: {raw}"))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }
}
