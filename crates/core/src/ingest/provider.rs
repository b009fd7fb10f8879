use crate::config::Settings;
use crate::domain::params::TimeRange;
use crate::domain::region::Coordinates;
use crate::domain::series::{CropHealthSeries, PriceSeries, WeatherSeries};
use crate::ingest::error::FetchError;
use crate::ingest::types::{ArchiveResponse, ChartResponse, PowerResponse};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_price_history(
        &self,
        ticker: &str,
        range: TimeRange,
    ) -> Result<PriceSeries, FetchError>;

    async fn fetch_weather(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeatherSeries, FetchError>;

    async fn fetch_crop_health(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CropHealthSeries, FetchError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Wait before the second attempt; doubles after each further failure.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attempts: settings.retries.max(1),
            backoff_base: settings.backoff_base,
        }
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }

    /// Runs `op` until it succeeds or `attempts` is exhausted, sleeping between failures.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err(err);
                    }
                    let backoff = self.backoff(attempt);
                    tracing::warn!(operation, attempt, ?backoff, kind = err.kind(), error = %err, "live fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpMarketDataSource {
    http: reqwest::Client,
    price_base_url: String,
    weather_base_url: String,
    agro_base_url: String,
}

impl HttpMarketDataSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(concat!("sauda/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            price_base_url: settings.price_provider_base_url.clone(),
            weather_base_url: settings.weather_provider_base_url.clone(),
            agro_base_url: settings.agro_provider_base_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                body: clip_body(text),
            });
        }

        serde_json::from_str::<T>(&text).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Keeps at most `MAX_ERROR_BODY_CHARS` characters, cutting on a char boundary.
fn clip_body(mut body: String) -> String {
    if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        body.truncate(cut);
    }
    body
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[async_trait::async_trait]
impl MarketDataSource for HttpMarketDataSource {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_price_history(
        &self,
        ticker: &str,
        range: TimeRange,
    ) -> Result<PriceSeries, FetchError> {
        let url = join_url(&self.price_base_url, &format!("/v8/finance/chart/{ticker}"));
        let query = [
            ("range", range.as_str().to_string()),
            ("interval", "1d".to_string()),
        ];
        let parsed: ChartResponse = self.get_json(url, &query).await?;
        parsed.into_price_series()
    }

    async fn fetch_weather(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeatherSeries, FetchError> {
        let url = join_url(&self.weather_base_url, "/v1/archive");
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("hourly", "temperature_2m,rain".to_string()),
        ];
        let parsed: ArchiveResponse = self.get_json(url, &query).await?;
        parsed.into_weather_series()
    }

    async fn fetch_crop_health(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CropHealthSeries, FetchError> {
        let url = join_url(&self.agro_base_url, "/api/temporal/daily/point");
        let query = [
            ("parameters", "T2M,PRECTOTCORR".to_string()),
            ("community", "AG".to_string()),
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("start", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
            ("format", "JSON".to_string()),
        ];
        let parsed: PowerResponse = self.get_json(url, &query).await?;
        parsed.into_crop_health_series()
    }
}

/// A source with no network access. Every call fails, so callers fall back to synthetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait::async_trait]
impl MarketDataSource for OfflineSource {
    fn provider_name(&self) -> &'static str {
        "offline"
    }

    async fn fetch_price_history(&self, _: &str, _: TimeRange) -> Result<PriceSeries, FetchError> {
        Err(FetchError::Network("offline mode".to_string()))
    }

    async fn fetch_weather(
        &self,
        _: Coordinates,
        _: NaiveDate,
        _: NaiveDate,
    ) -> Result<WeatherSeries, FetchError> {
        Err(FetchError::Network("offline mode".to_string()))
    }

    async fn fetch_crop_health(
        &self,
        _: Coordinates,
        _: NaiveDate,
        _: NaiveDate,
    ) -> Result<CropHealthSeries, FetchError> {
        Err(FetchError::Network("offline mode".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn join_url_trims_trailing_slash() {
        assert_eq!(join_url("http://x/", "/v1/archive"), "http://x/v1/archive");
        assert_eq!(join_url("http://x", "/v1/archive"), "http://x/v1/archive");
    }

    #[test]
    fn clip_body_respects_multibyte_characters() {
        let body = format!("{}{}", "a".repeat(511), "é".repeat(5));
        let clipped = clip_body(body);
        assert_eq!(clipped.chars().count(), MAX_ERROR_BODY_CHARS);
        assert!(clipped.ends_with("aé"));

        assert_eq!(clip_body("short".to_string()), "short");
    }

    #[tokio::test]
    async fn non_ascii_error_body_becomes_status_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = format!("{}{}", "a".repeat(511), "é".repeat(5));
        let response = format!(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let settings = Settings {
            price_provider_base_url: format!("http://{addr}"),
            request_timeout: Duration::from_secs(5),
            ..Settings::default()
        };
        let source = HttpMarketDataSource::from_settings(&settings).unwrap();
        match source.fetch_price_history("ZW=F", TimeRange::OneYear).await {
            Err(FetchError::Status { code, body }) => {
                assert_eq!(code, 503);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS);
                assert!(body.ends_with('é'));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_until_exhausted() {
        let policy = RetryPolicy {
            attempts: 3,
            backoff_base: Duration::ZERO,
        };
        let calls = AtomicU32::new(0);
        let res: Result<(), FetchError> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FetchError::EmptyResult) }
            })
            .await;
        assert_eq!(res, Err(FetchError::EmptyResult));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_retrying_on_success() {
        let policy = RetryPolicy {
            attempts: 3,
            backoff_base: Duration::ZERO,
        };
        let calls = AtomicU32::new(0);
        let res = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 2 {
                        Err(FetchError::Network("reset".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(res, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_host_reports_network_failure() {
        let settings = Settings {
            price_provider_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(2),
            ..Settings::default()
        };
        let source = HttpMarketDataSource::from_settings(&settings).unwrap();
        let res = source.fetch_price_history("ZW=F", TimeRange::OneYear).await;
        assert!(matches!(res, Err(FetchError::Network(_))));
    }
}
