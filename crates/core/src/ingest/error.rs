use std::fmt;

/// Why a live fetch did not produce usable data. Every variant degrades to synthetic data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection failure or timeout.
    Network(String),
    /// Non-2xx response.
    Status { code: u16, body: String },
    /// The body could not be parsed into the expected shape.
    Malformed(String),
    /// A well-formed response with no usable rows.
    EmptyResult,
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::Malformed(_) => "malformed",
            FetchError::EmptyResult => "empty_result",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(detail) => write!(f, "network failure: {detail}"),
            FetchError::Status { code, body } => write!(f, "provider HTTP {code}: {body}"),
            FetchError::Malformed(detail) => write!(f, "malformed provider payload: {detail}"),
            FetchError::EmptyResult => f.write_str("provider returned no usable rows"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let err = FetchError::Status {
            code: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "provider HTTP 503: unavailable");
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn converts_into_anyhow_and_back() {
        let err = anyhow::Error::new(FetchError::EmptyResult);
        assert_eq!(err.downcast_ref::<FetchError>(), Some(&FetchError::EmptyResult));
    }
}
