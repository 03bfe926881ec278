use thiserror::Error;

use crate::store::StoreError;

/// Every way a weather lookup can fail.
///
/// Variants are kept distinct so the display layer can tell a bad input
/// (prompt the user again) from a configuration problem or a transient
/// network failure.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No API key configured.\n\
         Hint: run `weathercast configure` or set OPENWEATHER_API_KEY."
    )]
    MissingCredential,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to reach the weather provider: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Weather provider returned an empty response")]
    NoData,

    #[error("Failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Weather provider rejected the request with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No city given and no previously searched city stored")]
    NoTarget,

    #[error("City store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`WeatherError`] for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Input,
    Transient,
    Data,
    TargetRequired,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::MissingCredential | WeatherError::Store(_) => ErrorKind::Configuration,
            WeatherError::InvalidRequest(_) => ErrorKind::Input,
            WeatherError::Network(_) | WeatherError::NoData => ErrorKind::Transient,
            WeatherError::Decode(_) => ErrorKind::Data,
            WeatherError::NoTarget => ErrorKind::TargetRequired,
            WeatherError::Api { status, .. } => match status {
                401 | 403 => ErrorKind::Configuration,
                400 | 404 => ErrorKind::Input,
                _ => ErrorKind::Transient,
            },
        }
    }
}

impl ErrorKind {
    /// Message shown to the user in place of weather content.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Transient => "Weather information is unavailable. Try again",
            _ => "Weather information is unavailable",
        }
    }

    /// Whether the user should be asked to enter a (different) city.
    pub fn needs_reentry(&self) -> bool {
        matches!(self, ErrorKind::Input | ErrorKind::TargetRequired)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Input => "input error",
            ErrorKind::Transient => "transient error",
            ErrorKind::Data => "data error",
            ErrorKind::TargetRequired => "city required",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_classification() {
        let kind = |status| WeatherError::Api { status, message: String::new() }.kind();

        assert_eq!(kind(401), ErrorKind::Configuration);
        assert_eq!(kind(404), ErrorKind::Input);
        assert_eq!(kind(500), ErrorKind::Transient);
    }

    #[test]
    fn reentry_only_for_input_problems() {
        assert!(WeatherError::NoTarget.kind().needs_reentry());
        assert!(WeatherError::InvalidRequest("bad".into()).kind().needs_reentry());
        assert!(!WeatherError::MissingCredential.kind().needs_reentry());
        assert!(!WeatherError::NoData.kind().needs_reentry());
    }

    #[test]
    fn transient_errors_suggest_retry() {
        assert!(WeatherError::NoData.kind().user_message().ends_with("Try again"));
        assert_eq!(
            WeatherError::NoTarget.kind().user_message(),
            "Weather information is unavailable"
        );
    }

    #[test]
    fn decode_errors_keep_parse_detail() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = WeatherError::from(parse);

        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.to_string().starts_with("Failed to decode weather response"));
    }
}
