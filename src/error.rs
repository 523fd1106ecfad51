#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("URL input must be a string, got {found}")]
    NotAString { found: &'static str },
    #[error("Malicious signature '{name}' failed to compile: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("Risk thresholds must satisfy high >= medium >= low (got {high}/{medium}/{low})")]
    InvalidThresholds { high: i32, medium: i32, low: i32 },
}
