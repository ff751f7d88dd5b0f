use thiserror::Error;

/// Errors raised at the fallible edges of the state store.
///
/// Store accessors themselves never fail; these cover parsing a URL into a
/// location, loading configuration, and merging explicit parameter overrides.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unknown jobs parameter: {0}")]
    UnknownParam(String),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidParam {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

impl From<figment::Error> for StateError {
    fn from(err: figment::Error) -> Self {
        StateError::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
