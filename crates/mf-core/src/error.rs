use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A mapping program could not be generated or lowered. Raised while
    /// building a mapping, never while running one.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A compiled program failed while executing against a concrete value.
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Generic error: {0}")]
    Generic(eyre::Report),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Error::Runtime(_))
    }
}

pub type Result<T> = result::Result<T, Error>;

pub fn configuration_error(message: impl Into<String>) -> Error {
    Error::Configuration(message.into())
}

pub fn runtime_error(message: impl Into<String>) -> Error {
    Error::Runtime(message.into())
}

pub fn generic_error(message: impl Into<String>) -> Error {
    Error::Generic(eyre::Report::msg(message.into()))
}

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        generic_error(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        generic_error(e.to_string())
    }
}
