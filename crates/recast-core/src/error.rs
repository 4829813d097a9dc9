use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before the first cycle; the only error fatal to a whole run.
    #[error("invalid engine configuration: {0}")]
    Config(String),
    /// A visitor hit a structural invariant violation. Fatal for the
    /// offending unit only; other units keep processing. The engine knows
    /// which unit was being visited and reports the path alongside.
    #[error("malformed tree: {message}")]
    MalformedTree { message: String },
    /// Unexpected failure inside a visitor application, isolated to one unit
    /// for one cycle.
    #[error("recipe '{recipe}' failed: {message}")]
    RecipeExecution { recipe: String, message: String },
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

// Convert from std::io::Error to our Error type
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
