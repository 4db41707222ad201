use thiserror::Error;

use crate::angles::AngleError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceSpecificationError {
    #[error("Source name must be a plain ASCII string; you specified {0:?}")]
    NonAsciiName(String),
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No J2000 coordinates found for '{0}'")]
    NoSimbadCoordinates(String),

    #[error("Could not parse the J2000 coordinates of '{name}' from '{line}': {err}")]
    BadCoordinates {
        name: String,
        line: String,
        err: AngleError,
    },

    #[error("The catalogue request for '{name}' failed: {err}")]
    Request { name: String, err: String },

    #[error(transparent)]
    Source(#[from] SourceSpecificationError),
}
