use thiserror::Error;

use super::Band;
use crate::{
    angles::AngleError,
    target::{LookupError, SourceSpecificationError},
};

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("No {band} source is between {min_deg:.2} and {max_deg:.2} degrees elevation. Candidates:\n{candidates}")]
    NoSuitableSource {
        band: Band,
        min_deg: f64,
        max_deg: f64,
        /// One "name: elevation" line per candidate, highest first.
        candidates: String,
    },

    #[error("Catalogue entry '{name}' has invalid coordinates: {err}")]
    BadRow { name: String, err: AngleError },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Source(#[from] SourceSpecificationError),
}
