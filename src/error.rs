use thiserror::Error;

use crate::parse::GrammarError;
use crate::{SchemaError, StructuralError};

/// Unified error type covering parsing, schema validation, graph
/// compilation and I/O.
///
/// Every import is rejected with exactly one of these; the session keeps its
/// previous state when that happens.
#[derive(Debug, Error)]
pub enum RulescopeError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("invalid pattern for feature '{feature}': {source}")]
    Regex {
        feature: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
