//! Error type shared by strategies, catalogues and the simulator.

use thiserror::Error;

/// Failures raised by the strategy layer.
///
/// Errors are local to the call that raised them: a strategy that fails
/// keeps its state as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A product identifier that is not part of the catalogue.
    #[error("unknown product `{product}`")]
    InvalidProduct { product: String },

    /// A strategy, catalogue or binning grid cannot be built as requested.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn invalid_product(product: &str) -> Self {
        Self::InvalidProduct {
            product: product.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
