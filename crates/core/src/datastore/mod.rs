//! Data store abstraction.
//!
//! The pipeline reads its input from, and publishes its outputs to, a remote
//! pathology data store. This module defines the narrow [`DataStore`] trait the
//! pipeline consumes and an HTTP implementation, [`HttpDataStore`].

mod error;
mod http;
mod traits;

pub use error::DataStoreError;
pub use http::HttpDataStore;
pub use traits::DataStore;

/// Status codes are plain HTTP status codes regardless of implementation.
pub use reqwest::StatusCode;

/// Result tag under which the cell-quantification table is stored.
pub const QUANT_TAG: &str = "Quant";

/// Result tag under which MOHA outputs are published.
pub const MOHA_TAG: &str = "MOHA";

/// Channel of the nuclear reference image.
pub const NUCLEAR_CHANNEL: &str = "DAPI";

/// Format tag of the downloaded quantification table.
pub const QUANT_FORMAT: &str = "csv";
