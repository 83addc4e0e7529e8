//! Translation of transport and HTTP failures into `FolioError`.
//!
//! Every reqwest call site goes through [`TransportError::from_reqwest`] or
//! [`status_error`]; nothing else in the crate inspects reqwest errors.

pub mod conversions;

pub use conversions::{status_error, TransportError};
