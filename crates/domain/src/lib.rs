//! # Folio Domain
//!
//! Protocol types and models for the FOLIO client.
//!
//! This crate contains:
//! - The error taxonomy and `Result` alias
//! - Client configuration structures
//! - Okapi protocol constants (headers, cookies, endpoints)
//! - Response and record types
//!
//! ## Architecture
//! - No dependencies on other folio crates
//! - No I/O; everything here is plain data

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
