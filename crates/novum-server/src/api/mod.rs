//! HTTP handlers, one module per resource.

pub mod compliance;
pub mod documents;
pub mod error;
pub mod reports;
pub mod system;
