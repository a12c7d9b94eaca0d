//! Novum Core — domain models, the document taxonomy, compliance
//! scoring, repository traits and the error taxonomy shared by every
//! other crate in the workspace.

pub mod clock;
pub mod error;
pub mod expiry;
pub mod models;
pub mod repository;
pub mod scoring;
pub mod taxonomy;
