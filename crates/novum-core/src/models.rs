//! Domain models for Novum.
//!
//! Every tenant-scoped entity carries its `tenant_id`; repositories
//! filter on it in every query.

pub mod audit;
pub mod document;
pub mod folder;
pub mod notification;
pub mod person;
pub mod right_to_work;
pub mod task;
pub mod tenant;
pub mod training;
pub mod user_profile;
