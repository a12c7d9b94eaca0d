//! Novum Server — HTTP surface over the compliance services and the
//! monthly report job. Exposed as a library so the router can be
//! driven from tests without binding a socket.

pub mod api;
pub mod app;
pub mod config;
