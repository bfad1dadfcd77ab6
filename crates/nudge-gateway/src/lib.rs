//! # Nudge Gateway
//!
//! The HTTP surface. It exists mainly so an external uptime monitor has
//! something to poll; in webhook delivery mode it also receives inbound
//! platform events and feeds them to the command pipeline.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
