//! # Nudge Bot
//!
//! The chat command surface: `/start`, `/plan_today`, `/next_task`,
//! `/add`, `/list`, `/del`. Parsing lives in [`commands`], execution
//! against the stores in [`handler`]. Every user error becomes a reply
//! string; nothing in here can crash the process.

pub mod commands;
pub mod handler;

pub use commands::Command;
pub use handler::CommandHandler;
