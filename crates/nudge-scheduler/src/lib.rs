//! # Nudge Scheduler
//!
//! The notification loop. Once per tick it computes "now" in the configured
//! time zone, reads the weekly schedule, and decides which
//! (task, day, recipient) triples have newly become due — each fires exactly
//! once per day, tracked by an in-memory fired-set that clears at a daily
//! boundary.
//!
//! ```text
//! tokio interval (60s)
//!   └── ReminderEngine::tick(now)
//!         ├── subscribers empty? → done
//!         ├── entry.time == "HH:MM" of now → due reminder
//!         ├── entry.time == now + lead     → "coming up" pre-notification
//!         ├── FiredSet membership → at most once per key per day
//!         └── now == reset boundary → clear FiredSet
//! ```

pub mod engine;
pub mod fired;

pub use engine::{EngineOptions, ReminderEngine, run_reminder_loop};
pub use fired::{FiredSet, NotificationKey, NotifyKind};
