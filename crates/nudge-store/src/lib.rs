//! # Nudge Store
//!
//! Flat-file persistence — human-readable JSON, git-friendly.
//! Two files: `schedule.json` (the weekly task table) and `chats.json`
//! (subscriber chat ids). Both are read on demand and written back on
//! mutation; there is no locking and no cache.

pub mod schedule;
pub mod subscribers;

pub use schedule::{ScheduleEntry, ScheduleStore, WeekSchedule, Weekday};
pub use subscribers::SubscriberStore;
