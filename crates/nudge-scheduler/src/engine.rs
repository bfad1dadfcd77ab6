//! The per-tick decision engine and the background reminder loop.
//! Uses tokio::interval for zero-overhead ticking (sleeps between checks).

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveTime, Timelike};
use chrono_tz::Tz;
use tokio::sync::Mutex;

use nudge_core::traits::Channel;
use nudge_core::types::OutgoingMessage;
use nudge_store::{ScheduleStore, SubscriberStore, Weekday};

use crate::fired::{FiredSet, NotificationKey};

/// Tuning for the reminder engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// "HH:MM" boundary at which the fired-set is cleared.
    pub reset_time: String,
    /// Minutes of advance warning; 0 disables pre-notifications.
    pub lead_minutes: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            reset_time: "00:00".into(),
            lead_minutes: 0,
        }
    }
}

/// Decides, once per tick, which notifications must fire.
///
/// The engine owns explicit store handles and its fired-set; the wall clock
/// is supplied by the caller, so ticks are deterministic under test.
pub struct ReminderEngine {
    schedule: ScheduleStore,
    subscribers: SubscriberStore,
    fired: FiredSet,
    options: EngineOptions,
}

impl ReminderEngine {
    pub fn new(
        schedule: ScheduleStore,
        subscribers: SubscriberStore,
        options: EngineOptions,
    ) -> Self {
        Self {
            schedule,
            subscribers,
            fired: FiredSet::new(),
            options,
        }
    }

    /// One tick of the notification loop. Returns the messages to deliver.
    ///
    /// A due task fires when its time string equals the current "HH:MM"
    /// exactly — a tick that misses the due minute (process downtime, a long
    /// stall) skips that occurrence for the day, with no catch-up. With no
    /// subscribers the tick does nothing at all: no schedule read and no
    /// reset check.
    pub fn tick(&mut self, now: DateTime<Tz>) -> Vec<OutgoingMessage> {
        let subscribers = self.subscribers.load();
        if subscribers.is_empty() {
            return Vec::new();
        }

        let today = Weekday::from(now.weekday());
        let current = now.format("%H:%M").to_string();
        let schedule = self.schedule.load_or_empty();
        let mut due = Vec::new();

        for entry in schedule.day(today) {
            if entry.time == current {
                for &chat_id in &subscribers {
                    let key = NotificationKey::due(today, &entry.time, chat_id);
                    if self.fired.mark(key) {
                        tracing::info!("🔔 Due on {today} {}: '{}' → {chat_id}", entry.time, entry.task);
                        due.push(OutgoingMessage {
                            chat_id,
                            text: format!("🔔 *Reminder*\n{} — {}", entry.time, entry.task),
                        });
                    }
                }
            } else if self.options.lead_minutes > 0
                && minutes_until(&entry.time, now) == Some(i64::from(self.options.lead_minutes))
            {
                for &chat_id in &subscribers {
                    let key = NotificationKey::upcoming(today, &entry.time, chat_id);
                    if self.fired.mark(key) {
                        due.push(OutgoingMessage {
                            chat_id,
                            text: format!(
                                "⏳ *Coming up in {} min*\n{} — {}",
                                self.options.lead_minutes, entry.time, entry.task
                            ),
                        });
                    }
                }
            }
        }

        // Clear after firing, so a task scheduled exactly at the boundary
        // still goes out once before the reset.
        if current == self.options.reset_time {
            tracing::debug!("🧹 Daily reset: clearing {} fired key(s)", self.fired.len());
            self.fired.clear();
        }

        due
    }

    /// Number of keys fired since the last reset.
    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }
}

/// Whole minutes from `now` until a same-day "HH:MM" time string.
/// `None` when the string does not parse or the time has already passed.
fn minutes_until(time: &str, now: DateTime<Tz>) -> Option<i64> {
    let target = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let target_min = i64::from(target.hour() * 60 + target.minute());
    let now_min = i64::from(now.hour() * 60 + now.minute());
    (target_min >= now_min).then_some(target_min - now_min)
}

/// Run the notification loop until the process exits.
///
/// Each tick computes "now" in the configured zone, asks the engine what is
/// due, and pushes the messages out. Delivery failures are logged per
/// recipient and never stop the loop.
pub async fn run_reminder_loop<C>(
    engine: Arc<Mutex<ReminderEngine>>,
    channel: Arc<C>,
    tz: Tz,
    tick_interval_secs: u64,
) where
    C: Channel + ?Sized,
{
    tracing::info!(
        "⏰ Reminder loop started (tick every {}s, zone {})",
        tick_interval_secs,
        tz
    );

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(tick_interval_secs));

    loop {
        interval.tick().await;

        let due = {
            let mut eng = engine.lock().await;
            eng.tick(chrono::Utc::now().with_timezone(&tz))
        };

        for message in due {
            let chat_id = message.chat_id;
            if let Err(e) = channel.send(message).await {
                tracing::error!("❌ Delivery to {chat_id} failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nudge_store::{ScheduleEntry, WeekSchedule};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nudge-test-engine-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn seed(dir: &PathBuf, day: Weekday, entries: &[(&str, &str)]) -> (ScheduleStore, SubscriberStore) {
        let schedule = ScheduleStore::new(dir);
        let subscribers = SubscriberStore::new(dir);
        let mut week = WeekSchedule::seeded();
        for (time, task) in entries {
            week.add(
                day,
                ScheduleEntry {
                    time: (*time).into(),
                    task: (*task).into(),
                },
            );
        }
        schedule.save(&week).unwrap();
        (schedule, subscribers)
    }

    // 2026-02-23 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Tz> {
        chrono_tz::UTC
            .with_ymd_and_hms(2026, 2, 23, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_due_task_fires_exactly_once() {
        let dir = scratch("once");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(42).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        let first = engine.tick(monday_at(9, 0));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].chat_id, 42);
        assert!(first[0].text.contains("09:00"));
        assert!(first[0].text.contains("standup"));

        // a second tick in the same minute sends nothing more
        assert!(engine.tick(monday_at(9, 0)).is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_every_subscriber_gets_one_message() {
        let dir = scratch("fanout");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(1).unwrap();
        subscribers.add(2).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        let mut chats: Vec<i64> = engine.tick(monday_at(9, 0)).iter().map(|m| m.chat_id).collect();
        chats.sort_unstable();
        assert_eq!(chats, vec![1, 2]);
        assert!(engine.tick(monday_at(9, 0)).is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reset_boundary_rearms_the_day() {
        let dir = scratch("reset");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(42).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        assert_eq!(engine.tick(monday_at(9, 0)).len(), 1);
        assert_eq!(engine.fired_count(), 1);

        // the reset tick clears the cache...
        assert!(engine.tick(monday_at(0, 0)).is_empty());
        assert_eq!(engine.fired_count(), 0);

        // ...so the same (time, day) can fire again next week
        assert_eq!(engine.tick(monday_at(9, 0)).len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_task_at_the_reset_minute_fires_before_the_clear() {
        let dir = scratch("boundary-task");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("00:00", "midnight check")]);
        subscribers.add(42).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        let due = engine.tick(monday_at(0, 0));
        assert_eq!(due.len(), 1);
        assert!(due[0].text.contains("midnight check"));
        assert_eq!(engine.fired_count(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_subscribers_short_circuits() {
        let dir = scratch("nosubs");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        let mut engine = ReminderEngine::new(schedule, subscribers.clone(), EngineOptions::default());

        assert!(engine.tick(monday_at(9, 0)).is_empty());

        // with no subscribers even the reset boundary leaves the cache alone
        subscribers.add(42).unwrap();
        assert_eq!(engine.tick(monday_at(9, 0)).len(), 1);
        subscribers.save(&std::collections::BTreeSet::new()).unwrap();
        assert!(engine.tick(monday_at(0, 0)).is_empty());
        assert_eq!(engine.fired_count(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_absent_day_bucket_means_no_tasks() {
        let dir = scratch("absent-day");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(42).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        // 2026-02-24 is a Tuesday; monday's entries must not leak
        let tuesday = chrono_tz::UTC.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap();
        assert!(engine.tick(tuesday).is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_schedule_degrades_to_empty() {
        let dir = scratch("bad-schedule");
        let schedule = ScheduleStore::new(&dir);
        let subscribers = SubscriberStore::new(&dir);
        subscribers.add(42).unwrap();
        std::fs::write(dir.join("schedule.json"), "{broken").unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        assert!(engine.tick(monday_at(9, 0)).is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lead_time_pre_notification() {
        let dir = scratch("lead");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(42).unwrap();
        let options = EngineOptions {
            lead_minutes: 5,
            ..EngineOptions::default()
        };
        let mut engine = ReminderEngine::new(schedule, subscribers, options);

        let ahead = engine.tick(monday_at(8, 55));
        assert_eq!(ahead.len(), 1);
        assert!(ahead[0].text.contains("Coming up"));
        assert!(ahead[0].text.contains("09:00"));

        // once only, and the due notification still fires on its own minute
        assert!(engine.tick(monday_at(8, 55)).is_empty());
        let due = engine.tick(monday_at(9, 0));
        assert_eq!(due.len(), 1);
        assert!(due[0].text.contains("Reminder"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_exact_match_means_a_late_tick_skips() {
        let dir = scratch("late-tick");
        let (schedule, subscribers) = seed(&dir, Weekday::Monday, &[("09:00", "standup")]);
        subscribers.add(42).unwrap();
        let mut engine = ReminderEngine::new(schedule, subscribers, EngineOptions::default());

        // the process was down during the due minute; 09:01 does not match
        assert!(engine.tick(monday_at(9, 1)).is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_minutes_until() {
        let now = monday_at(8, 55);
        assert_eq!(minutes_until("09:00", now), Some(5));
        assert_eq!(minutes_until("08:55", now), Some(0));
        assert_eq!(minutes_until("08:00", now), None);
        assert_eq!(minutes_until("garbage", now), None);
    }
}
