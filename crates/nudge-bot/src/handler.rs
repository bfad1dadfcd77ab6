//! Executes chat commands against the stores.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

use nudge_core::error::NudgeError;
use nudge_core::types::IncomingMessage;
use nudge_store::{ScheduleEntry, ScheduleStore, SubscriberStore, Weekday};

use crate::commands::Command;

const HELP: &str = "👋 *Hi! I'm your reminder bot.*\n\
I'll ping you here when a scheduled task is due.\n\
\n\
*Today:*\n\
▫️ /plan_today — show today's plan\n\
▫️ /next_task — show the next task\n\
\n\
*Managing the schedule:*\n\
▫️ `/add <day> <HH:MM> <text>`\n\
   e.g. `/add tuesday 19:00 Rust exercises`\n\
▫️ `/list <day>`\n\
▫️ `/del <day> <number>`\n\
\n\
Days: `monday, tuesday, wednesday, thursday, friday, saturday, sunday`.";

/// Handles inbound chat messages; owns handles to both stores.
pub struct CommandHandler {
    schedule: ScheduleStore,
    subscribers: SubscriberStore,
    tz: Tz,
}

impl CommandHandler {
    pub fn new(schedule: ScheduleStore, subscribers: SubscriberStore, tz: Tz) -> Self {
        Self {
            schedule,
            subscribers,
            tz,
        }
    }

    /// The reply for a message, or `None` when it is not a command.
    pub fn handle(&self, message: &IncomingMessage) -> Option<String> {
        let parsed = Command::parse(&message.text)?;
        Some(match parsed {
            Ok(command) => self.run(command, message.chat_id),
            Err(e) => e.reply(),
        })
    }

    fn run(&self, command: Command, chat_id: i64) -> String {
        let now = Utc::now().with_timezone(&self.tz);
        match command {
            Command::Start => self.start(chat_id),
            Command::Add { day, time, task } => self.add(day, time, task),
            Command::List { day } => self.list(day),
            Command::Del { day, index } => self.del(day, index),
            Command::PlanToday => self.plan_for(now),
            Command::NextTask => self.next_after(now),
        }
    }

    /// `/start`: greet and register the chat as a subscriber.
    fn start(&self, chat_id: i64) -> String {
        match self.subscribers.add(chat_id) {
            Ok(true) => tracing::info!("📝 New subscriber: {chat_id}"),
            Ok(false) => {}
            Err(e) => tracing::error!("❌ Could not persist subscriber {chat_id}: {e}"),
        }
        HELP.to_string()
    }

    fn add(&self, day: Weekday, time: String, task: String) -> String {
        let mut schedule = match self.schedule.load() {
            Ok(s) => s,
            Err(e) => return store_error(&e),
        };
        schedule.add(
            day,
            ScheduleEntry {
                time: time.clone(),
                task: task.clone(),
            },
        );
        if let Err(e) = self.schedule.save(&schedule) {
            return store_error(&e);
        }
        format!("✅ Task \"{task}\" added to {day} at {time}.")
    }

    fn list(&self, day: Weekday) -> String {
        let schedule = match self.schedule.load() {
            Ok(s) => s,
            Err(e) => return store_error(&e),
        };
        let tasks = schedule.day(day);
        if tasks.is_empty() {
            return format!("No tasks for {day}.");
        }
        let lines: Vec<String> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {} - {}", i + 1, t.time, t.task))
            .collect();
        format!("*Plan for {day}:*\n{}", lines.join("\n"))
    }

    fn del(&self, day: Weekday, index: usize) -> String {
        let mut schedule = match self.schedule.load() {
            Ok(s) => s,
            Err(e) => return store_error(&e),
        };
        match schedule.remove(day, index) {
            Some(removed) => {
                if let Err(e) = self.schedule.save(&schedule) {
                    return store_error(&e);
                }
                format!("🗑️ Task \"{}\" removed.", removed.task)
            }
            None => format!("❌ No task number {index} on {day}. Use /list {day} to see the numbers."),
        }
    }

    /// Today's plan, for the given local timestamp.
    pub fn plan_for(&self, now: DateTime<Tz>) -> String {
        let today = Weekday::from(now.weekday());
        let schedule = match self.schedule.load() {
            Ok(s) => s,
            Err(e) => return store_error(&e),
        };
        let tasks = schedule.day(today);
        let body = if tasks.is_empty() {
            "No tasks today.".to_string()
        } else {
            tasks
                .iter()
                .map(|t| format!("📌 {} — {}", t.time, t.task))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("🗓 *Plan for today ({})*:\n\n{body}", now.format("%d.%m.%Y"))
    }

    /// The earliest entry strictly later than the given local timestamp.
    pub fn next_after(&self, now: DateTime<Tz>) -> String {
        let today = Weekday::from(now.weekday());
        let current = now.format("%H:%M").to_string();
        let schedule = match self.schedule.load() {
            Ok(s) => s,
            Err(e) => return store_error(&e),
        };
        // buckets stay sorted by time, so the first later entry is the next one
        match schedule.day(today).iter().find(|t| t.time > current) {
            Some(t) => format!("⏭ *Next task:*\n{} — {}", t.time, t.task),
            None => "✅ All tasks for today are done!".to_string(),
        }
    }
}

fn store_error(e: &NudgeError) -> String {
    tracing::error!("❌ Store failure while handling a command: {e}");
    "⚠️ The schedule file is unreadable right now. Try again later.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nudge-test-handler-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn handler(dir: &PathBuf) -> CommandHandler {
        CommandHandler::new(
            ScheduleStore::new(dir),
            SubscriberStore::new(dir),
            chrono_tz::UTC,
        )
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            chat_id: 42,
            sender_name: Some("Ada".into()),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    // 2026-02-23 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Tz> {
        chrono_tz::UTC
            .with_ymd_and_hms(2026, 2, 23, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_start_registers_subscriber_and_greets() {
        let dir = scratch("start");
        let h = handler(&dir);

        let reply = h.handle(&message("/start")).unwrap();
        assert!(reply.contains("reminder bot"));
        assert!(SubscriberStore::new(&dir).load().contains(&42));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_add_then_list_is_sorted_and_one_indexed() {
        let dir = scratch("add-list");
        let h = handler(&dir);

        h.handle(&message("/add monday 12:30 lunch")).unwrap();
        h.handle(&message("/add monday 09:00 standup")).unwrap();
        let reply = h.handle(&message("/list monday")).unwrap();

        assert!(reply.contains("1. 09:00 - standup"));
        assert!(reply.contains("2. 12:30 - lunch"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_del_removes_exactly_one() {
        let dir = scratch("del");
        let h = handler(&dir);

        h.handle(&message("/add monday 09:00 standup")).unwrap();
        h.handle(&message("/add monday 12:30 lunch")).unwrap();

        let reply = h.handle(&message("/del monday 1")).unwrap();
        assert!(reply.contains("standup"));

        let listed = h.handle(&message("/list monday")).unwrap();
        assert!(listed.contains("1. 12:30 - lunch"));
        assert!(!listed.contains("standup"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_del_out_of_range_is_rejected_without_mutation() {
        let dir = scratch("del-range");
        let h = handler(&dir);

        h.handle(&message("/add monday 09:00 standup")).unwrap();
        let reply = h.handle(&message("/del monday 5")).unwrap();
        assert!(reply.contains("No task number 5"));

        let listed = h.handle(&message("/list monday")).unwrap();
        assert!(listed.contains("standup"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_day_is_reported() {
        let dir = scratch("bad-day");
        let h = handler(&dir);
        let reply = h.handle(&message("/list someday")).unwrap();
        assert!(reply.contains("Unknown day"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_plan_for_shows_today_only() {
        let dir = scratch("plan");
        let h = handler(&dir);

        h.handle(&message("/add monday 09:00 standup")).unwrap();
        h.handle(&message("/add friday 17:00 retro")).unwrap();

        let plan = h.plan_for(monday_at(8, 0));
        assert!(plan.contains("23.02.2026"));
        assert!(plan.contains("09:00 — standup"));
        assert!(!plan.contains("retro"));

        let empty = h.plan_for(chrono_tz::UTC.with_ymd_and_hms(2026, 2, 25, 8, 0, 0).unwrap());
        assert!(empty.contains("No tasks today."));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_next_after_is_strictly_later() {
        let dir = scratch("next");
        let h = handler(&dir);

        h.handle(&message("/add monday 09:00 standup")).unwrap();
        h.handle(&message("/add monday 12:30 lunch")).unwrap();

        assert!(h.next_after(monday_at(8, 0)).contains("09:00 — standup"));
        // the entry due this very minute no longer counts as "next"
        assert!(h.next_after(monday_at(9, 0)).contains("12:30 — lunch"));
        assert!(h.next_after(monday_at(13, 0)).contains("All tasks for today are done"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_non_commands_get_no_reply() {
        let dir = scratch("silence");
        let h = handler(&dir);
        assert!(h.handle(&message("just chatting")).is_none());
        assert!(h.handle(&message("/unknown")).is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_schedule_yields_error_reply() {
        let dir = scratch("bad-file");
        let h = handler(&dir);
        std::fs::write(dir.join("schedule.json"), "{oops").unwrap();
        let reply = h.handle(&message("/list monday")).unwrap();
        assert!(reply.contains("unreadable"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
