//! Weekly schedule model and its flat-file store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nudge_core::error::{NudgeError, Result};

/// One of the seven fixed day buckets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            other => Err(NudgeError::Store(format!("not a day of the week: {other}"))),
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// One scheduled task inside a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Zero-padded 24h "HH:MM".
    pub time: String,
    pub task: String,
}

/// The weekly task table. A day absent from the map counts as empty.
///
/// Invariant: every bucket stays sorted by time string — zero-padded HH:MM
/// makes lexicographic and chronological order coincide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekSchedule {
    days: BTreeMap<Weekday, Vec<ScheduleEntry>>,
}

impl WeekSchedule {
    /// All seven buckets present and empty — the shape of a freshly seeded file.
    pub fn seeded() -> Self {
        Self {
            days: Weekday::ALL.iter().map(|d| (*d, Vec::new())).collect(),
        }
    }

    pub fn day(&self, day: Weekday) -> &[ScheduleEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert an entry, keeping the bucket sorted by time.
    pub fn add(&mut self, day: Weekday, entry: ScheduleEntry) {
        let bucket = self.days.entry(day).or_default();
        bucket.push(entry);
        bucket.sort_by(|a, b| a.time.cmp(&b.time));
    }

    /// Remove by 1-indexed position. `None` when the index is out of range.
    pub fn remove(&mut self, day: Weekday, index: usize) -> Option<ScheduleEntry> {
        let bucket = self.days.get_mut(&day)?;
        if index == 0 || index > bucket.len() {
            return None;
        }
        Some(bucket.remove(index - 1))
    }

    /// Total entry count across all buckets.
    pub fn total(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Flat-file store for the weekly schedule.
#[derive(Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Create a schedule store inside the given data directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            path: dir.join("schedule.json"),
        }
    }

    /// Load the schedule. A missing file is seeded with all seven empty
    /// buckets and written out; a present but unparsable file is an error —
    /// the caller decides whether to degrade.
    pub fn load(&self) -> Result<WeekSchedule> {
        if !self.path.exists() {
            let seeded = WeekSchedule::seeded();
            if let Err(e) = self.save(&seeded) {
                tracing::warn!("⚠️ Could not seed {}: {e}", self.path.display());
            }
            return Ok(seeded);
        }
        let json = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&json)
            .map_err(|e| NudgeError::Store(format!("cannot parse {}: {e}", self.path.display())))
    }

    /// Load, degrading to an empty schedule on any failure. The notification
    /// loop uses this path; a bad file must never stop the timer.
    pub fn load_or_empty(&self) -> WeekSchedule {
        match self.load() {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::warn!("⚠️ Schedule unreadable, treating as empty: {e}");
                WeekSchedule::default()
            }
        }
    }

    /// Write the schedule back to disk.
    pub fn save(&self, schedule: &WeekSchedule) -> Result<()> {
        let json = serde_json::to_string_pretty(schedule)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
