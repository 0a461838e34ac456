/// Types for weekly schedule entries
use crate::error::PlannerError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days shown on the class grid. Sunday is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Grid column order.
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }

    /// Zero-based column index on the grid.
    pub fn column(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("'{s}' is not a class day"))
    }
}

/// A recurring weekly class block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    /// Catalog code, if the block belongs to a catalog subject
    pub subject_code: Option<String>,
    pub subject_name: String,
    pub day_of_week: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Rendering token only
    pub color: String,
    pub room: Option<String>,
}

impl ScheduleEntry {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// True if both blocks share a day and their time ranges intersect.
    pub fn overlaps(&self, other: &ScheduleEntry) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

/// Fields supplied when creating or editing a schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntryInput {
    #[serde(default)]
    pub subject_code: Option<String>,
    pub subject_name: String,
    pub day_of_week: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

impl ScheduleEntryInput {
    /// Checks the fields that can be rejected without consulting the store.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.subject_name.trim().is_empty() {
            return Err(PlannerError::validation(
                "subject_name",
                "a subject name is required",
            ));
        }
        if self.start_time >= self.end_time {
            return Err(PlannerError::validation(
                "end_time",
                format!(
                    "must be after the start time ({})",
                    self.start_time.format("%H:%M")
                ),
            ));
        }
        Ok(())
    }

    /// Materializes the input as an entry, picking a palette color if none
    /// was chosen.
    pub fn into_entry(self, id: i64, palette_index: usize) -> ScheduleEntry {
        ScheduleEntry {
            id,
            subject_code: self.subject_code.filter(|c| !c.trim().is_empty()),
            subject_name: self.subject_name.trim().to_string(),
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            color: self
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| color_for(palette_index).to_string()),
            room: self.room.filter(|r| !r.trim().is_empty()),
        }
    }

    /// Applies the input to a stored entry. A blank color keeps the
    /// entry's current color.
    pub fn apply_to(self, existing: &ScheduleEntry) -> ScheduleEntry {
        let color = match self.color.as_deref() {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => existing.color.clone(),
        };
        ScheduleEntry {
            color,
            ..self.into_entry(existing.id, 0)
        }
    }
}

/// Color tokens assigned to new entries in rotation.
pub const COLOR_PALETTE: &[&str] = &[
    "blue", "green", "orange", "purple", "pink", "teal", "yellow", "red",
];

pub fn color_for(index: usize) -> &'static str {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

/// Wall-clock times as `HH:MM`. Seconds are accepted on input and dropped.
pub mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Result<NaiveTime, chrono::ParseError> {
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))?;
        Ok(time.with_second(0).unwrap_or(time))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, start: &str, end: &str) -> ScheduleEntryInput {
        ScheduleEntryInput {
            subject_code: None,
            subject_name: name.to_string(),
            day_of_week: Weekday::Thursday,
            start_time: hhmm::parse(start).unwrap(),
            end_time: hhmm::parse(end).unwrap(),
            color: None,
            room: None,
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(input("Physics", "09:00", "10:30").validate().is_ok());
        assert!(input("", "09:00", "10:30").validate().is_err());
        assert!(input("Physics", "10:30", "10:30").validate().is_err());
        assert!(input("Physics", "11:00", "10:30").validate().is_err());
    }

    #[test]
    fn test_into_entry_assigns_palette_color() {
        let entry = input(" Physics ", "09:00", "10:00").into_entry(4, 9);
        assert_eq!(entry.color, color_for(9));
        assert_eq!(entry.subject_name, "Physics");
        assert_eq!(entry.duration_minutes(), 60);

        let mut custom = input("Physics", "09:00", "10:00");
        custom.color = Some("red".to_string());
        custom.room = Some("  ".to_string());
        let entry = custom.into_entry(5, 0);
        assert_eq!(entry.color, "red");
        assert_eq!(entry.room, None);
    }

    #[test]
    fn test_times_serialize_as_hh_mm() {
        let entry = input("Physics", "09:00:00", "10:30").into_entry(1, 0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["end_time"], "10:30");
        assert_eq!(json["day_of_week"], "thursday");

        let back: ScheduleEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_sunday_is_not_a_class_day() {
        assert!("sunday".parse::<Weekday>().is_err());
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert!(serde_json::from_str::<Weekday>("\"sunday\"").is_err());
    }
}
