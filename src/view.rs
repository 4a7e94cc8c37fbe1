use crate::engine::records::{LapRecord, SplitRecord};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFilter {
    #[default]
    All,
    Laps,
    Splits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSort {
    #[default]
    Newest,
    Oldest,
    Fastest,
    Slowest,
}

#[derive(Debug)]
pub struct SelectionParseError;

impl Display for SelectionParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized record view selection")
    }
}

impl Error for SelectionParseError {}

impl FromStr for RecordFilter {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RecordFilter::All),
            "laps" => Ok(RecordFilter::Laps),
            "splits" => Ok(RecordFilter::Splits),
            _ => Err(SelectionParseError),
        }
    }
}

impl FromStr for RecordSort {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(RecordSort::Newest),
            "oldest" => Ok(RecordSort::Oldest),
            "fastest" => Ok(RecordSort::Fastest),
            "slowest" => Ok(RecordSort::Slowest),
            _ => Err(SelectionParseError),
        }
    }
}

/// A borrowed record of either kind, as projected for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordEntry<'a> {
    Lap(&'a LapRecord),
    Split(&'a SplitRecord),
}

impl<'a> RecordEntry<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            RecordEntry::Lap(_) => "Lap",
            RecordEntry::Split(_) => "Split",
        }
    }

    pub fn sequence(&self) -> u32 {
        match self {
            RecordEntry::Lap(lap) => lap.sequence,
            RecordEntry::Split(split) => split.sequence,
        }
    }

    /// The duration the entry displays and sorts by: the delta for a lap,
    /// the cumulative time for a split.
    pub fn display_ms(&self) -> u64 {
        match self {
            RecordEntry::Lap(lap) => lap.lap_ms,
            RecordEntry::Split(split) => split.elapsed_ms,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        match self {
            RecordEntry::Lap(lap) => lap.captured_at,
            RecordEntry::Split(split) => split.captured_at,
        }
    }
}

/// Projects the record set for display: laps-then-splits base order, the
/// filter applied, then a stable sort. The store itself is never touched.
pub fn project<'a>(
    laps: &'a [LapRecord],
    splits: &'a [SplitRecord],
    filter: RecordFilter,
    sort: RecordSort,
) -> Vec<RecordEntry<'a>> {
    let mut entries: Vec<RecordEntry<'a>> = Vec::with_capacity(laps.len() + splits.len());

    if filter != RecordFilter::Splits {
        entries.extend(laps.iter().map(RecordEntry::Lap));
    }
    if filter != RecordFilter::Laps {
        entries.extend(splits.iter().map(RecordEntry::Split));
    }

    match sort {
        RecordSort::Newest => entries.sort_by_key(|entry| Reverse(entry.captured_at())),
        RecordSort::Oldest => entries.sort_by_key(|entry| entry.captured_at()),
        RecordSort::Fastest => entries.sort_by_key(|entry| entry.display_ms()),
        RecordSort::Slowest => entries.sort_by_key(|entry| Reverse(entry.display_ms())),
    }

    entries
}
