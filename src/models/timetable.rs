use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::time::TimeInterval;

static PERIOD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-－―〜~:：]").expect("valid period separator regex"));

/// A timetable slot a staff member may have to attend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassPeriod {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "HR")]
    Homeroom,
    #[serde(rename = "after")]
    AfterSchool,
}

impl ClassPeriod {
    pub const ALL: [ClassPeriod; 6] = [
        ClassPeriod::First,
        ClassPeriod::Second,
        ClassPeriod::Third,
        ClassPeriod::Fourth,
        ClassPeriod::Homeroom,
        ClassPeriod::AfterSchool,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClassPeriod::First => "1",
            ClassPeriod::Second => "2",
            ClassPeriod::Third => "3",
            ClassPeriod::Fourth => "4",
            ClassPeriod::Homeroom => "HR",
            ClassPeriod::AfterSchool => "after",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_digits(raw.trim());
        match normalized.as_str() {
            "HR" | "hr" => Some(ClassPeriod::Homeroom),
            "after" => Some(ClassPeriod::AfterSchool),
            other => match other.parse::<u32>().ok()? {
                1 => Some(ClassPeriod::First),
                2 => Some(ClassPeriod::Second),
                3 => Some(ClassPeriod::Third),
                4 => Some(ClassPeriod::Fourth),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ClassPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single period or an inclusive `first-last` range from a timetable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpan {
    pub first: ClassPeriod,
    pub last: ClassPeriod,
}

impl PeriodSpan {
    /// Accepts `"2"`, `"1-2"`, `"３〜４"`, `"HR"`; reversed ranges are reordered.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_digits(raw.trim());
        if normalized.is_empty() {
            return None;
        }

        let parts: Vec<&str> = PERIOD_SEPARATOR.split(&normalized).collect();
        let (first, last) = if parts.len() > 1 {
            let first = ClassPeriod::parse(parts[0])?;
            let last = ClassPeriod::parse(parts[parts.len() - 1])?;
            (first.min(last), first.max(last))
        } else {
            let single = ClassPeriod::parse(&normalized)?;
            (single, single)
        };

        Some(Self { first, last })
    }

    pub fn periods(&self) -> impl Iterator<Item = ClassPeriod> + '_ {
        ClassPeriod::ALL
            .into_iter()
            .filter(move |period| *period >= self.first && *period <= self.last)
    }

    pub fn label(&self) -> String {
        if self.first == self.last {
            self.first.label().to_string()
        } else {
            format!("{}-{}", self.first, self.last)
        }
    }
}

fn normalize_digits(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '０'..='９' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
            _ => ch,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTime {
    pub period: ClassPeriod,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

/// Clock hours of each class period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodTimeTable {
    entries: Vec<PeriodTime>,
}

impl Default for PeriodTimeTable {
    fn default() -> Self {
        let entry = |period, start, end| PeriodTime {
            period,
            interval: TimeInterval::from_minutes(start, end),
        };
        Self {
            entries: vec![
                entry(ClassPeriod::First, 540, 635),
                entry(ClassPeriod::Second, 645, 740),
                entry(ClassPeriod::Third, 785, 880),
                entry(ClassPeriod::Fourth, 890, 985),
                entry(ClassPeriod::Homeroom, 890, 935),
                entry(ClassPeriod::AfterSchool, 990, 1080),
            ],
        }
    }
}

impl PeriodTimeTable {
    pub fn get(&self, period: ClassPeriod) -> Option<TimeInterval> {
        self.entries
            .iter()
            .find(|entry| entry.period == period)
            .map(|entry| entry.interval)
    }

    /// `[first period start, last period end]`.
    pub fn span_interval(&self, span: &PeriodSpan) -> Option<TimeInterval> {
        let first = self.get(span.first)?;
        let last = self.get(span.last)?;
        Some(TimeInterval::new(first.start, last.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    /// April-September is the first semester, October-March the second.
    pub fn for_month(month: u32) -> Self {
        if (4..=9).contains(&month) {
            Semester::First
        } else {
            Semester::Second
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemesterScope {
    First,
    Second,
    #[default]
    Full,
}

impl SemesterScope {
    pub fn includes(self, semester: Semester) -> bool {
        match self {
            SemesterScope::Full => true,
            SemesterScope::First => semester == Semester::First,
            SemesterScope::Second => semester == Semester::Second,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSlot {
    /// 0 = Sunday ... 6 = Saturday.
    pub weekday: u8,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_year: Option<i32>,
    #[serde(default)]
    pub semester_type: SemesterScope,
    #[serde(default)]
    pub first_semester: Option<ClassSlot>,
    #[serde(default)]
    pub second_semester: Option<ClassSlot>,
}

impl ClassEntry {
    pub fn slot_for(&self, semester: Semester) -> Option<&ClassSlot> {
        if !self.semester_type.includes(semester) {
            return None;
        }
        match semester {
            Semester::First => self.first_semester.as_ref(),
            Semester::Second => self.second_semester.as_ref(),
        }
    }

    pub fn runs_in_year(&self, fiscal_year: i32) -> bool {
        self.class_year.map_or(true, |year| year == fiscal_year)
    }
}
