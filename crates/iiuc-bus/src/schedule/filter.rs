//! Filter engine over the schedule dataset.
//!
//! A [`FilterState`] holds six independent dimensions. A record is kept when it
//! satisfies every dimension that is not set to `All`. Free-text search also
//! understands a few informal words ("morning", "ac", "friday", ...) which are
//! OR-ed with the plain substring checks.

use super::types::{Direction, Gender, ScheduleRecord, ScheduleType};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

static MORNING_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[6-9]:").unwrap());
static AFTERNOON_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1[0-6]:").unwrap());
static EVENING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[7-9]:|^2[0-3]:").unwrap());
static ROUTE_SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[–—-]").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PARENTHESES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

const CAMPUS: &str = "IIUC";

/// A filter dimension: either a wildcard or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    /// `""` and `"All"` (any case) parse to the wildcard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

impl<T: Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("All"),
            Selection::Only(v) => serializer.collect_str(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Current filter selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_term: String,
    pub direction: Selection<Direction>,
    pub gender: Selection<Gender>,
    pub bus_type: Selection<String>,
    pub schedule_type: Selection<ScheduleType>,
    pub route_filter: Selection<String>,
}

/// Shortcut filters offered next to the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickFilter {
    Morning,
    Friday,
    Female,
    Male,
    Ac,
    Bot,
    Agrabad,
    Chatteswari,
    /// Anything else is used as a plain search term.
    Search(String),
}

impl QuickFilter {
    pub fn parse(preset: &str) -> Self {
        match preset {
            "morning" => QuickFilter::Morning,
            "friday" => QuickFilter::Friday,
            "female" => QuickFilter::Female,
            "male" => QuickFilter::Male,
            "ac" => QuickFilter::Ac,
            "bot" => QuickFilter::Bot,
            "agrabad" => QuickFilter::Agrabad,
            "chatteswari" => QuickFilter::Chatteswari,
            other => QuickFilter::Search(other.to_string()),
        }
    }
}

impl FilterState {
    /// Returns true if any dimension differs from the identity state.
    pub fn is_searching(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Number of dimensions that are currently narrowing the results.
    pub fn active_filter_count(&self) -> usize {
        [
            !self.search_term.is_empty(),
            !self.direction.is_all(),
            !self.gender.is_all(),
            !self.bus_type.is_all(),
            !self.schedule_type.is_all(),
            !self.route_filter.is_all(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn reset_all_filters(&mut self) {
        *self = FilterState::default();
    }

    /// Resets every dimension, then applies the preset.
    pub fn apply_quick_filter(&mut self, preset: &QuickFilter) {
        self.reset_all_filters();

        match preset {
            QuickFilter::Morning => self.search_term = "morning".to_string(),
            QuickFilter::Friday => self.schedule_type = Selection::Only(ScheduleType::Friday),
            QuickFilter::Female => self.gender = Selection::Only(Gender::Female),
            QuickFilter::Male => self.gender = Selection::Only(Gender::Male),
            QuickFilter::Ac => {
                self.schedule_type = Selection::Only(ScheduleType::Friday);
                self.bus_type = Selection::Only("AC Bus".to_string());
            }
            QuickFilter::Bot => self.route_filter = Selection::Only("BOT".to_string()),
            QuickFilter::Agrabad => self.route_filter = Selection::Only("Agrabad".to_string()),
            QuickFilter::Chatteswari => {
                self.route_filter = Selection::Only("Chatteswari".to_string())
            }
            QuickFilter::Search(term) => self.search_term = term.clone(),
        }
    }

    /// Returns true if the record passes every active dimension.
    pub fn matches(&self, record: &ScheduleRecord) -> bool {
        self.matches_search(record)
            && self.matches_direction(record)
            && self.matches_gender(record)
            && self.matches_bus_type(record)
            && self.matches_schedule_type(record)
            && self.matches_route(record)
    }

    pub fn matches_search(&self, record: &ScheduleRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }

        let needle = self.search_term.to_lowercase();
        let needle = needle.trim();
        let contains = |field: &str| field.to_lowercase().contains(needle);
        let contains_opt = |field: &Option<String>| field.as_deref().is_some_and(contains);

        contains(&record.time)
            || contains(&record.starting_point)
            || contains(&record.route)
            || contains(&record.end_point)
            || contains_opt(&record.bus_type)
            || contains_opt(&record.remarks)
            || contains_opt(&record.description)
            || (needle.contains("morning") && MORNING_REGEX.is_match(&record.time))
            || (needle.contains("afternoon") && AFTERNOON_REGEX.is_match(&record.time))
            || (needle.contains("evening") && EVENING_REGEX.is_match(&record.time))
            || (needle.contains("ac")
                && record
                    .bus_type
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains("ac")))
            || (needle.contains("friday") && record.schedule_type == ScheduleType::Friday)
            || (needle.contains("regular") && record.schedule_type == ScheduleType::Regular)
    }

    pub fn matches_direction(&self, record: &ScheduleRecord) -> bool {
        match &self.direction {
            Selection::All => true,
            Selection::Only(d) => record.direction == *d,
        }
    }

    pub fn matches_gender(&self, record: &ScheduleRecord) -> bool {
        match &self.gender {
            Selection::All => true,
            Selection::Only(g) => record.gender == Some(*g),
        }
    }

    pub fn matches_bus_type(&self, record: &ScheduleRecord) -> bool {
        match &self.bus_type {
            Selection::All => true,
            Selection::Only(t) => record.bus_type.as_deref() == Some(t.as_str()),
        }
    }

    pub fn matches_schedule_type(&self, record: &ScheduleRecord) -> bool {
        match &self.schedule_type {
            Selection::All => true,
            Selection::Only(t) => record.schedule_type == *t,
        }
    }

    pub fn matches_route(&self, record: &ScheduleRecord) -> bool {
        let Selection::Only(route_filter) = &self.route_filter else {
            return true;
        };

        let wanted = route_filter.to_lowercase();
        let route = record.route.to_lowercase();

        route.contains(&wanted)
            || record.starting_point.to_lowercase().contains(&wanted)
            || record.end_point.to_lowercase().contains(&wanted)
            // BOT is the local name for Bahaddarhat
            || (wanted.contains("bot") && route.contains("bahaddarhat"))
            || (wanted.contains("bahaddarhat") && route.contains("bot"))
    }
}

/// Counts shown alongside a filtered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub total_filtered: usize,
    pub total_available: usize,
    pub active_filter_count: usize,
    pub is_searching: bool,
}

/// Returns the records matching `state`, in dataset order.
pub fn filter<'a>(records: &'a [ScheduleRecord], state: &FilterState) -> Vec<&'a ScheduleRecord> {
    records.iter().filter(|r| state.matches(r)).collect()
}

/// Filters and summarizes in one pass.
pub fn filter_with_summary<'a>(
    records: &'a [ScheduleRecord],
    state: &FilterState,
) -> (Vec<&'a ScheduleRecord>, FilterSummary) {
    let filtered = filter(records, state);
    let summary = FilterSummary {
        total_filtered: filtered.len(),
        total_available: records.len(),
        active_filter_count: state.active_filter_count(),
        is_searching: state.is_searching(),
    };
    (filtered, summary)
}

/// Distinct place names for the route dropdown, sorted.
pub fn route_areas(records: &[ScheduleRecord]) -> Vec<String> {
    let mut areas = BTreeSet::new();

    for record in records {
        for part in ROUTE_SEPARATOR_REGEX.split(&record.route).map(str::trim) {
            if part.is_empty() || part == CAMPUS || part.chars().count() <= 2 {
                continue;
            }

            let collapsed = WHITESPACE_REGEX.replace_all(part, " ");
            let cleaned = PARENTHESES_REGEX.replace_all(&collapsed, "");
            let cleaned = cleaned.trim();
            if !cleaned.is_empty() {
                areas.insert(cleaned.to_string());
            }
        }

        if !record.starting_point.is_empty() && record.starting_point != CAMPUS {
            areas.insert(record.starting_point.clone());
        }
        if !record.end_point.is_empty() && record.end_point != CAMPUS {
            areas.insert(record.end_point.clone());
        }
    }

    areas.into_iter().collect()
}

/// Search box plus the all/regular/friday tabs used on the dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardFilter {
    pub search: String,
    pub kind: Selection<ScheduleType>,
}

impl DashboardFilter {
    pub fn matches(&self, record: &ScheduleRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || record.time.to_lowercase().contains(&needle)
            || record.starting_point.to_lowercase().contains(&needle)
            || record.route.to_lowercase().contains(&needle)
            || record.end_point.to_lowercase().contains(&needle);

        let matches_kind = match &self.kind {
            Selection::All => true,
            Selection::Only(t) => record.schedule_type == *t,
        };

        matches_search && matches_kind
    }

    pub fn apply<'a>(&self, records: &'a [ScheduleRecord]) -> Vec<&'a ScheduleRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
