/// Types for bus schedule data
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Travel leg of a trip.
///
/// `CityToIIUC`/`IIUCToCity` are used by the regular (Saturday to Wednesday)
/// timetable, `ToUniversity`/`FromUniversity` by the Friday one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    CityToIIUC,
    IIUCToCity,
    ToUniversity,
    FromUniversity,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::CityToIIUC,
        Direction::IIUCToCity,
        Direction::ToUniversity,
        Direction::FromUniversity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::CityToIIUC => "CityToIIUC",
            Direction::IIUCToCity => "IIUCToCity",
            Direction::ToUniversity => "ToUniversity",
            Direction::FromUniversity => "FromUniversity",
        }
    }

    /// Returns true for trips leaving campus.
    pub fn is_return(&self) -> bool {
        matches!(self, Direction::IIUCToCity | Direction::FromUniversity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleType {
    Regular,
    Friday,
}

impl ScheduleType {
    pub const ALL: [ScheduleType; 2] = [ScheduleType::Regular, ScheduleType::Friday];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Regular => "Regular",
            ScheduleType::Friday => "Friday",
        }
    }
}

/// Bus type labels that appear on Friday trips.
pub const BUS_TYPES: [&str; 4] = ["IIUC Bus", "IIUC A&H B", "AC Bus", "Non-AC Bus"];

/// Error returned when a filter value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_from_str!(Direction, "direction");
impl_from_str!(Gender, "gender");
impl_from_str!(ScheduleType, "schedule type");

/// One bus trip entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub id: String,
    /// Departure time as printed on the timetable, e.g. `"7:00 AM"`.
    pub time: String,
    pub starting_point: String,
    pub route: String,
    pub end_point: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schedule_type: ScheduleType,
}

impl ScheduleRecord {
    /// Hour as written before the colon (`"1:30 PM"` gives 1, `"07:00:00"` gives 7).
    ///
    /// Reads the leading digits only, so trailing text after the number is ignored.
    pub fn leading_hour(&self) -> Option<u32> {
        let head = self.time.split(':').next()?.trim_start();
        let digits: String = head.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// One-line `time - from → to` summary used in assistant replies.
    pub fn summary(&self) -> String {
        format!("{} - {} → {}", self.time, self.starting_point, self.end_point)
    }
}
