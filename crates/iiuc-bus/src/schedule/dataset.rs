/// Loading of the static timetable
use super::error::DatasetError;
use super::types::ScheduleRecord;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// The published timetable, Regular (Saturday to Wednesday) then Friday.
const BUNDLED_SCHEDULES: &str = include_str!("../../data/bus_schedules.json");

/// An immutable list of schedule records.
#[derive(Debug, Clone)]
pub struct ScheduleDataset {
    records: Vec<ScheduleRecord>,
}

impl ScheduleDataset {
    /// Parses the timetable that ships with the binary.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json(BUNDLED_SCHEDULES)
    }

    /// Loads a timetable from a JSON file with the same shape as the bundled one.
    ///
    /// # Arguments
    /// * `path` - Path to a JSON array of schedule records
    ///
    /// # Returns
    /// * `Ok(ScheduleDataset)` - The parsed, validated dataset
    /// * `Err` - If the file can't be read, parsed, or has duplicate ids
    pub fn load_from_file(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let dataset = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            records = dataset.len(),
            "Loaded schedule dataset from file"
        );
        Ok(dataset)
    }

    /// Loads from `path` when given, otherwise the bundled timetable.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::bundled(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, DatasetError> {
        let records: Vec<ScheduleRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<ScheduleRecord>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(DatasetError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
