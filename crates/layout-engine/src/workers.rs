//! Worker pool records
//!
//! Workers are a plain table alongside the graph. They are not linked to
//! nodes and are not part of undo history.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::export::SheetRow;
use crate::types::{coerce_int, lenient};

/// One worker pool row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    #[serde(rename = "Worker", default)]
    pub name: String,
    #[serde(rename = "Amount", default, deserialize_with = "lenient::int")]
    pub amount: i64,
    #[serde(rename = "Shift", default)]
    pub shift: String,
    #[serde(rename = "Speed", default, deserialize_with = "lenient::int")]
    pub speed: i64,
    #[serde(rename = "Efficiency", default, deserialize_with = "lenient::int")]
    pub efficiency: i64,
    #[serde(rename = "Home_Language", default)]
    pub language: String,
    #[serde(rename = "Scope", default)]
    pub scope: String,
    #[serde(rename = "Additional_Services", default)]
    pub additional_services: String,
}

impl Default for WorkerRecord {
    /// The row the editor adds for a new team
    fn default() -> Self {
        Self {
            name: "New Team".to_string(),
            amount: 1,
            shift: "Day".to_string(),
            speed: 100,
            efficiency: 95,
            language: "English".to_string(),
            scope: "General".to_string(),
            additional_services: "None".to_string(),
        }
    }
}

impl SheetRow for WorkerRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Worker",
        "Amount",
        "Shift",
        "Speed",
        "Efficiency",
        "Home_Language",
        "Scope",
        "Additional_Services",
    ];

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.as_str()),
            Value::from(self.amount),
            Value::from(self.shift.as_str()),
            Value::from(self.speed),
            Value::from(self.efficiency),
            Value::from(self.language.as_str()),
            Value::from(self.scope.as_str()),
            Value::from(self.additional_services.as_str()),
        ]
    }
}

/// An editable worker column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerField {
    Name,
    Amount,
    Shift,
    Speed,
    Efficiency,
    Language,
    Scope,
    AdditionalServices,
}

impl WorkerField {
    pub fn is_numeric(&self) -> bool {
        matches!(self, WorkerField::Amount | WorkerField::Speed | WorkerField::Efficiency)
    }

    /// Write form input into a record; numeric columns coerce bad input to 0
    pub fn set(&self, record: &mut WorkerRecord, value: &str) {
        match self {
            WorkerField::Name => record.name = value.to_string(),
            WorkerField::Amount => record.amount = coerce_int(value),
            WorkerField::Shift => record.shift = value.to_string(),
            WorkerField::Speed => record.speed = coerce_int(value),
            WorkerField::Efficiency => record.efficiency = coerce_int(value),
            WorkerField::Language => record.language = value.to_string(),
            WorkerField::Scope => record.scope = value.to_string(),
            WorkerField::AdditionalServices => record.additional_services = value.to_string(),
        }
    }
}

/// The worker table being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerRoster {
    records: Vec<WorkerRecord>,
}

impl WorkerRoster {
    pub fn new(records: Vec<WorkerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[WorkerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a default worker row; returns its index
    pub fn add(&mut self) -> usize {
        self.records.push(WorkerRecord::default());
        self.records.len() - 1
    }

    /// Edit one field; false when `index` is out of range
    pub fn update(&mut self, index: usize, field: WorkerField, value: &str) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                field.set(record, value);
                true
            }
            None => false,
        }
    }

    /// Remove a row, keeping the order of the others
    pub fn remove(&mut self, index: usize) -> Option<WorkerRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_uses_new_team_defaults() {
        let mut roster = WorkerRoster::default();
        let index = roster.add();
        assert_eq!(index, 0);
        let record = &roster.records()[0];
        assert_eq!(record.name, "New Team");
        assert_eq!((record.amount, record.speed, record.efficiency), (1, 100, 95));
        assert_eq!(record.shift, "Day");
    }

    #[test]
    fn test_update_coerces_numbers() {
        let mut roster = WorkerRoster::default();
        roster.add();
        assert!(roster.update(0, WorkerField::Amount, "3"));
        assert!(roster.update(0, WorkerField::Speed, "fast"));
        assert!(roster.update(0, WorkerField::Scope, "Welding"));
        assert!(!roster.update(5, WorkerField::Name, "nobody"));

        let record = &roster.records()[0];
        assert_eq!(record.amount, 3);
        assert_eq!(record.speed, 0);
        assert_eq!(record.scope, "Welding");
        assert!(WorkerField::Efficiency.is_numeric());
        assert!(!WorkerField::Shift.is_numeric());
    }

    #[test]
    fn test_remove_by_index() {
        let mut roster = WorkerRoster::default();
        roster.add();
        roster.add();
        roster.update(1, WorkerField::Name, "Second");
        let removed = roster.remove(0).unwrap();
        assert_eq!(removed.name, "New Team");
        assert_eq!(roster.records()[0].name, "Second");
        assert!(roster.remove(3).is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_wire_format_is_lenient() {
        let json = serde_json::json!({
            "Worker": "Crew A",
            "Amount": "4",
            "Speed": 90.7,
            "Efficiency": null,
            "Shift": "Night"
        });
        let record: WorkerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.amount, 4);
        assert_eq!(record.speed, 90);
        assert_eq!(record.efficiency, 0);
        assert_eq!(record.language, "");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["Home_Language"], "");
        assert_eq!(back["Amount"], 4);
    }
}
