//! Insertion-ordered field records
//!
//! A [`FieldRecord`] is the decoded form of one analyzer packet: an ordered
//! association of field names to values. Order matters because downstream
//! rendering follows the instrument-reported order, so the container is a
//! sequence of key-value pairs with an index for fast lookup rather than a
//! plain map.

use chrono::{DateTime, Local};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

/// Field name holding free-text lines that matched no grammar rule
pub const MISC: &str = "MISC";

/// Canonical measurement order used for receipt rendering
const RECEIPT_ORDER: &[&str] = &[
    "WBC", "RBC", "HGB", "HCT", "MCV", "MCH", "MCHC", "RDW", "PLT", "MPV", "PCT", "PDW", "%LYM",
    "%MON", "%GRA", "#LYM", "#MON", "#GRA", "CRP",
];

/// A field value: a single text value, or accumulated lines for multi-valued
/// fields such as [`MISC`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single text value
    Single(String),
    /// Ordered list of text lines
    Multi(Vec<String>),
}

impl FieldValue {
    /// Get the value as a single string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::Multi(_) => None,
        }
    }

    /// Get the value as a list of lines, if it is one
    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            Self::Single(_) => None,
            Self::Multi(lines) => Some(lines),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

/// One decoded analyzer packet as an ordered set of named fields
#[derive(Debug, Clone)]
pub struct FieldRecord {
    /// Unique record ID
    id: Uuid,
    /// Time the record was produced
    received_at: DateTime<Local>,
    /// Fields in insertion order
    fields: Vec<(String, FieldValue)>,
    /// Index by field name
    index: HashMap<String, usize>,
}

// Equality compares the decoded fields; the record ID and timestamp are
// emission metadata.
impl PartialEq for FieldRecord {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Default for FieldRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Local::now(),
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Get the record ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the time the record was produced
    pub fn received_at(&self) -> DateTime<Local> {
        self.received_at
    }

    /// Insert a field only if the name is not already set (first-wins).
    /// Returns `true` if the value was inserted.
    pub fn insert_first(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.fields.len());
        self.fields.push((name.to_string(), value.into()));
        true
    }

    /// Insert or overwrite a field, keeping its original position if present
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        match self.index.get(name) {
            Some(&idx) => self.fields[idx].1 = value.into(),
            None => {
                self.index.insert(name.to_string(), self.fields.len());
                self.fields.push((name.to_string(), value.into()));
            }
        }
    }

    /// Append a line to the multi-valued [`MISC`] field
    pub fn push_misc(&mut self, line: &str) {
        match self.index.get(MISC) {
            Some(&idx) => {
                if let FieldValue::Multi(lines) = &mut self.fields[idx].1 {
                    lines.push(line.to_string());
                }
            }
            None => {
                self.index.insert(MISC.to_string(), self.fields.len());
                self.fields
                    .push((MISC.to_string(), FieldValue::Multi(vec![line.to_string()])));
            }
        }
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index.get(name).map(|&idx| &self.fields[idx].1)
    }

    /// Get a single-valued field as a string slice
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// Check whether a field is set
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field count
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render a receipt-like text block in canonical measurement order
    pub fn receipt(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push("        RESULT\n".to_string());
        if let Some(no) = self.value("NO.") {
            lines.push(format!("NO. : {no}"));
        }
        let dt = format!(
            "{} {}",
            self.value("DATE").unwrap_or(""),
            self.value("TIME").unwrap_or("")
        );
        let dt = dt.trim();
        if !dt.is_empty() {
            lines.push(dt.to_string());
        }
        if let Some(id) = self.value("ID") {
            lines.push(format!("User ID. {id}"));
        }
        if let Some(sid) = self.value("SID") {
            lines.push(format!("SID. {sid}"));
        }
        if let Some(pid) = self.value("PID") {
            lines.push(format!("PID. {pid}"));
        }
        lines.push(String::new());
        let width = RECEIPT_ORDER.iter().map(|l| l.len()).max().unwrap_or(0);
        for label in RECEIPT_ORDER {
            if let Some(val) = self.value(label) {
                lines.push(format!("{label:width$} : {val}"));
            }
        }
        if let Some(name) = self.value("InstrumentName") {
            lines.push(String::new());
            lines.push(name.to_string());
        }
        if let Some(version) = self.value("FormatVersion") {
            lines.push(format!("Format: {version}"));
        }
        lines.join("\n")
    }
}

// Serialized with the fields as a JSON object so insertion order survives in
// the output.
impl Serialize for FieldRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        struct Fields<'a>(&'a [(String, FieldValue)]);

        impl Serialize for Fields<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, value) in self.0 {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("FieldRecord", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("received_at", &self.received_at)?;
        state.serialize_field("fields", &Fields(&self.fields))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_wins() {
        let mut record = FieldRecord::new();
        assert!(record.insert_first("WBC", "6.23"));
        assert!(!record.insert_first("WBC", "9.99"));
        assert_eq!(record.value("WBC"), Some("6.23"));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut record = FieldRecord::new();
        record.insert_first("ID", "000");
        record.insert_first("WBC", "6.23");
        record.set("ID", "ABC123");

        assert_eq!(record.value("ID"), Some("ABC123"));
        let order: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["ID", "WBC"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut record = FieldRecord::new();
        record.insert_first("PLT", "250");
        record.insert_first("WBC", "6.23");
        record.insert_first("CRP", "0.8 mg/dL");

        let order: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["PLT", "WBC", "CRP"]);
    }

    #[test]
    fn test_misc_accumulates() {
        let mut record = FieldRecord::new();
        record.push_misc("noise line one");
        record.push_misc("noise line two");

        let lines = record.get(MISC).and_then(FieldValue::as_lines).unwrap();
        assert_eq!(lines, ["noise line one", "noise line two"]);
    }

    #[test]
    fn test_receipt_layout() {
        let mut record = FieldRecord::new();
        record.insert_first("NO.", "12/3");
        record.insert_first("DATE", "01/02/24");
        record.insert_first("TIME", "10:30:00");
        record.insert_first("ID", "PATIENT7");
        record.insert_first("WBC", "6.23 10^3/uL");
        record.insert_first("CRP", "0.8 mg/dL");
        record.insert_first("InstrumentName", "MyInstrument");
        record.insert_first("FormatVersion", "v1");

        let receipt = record.receipt();
        assert!(receipt.starts_with("        RESULT"));
        assert!(receipt.contains("NO. : 12/3"));
        assert!(receipt.contains("01/02/24 10:30:00"));
        assert!(receipt.contains("User ID. PATIENT7"));
        assert!(receipt.contains("WBC  : 6.23 10^3/uL"));
        assert!(receipt.contains("CRP  : 0.8 mg/dL"));
        assert!(receipt.contains("MyInstrument"));
        assert!(receipt.contains("Format: v1"));
        // WBC must render before CRP
        assert!(receipt.find("WBC").unwrap() < receipt.find("CRP").unwrap());
    }

    #[test]
    fn test_json_export_keeps_order() {
        let mut record = FieldRecord::new();
        record.insert_first("WBC", "6.23");
        record.insert_first("RBC", "4.5");

        let json = record.to_json().unwrap();
        assert!(json.find("WBC").unwrap() < json.find("RBC").unwrap());
    }
}
