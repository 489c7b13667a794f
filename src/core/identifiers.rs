//! Analyzer token identifier map
//!
//! Result packets carry one measurement per line, keyed by a single leading
//! token character. This module holds the static table mapping each token to
//! its canonical field label and display unit.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A single identifier map entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    /// Canonical field label (e.g. `WBC`, `CRP`)
    pub label: &'static str,
    /// Display unit appended to numeric values, if the field has one
    pub unit: Option<&'static str>,
}

const ENTRIES: &[(char, &str, Option<&str>)] = &[
    ('p', "Instrument #", None),
    ('q', "DateTime", None),
    ('u', "ID", None),
    ('s', "MeasurementsPerDay", None),
    ('!', "WBC", Some("10^3/uL")),
    ('2', "RBC", Some("10^6/uL")),
    ('3', "HGB", Some("g/dL")),
    ('4', "HCT", Some("%")),
    ('5', "MCV", Some("fL")),
    ('6', "MCH", Some("pg")),
    ('7', "MCHC", Some("g/dL")),
    ('8', "RDW", Some("%")),
    ('@', "PLT", Some("10^3/uL")),
    ('A', "MPV", Some("fL")),
    ('B', "PCT", Some("%")),
    ('C', "PDW", Some("%")),
    ('#', "%LYM", Some("%")),
    ('%', "%MON", Some("%")),
    ('\'', "%GRA", Some("%")),
    ('"', "#LYM", Some("10^3/uL")),
    ('$', "#MON", Some("10^3/uL")),
    ('&', "#GRA", Some("10^3/uL")),
    ('K', "CRP", Some("mg/dL")),
    ('W', "WBC_HIST", None),
    ('X', "RBC_HIST", None),
    ('Y', "PLT_HIST", None),
    ('_', "PLT_THRESHOLD", None),
    (']', "WBC_THRESHOLDS", None),
];

/// Token-code to identifier lookup table, process-wide constant
pub static IDENTIFIER_MAP: LazyLock<HashMap<char, Identifier>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .map(|&(token, label, unit)| (token, Identifier { label, unit }))
        .collect()
});

/// Look up the identifier for a token character
pub fn lookup(token: char) -> Option<&'static Identifier> {
    IDENTIFIER_MAP.get(&token)
}
