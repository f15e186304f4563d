use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One booking-code definition from the reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDefinition {
    /// User-defined categorization tag, e.g. "CT".
    pub code: String,
    /// Display description, e.g. "Collecte".
    pub description: String,
    /// Booking type this code classifies into.
    pub booking_type: String,
    /// Main group within the type.
    pub maingroup: String,
    /// Subgroup within the main group.
    pub subgroup: String,
    /// Report ordering position, owned by the reference data (not alphabetic).
    pub sequence: u32,
}

/// Immutable booking-code lookup service.
///
/// Built once by the caller from reference data and passed by reference into
/// each report provider. The report engine never mutates it.
#[derive(Debug, Clone, Default)]
pub struct BookingCatalog {
    by_code: BTreeMap<String, BookingDefinition>,
    by_key: BTreeMap<(String, String, String), u32>,
}

impl BookingCatalog {
    /// Build a catalog from booking-code definitions.
    ///
    /// When two definitions share a code the first one wins; when two codes
    /// share a classification key the lowest sequence number wins.
    pub fn new(definitions: Vec<BookingDefinition>) -> Self {
        let mut by_code = BTreeMap::new();
        let mut by_key: BTreeMap<(String, String, String), u32> = BTreeMap::new();
        for def in definitions {
            let key = (
                def.booking_type.clone(),
                def.maingroup.clone(),
                def.subgroup.clone(),
            );
            by_key
                .entry(key)
                .and_modify(|seq| *seq = (*seq).min(def.sequence))
                .or_insert(def.sequence);
            by_code.entry(def.code.clone()).or_insert(def);
        }
        Self { by_code, by_key }
    }

    /// Look up the description for a booking code.
    pub fn description(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(|d| d.description.as_str())
    }

    /// Look up the report sequence number for a booking code.
    pub fn sequence_for_code(&self, code: &str) -> Option<u32> {
        self.by_code.get(code).map(|d| d.sequence)
    }

    /// Look up the report sequence number for a classification key.
    pub fn sequence_for_key(
        &self,
        booking_type: &str,
        maingroup: &str,
        subgroup: &str,
    ) -> Option<u32> {
        self.by_key
            .get(&(
                booking_type.to_string(),
                maingroup.to_string(),
                subgroup.to_string(),
            ))
            .copied()
    }

    /// Look up the (type, maingroup, subgroup) classification for a code.
    pub fn classification(&self, code: &str) -> Option<(&str, &str, &str)> {
        self.by_code.get(code).map(|d| {
            (
                d.booking_type.as_str(),
                d.maingroup.as_str(),
                d.subgroup.as_str(),
            )
        })
    }

    /// Number of known booking codes.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether the catalog holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
