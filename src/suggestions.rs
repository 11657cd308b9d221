// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static suggested-use lookup table for detected wood species

use std::collections::HashMap;

/// Fallback suggestion for species without a table entry
pub const FALLBACK_SUGGESTION: &str = "General purpose";

/// Immutable mapping from wood species to a suggested-use string.
///
/// Built once at startup and shared read-only across requests. Lookup
/// is case-insensitive: labels are lowercased before the table is
/// consulted, so "Oak" and "oak" resolve to the same entry.
#[derive(Debug, Clone)]
pub struct SuggestionTable {
    entries: HashMap<&'static str, &'static str>,
}

impl SuggestionTable {
    pub fn new() -> Self {
        let entries = HashMap::from([
            ("mahogany", "Furniture, cabinets, doors"),
            ("oak", "Flooring, tables, chairs"),
            ("narra", "Premium furniture, carvings"),
        ]);
        Self { entries }
    }

    /// Look up the suggested use for a detected species label.
    ///
    /// Returns the fallback for any species outside the table.
    pub fn suggest(&self, label: &str) -> &'static str {
        self.entries
            .get(label.to_lowercase().as_str())
            .copied()
            .unwrap_or(FALLBACK_SUGGESTION)
    }

    /// Number of known species entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SuggestionTable {
    fn default() -> Self {
        Self::new()
    }
}
