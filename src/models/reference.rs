use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

// ---------------------------------------------------------------------------
// CountryReference: Static per-country facts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryReference {
    /// Country name exactly as keyed in the upstream document.
    pub country: String,
    /// Population in millions.
    pub population: f64,
    pub lockdown_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// ReferenceData: Immutable lookup table passed into enrichment
// ---------------------------------------------------------------------------

/// The set of countries the report covers, with their population and
/// lockdown date.
///
/// Built once and only read afterwards. Entries are kept sorted by country.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    entries: Vec<CountryReference>,
}

impl ReferenceData {
    /// Build a reference table, rejecting duplicates and non-positive populations.
    pub fn new(mut entries: Vec<CountryReference>) -> Result<Self> {
        entries.sort_by(|a, b| a.country.cmp(&b.country));
        for pair in entries.windows(2) {
            if pair[0].country == pair[1].country {
                return Err(ReportError::InvalidArgument(format!(
                    "Duplicate reference entry for {}",
                    pair[0].country
                )));
            }
        }
        if let Some(bad) = entries
            .iter()
            .find(|e| !(e.population.is_finite() && e.population > 0.0))
        {
            return Err(ReportError::InvalidArgument(format!(
                "Population for {} must be positive, got {}",
                bad.country, bad.population
            )));
        }
        Ok(Self { entries })
    }

    /// Load a reference table from a JSON array of
    /// `{country, population, lockdown_date}` objects.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<CountryReference> = serde_json::from_str(&contents)?;
        Self::new(entries)
    }

    /// Look up one country.
    pub fn get(&self, country: &str) -> Option<&CountryReference> {
        self.entries
            .binary_search_by(|e| e.country.as_str().cmp(country))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn countries(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.country.as_str()).collect()
    }

    pub fn entries(&self) -> &[CountryReference] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the named countries. Unknown names are an error so a typo
    /// does not silently produce an empty report.
    pub fn restrict(&self, countries: &[&str]) -> Result<Self> {
        let mut kept = Vec::with_capacity(countries.len());
        for name in countries {
            let entry = self.get(name).ok_or_else(|| {
                ReportError::NotFound(format!("No reference data for country: {}", name))
            })?;
            kept.push(entry.clone());
        }
        Self::new(kept)
    }
}

impl Default for ReferenceData {
    /// Nordic countries plus the large European economies and the US, with
    /// 2019 population estimates and the date national restrictions began.
    fn default() -> Self {
        let rows: [(&str, f64, (i32, u32, u32)); 10] = [
            ("Denmark", 5.81, (2020, 3, 11)),
            ("Finland", 5.52, (2020, 3, 16)),
            ("France", 67.06, (2020, 3, 17)),
            ("Germany", 83.17, (2020, 3, 22)),
            ("Italy", 60.36, (2020, 3, 9)),
            ("Norway", 5.37, (2020, 3, 12)),
            ("Spain", 47.08, (2020, 3, 14)),
            ("Sweden", 10.33, (2020, 3, 29)),
            ("US", 328.24, (2020, 3, 19)),
            ("United Kingdom", 66.80, (2020, 3, 23)),
        ];
        let entries = rows
            .iter()
            .filter_map(|(country, population, (y, m, d))| {
                NaiveDate::from_ymd_opt(*y, *m, *d).map(|lockdown_date| CountryReference {
                    country: country.to_string(),
                    population: *population,
                    lockdown_date,
                })
            })
            .collect();
        Self { entries }
    }
}
