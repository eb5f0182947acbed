//! Typed institution location table
//!
//! Resolves input records to coordinates through a [`Geocoder`]. Records that
//! cannot be placed are skipped, logged, and kept in the table's skip list
//! with the reason, so nothing disappears silently.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::continent::{Continent, continent_for_country};
use crate::coordinate::Coordinate;
use crate::geocode::{Geocoder, normalize_query};
use crate::input::CollaboratorRecord;

/// Institution key: whitespace-collapsed, lowercased name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InstitutionId(String);

impl InstitutionId {
    pub fn new(name: &str) -> Self {
        Self(normalize_query(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An institution with a resolved position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedInstitution {
    pub id: InstitutionId,
    pub name: String,
    pub country: String,
    pub continent: Continent,
    pub coordinate: Coordinate,
    pub publications: f64,
    /// Input line the entry came from
    pub line: usize,
}

/// Why a record did not make it onto the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The geocoder found no match
    NotFound,
    /// The geocoder failed (network error, offline, bad response)
    GeocodeFailed(String),
    /// Coordinates supplied in the input were invalid
    InvalidCoordinate(String),
    /// Replaced by a later row for the same institution
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "no geocoding match"),
            SkipReason::GeocodeFailed(e) => write!(f, "geocoding failed: {}", e),
            SkipReason::InvalidCoordinate(e) => write!(f, "invalid coordinate: {}", e),
            SkipReason::Duplicate => write!(f, "replaced by a later row"),
        }
    }
}

/// A record that was left off the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInstitution {
    pub name: String,
    pub country: String,
    pub line: usize,
    pub reason: SkipReason,
}

/// Resolved institutions keyed by [`InstitutionId`], plus everything skipped
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    entries: BTreeMap<InstitutionId, LocatedInstitution>,
    skipped: Vec<SkippedInstitution>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &InstitutionId) -> Option<&LocatedInstitution> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &InstitutionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Located institutions in key order
    pub fn iter(&self) -> impl Iterator<Item = &LocatedInstitution> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedInstitution] {
        &self.skipped
    }

    /// Insert a located institution, returning the entry it replaced
    pub fn insert(&mut self, institution: LocatedInstitution) -> Option<LocatedInstitution> {
        self.entries.insert(institution.id.clone(), institution)
    }

    fn skip(&mut self, record: &CollaboratorRecord, reason: SkipReason) {
        self.push_skipped(SkippedInstitution {
            name: record.institution.clone(),
            country: record.country.clone(),
            line: record.line,
            reason,
        });
    }

    fn push_skipped(&mut self, skipped: SkippedInstitution) {
        warn!(
            institution = %skipped.name,
            line = skipped.line,
            "skipping institution: {}",
            skipped.reason
        );
        self.skipped.push(skipped);
    }
}

/// Resolve every record to a location, skipping the ones that cannot be placed
///
/// Records carrying their own coordinates bypass the geocoder. When an
/// institution appears more than once, the last row that resolves wins and
/// the entry it replaces is recorded as [`SkipReason::Duplicate`].
pub fn resolve_locations<G: Geocoder + ?Sized>(
    records: &[CollaboratorRecord],
    geocoder: &mut G,
) -> LocationTable {
    let mut table = LocationTable::new();
    let total = records.len();

    for (idx, record) in records.iter().enumerate() {
        let id = InstitutionId::new(&record.institution);
        let coordinate = match record.location {
            Some((lat, lon)) => match Coordinate::new(lat, lon) {
                Ok(c) => c,
                Err(e) => {
                    table.skip(record, SkipReason::InvalidCoordinate(e.to_string()));
                    continue;
                }
            },
            None => {
                let query = record.geocode_query();
                debug!("[{}/{}] geocoding '{}'", idx + 1, total, query);
                match geocoder.geocode(&query) {
                    Ok(Some(c)) => c,
                    Ok(None) => {
                        table.skip(record, SkipReason::NotFound);
                        continue;
                    }
                    Err(e) => {
                        table.skip(record, SkipReason::GeocodeFailed(e.to_string()));
                        continue;
                    }
                }
            }
        };

        let replaced = table.insert(LocatedInstitution {
            id,
            name: record.institution.clone(),
            country: record.country.clone(),
            continent: continent_for_country(&record.country),
            coordinate,
            publications: record.publications,
            line: record.line,
        });
        if let Some(old) = replaced {
            table.push_skipped(SkippedInstitution {
                name: old.name,
                country: old.country,
                line: old.line,
                reason: SkipReason::Duplicate,
            });
        }
    }

    info!(
        located = table.len(),
        skipped = table.skipped.len(),
        "resolved institution locations"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{FixedGeocoder, OfflineGeocoder};

    fn record(name: &str, country: &str, pubs: f64, line: usize) -> CollaboratorRecord {
        CollaboratorRecord {
            institution: name.to_string(),
            country: country.to_string(),
            publications: pubs,
            location: None,
            line,
        }
    }

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_institution_id_normalizes() {
        assert_eq!(
            InstitutionId::new("  Imperial   College London"),
            InstitutionId::new("imperial college london")
        );
    }

    #[test]
    fn test_resolve_with_fixed_geocoder() {
        let mut geocoder = FixedGeocoder::new()
            .with("Imperial College London, United Kingdom", c(51.4988, -0.1749))
            .with("Kyoto University, Japan", c(35.0262, 135.7808));

        let records = vec![
            record("Imperial College London", "United Kingdom", 8.0, 2),
            record("Kyoto University", "Japan", 3.0, 3),
            record("Unknown Institute", "Nowhere", 1.0, 4),
        ];

        let table = resolve_locations(&records, &mut geocoder);
        assert_eq!(table.len(), 2);

        let imperial = table.get(&InstitutionId::new("Imperial College London")).unwrap();
        assert_eq!(imperial.continent, Continent::Europe);
        assert_eq!(imperial.publications, 8.0);

        assert_eq!(table.skipped().len(), 1);
        assert_eq!(table.skipped()[0].name, "Unknown Institute");
        assert_eq!(table.skipped()[0].line, 4);
        assert_eq!(table.skipped()[0].reason, SkipReason::NotFound);
    }

    #[test]
    fn test_preresolved_coordinates_bypass_geocoder() {
        let mut geocoder = FixedGeocoder::new();
        let mut rec = record("University of Auckland", "New Zealand", 5.0, 2);
        rec.location = Some((-36.8523, 174.7691));
        let mut bad = record("Broken", "Fiji", 1.0, 3);
        bad.location = Some((123.0, 0.0));

        let table = resolve_locations(&[rec, bad], &mut geocoder);
        assert_eq!(geocoder.lookups(), 0);
        assert_eq!(table.len(), 1);
        assert!(matches!(
            table.skipped()[0].reason,
            SkipReason::InvalidCoordinate(_)
        ));
    }

    #[test]
    fn test_offline_failures_are_recorded() {
        let records = vec![record("Somewhere", "France", 1.0, 2)];
        let table = resolve_locations(&records, &mut OfflineGeocoder);
        assert!(table.is_empty());
        assert!(matches!(
            table.skipped()[0].reason,
            SkipReason::GeocodeFailed(_)
        ));
    }

    #[test]
    fn test_duplicates_keep_last() {
        let mut geocoder = FixedGeocoder::new()
            .with("ETH Zurich, Switzerland", c(47.3763, 8.5477))
            .with("ETH Zurich, CH", c(47.3763, 8.5477));
        let records = vec![
            record("ETH Zurich", "Switzerland", 3.0, 2),
            record("ETH  zurich", "CH", 9.0, 3),
        ];
        let table = resolve_locations(&records, &mut geocoder);

        assert_eq!(table.len(), 1);
        let eth = table.get(&InstitutionId::new("ETH Zurich")).unwrap();
        assert_eq!(eth.publications, 9.0);
        assert_eq!(eth.country, "CH");
        assert_eq!(eth.line, 3);

        assert_eq!(table.skipped().len(), 1);
        assert_eq!(table.skipped()[0].line, 2);
        assert_eq!(table.skipped()[0].country, "Switzerland");
        assert_eq!(table.skipped()[0].reason, SkipReason::Duplicate);
        assert_eq!(geocoder.lookups(), 2);
    }

    #[test]
    fn test_unresolved_duplicate_keeps_earlier_entry() {
        let mut geocoder = FixedGeocoder::new().with("MIT, United States", c(42.3601, -71.0942));
        let records = vec![
            record("MIT", "United States", 4.0, 2),
            record("MIT", "Atlantis", 9.0, 3),
        ];
        let table = resolve_locations(&records, &mut geocoder);

        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().publications, 4.0);
        assert_eq!(table.skipped()[0].line, 3);
        assert_eq!(table.skipped()[0].reason, SkipReason::NotFound);
    }
}
