//! # Geographic location catalog
//!
//! CSV-backed registry of named places implementing [`LocationIndex`].
//! Expected columns: `name, latitude, longitude, elevation, utc_offset`
//! and an optional `timezone`. Rows are validated on load: out-of-range or
//! non-finite coordinates fail with the offending record number rather than
//! being silently replaced.
//!
//! Proximity queries go through a lazily built 1°-cell grid index so that a
//! central-line walk issuing thousands of small-radius queries never scans
//! the whole catalog.

use std::collections::HashMap;
use std::io::Read;

use ahash::RandomState;
use camino::Utf8Path;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::constants::{Degree, Kilometer};
use crate::geo::{great_circle_deg_km, GeographicLocation};
use crate::path::LocationIndex;
use crate::umbra_errors::UmbraError;

/// Kilometers per degree of latitude, used to size the cell neighborhood of
/// a query.
const KM_PER_DEG: f64 = 111.19;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: f64,
    #[serde(default)]
    utc_offset: f64,
    #[serde(default)]
    timezone: Option<String>,
}

type CellKey = (i32, i32);

/// In-memory catalog of named places with a grid index.
#[derive(Debug, Default)]
pub struct LocationCatalog {
    entries: Vec<GeographicLocation>,
    grid: OnceCell<HashMap<CellKey, Vec<usize>, RandomState>>,
}

impl LocationCatalog {
    /// Load a catalog from a CSV file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: UTF-8 path of the CSV file (headered).
    ///
    /// Return
    /// ----------
    /// * The loaded catalog, or the first I/O, CSV, or validation failure
    ///   with its record number.
    pub fn from_csv_path(path: &Utf8Path) -> Result<Self, UmbraError> {
        let reader = csv::Reader::from_path(path.as_std_path())?;
        Self::from_csv(reader)
    }

    /// Load a catalog from any CSV reader (used by tests with in-memory data).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, UmbraError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, UmbraError> {
        let mut entries = Vec::new();

        for (i, row) in reader.deserialize::<CatalogRow>().enumerate() {
            // Header is record 0 in the file; data records start at 1
            let record = i as u64 + 1;
            let row = row?;
            validate_row(&row, record)?;

            let mut location = GeographicLocation::new(
                row.name,
                row.latitude,
                row.longitude,
                row.elevation,
            )?
            .with_utc_offset(row.utc_offset);
            if let Some(tz) = row.timezone {
                location = location.with_timezone(tz);
            }
            entries.push(location);
        }

        Ok(LocationCatalog {
            entries,
            grid: OnceCell::new(),
        })
    }

    /// Build a catalog directly from locations (test doubles, synthetic data).
    pub fn from_locations(entries: Vec<GeographicLocation>) -> Self {
        LocationCatalog {
            entries,
            grid: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn grid(&self) -> &HashMap<CellKey, Vec<usize>, RandomState> {
        self.grid.get_or_init(|| {
            let mut cells: HashMap<CellKey, Vec<usize>, RandomState> = HashMap::default();
            for (i, loc) in self.entries.iter().enumerate() {
                cells.entry(cell_of(loc.latitude(), loc.longitude()))
                    .or_default()
                    .push(i);
            }
            cells
        })
    }
}

fn validate_row(row: &CatalogRow, record: u64) -> Result<(), UmbraError> {
    let fail = |message: String| UmbraError::LocationCatalog { record, message };

    if row.name.trim().is_empty() {
        return Err(fail("empty place name".into()));
    }
    if !row.latitude.is_finite() || !(-90.0..=90.0).contains(&row.latitude) {
        return Err(fail(format!("latitude {} out of range", row.latitude)));
    }
    if !row.longitude.is_finite() || !(-180.0..=180.0).contains(&row.longitude) {
        return Err(fail(format!("longitude {} out of range", row.longitude)));
    }
    if !row.elevation.is_finite() {
        return Err(fail("non-finite elevation".into()));
    }
    Ok(())
}

fn cell_of(lat: Degree, lon: Degree) -> CellKey {
    (lat.floor() as i32, lon.floor() as i32)
}

impl LocationIndex for LocationCatalog {
    fn search(
        &self,
        latitude: Degree,
        longitude: Degree,
        radius_km: Kilometer,
    ) -> Vec<GeographicLocation> {
        let grid = self.grid();

        // Cell neighborhood wide enough to cover the radius; longitude cells
        // widen toward the poles
        let dlat = (radius_km / KM_PER_DEG).ceil() as i32 + 1;
        let cos_lat = latitude.to_radians().cos().max(0.01);
        let dlon = (radius_km / (KM_PER_DEG * cos_lat)).ceil() as i32 + 1;

        let lat0 = latitude.floor() as i32;
        let lon0 = longitude.floor() as i32;

        let mut matches = Vec::new();
        for la in (lat0 - dlat)..=(lat0 + dlat) {
            if !(-90..=90).contains(&la) {
                continue;
            }
            for lo in (lon0 - dlon)..=(lon0 + dlon) {
                // Wrap longitude cells across the date line
                let lo_wrapped = (lo + 180).rem_euclid(360) - 180;
                let Some(cell) = grid.get(&(la, lo_wrapped)) else {
                    continue;
                };
                for &i in cell {
                    let loc = &self.entries[i];
                    let d =
                        great_circle_deg_km(latitude, longitude, loc.latitude(), loc.longitude());
                    if d <= radius_km {
                        matches.push(loc.clone());
                    }
                }
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
name,latitude,longitude,elevation,utc_offset,timezone
Dallas,32.7767,-96.7970,131.0,-6.0,America/Chicago
Austin,30.2672,-97.7431,149.0,-6.0,America/Chicago
Paris,48.8566,2.3522,35.0,1.0,Europe/Paris
";

    #[test]
    fn loads_and_indexes_a_catalog() {
        let catalog = LocationCatalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);

        let near_dallas = catalog.search(32.8, -96.8, 30.0);
        assert_eq!(near_dallas.len(), 1);
        assert_eq!(near_dallas[0].name(), "Dallas");
        assert_eq!(near_dallas[0].timezone(), Some("America/Chicago"));
    }

    #[test]
    fn wide_radius_catches_several_places() {
        let catalog = LocationCatalog::from_reader(CSV.as_bytes()).unwrap();
        let texas = catalog.search(31.5, -97.3, 300.0);
        assert_eq!(texas.len(), 2);
    }

    #[test]
    fn far_query_returns_nothing() {
        let catalog = LocationCatalog::from_reader(CSV.as_bytes()).unwrap();
        assert!(catalog.search(-30.0, 140.0, 100.0).is_empty());
    }

    #[test]
    fn out_of_range_latitude_names_the_record() {
        let bad = "name,latitude,longitude,elevation,utc_offset\nNowhere,123.0,10.0,0.0,0.0\n";
        let err = LocationCatalog::from_reader(bad.as_bytes()).unwrap_err();
        match err {
            UmbraError::LocationCatalog { record, ref message } => {
                assert_eq!(record, 1);
                assert!(message.contains("latitude"), "message = {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let bad = "name,latitude,longitude,elevation,utc_offset\n ,10.0,10.0,0.0,0.0\n";
        assert!(LocationCatalog::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn date_line_queries_wrap() {
        let catalog = LocationCatalog::from_locations(vec![
            GeographicLocation::new("Amundsen", -77.0, 179.5, 0.0).unwrap(),
        ]);
        let hits = catalog.search(-77.0, -179.8, 50.0);
        assert_eq!(hits.len(), 1);
    }
}
