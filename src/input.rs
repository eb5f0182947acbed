//! CSV loading for collaboration exports
//!
//! Reads the institution table exported by SciVal-like tools. The header row
//! is located by its `Institution` column, so any metadata lines an export
//! puts above the table are skipped.
//!
//! Recognised columns (case-insensitive):
//!
//! | Column                     | Required |
//! |----------------------------|----------|
//! | `Institution`              | yes      |
//! | `Country/Region`           | yes      |
//! | `Co-authored publications` | yes      |
//! | `Latitude`, `Longitude`    | no       |

use std::fs;
use std::path::Path;

use thiserror::Error;

pub const INSTITUTION_COLUMN: &str = "institution";
pub const COUNTRY_COLUMN: &str = "country/region";
pub const PUBLICATIONS_COLUMN: &str = "co-authored publications";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Errors that can occur when loading input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No header row with an 'Institution' column found")]
    MissingHeader,

    #[error("Header is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}

/// One row of the collaboration table
#[derive(Debug, Clone, PartialEq)]
pub struct CollaboratorRecord {
    pub institution: String,
    pub country: String,
    pub publications: f64,
    /// Pre-resolved `(lat, lon)`, if the export carries coordinates
    pub location: Option<(f64, f64)>,
    /// 1-based line number in the source file
    pub line: usize,
}

impl CollaboratorRecord {
    /// Query string handed to a geocoder
    pub fn geocode_query(&self) -> String {
        if self.country.is_empty() {
            self.institution.clone()
        } else {
            format!("{}, {}", self.institution, self.country)
        }
    }
}

/// Column positions resolved from the header row
struct Columns {
    institution: usize,
    country: usize,
    publications: usize,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, InputError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };

        Ok(Self {
            institution: find(INSTITUTION_COLUMN).ok_or(InputError::MissingColumn("Institution"))?,
            country: find(COUNTRY_COLUMN).ok_or(InputError::MissingColumn("Country/Region"))?,
            publications: find(PUBLICATIONS_COLUMN)
                .ok_or(InputError::MissingColumn("Co-authored publications"))?,
            latitude: find(LATITUDE_COLUMN),
            longitude: find(LONGITUDE_COLUMN),
        })
    }
}

/// Load collaborator records from a CSV file
pub fn load_records(path: &Path) -> Result<Vec<CollaboratorRecord>, InputError> {
    let content = fs::read_to_string(path)?;
    parse_records(&content)
}

/// Parse collaborator records from CSV text
pub fn parse_records(content: &str) -> Result<Vec<CollaboratorRecord>, InputError> {
    let rows = split_rows(content);

    let header_idx = rows
        .iter()
        .position(|(_, fields)| {
            fields.iter().any(|f| {
                f.trim()
                    .trim_start_matches('\u{feff}')
                    .eq_ignore_ascii_case(INSTITUTION_COLUMN)
            })
        })
        .ok_or(InputError::MissingHeader)?;
    let columns = Columns::from_header(&rows[header_idx].1)?;

    let mut records = Vec::new();
    for (line, fields) in &rows[header_idx + 1..] {
        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");

        let institution = field(columns.institution);
        if institution.is_empty() {
            continue;
        }

        let publications = parse_count(field(columns.publications)).ok_or_else(|| {
            InputError::InvalidRow {
                line: *line,
                message: format!(
                    "invalid publication count '{}' for '{}'",
                    field(columns.publications),
                    institution
                ),
            }
        })?;

        let location = match (columns.latitude, columns.longitude) {
            (Some(lat_idx), Some(lon_idx)) => {
                parse_location(field(lat_idx), field(lon_idx)).map_err(|message| {
                    InputError::InvalidRow {
                        line: *line,
                        message,
                    }
                })?
            }
            _ => None,
        };

        records.push(CollaboratorRecord {
            institution: institution.to_string(),
            country: field(columns.country).to_string(),
            publications,
            location,
            line: *line,
        });
    }

    Ok(records)
}

/// Publication counts, allowing thousands separators and an empty cell as zero
fn parse_count(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw == "-" {
        return Some(0.0);
    }
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn parse_location(lat: &str, lon: &str) -> Result<Option<(f64, f64)>, String> {
    if lat.is_empty() && lon.is_empty() {
        return Ok(None);
    }
    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon))?;
    Ok(Some((lat, lon)))
}

/// Split CSV text into rows of fields, tracking the line each row starts on.
///
/// Handles quoted fields with embedded commas, newlines and doubled quotes.
fn split_rows(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' => {
                line += 1;
                if in_quotes {
                    field.push('\n');
                } else {
                    fields.push(std::mem::take(&mut field));
                    push_row(&mut rows, row_start, std::mem::take(&mut fields));
                    row_start = line;
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_row(&mut rows, row_start, fields);
    }

    rows
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    if fields.iter().any(|f| !f.trim().is_empty()) {
        rows.push((line, fields));
    }
}
