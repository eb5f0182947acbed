//! Summary report for a built collaboration map
//!
//! Generates a human-readable overview: per-continent totals, edge strategies,
//! top collaborators and the institutions that could not be placed.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::antimeridian::PathStrategy;
use crate::continent::Continent;
use crate::map::CollaborationMap;
use crate::spherical::great_circle_distance_km;

/// Number of collaborators listed in the "top" section
pub const TOP_COLLABORATORS: usize = 10;

/// Totals for one continent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContinentStats {
    pub institutions: usize,
    pub publications: f64,
}

/// A collaborator line in the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorSummary {
    pub institution: String,
    pub country: String,
    pub publications: f64,
    pub distance_km: f64,
    pub strategy: PathStrategy,
}

/// Aggregated view of a map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub home_label: String,
    pub collaborators: usize,
    pub skipped: usize,
    pub total_publications: f64,
    pub great_circle_edges: usize,
    pub straight_edges: usize,
    pub by_continent: BTreeMap<Continent, ContinentStats>,
    pub top: Vec<CollaboratorSummary>,
    pub farthest: Option<CollaboratorSummary>,
}

impl MapSummary {
    pub fn from_map(map: &CollaborationMap) -> Self {
        let mut by_continent: BTreeMap<Continent, ContinentStats> = BTreeMap::new();
        let mut lines: Vec<CollaboratorSummary> = Vec::with_capacity(map.collaborators.len());

        for entry in &map.collaborators {
            let inst = &entry.institution;
            let stats = by_continent.entry(inst.continent).or_default();
            stats.institutions += 1;
            stats.publications += inst.publications;

            lines.push(CollaboratorSummary {
                institution: inst.name.clone(),
                country: inst.country.clone(),
                publications: inst.publications,
                distance_km: great_circle_distance_km(&map.home.coordinate, &inst.coordinate),
                strategy: entry.edge.strategy,
            });
        }

        let straight_edges = map.straight_segment_count();
        let farthest = lines
            .iter()
            .max_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            .cloned();

        lines.sort_by(|a, b| {
            b.publications
                .total_cmp(&a.publications)
                .then_with(|| a.institution.cmp(&b.institution))
        });
        lines.truncate(TOP_COLLABORATORS);

        Self {
            home_label: map.home.label.clone(),
            collaborators: map.collaborators.len(),
            skipped: map.skipped.len(),
            total_publications: map
                .collaborators
                .iter()
                .map(|c| c.institution.publications)
                .sum(),
            great_circle_edges: map.collaborators.len() - straight_edges,
            straight_edges,
            by_continent,
            top: lines,
            farthest,
        }
    }
}

/// Generate a summary report to the given writer
pub fn generate_summary<W: Write>(map: &CollaborationMap, writer: &mut W) -> io::Result<()> {
    let summary = MapSummary::from_map(map);

    writeln!(writer, "Collaboration Map: {}", summary.home_label)?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Home: {} | Collaborators: {} | Publications: {} | Skipped: {}",
        map.home.coordinate, summary.collaborators, summary.total_publications, summary.skipped
    )?;
    writeln!(
        writer,
        "Edges: {} great-circle arcs ({} points each) / {} straight segments (dateline)",
        summary.great_circle_edges, map.arc_resolution, summary.straight_edges
    )?;
    writeln!(writer)?;

    if !summary.by_continent.is_empty() {
        writeln!(writer, "By Continent:")?;
        for (continent, stats) in &summary.by_continent {
            writeln!(
                writer,
                "  {:<14} {:>4} institutions  {:>7} publications",
                continent.to_string(),
                stats.institutions,
                stats.publications
            )?;
        }
        writeln!(writer)?;
    }

    if !summary.top.is_empty() {
        writeln!(writer, "Top Collaborators:")?;
        for (i, line) in summary.top.iter().enumerate() {
            writeln!(
                writer,
                "  {:>2}. {} ({}) - {} papers, {:.0} km",
                i + 1,
                line.institution,
                line.country,
                line.publications,
                line.distance_km
            )?;
        }
        writeln!(writer)?;
    }

    if let Some(far) = &summary.farthest {
        writeln!(
            writer,
            "Farthest: {} ({:.0} km, {})",
            far.institution, far.distance_km, far.strategy
        )?;
        writeln!(writer)?;
    }

    if !map.skipped.is_empty() {
        writeln!(writer, "Skipped:")?;
        for skipped in &map.skipped {
            writeln!(
                writer,
                "  line {}: {} ({}) - {}",
                skipped.line, skipped.name, skipped.country, skipped.reason
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::continent::Palette;
    use crate::coordinate::Coordinate;
    use crate::geocode::FixedGeocoder;
    use crate::input::parse_records;
    use crate::locations::resolve_locations;
    use crate::map::build_map;

    fn sample_map() -> CollaborationMap {
        let csv = "Institution,Country/Region,Co-authored publications\n\
                   ETH Zurich,Switzerland,6\n\
                   University of Tokyo,Japan,9\n\
                   University of Chile,Chile,2\n\
                   Missing Institute,Peru,1\n";
        let records = parse_records(csv).unwrap();
        let mut geocoder = FixedGeocoder::new()
            .with("ETH Zurich, Switzerland", Coordinate::new(47.3763, 8.5477).unwrap())
            .with("University of Tokyo, Japan", Coordinate::new(35.7126, 139.7620).unwrap())
            .with("University of Chile, Chile", Coordinate::new(-33.4450, -70.6504).unwrap());
        let table = resolve_locations(&records, &mut geocoder);
        build_map(&table, &MapConfig::default(), &Palette::default()).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let summary = MapSummary::from_map(&sample_map());
        assert_eq!(summary.collaborators, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_publications, 17.0);
        // Santiago is more than 180 degrees of raw longitude from Brisbane
        assert_eq!(summary.straight_edges, 1);
        assert_eq!(summary.great_circle_edges, 2);
        assert_eq!(summary.by_continent[&Continent::Asia].institutions, 1);
        assert_eq!(summary.by_continent[&Continent::SouthAmerica].publications, 2.0);
    }

    #[test]
    fn test_summary_ordering() {
        let summary = MapSummary::from_map(&sample_map());
        assert_eq!(summary.top[0].institution, "University of Tokyo");
        assert_eq!(summary.top[2].institution, "University of Chile");
        assert_eq!(summary.farthest.unwrap().institution, "ETH Zurich");
    }

    #[test]
    fn test_generate_summary_text() {
        let mut out = Vec::new();
        generate_summary(&sample_map(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Collaborators: 3"));
        assert!(text.contains("1 straight segments"));
        assert!(text.contains("University of Tokyo (Japan) - 9 papers"));
        assert!(text.contains("line 5: Missing Institute (Peru) - no geocoding match"));
    }
}
