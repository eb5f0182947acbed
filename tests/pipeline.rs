//! End-to-end pipeline: CSV file -> locations -> map -> HTML / GeoJSON / summary

use std::fs;

use collab_map::{
    CachedGeocoder, Continent, Coordinate, FixedGeocoder, MapConfig, OutputFormat, Palette,
    PathStrategy, SkipReason, build_map, generate_summary, load_records, render,
    resolve_locations, to_geojson,
};
use tempfile::TempDir;

const EXPORT: &str = "\
Collaborating institutions,,
Exported from SciVal,,
Institution,Country/Region,Co-authored publications
University College London,United Kingdom,25
University of Hawaii at Manoa,United States,4
\"University of California, Berkeley\",United States,\"1,200\"
Universidad de Buenos Aires,Argentina,-
Nowhere Polytechnic,Atlantis,3
";

fn c(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn geocoder() -> FixedGeocoder {
    FixedGeocoder::new()
        .with("University College London, United Kingdom", c(51.5246, -0.1340))
        .with("University of Hawaii at Manoa, United States", c(21.2969, -157.8171))
        .with("University of California, Berkeley, United States", c(37.8719, -122.2585))
        .with("Universidad de Buenos Aires, Argentina", c(-34.5997, -58.3731))
}

fn write_export(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("collab.csv");
    fs::write(&path, EXPORT).unwrap();
    path
}

#[test]
fn csv_to_map() {
    let dir = TempDir::new().unwrap();
    let records = load_records(&write_export(&dir)).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[2].institution, "University of California, Berkeley");
    assert_eq!(records[2].publications, 1200.0);
    assert_eq!(records[3].publications, 0.0);

    let table = resolve_locations(&records, &mut geocoder());
    assert_eq!(table.len(), 4);
    assert_eq!(table.skipped().len(), 1);
    assert_eq!(table.skipped()[0].name, "Nowhere Polytechnic");
    assert_eq!(table.skipped()[0].reason, SkipReason::NotFound);

    let map = build_map(&table, &MapConfig::default(), &Palette::default()).unwrap();
    assert_eq!(map.collaborators.len(), 4);

    let entry = |name: &str| {
        map.collaborators
            .iter()
            .find(|e| e.institution.name == name)
            .unwrap()
    };

    // Brisbane -> London stays on the same side of the dateline
    let london = entry("University College London");
    assert_eq!(london.edge.strategy, PathStrategy::GreatCircle);
    assert_eq!(london.edge.path.len(), 50);
    assert!(london.edge.path.first().approx_eq(&map.home.coordinate, 1e-6));
    assert!(london.edge.path.last().approx_eq(&c(51.5246, -0.1340), 1e-6));
    assert!(!london.edge.path.has_dateline_tear());
    assert_eq!(london.edge.style.stroke_weight, 6.0);
    assert_eq!(london.color, "blue");
    assert_eq!(london.institution.continent, Continent::Europe);

    // Brisbane -> Honolulu wraps, so it is drawn as a chord
    let hawaii = entry("University of Hawaii at Manoa");
    assert_eq!(hawaii.edge.strategy, PathStrategy::StraightSegment);
    assert_eq!(
        hawaii.edge.path.points(),
        &[map.home.coordinate, c(21.2969, -157.8171)][..]
    );

    // Stroke weight grows without a cap
    let berkeley = entry("University of California, Berkeley");
    assert_eq!(berkeley.edge.style.stroke_weight, 241.0);
    assert_eq!(berkeley.marker_radius, 403.0);

    let buenos_aires = entry("Universidad de Buenos Aires");
    assert_eq!(buenos_aires.edge.style.stroke_weight, 1.0);
    assert_eq!(buenos_aires.color, "orange");
    assert_eq!(
        buenos_aires.popup,
        "Universidad de Buenos Aires (Argentina) - 0 papers"
    );
}

#[test]
fn rendered_outputs() {
    let dir = TempDir::new().unwrap();
    let records = load_records(&write_export(&dir)).unwrap();
    let table = resolve_locations(&records, &mut geocoder());
    let map = build_map(&table, &MapConfig::default(), &Palette::default()).unwrap();

    let html_path = dir.path().join("map.html");
    let mut file = fs::File::create(&html_path).unwrap();
    render(&map, OutputFormat::Html, &mut file).unwrap();
    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("drawCollaborationMap"));
    assert!(html.contains("University College London (United Kingdom) - 25 papers"));

    let mut geojson = Vec::new();
    render(&map, OutputFormat::GeoJson, &mut geojson).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&geojson).unwrap();
    assert_eq!(doc["type"], to_geojson(&map)["type"]);
    assert_eq!(doc["features"].as_array().unwrap().len(), 1 + 4 * 2);
    let straight = doc["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["properties"]["strategy"] == "straight_segment")
        .count();
    assert_eq!(straight, map.straight_segment_count());

    let mut summary = Vec::new();
    generate_summary(&map, &mut summary).unwrap();
    let text = String::from_utf8(summary).unwrap();
    assert!(text.contains("Collaborators: 4"));
    assert!(text.contains("Nowhere Polytechnic"));
}

#[test]
fn cached_geocoder_avoids_repeat_lookups() {
    let dir = TempDir::new().unwrap();
    let records = load_records(&write_export(&dir)).unwrap();
    let cache_path = dir.path().join("cache").join("geocode.json");

    let mut cached = CachedGeocoder::open(&cache_path, geocoder()).unwrap();
    let first = resolve_locations(&records, &mut cached);
    cached.save().unwrap();
    assert_eq!(cached.into_inner().lookups(), 5);
    assert!(cache_path.exists());

    let mut reopened = CachedGeocoder::open(&cache_path, FixedGeocoder::new()).unwrap();
    let second = resolve_locations(&records, &mut reopened);
    assert_eq!(reopened.into_inner().lookups(), 0);

    assert_eq!(first.len(), second.len());
    for inst in first.iter() {
        assert_eq!(second.get(&inst.id).unwrap().coordinate, inst.coordinate);
    }
}

#[test]
fn demo_files_load() {
    let config = collab_map::parse_config(include_str!("../demos/.collab-map.toml")).unwrap();
    assert_eq!(config.map.home_label, "University of Queensland");
    assert_eq!(config.output.format, Some(OutputFormat::Html));

    let (palette, unknown) = Palette::with_overrides(&config.colors);
    assert!(unknown.is_empty());
    assert_eq!(palette.color(Continent::Oceania), "teal");

    let records = collab_map::parse_records(include_str!("../demos/collab.csv")).unwrap();
    let table = resolve_locations(&records, &mut collab_map::OfflineGeocoder);
    assert_eq!(table.len(), 7);

    let map = build_map(&table, &config.map, &palette).unwrap();
    assert!(map.straight_segment_count() > 0);
    for entry in &map.collaborators {
        if entry.edge.strategy == PathStrategy::GreatCircle {
            assert!(!entry.edge.path.has_dateline_tear());
        }
    }
}
