/// Smoke tests to verify the binary runs without panicking
use std::fs;
use std::process::Command;

fn collab_map() -> Command {
    Command::new(env!("CARGO_BIN_EXE_collab-map"))
}

#[test]
fn binary_shows_help() {
    let output = collab_map()
        .arg("--help")
        .output()
        .expect("Failed to execute collab-map");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("collab-map"),
        "Help output should mention collab-map"
    );
    assert!(stdout.contains("--resolution"));
}

#[test]
fn binary_shows_version() {
    let output = collab_map()
        .arg("--version")
        .output()
        .expect("Failed to execute collab-map");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn missing_input_fails_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let output = collab_map()
        .current_dir(dir.path())
        .args(["--offline", "does-not-exist.csv"])
        .output()
        .expect("Failed to execute collab-map");

    assert!(!output.status.success(), "Missing input should return error status");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(
        !stderr.contains("panicked at"),
        "Missing input should not cause panic"
    );
}

#[test]
fn offline_run_writes_geojson() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("collab.csv"),
        "Institution,Country/Region,Co-authored publications,Latitude,Longitude\n\
         Victoria University of Wellington,New Zealand,7,-41.2901,174.7682\n\
         University of Toronto,Canada,3,43.6629,-79.3957\n\
         Unlocated Institute,France,1,,\n",
    )
    .unwrap();

    let output = collab_map()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["--offline", "--format", "geojson", "-o", "out.geojson", "collab.csv"])
        .output()
        .expect("Failed to execute collab-map");

    assert!(
        output.status.success(),
        "Offline run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.geojson")).unwrap())
            .unwrap();
    // home + 2 * (edge + marker); the unlocated row is skipped
    assert_eq!(doc["features"].as_array().unwrap().len(), 5);

    // Each skipped row is reported once, through the log
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Unlocated Institute").count(), 1, "{}", stderr);
    assert!(stderr.contains("Located 2 institutions, skipped 1"));
}
