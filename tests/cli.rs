use std::fs::File;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn theater() -> Command {
    let mut cmd = Command::cargo_bin("theater").expect("theater bin");
    cmd.env_remove("FALCON_BMS_ROOT").env_remove("RUST_LOG");
    cmd
}

#[test]
fn convert_reports_grid_exact_position() {
    theater()
        .args(["convert", "1000000", "1000000", "--theater", "korea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Geodetic  : 36.61"))
        .stdout(predicate::str::contains("Strategy  : grid-exact"));
}

#[test]
fn convert_json_includes_strategy_and_coordinates() {
    let output = theater()
        .args([
            "convert",
            "1000000",
            "1000000",
            "--strategy",
            "generic",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf8 stdout");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(json["strategy"], "generic");
    assert_eq!(json["theater"], "korea");
    let lat = json["geodetic"]["latitude"].as_f64().expect("latitude");
    assert!((lat - 36.6106).abs() < 1e-3, "latitude {lat}");
    assert!(json.get("elevation").is_none());
}

#[test]
fn reverse_conversion_round_trips_through_the_cli() {
    theater()
        .args(["convert", "38.5", "127.5", "--reverse", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unit\": \"feet\""))
        .stdout(predicate::str::contains("\"x\": 1679349"));
}

#[test]
fn fallback_is_announced() {
    theater()
        .args(["convert", "1000000", "1000000", "--theater", "israel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy  : generic (fallback:"));
}

#[test]
fn elevation_lookup_uses_given_heightmap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("HeightMap.raw");
    let catalog = dir.path().join("tiny.toml");
    std::fs::write(
        &catalog,
        "key = \"tiny\"\nprojection_string = \"+proj=tmerc +lon_0=127.5 +k=0.9996 +units=m\"\nheightmap_size = [2, 2]\nheightmap_bounds = { min_x = 0.0, max_x = 100.0, min_y = 0.0, max_y = 100.0 }\n",
    )
    .expect("write catalog");
    let mut file = File::create(&path).expect("create raster");
    for sample in [10u16, 20, 30, 40] {
        file.write_all(&sample.to_le_bytes()).expect("write sample");
    }
    drop(file);

    theater()
        .args(["--catalog", catalog.to_str().unwrap()])
        .args(["convert", "100", "0", "--theater", "tiny", "--elevation"])
        .args(["--heightmap", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Elevation : 40 ft"));

    theater()
        .args(["--catalog", catalog.to_str().unwrap()])
        .args(["convert", "101", "0", "--theater", "tiny", "--elevation"])
        .args(["--heightmap", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Elevation : unavailable"))
        .stdout(predicate::str::contains("outside the heightmap bounds"));
}

#[test]
fn corners_lists_all_four() {
    theater()
        .args(["corners", "--theater", "korea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SW"))
        .stdout(predicate::str::contains("SE"))
        .stdout(predicate::str::contains("NW"))
        .stdout(predicate::str::contains("NE"))
        .stdout(predicate::str::contains("33.7603"));
}

#[test]
fn theaters_lists_builtins() {
    theater()
        .arg("theaters")
        .assert()
        .success()
        .stdout(predicate::str::contains("korea"))
        .stdout(predicate::str::contains("balkans"))
        .stdout(predicate::str::contains("generic only"));
}

#[test]
fn theaters_describes_installed_definitions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let defs = dir.path().join("Data/TerrData/TheaterDefinition");
    std::fs::create_dir_all(&defs).expect("create dirs");
    std::fs::write(
        defs.join("Theater.lst"),
        "TerrData\\TheaterDefinition\\Korea.tdf\n",
    )
    .expect("write list");
    std::fs::write(
        defs.join("Korea.tdf"),
        "name Korea\ndesc Korean peninsula\nterraindir TerrData\\Korea\nmagneticdeclination -7.5\n",
    )
    .expect("write tdf");

    theater()
        .arg("--install-root")
        .arg(dir.path())
        .arg("theaters")
        .assert()
        .success()
        .stdout(predicate::str::contains("Korea.tdf"))
        .stdout(predicate::str::contains("Korean peninsula"))
        .stdout(predicate::str::contains("magnetic declination -7.5°"));
}

#[test]
fn projection_string_for_korea_centre() {
    theater()
        .args(["projection", "38.5", "127.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "+proj=tmerc +lon_0=127.5 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000 +y_0=-3.74929e6",
        ));
}

#[test]
fn unknown_theater_fails() {
    theater()
        .args(["convert", "0", "0", "--theater", "atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("atlantis"));
}
