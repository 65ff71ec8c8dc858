use std::fs;
use std::path::Path;

use theater_geo::config::{ConfigError, TheaterCatalog, load_records};
use theater_geo::core::GameCoordinate;
use theater_geo::projection::{ConversionStrategy, CoordinateConverter};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

/// Minimal installation: Korea with its own Theater.txt and an add-on Aegean theater.
fn fake_install(root: &Path) {
    let defs = root.join("Data/TerrData/TheaterDefinition");
    write(
        &defs.join("Theater.lst"),
        "# installed theaters\r\nTerrData\\TheaterDefinition\\Korea.tdf\r\nAdd-On Aegean\\Aegean.tdf\r\nTerrData\\TheaterDefinition\\Missing.tdf\r\n",
    );
    write(
        &defs.join("Korea.tdf"),
        "name Korea\ndesc Korean peninsula\ncampaigndir Campaign\nterraindir TerrData\\Korea\n",
    );
    write(
        &root.join("Data/TerrData/Korea/NewTerrain/Theater.txt"),
        "Theater Name = Korea KTO\nCenterLat = 38.5\nCenterLong = 127.5\nTheaterSizeKm = 1024\nMapSizeInPixels = 32768\n",
    );
    write(
        &root.join("Data/Add-On Aegean/Aegean.tdf"),
        "name Aegean\nterraindir Add-On Aegean\\TerrData\\Aegean\ncampaigndir Add-On Aegean\\Campaign\n",
    );
    write(
        &root.join("Data/Add-On Aegean/TerrData/Aegean/Theater.txt"),
        "CenterLat 38.0\nCenterLong 25.0\nTheaterSizeKm 1024\nMapSizeInPixels 16384\n",
    );
}

#[test]
fn builtin_catalog_resolves_every_builtin_theater() {
    let catalog = TheaterCatalog::builtin();
    assert_eq!(
        catalog.available(),
        vec!["balkans", "falcon", "israel", "korea"]
    );
    for key in catalog.available() {
        let config = catalog.resolve(&key).expect("built-in theater");
        assert_eq!(config.key(), key);
        CoordinateConverter::new(&config).expect("built-in descriptor parses");
    }
    assert!(
        catalog.resolve("KOREA").is_ok(),
        "keys are case-insensitive"
    );
    let korea = catalog.resolve("korea").expect("korea");
    assert!(catalog.heightmap_path(&korea).is_none());
    assert!(matches!(
        catalog.resolve("atlantis"),
        Err(ConfigError::UnknownTheater(key)) if key == "atlantis"
    ));
}

#[test]
fn installation_files_extend_and_override_builtins() {
    let dir = tempfile::tempdir().expect("tempdir");
    fake_install(dir.path());
    let catalog = TheaterCatalog::builtin().with_install_root(dir.path());
    assert!(catalog.installation_available());

    let installed: Vec<String> = catalog
        .installed_theaters()
        .into_iter()
        .map(|t| t.key)
        .collect();
    assert_eq!(installed, vec!["korea", "aegean"]);
    assert!(catalog.available().contains(&"aegean".to_string()));

    let korea = catalog.resolve("korea").expect("korea");
    assert_eq!(korea.name(), "Korea KTO");
    assert!(korea.projection_string().contains("+lon_0=127.5"));
    assert_eq!(
        catalog.heightmap_path(&korea).expect("heightmap path"),
        dir.path()
            .join("Data")
            .join("TerrData")
            .join("Korea")
            .join("HeightMaps")
            .join("HeightMap.raw")
    );

    let aegean = catalog.resolve("aegean").expect("aegean");
    assert_eq!(aegean.name(), "Aegean");
    assert_eq!(aegean.utm_zone(), Some(35));
    assert!(
        aegean
            .projection_string()
            .starts_with("+proj=tmerc +lon_0=25 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000"),
        "generated descriptor: {}",
        aegean.projection_string()
    );
    let grid = aegean.grid().expect("grid parameters from Theater.txt");
    assert!((grid.meter_res - 62.5).abs() < 1e-12);

    let converter = CoordinateConverter::new(&aegean).expect("aegean converter");
    assert_eq!(converter.engine().descriptor().central_meridian(), 25.0);
    let half = aegean.heightmap_bounds().max_x / 2.0;
    let centre = GameCoordinate::feet(half, half);
    for strategy in [ConversionStrategy::GridExact, ConversionStrategy::Generic] {
        let result = converter.game_to_geodetic(&centre, strategy);
        assert!(result.fallback.is_none());
        let (dlat, dlon) = (result.value.latitude - 38.0, result.value.longitude - 25.0);
        let north_m = dlat * 111_000.0;
        let east_m = dlon * 111_000.0 * 38.0_f64.to_radians().cos();
        assert!(
            north_m.hypot(east_m) < 300.0,
            "{strategy} mapped the aegean centre to {}",
            result.value
        );
    }
}

#[test]
fn unparsable_theater_txt_falls_back_to_definition_and_builtin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fake_install(root);
    write(
        &root.join("Data/TerrData/Korea/NewTerrain/Theater.txt"),
        "CenterLat = north\n",
    );
    let catalog = TheaterCatalog::builtin().with_install_root(root);
    let korea = catalog.resolve("korea").expect("korea still resolves");
    assert_eq!(korea.name(), "Korea");
    assert!(korea.grid().is_some());
}

#[test]
fn missing_install_root_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = TheaterCatalog::builtin().with_install_root(dir.path().join("nope"));
    assert!(!catalog.installation_available());
    assert!(catalog.installed_theaters().is_empty());
    assert_eq!(catalog.available().len(), 4);
}

#[test]
fn toml_and_yaml_overrides_take_precedence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml_path = dir.path().join("korea.toml");
    write(
        &toml_path,
        r#"
key = "korea"
name = "Korea (tuned)"
center_lat = 38.6

[heightmap_bounds]
min_x = 0.0
max_x = 3358699.5
min_y = 0.0
max_y = 3358699.5
"#,
    );
    let catalog = TheaterCatalog::builtin()
        .load_overrides(&toml_path)
        .expect("toml override");
    let korea = catalog.resolve("korea").expect("korea");
    assert_eq!(korea.name(), "Korea (tuned)");
    assert_eq!(korea.center().expect("centre").latitude, 38.6);
    assert_eq!(korea.heightmap_size().width, 32_768, "merged from built-in");

    let yaml_path = dir.path().join("theaters.yaml");
    write(
        &yaml_path,
        r#"
- name: Test Range
  projection_string: "+proj=utm +zone=11 +datum=WGS84 +units=m"
  center_lat: 36.2
  center_lon: -115.0
  heightmap_size: [2048, 2048]
  theater_size_km: 256
"#,
    );
    let records = load_records(&yaml_path).expect("yaml records");
    assert_eq!(records.len(), 1);
    let catalog = TheaterCatalog::builtin().with_overrides(records);
    assert!(catalog.available().contains(&"test_range".to_string()));
    let range = catalog.resolve("test_range").expect("test range");
    assert_eq!(range.utm_zone(), Some(11));
    let grid = range.grid().expect("grid");
    assert!((grid.meter_res - 125.0).abs() < 1e-12);
}

#[test]
fn directory_overrides_use_file_stem_as_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir.path().join("nevada.toml"),
        "projection_string = \"+proj=utm +zone=11 +datum=WGS84\"\nheightmap_size = [1024, 1024]\ntheater_size_meters = 512000.0\n",
    );
    write(&dir.path().join("notes.txt"), "ignored");
    let catalog = TheaterCatalog::builtin()
        .load_overrides(dir.path())
        .expect("directory overrides");
    let nevada = catalog.resolve("nevada").expect("nevada");
    assert_eq!(nevada.name(), "Nevada");
    assert!(
        nevada.grid().is_none(),
        "no centre, so no grid-exact support"
    );
}

#[test]
fn invalid_override_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    write(
        &path,
        "key = \"broken\"\nprojection_string = \"+proj=tmerc\"\nheightmap_size = [0, 10]\nheightmap_bounds = { min_x = 0.0, max_x = 1.0, min_y = 0.0, max_y = 1.0 }\n",
    );
    let catalog = TheaterCatalog::builtin().load_overrides(&path).expect("parses");
    assert!(matches!(
        catalog.resolve("broken"),
        Err(ConfigError::EmptyRaster { width: 0, .. })
    ));
}
