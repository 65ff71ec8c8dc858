//! Built-in theater table used when no installation or catalog provides a theater.

use crate::{HeightmapBounds, RasterSize, TheaterRecord};

/// Game-space extent of the 1024 km, 32768-pixel theaters.
pub const LARGE_THEATER_FEET: f64 = 3_358_699.5;
/// Game-space extent of the legacy 1024-pixel theaters.
pub const LEGACY_THEATER_FEET: f64 = 2_097_152.0;

/// Keys of the built-in theaters, in display order.
pub const BUILTIN_KEYS: &[&str] = &["korea", "balkans", "israel", "falcon"];

/// Built-in record for `key` (case-insensitive).
pub fn record(key: &str) -> Option<TheaterRecord> {
    let record = match key.to_ascii_lowercase().as_str() {
        "korea" => TheaterRecord {
            key: Some("korea".into()),
            name: Some("Korea".into()),
            projection_string: Some(
                "+proj=tmerc +lon_0=127.5 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000 +y_0=-3.74929e+06"
                    .into(),
            ),
            center_lat: Some(38.5),
            center_lon: Some(127.5),
            utm_zone: Some(52),
            campaign_subdir: Some("Campaign".into()),
            terrain_subdir: Some("TerrData/Korea/NewTerrain".into()),
            heightmap_file: Some("HeightMaps/HeightMap.raw".into()),
            ..large_theater()
        },
        "balkans" => TheaterRecord {
            key: Some("balkans".into()),
            name: Some("Balkans".into()),
            projection_string: Some(
                "+proj=tmerc +lon_0=16.4191 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000 +y_0=-4.1192e+06"
                    .into(),
            ),
            center_lat: Some(41.8327),
            center_lon: Some(16.4191),
            utm_zone: Some(34),
            campaign_subdir: Some("Add-On Balkans/Campaign".into()),
            terrain_subdir: Some("Add-On Balkans/TerrData/Balkans".into()),
            heightmap_file: Some("NewTerrain/Heightmaps/Heightmap.raw".into()),
            ..large_theater()
        },
        "israel" => TheaterRecord {
            key: Some("israel".into()),
            name: Some("Israel".into()),
            projection_string: Some("+proj=utm +zone=36 +datum=WGS84 +units=m +no_defs".into()),
            center_lat: Some(31.5),
            center_lon: Some(35.0),
            utm_zone: Some(36),
            campaign_subdir: Some("Add-On Israel/Campaign".into()),
            terrain_subdir: Some("Add-On Israel/TerrData/Israel".into()),
            ..legacy_theater()
        },
        "falcon" => TheaterRecord {
            key: Some("falcon".into()),
            name: Some("Falcon".into()),
            projection_string: Some("+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs".into()),
            center_lat: Some(41.0),
            center_lon: Some(15.0),
            utm_zone: Some(33),
            campaign_subdir: Some("Add-On Falcon/Campaign".into()),
            terrain_subdir: Some("Add-On Falcon/TerrData/Falcon".into()),
            ..legacy_theater()
        },
        _ => return None,
    };
    Some(record)
}

fn large_theater() -> TheaterRecord {
    TheaterRecord {
        heightmap_size: Some(RasterSize::square(32_768)),
        heightmap_bounds: Some(HeightmapBounds::square(LARGE_THEATER_FEET)),
        theater_size_km: Some(1_024.0),
        ..TheaterRecord::default()
    }
}

// Legacy theaters carry no theater size, so they only support the generic path.
fn legacy_theater() -> TheaterRecord {
    TheaterRecord {
        heightmap_size: Some(RasterSize::square(1_024)),
        heightmap_bounds: Some(HeightmapBounds::square(LEGACY_THEATER_FEET)),
        heightmap_file: Some(crate::DEFAULT_HEIGHTMAP_FILE.into()),
        ..TheaterRecord::default()
    }
}
