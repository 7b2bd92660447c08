use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use volcano_mapping::types::CountryCount;
use volcano_mapping::{data, processing, render, server};

const VOLCANO_CSV: &str = "\
Unnamed: 0,Volcano Name,Country,Region,Latitude,Longitude,Type,Status
0,Yellowstone,United States,US-Wyoming,44.43,-110.67,Caldera,Holocene
1,Acamarachi,Chile,Chile-N,-23.30,-67.62,Stratovolcano,Holocene
2,Lascar,Chile,Chile-N,-23.37,-67.73,Stratovolcano,Holocene
3,Lost Peak,Atlantis,Atlantic Ocean,30.00,-40.00,Submarine volcano,Uncertain
";

// Two named countries plus one feature without an ADMIN property, which the
// reconciler must skip.
const BOUNDARIES_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "ADMIN": "United States of America" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-125.0, 30.0], [-65.0, 30.0], [-65.0, 50.0], [-125.0, 30.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "ADMIN": "Chile" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-76.0, -56.0], [-66.0, -56.0], [-66.0, -17.0], [-76.0, -56.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "name": "unnamed region" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        }
    ]
}"#;

fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
    let csv_path = dir.path().join("volcanoes.csv");
    let geo_path = dir.path().join("countries.geojson");
    fs::write(&csv_path, VOLCANO_CSV).unwrap();
    fs::write(&geo_path, BOUNDARIES_GEOJSON).unwrap();
    (csv_path, geo_path)
}

#[test]
fn full_pipeline_from_files_to_figures() {
    let dir = TempDir::new().unwrap();
    let (csv_path, geo_path) = write_inputs(&dir);

    let mut cache = data::DatasetCache::new();
    let records = cache.volcanoes(&csv_path).unwrap();
    let boundaries = cache.boundaries(&geo_path).unwrap();
    assert_eq!(records.len(), 4);

    // Reconcile
    let names = processing::boundary_names(&boundaries);
    assert_eq!(names.len(), 2);

    let missing = processing::missing_names(&records, &names);
    assert_eq!(
        missing,
        vec!["Atlantis".to_string(), "United States".to_string()]
    );

    let mut records = (*records).clone();
    processing::apply_renames(&mut records);
    let unresolved = processing::missing_names(&records, &names);
    assert_eq!(unresolved, vec!["Atlantis".to_string()]);

    // Aggregate + rank
    let counts = processing::count_by_country(&records);
    let total: u64 = counts.iter().map(|c| c.count).sum();
    assert_eq!(total, records.len() as u64);
    assert_eq!(
        counts,
        vec![
            CountryCount { country: "United States of America".to_string(), count: 1 },
            CountryCount { country: "Chile".to_string(), count: 2 },
            CountryCount { country: "Atlantis".to_string(), count: 1 },
        ]
    );

    let label = processing::top_countries_label(&counts);
    assert_eq!(
        label,
        "Top 5 countries\nChile: 2\nUnited States of America: 1\nAtlantis: 1"
    );

    // Compose
    let choropleth = render::choropleth_figure(&boundaries, &counts, &label);
    let scatter = render::scatter_figure(&records, &label);

    let choropleth_json = serde_json::to_value(&choropleth).unwrap();
    let locations: Vec<&str> = choropleth_json["data"][0]["locations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(locations.contains(&"Atlantis"));

    // The embedded boundary collection has no feature for Atlantis, so that
    // row stays uncolored; the scatter map still shows the volcano.
    let admins: Vec<&str> = choropleth_json["data"][0]["geojson"]["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["properties"]["ADMIN"].as_str())
        .collect();
    assert!(!admins.contains(&"Atlantis"));

    let scatter_json = serde_json::to_value(&scatter).unwrap();
    let hover_names: Vec<String> = scatter_json["data"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|trace| trace["text"].as_array().unwrap().clone())
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(hover_names.contains(&"Lost Peak".to_string()));

    // Interaction layer selections over the computed state
    let dashboard = server::Dashboard {
        records,
        counts,
        missing: unresolved,
        choropleth,
        scatter,
    };
    assert_eq!(
        dashboard.country_options(),
        vec!["All", "Atlantis", "Chile", "United States of America"]
    );
    assert_eq!(dashboard.filter_counts("All"), dashboard.counts);
    assert_eq!(dashboard.filter_counts("Chile").len(), 1);
}

#[test]
fn repeated_loads_come_from_the_cache() {
    let dir = TempDir::new().unwrap();
    let (csv_path, geo_path) = write_inputs(&dir);

    let mut cache = data::DatasetCache::new();
    let first = cache.volcanoes(&csv_path).unwrap();
    let second = cache.volcanoes(&csv_path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let boundaries_first = cache.boundaries(&geo_path).unwrap();
    let boundaries_second = cache.boundaries(&geo_path).unwrap();
    assert!(Arc::ptr_eq(&boundaries_first, &boundaries_second));
}
