use serde::Serialize;
use std::collections::BTreeMap;

/// One volcano from the input CSV. The named fields are the columns the
/// pipeline computes with; everything else the file carried rides along in
/// `extra` so the raw-table view can show the full dataset.
#[derive(Debug, Clone, Serialize)]
pub struct VolcanoRecord {
    #[serde(rename = "Volcano Name")]
    pub name: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Aggregated volcano count for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}
