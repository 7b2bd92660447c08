use crate::types::{CountryCount, VolcanoRecord};
use geojson::FeatureCollection;
use std::collections::{BTreeSet, HashMap};

/// Feature property carrying the country name in the boundary file.
pub const BOUNDARY_NAME_PROPERTY: &str = "ADMIN";

/// CSV country spellings known to differ from the boundary file's ADMIN
/// names. Extend this table from the `check` subcommand's output; unmapped
/// names stay as they are and simply get no color on the choropleth.
pub const COUNTRY_RENAMES: [(&str, &str); 1] =
    [("United States", "United States of America")];

pub const TOP_N: usize = 5;

/// Country names declared by the boundary features. Features without a
/// string ADMIN property are skipped.
pub fn boundary_names(boundaries: &FeatureCollection) -> BTreeSet<String> {
    boundaries
        .features
        .iter()
        .filter_map(|f| f.properties.as_ref())
        .filter_map(|props| props.get(BOUNDARY_NAME_PROPERTY))
        .filter_map(|value| value.as_str())
        .map(|name| name.to_string())
        .collect()
}

/// Record countries with no matching boundary name, sorted lexicographically.
pub fn missing_names(records: &[VolcanoRecord], boundary: &BTreeSet<String>) -> Vec<String> {
    let record_names: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
    record_names
        .into_iter()
        .filter(|name| !boundary.contains(*name))
        .map(|name| name.to_string())
        .collect()
}

/// Rewrite record countries through [`COUNTRY_RENAMES`]. Idempotent: the
/// right-hand names are not themselves keys in the table.
pub fn apply_renames(records: &mut [VolcanoRecord]) {
    for record in records.iter_mut() {
        if let Some((_, to)) = COUNTRY_RENAMES
            .iter()
            .find(|(from, _)| *from == record.country)
        {
            record.country = (*to).to_string();
        }
    }
}

/// Volcano count per country, in order of first appearance.
pub fn count_by_country(records: &[VolcanoRecord]) -> Vec<CountryCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for record in records {
        match counts.get_mut(&record.country) {
            Some(count) => *count += 1,
            None => {
                counts.insert(record.country.clone(), 1);
                order.push(record.country.clone());
            }
        }
    }

    order
        .into_iter()
        .map(|country| {
            let count = counts[&country];
            CountryCount { country, count }
        })
        .collect()
}

/// The `n` highest counts, descending. Ties keep their input order.
pub fn top_countries(counts: &[CountryCount], n: usize) -> Vec<CountryCount> {
    let mut ranked = counts.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Multi-line label for the map annotation box: a title line followed by one
/// "Country: count" line per top entry.
pub fn top_countries_label(counts: &[CountryCount]) -> String {
    let mut label = format!("Top {} countries", TOP_N);
    for row in top_countries(counts, TOP_N) {
        label.push('\n');
        label.push_str(&row.country);
        label.push_str(": ");
        label.push_str(&row.count.to_string());
    }
    label
}
