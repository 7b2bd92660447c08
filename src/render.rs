use crate::types::{CountryCount, VolcanoRecord};
use geojson::FeatureCollection;
use serde::Serialize;

// Map view constants. The center sits on Chile, the most volcano-dense
// stretch of the dataset.
pub const MAP_CENTER_LAT: f64 = -35.6751;
pub const MAP_CENTER_LON: f64 = -71.5430;
pub const MAP_ZOOM: f64 = 1.0;
pub const COLOR_SCALE: &str = "Viridis";
const FIGURE_WIDTH: u32 = 800;

/// Plotly's default qualitative palette, cycled over volcano types.
const CATEGORY_COLORS: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A",
    "#19d3f3", "#FF6692", "#B6E880", "#FF97FF", "#FECB52",
];

/// A complete Plotly figure specification. Pure data: the page hands `data`
/// and `layout` straight to the charting library.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Trace {
    Choropleth(ChoroplethTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub geojson: FeatureCollection,
    pub locations: Vec<String>,
    pub z: Vec<u64>,
    pub featureidkey: &'static str,
    pub colorscale: &'static str,
    pub colorbar: ColorBar,
    pub marker: ChoroplethMarker,
    pub showscale: bool,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethMarker {
    pub line: MarkerLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub name: String,
    pub mode: &'static str,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub text: Vec<String>,
    pub customdata: Vec<[String; 4]>,
    pub hovertemplate: &'static str,
    pub marker: ScatterMarker,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterMarker {
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub map: MapLayout,
    pub margin: Margin,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapLayout {
    pub center: MapCenter,
    pub zoom: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub xref: &'static str,
    pub yref: &'static str,
    pub text: String,
    pub showarrow: bool,
    pub bgcolor: &'static str,
    pub borderpad: u32,
}

/// Counts-per-country choropleth. The boundary collection is embedded whole;
/// count rows bind to features through the ADMIN name, and rows with no
/// matching feature simply stay uncolored.
pub fn choropleth_figure(
    boundaries: &FeatureCollection,
    counts: &[CountryCount],
    top_label: &str,
) -> Figure {
    let trace = ChoroplethTrace {
        trace_type: "choroplethmap",
        geojson: boundaries.clone(),
        locations: counts.iter().map(|c| c.country.clone()).collect(),
        z: counts.iter().map(|c| c.count).collect(),
        featureidkey: "properties.ADMIN",
        colorscale: COLOR_SCALE,
        colorbar: ColorBar { title: "Volcanoes" },
        marker: ChoroplethMarker {
            line: MarkerLine { width: 0.2 },
        },
        showscale: true,
        hovertemplate: "<b>%{location}</b><br>Volcanoes: %{z}<extra></extra>",
    };

    Figure {
        data: vec![Trace::Choropleth(trace)],
        layout: Layout {
            title: Title {
                text: "Number of volcanoes per country".to_string(),
                font: None,
            },
            map: map_layout(),
            margin: margin(),
            width: FIGURE_WIDTH,
            showlegend: None,
            annotations: vec![top_annotation(top_label)],
        },
    }
}

/// One marker per volcano, one trace per volcano type so each type gets its
/// own color. Hover shows the volcano name with type, country, status and
/// region underneath.
pub fn scatter_figure(records: &[VolcanoRecord], top_label: &str) -> Figure {
    let mut kinds: Vec<&str> = Vec::new();
    for record in records {
        if !kinds.contains(&record.kind.as_str()) {
            kinds.push(record.kind.as_str());
        }
    }

    let data = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let members: Vec<&VolcanoRecord> =
                records.iter().filter(|r| r.kind == *kind).collect();
            Trace::Scatter(ScatterTrace {
                trace_type: "scattermap",
                name: (*kind).to_string(),
                mode: "markers",
                lat: members.iter().map(|r| r.latitude).collect(),
                lon: members.iter().map(|r| r.longitude).collect(),
                text: members.iter().map(|r| r.name.clone()).collect(),
                customdata: members
                    .iter()
                    .map(|r| {
                        [
                            r.kind.clone(),
                            r.country.clone(),
                            r.status.clone(),
                            r.region.clone(),
                        ]
                    })
                    .collect(),
                hovertemplate: "<b>%{text}</b><br>Type: %{customdata[0]}<br>Country: %{customdata[1]}<br>Status: %{customdata[2]}<br>Region: %{customdata[3]}<extra></extra>",
                marker: ScatterMarker {
                    color: CATEGORY_COLORS[i % CATEGORY_COLORS.len()].to_string(),
                },
            })
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Title {
                text: "Volcanoes in the World".to_string(),
                font: Some(Font { size: 22 }),
            },
            map: map_layout(),
            margin: margin(),
            width: FIGURE_WIDTH,
            showlegend: Some(false),
            annotations: vec![top_annotation(top_label)],
        },
    }
}

fn map_layout() -> MapLayout {
    MapLayout {
        center: MapCenter {
            lat: MAP_CENTER_LAT,
            lon: MAP_CENTER_LON,
        },
        zoom: MAP_ZOOM,
    }
}

fn margin() -> Margin {
    Margin { l: 0, r: 0, t: 40, b: 0 }
}

fn top_annotation(label: &str) -> Annotation {
    let text = match label.split_once('\n') {
        Some((title, rest)) => format!("<b>{}</b><br>{}", title, rest.replace('\n', "<br>")),
        None => format!("<b>{}</b>", label),
    };
    Annotation {
        x: 0.02,
        y: 0.02,
        xref: "paper",
        yref: "paper",
        text,
        showarrow: false,
        bgcolor: "white",
        borderpad: 2,
    }
}
