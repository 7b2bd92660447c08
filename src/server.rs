use crate::config::AppConfig;
use crate::render::Figure;
use crate::types::{CountryCount, VolcanoRecord};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Sentinel option for the country filter.
pub const ALL_COUNTRIES: &str = "All";

/// Everything the pipeline computed, shared read-only across requests.
/// Control state (table toggle, country filter, plot choice) lives in the
/// page; handlers only select slices of this.
pub struct Dashboard {
    pub records: Vec<VolcanoRecord>,
    pub counts: Vec<CountryCount>,
    pub missing: Vec<String>,
    pub choropleth: Figure,
    pub scatter: Figure,
}

impl Dashboard {
    /// Filter options: "All" first, then the distinct countries sorted.
    pub fn country_options(&self) -> Vec<String> {
        let mut names: Vec<String> = self.counts.iter().map(|c| c.country.clone()).collect();
        names.sort();
        let mut options = Vec::with_capacity(names.len() + 1);
        options.push(ALL_COUNTRIES.to_string());
        options.extend(names);
        options
    }

    /// "All" returns the table unchanged; a country name returns its rows
    /// (one or none). An unknown name yields an empty table, not an error.
    pub fn filter_counts(&self, country: &str) -> Vec<CountryCount> {
        if country == ALL_COUNTRIES {
            self.counts.clone()
        } else {
            self.counts
                .iter()
                .filter(|c| c.country == country)
                .cloned()
                .collect()
        }
    }

    pub fn figure(&self, plot: PlotKind) -> &Figure {
        match plot {
            PlotKind::Counts => &self.choropleth,
            PlotKind::Locations => &self.scatter,
        }
    }
}

/// The two plot types the page can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Counts,
    Locations,
}

#[derive(Deserialize)]
pub struct CountsParams {
    #[serde(default = "default_country")]
    country: String,
}

fn default_country() -> String {
    ALL_COUNTRIES.to_string()
}

#[derive(Deserialize)]
pub struct FigureParams {
    plot: PlotKind,
}

#[derive(Serialize)]
pub struct Meta {
    title: &'static str,
    countries: Vec<String>,
    plots: Vec<&'static str>,
    missing: Vec<String>,
    total_volcanoes: usize,
}

pub async fn start_server(config: AppConfig, dashboard: Dashboard) -> Result<()> {
    let state = Arc::new(dashboard);

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/meta", get(meta_handler))
        .route("/api/counts", get(counts_handler))
        .route("/api/volcanoes", get(volcanoes_handler))
        .route("/api/figure", get(figure_handler))
        .fallback_service(ServeDir::new("assets"))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn meta_handler(State(state): State<Arc<Dashboard>>) -> Json<Meta> {
    Json(Meta {
        title: "Volcanoes in the World",
        countries: state.country_options(),
        plots: vec!["counts", "locations"],
        missing: state.missing.clone(),
        total_volcanoes: state.records.len(),
    })
}

async fn counts_handler(
    State(state): State<Arc<Dashboard>>,
    Query(params): Query<CountsParams>,
) -> Json<Vec<CountryCount>> {
    Json(state.filter_counts(&params.country))
}

async fn volcanoes_handler(State(state): State<Arc<Dashboard>>) -> Json<Vec<VolcanoRecord>> {
    Json(state.records.clone())
}

async fn figure_handler(
    State(state): State<Arc<Dashboard>>,
    Query(params): Query<FigureParams>,
) -> Json<Figure> {
    Json(state.figure(params.plot).clone())
}
