use clap::{Parser, Subcommand};
use std::path::PathBuf;
use volcano_mapping::{config, data, processing, render, server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the volcano dashboard
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Report country names that have no match in the boundary file
    Check {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            println!("Serving dashboard with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let mut cache = data::DatasetCache::new();

            // 1. Load data
            let records = cache.volcanoes(&app_config.input.volcano_csv)?;
            let boundaries = cache.boundaries(&app_config.input.boundaries_geojson)?;
            println!(
                "Loaded {} volcano records and {} boundary features",
                records.len(),
                boundaries.features.len()
            );

            // 2. Reconcile country names
            let names = processing::boundary_names(&boundaries);
            let mut records = (*records).clone();
            processing::apply_renames(&mut records);
            let missing = processing::missing_names(&records, &names);
            if !missing.is_empty() {
                println!(
                    "{} country names have no boundary match and will not color the choropleth: {:?}",
                    missing.len(),
                    missing
                );
            }

            // 3. Aggregate and rank
            let counts = processing::count_by_country(&records);
            let label = processing::top_countries_label(&counts);

            // 4. Compose figures
            let choropleth = render::choropleth_figure(&boundaries, &counts, &label);
            let scatter = render::scatter_figure(&records, &label);

            let dashboard = server::Dashboard {
                records,
                counts,
                missing,
                choropleth,
                scatter,
            };

            server::start_server(app_config, dashboard).await?;
        }
        Commands::Check { config } => {
            println!("Checking country names with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let mut cache = data::DatasetCache::new();
            let records = cache.volcanoes(&app_config.input.volcano_csv)?;
            let boundaries = cache.boundaries(&app_config.input.boundaries_geojson)?;

            let names = processing::boundary_names(&boundaries);
            let missing = processing::missing_names(&records, &names);
            println!("{} CSV country names have no boundary match:", missing.len());
            for name in &missing {
                println!("  {}", name);
            }

            let mut records = (*records).clone();
            processing::apply_renames(&mut records);
            let unresolved = processing::missing_names(&records, &names);
            println!(
                "{} remain after applying the rename table; add entries for them to resolve:",
                unresolved.len()
            );
            for name in &unresolved {
                println!("  {}", name);
            }

            let counts = processing::count_by_country(&records);
            println!("{}", processing::top_countries_label(&counts));
        }
    }

    Ok(())
}
