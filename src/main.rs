use clap::{Parser, Subcommand};
use collision_map::{config, data, grid, output, server, viewport};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate collisions into grid cells and write them as GeoJSON
    Grid {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Override the configured cell size (degrees)
        #[arg(long)]
        cell_size: Option<f64>,
        /// Override the configured output path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the collision summary for a bounding box as JSON
    Summary {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// west,south,east,north
        #[arg(long, allow_hyphen_values = true)]
        bbox: viewport::Viewport,
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Serve the analytics API and the static map page
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grid {
            config,
            cell_size,
            output,
        } => {
            info!("Aggregating grid with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(&config)?;

            let points = data::load_points(&app_config.input)?;

            let cell_size = cell_size.unwrap_or(app_config.grid.cell_size);
            let cells = grid::aggregate(&points, cell_size)?;

            let path = output.unwrap_or(app_config.output.grid_geojson);
            output::write_grid_geojson(&path, &cells)?;
        }
        Commands::Summary {
            config,
            bbox,
            top_n,
        } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let points = data::load_points(&app_config.input)?;

            let summary = viewport::summarize(
                &points,
                &bbox,
                &app_config.dashboard.category_fields,
                top_n.unwrap_or(app_config.dashboard.top_n),
            )?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Serve { config } => {
            info!("Serving with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(&config)?;
            let points = data::load_points(&app_config.input)?;

            server::start_server(app_config, points).await?;
        }
    }

    Ok(())
}
