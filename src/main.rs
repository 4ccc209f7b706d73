use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geoedit_core::{DrawMode, Feature, FeatureId, Position, Properties, Sketch};
use geoedit_export::ExportFormat;
use geoedit_session::views::table_view;
use geoedit_session::{commands, default_data_dir, DocumentStore, FileStore, KeyValueStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// GeoJSON editor with a persistent session
#[derive(Parser, Debug)]
#[command(name = "geoedit")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the persisted session
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the document as JSON
    Show,
    /// Print the feature table
    Table,
    /// Start a new empty document
    New,
    /// Replace the document with a GeoJSON or CSV file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Export the document
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Geojson)]
        format: FormatArg,
        /// Write into this directory instead of printing
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Add a point feature
    AddPoint {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        /// Property as KEY=VALUE (repeatable)
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,
    },
    /// Add a line through LON,LAT vertices
    AddLine {
        #[arg(value_name = "LON,LAT", allow_hyphen_values = true, num_args = 1..)]
        vertices: Vec<String>,
    },
    /// Add a polygon through LON,LAT vertices (closed automatically)
    AddPolygon {
        #[arg(value_name = "LON,LAT", allow_hyphen_values = true, num_args = 1..)]
        vertices: Vec<String>,
    },
    /// Remove features by identity token
    Remove { id: String },
    /// Replace the properties of a feature
    SetProps {
        id: String,
        #[arg(value_name = "KEY=VALUE")]
        props: Vec<String>,
    },
    /// Feed a file through the code editor path
    Edit {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Geojson,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Geojson => ExportFormat::GeoJson,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn parse_position(s: &str) -> Result<Position> {
    let (lon, lat) = s
        .split_once(',')
        .with_context(|| format!("Expected LON,LAT, got {:?}", s))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("Bad longitude in {:?}", s))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Bad latitude in {:?}", s))?;
    checked_position(lon, lat)
}

fn checked_position(lon: f64, lat: f64) -> Result<Position> {
    if !lon.is_finite() || !lat.is_finite() {
        bail!("Coordinates must be finite numbers");
    }
    Ok(Position::new(lon, lat))
}

fn parse_props(pairs: &[String]) -> Result<Properties> {
    let mut props = Properties::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got {:?}", pair))?;
        if key.trim().is_empty() {
            bail!("Property name must not be blank");
        }
        props.insert(key, value);
    }
    Ok(props)
}

/// Click each vertex into a sketch and finish it
fn sketch_feature(mode: DrawMode, vertices: &[String]) -> Result<Feature> {
    let mut sketch = Sketch::new(mode);
    for v in vertices {
        sketch.click(parse_position(v)?);
    }
    match sketch.finish() {
        Some(feature) => Ok(feature),
        None => bail!("Not enough vertices for a {}", mode.name()),
    }
}

fn add_drawn<S: KeyValueStore>(store: &mut DocumentStore<S>, feature: Feature) -> Result<()> {
    let label = format!(
        "{} {}",
        feature.geometry_type_name(),
        feature.id.as_ref().map(ToString::to_string).unwrap_or_default()
    );
    if !store.add_feature(feature) {
        bail!("Coordinates must be finite numbers");
    }
    println!("Added {}", label);
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    debug!(data_dir = %data_dir.display(), "opening session");
    let mut store = DocumentStore::open(FileStore::new(data_dir));

    match args.command {
        Command::Show => println!("{}", store.mirrored_text()),
        Command::Table => {
            let table = table_view(store.document(), store.selection());
            if table.is_empty() {
                println!("No features yet.");
            } else {
                println!("{}", table.to_text());
            }
        }
        Command::New => {
            commands::new_document(&mut store);
            println!("Started with a fresh GeoJSON document.");
        }
        Command::Import { file } => {
            let summary = commands::import_file(&mut store, &file).await?;
            println!("{}", summary);
        }
        Command::Export { format, out } => match out {
            Some(dir) => {
                let path = commands::export_to(&store, format.into(), &dir)?;
                println!("Exported to {}", path.display());
            }
            None => println!("{}", commands::export(&store, format.into()).content),
        },
        Command::AddPoint { lon, lat, props } => {
            let mut sketch = Sketch::new(DrawMode::Point);
            let Some(feature) = sketch.click(checked_position(lon, lat)?) else {
                bail!("Point tool produced no feature");
            };
            let feature = feature.with_properties(parse_props(&props)?);
            add_drawn(&mut store, feature)?;
        }
        Command::AddLine { vertices } => {
            let feature = sketch_feature(DrawMode::Line, &vertices)?;
            add_drawn(&mut store, feature)?;
        }
        Command::AddPolygon { vertices } => {
            let feature = sketch_feature(DrawMode::Polygon, &vertices)?;
            add_drawn(&mut store, feature)?;
        }
        Command::Remove { id } => {
            let id = FeatureId::parse(&id);
            let Some(feature) = store.document().find(&id).cloned() else {
                bail!("No feature with id {}", id);
            };
            let removed = store.remove_feature(&feature);
            println!("Removed {} feature(s)", removed);
        }
        Command::SetProps { id, props } => {
            let id = FeatureId::parse(&id);
            if store.update_feature_properties(&id, parse_props(&props)?) == 0 {
                bail!("No feature with id {}", id);
            }
            println!("Updated properties of {}", id);
        }
        Command::Edit { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;
            store.set_text_value(text);
            match store.text_error() {
                Some(error) => bail!("Document unchanged: {}", error),
                None => println!("Document updated ({} features)", store.document().len()),
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args
    let args = Args::parse();
    run(args).await
}
