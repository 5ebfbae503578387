use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use product_lens::data::correlation::ScatterSelection;
use product_lens::data::export::{write_csv_file, write_parquet, write_xlsx};
use product_lens::data::filter::{FilterBounds, FilterParams, Interval};
use product_lens::report::render_text;
use product_lens::{ConfigError, DashboardConfig, DashboardState, DatasetCache, ProductTable};

/// Summarise, correlate and export a filtered product catalogue.
#[derive(Parser, Debug)]
#[command(name = "product-lens", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data file (.csv, .json or .parquet); overrides the config
    #[arg(long)]
    data: Option<PathBuf>,

    /// Translated category label to keep (repeatable). Without any, the
    /// first few sorted categories are selected.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Apply no category filter at all
    #[arg(long, conflicts_with = "categories")]
    all_categories: bool,

    #[arg(long)]
    weight_min: Option<f64>,

    #[arg(long)]
    weight_max: Option<f64>,

    #[arg(long)]
    photos_min: Option<f64>,

    #[arg(long)]
    photos_max: Option<f64>,

    /// Scatter x-axis column
    #[arg(long)]
    x: Option<String>,

    /// Scatter y-axis column
    #[arg(long)]
    y: Option<String>,

    /// Column used to group scatter points; only the translated category
    /// column is accepted
    #[arg(long)]
    color_by: Option<String>,

    /// Write the filtered rows to this CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write the filtered rows to this Parquet file
    #[arg(long)]
    export_parquet: Option<PathBuf>,

    /// Write the filtered rows to this Excel (.xlsx) file
    #[arg(long)]
    export_xlsx: Option<PathBuf>,

    /// Print the snapshot as JSON instead of a text report
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn filter_params(&self, bounds: &FilterBounds, defaults: FilterParams) -> Result<FilterParams> {
        let categories = if self.all_categories {
            Default::default()
        } else if self.categories.is_empty() {
            defaults.categories
        } else {
            self.categories.iter().cloned().collect()
        };

        Ok(FilterParams {
            categories,
            weight: range("weight", bounds.weight, self.weight_min, self.weight_max)?,
            photos: range("photos", bounds.photos, self.photos_min, self.photos_max)?,
        })
    }

    fn scatter(
        &self,
        table: &ProductTable,
        current: Option<ScatterSelection>,
    ) -> Result<Option<ScatterSelection>> {
        if self.x.is_none() && self.y.is_none() && self.color_by.is_none() {
            return Ok(current);
        }
        let x = self.x.clone().or_else(|| current.as_ref().map(|s| s.x.clone()));
        let y = self.y.clone().or_else(|| current.as_ref().map(|s| s.y.clone()));
        let (Some(x), Some(y)) = (x, y) else {
            log::warn!("Scatter needs both --x and --y on a table with fewer than two numeric columns");
            return Ok(None);
        };
        let selection = ScatterSelection {
            x,
            y,
            group: None,
            size: current.and_then(|s| s.size),
        }
        .with_group(table, self.color_by.clone())?;
        Ok(Some(selection))
    }
}

/// Interval from user bounds, falling back to the data's full range.
fn range(
    name: &'static str,
    full: Option<Interval>,
    lo: Option<f64>,
    hi: Option<f64>,
) -> Result<Option<Interval>, ConfigError> {
    if full.is_none() && lo.is_none() && hi.is_none() {
        return Ok(None);
    }
    let lo = lo.or(full.map(|f| f.lo)).unwrap_or(f64::MIN);
    let hi = hi.or(full.map(|f| f.hi)).unwrap_or(f64::MAX);
    Interval::new(name, lo, hi).map(Some)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }

    let mut cache = DatasetCache::new(config.translations()?);
    let data_path = config.data_path.clone();
    let Some(table) = cache.load(&data_path)? else {
        eprintln!("File '{}' not found.", data_path.display());
        return Ok(ExitCode::FAILURE);
    };

    let mut state = DashboardState::new(table, config.clone());
    let defaults = state.bounds.default_params(config.default_category_count);
    let params = cli.filter_params(&state.bounds, defaults)?;
    state.set_params(params);
    let current = state.scatter.take();
    state.scatter = cli.scatter(state.table(), current)?;

    let snapshot = state.snapshot()?;

    let view = state.view();
    if let Some(path) = &cli.export_csv {
        write_csv_file(&view, path)?;
        log::info!("Wrote {} rows to {}", view.len(), path.display());
    }
    if let Some(path) = &cli.export_parquet {
        write_parquet(&view, path)?;
        log::info!("Wrote {} rows to {}", view.len(), path.display());
    }
    if let Some(path) = &cli.export_xlsx {
        write_xlsx(&view, path)?;
        log::info!("Wrote {} rows to {}", view.len(), path.display());
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
        println!("{json}");
    } else {
        print!("{}", render_text(&snapshot));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
