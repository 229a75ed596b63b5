mod app;
mod color;
mod state;
mod ui;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;

use app::DashboardApp;
use state::AppState;
use usage_health::{view, AddictionLevel, DashboardConfig, DataSource, SessionCache, ViewSelection};

/// Technology usage, sleep and health analytics dashboard
#[derive(Parser)]
#[command(name = "usage-health-dashboard", version, about, long_about = None)]
struct Cli {
    /// Dataset to open (CSV, JSON or Parquet); overrides the config file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the dashboard model as JSON instead of opening a window
    Report {
        /// Keep only these countries (repeatable; none = all)
        #[arg(long)]
        country: Vec<String>,

        /// Keep only these genders (repeatable; none = all)
        #[arg(long)]
        gender: Vec<String>,

        /// Keep only these addiction levels (repeatable; none = all)
        #[arg(long, value_parser = parse_level)]
        level: Vec<AddictionLevel>,

        #[arg(long)]
        min_age: Option<i64>,

        #[arg(long)]
        max_age: Option<i64>,

        /// Metric for the health tab
        #[arg(long)]
        health_metric: Option<String>,

        /// Y-axis metric for the social-media tab
        #[arg(long)]
        social_metric: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_level(s: &str) -> Result<AddictionLevel, String> {
    AddictionLevel::parse(s).ok_or_else(|| format!("expected Low, Moderate, High or Severe, got '{s}'"))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Some(Command::Report {
            country,
            gender,
            level,
            min_age,
            max_age,
            health_metric,
            social_metric,
            pretty,
        }) => {
            let mut cache = SessionCache::new();
            let source = DataSource::Path(config.data_path.clone());
            let dataset = cache.get_or_load(&source)?;

            let options = usage_health::FilterOptions::from_dataset(&dataset);
            let mut criteria = options.default_criteria(config.default_country_limit);
            if !country.is_empty() {
                criteria.countries = country.into_iter().collect();
            }
            if !gender.is_empty() {
                criteria.genders = gender.into_iter().collect();
            }
            if !level.is_empty() {
                criteria.levels = level.into_iter().collect();
            }
            criteria.min_age = min_age.unwrap_or(criteria.min_age);
            criteria.max_age = max_age.unwrap_or(criteria.max_age);

            let selection = ViewSelection {
                health_metric,
                social_metric,
            };
            let model = view::build(&dataset, &criteria, &selection, config.preview_rows);

            let json = if pretty {
                serde_json::to_string_pretty(&model)
            } else {
                serde_json::to_string(&model)
            }
            .context("serialising report")?;
            let mut out = std::io::stdout().lock();
            writeln!(out, "{json}").context("writing report")?;
            Ok(())
        }
        None => run_dashboard(config),
    }
}

fn run_dashboard(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let mut state = AppState::new(config);
    state.open(DataSource::Path(state.config.data_path.clone()));

    eframe::run_native(
        "Tech Usage • Sleep & Health Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
