//! spendmap command line entry point

mod terminal;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use spendmap_config::{Config, ConfigError};
use spendmap_core::calendar::weekday_of;
use spendmap_core::{
    load_statement, AggregateOptions, Analysis, CategoryMapper, CoreError, TimeSelection,
};
use spendmap_render::{PieChart, Table};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use terminal::StdinPrompter;

#[derive(Parser, Debug)]
#[command(name = "spendmap")]
#[command(version = "0.1.0")]
#[command(about = "Categorize bank transactions and break spending down by period", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "spendmap.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask for the category of every unknown description and save the map
    Learn {
        /// Bank CSV files
        files: Vec<PathBuf>,

        /// Learn from every CSV in the assets directory
        #[arg(long, conflicts_with = "files")]
        assets: bool,
    },
    /// Print spending per category for a year or part of it
    Report {
        /// Bank CSV file
        file: PathBuf,

        #[arg(short, long)]
        year: i32,

        /// Month number, 1-12
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12), conflicts_with_all = ["week", "day"])]
        month: Option<u32>,

        /// Week containing this date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg, conflicts_with = "day")]
        week: Option<NaiveDate>,

        /// Single day (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        day: Option<NaiveDate>,

        /// Leave income out of the report
        #[arg(long)]
        costs_only: bool,

        /// Pie chart output path, overrides the configured one
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Skip the pie chart
        #[arg(long, conflicts_with = "chart")]
        no_chart: bool,

        /// Also write the categorized transactions to this CSV
        #[arg(long)]
        export: Option<PathBuf>,

        /// Resolve unknown descriptions before reporting
        #[arg(long)]
        learn: bool,
    },
    /// Validate the category map and list ambiguous descriptions
    Check,
    /// Print a default configuration file
    Config,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Command::Config = args.command {
        print!("{}", Config::generate_default());
        return ExitCode::SUCCESS;
    }

    let config = match Config::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    match run(args.command, &config) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Config) -> anyhow::Result<ExitCode> {
    match command {
        Command::Learn { files, assets } => {
            let files = if assets {
                csv_files_in(&config.data.assets_dir)?
            } else {
                files
            };
            if files.is_empty() {
                bail!("No CSV files given");
            }
            learn(config, &files)?;
        }
        Command::Report {
            file,
            year,
            month,
            week,
            day,
            costs_only,
            chart,
            no_chart,
            export,
            learn: learn_first,
        } => {
            if learn_first {
                learn(config, std::slice::from_ref(&file))?;
            }
            let selection = TimeSelection::from_parts(month, week, day)?;
            let chart = if no_chart {
                None
            } else {
                Some(chart.unwrap_or_else(|| config.charts.output.clone()))
            };
            report(config, &file, year, &selection, costs_only, chart, export)?;
        }
        Command::Check => return check(config),
        Command::Config => print!("{}", Config::generate_default()),
    }
    Ok(ExitCode::SUCCESS)
}

fn learn(config: &Config, files: &[PathBuf]) -> anyhow::Result<()> {
    let mappings = &config.data.mappings_file;
    let mut mapper = CategoryMapper::open(mappings)?;
    let mut prompter = StdinPrompter::stdio();

    for file in files {
        let statement = load_statement(file, &config.csv)?;
        log::info!("Learning from {} ({} rows)", statement.source, statement.len());

        let report = mapper.resolve_unknown(
            &statement.descriptions(),
            &statement.category_hints(),
            &mut prompter,
        );
        mapper.persist(mappings)?;

        println!(
            "{}: {} resolved, {} skipped",
            file.display(),
            report.resolved_count(),
            report.skipped().len()
        );
    }
    Ok(())
}

fn report(
    config: &Config,
    file: &Path,
    year: i32,
    selection: &TimeSelection,
    costs_only: bool,
    chart: Option<PathBuf>,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mapper = CategoryMapper::open(&config.data.mappings_file)?;
    let statement = load_statement(file, &config.csv)?;
    let analysis = Analysis::build(&mapper, &statement, year, weekday_of(config.analysis.week_start))?;

    let options = AggregateOptions::from_config(&config.analysis)
        .with_income(config.analysis.include_income && !costs_only);
    let title = if costs_only { "Costs" } else { "Spending" };
    let category_report = analysis.report(selection, &options, title)?;

    print!("{}", Table::from(&category_report));
    if !analysis.unmapped.is_empty() {
        println!(
            "{} descriptions have no category; run `spendmap learn {}`",
            analysis.unmapped.len(),
            file.display()
        );
    }

    if let Some(path) = export {
        let node = selection.resolve(&analysis.year)?;
        spendmap_core::export::write_csv(&path, node.transactions())?;
    }

    if let Some(path) = chart {
        if category_report.is_empty() {
            log::warn!("Nothing to chart for {}", category_report.period);
        } else {
            PieChart::new(&category_report.chart_data(), &config.charts)
                .save(&path)
                .with_context(|| format!("Failed to write chart {}", path.display()))?;
            println!("Chart written to {}", path.display());
        }
    }
    Ok(())
}

fn check(config: &Config) -> anyhow::Result<ExitCode> {
    let mapper = CategoryMapper::open(&config.data.mappings_file)?;
    let map = mapper.map();
    let ambiguities = map.ambiguities();

    println!(
        "{}: {} categories, {} descriptions",
        config.data.mappings_file.display(),
        map.len(),
        map.description_count()
    );
    if ambiguities.is_empty() {
        println!("No ambiguous descriptions");
        return Ok(ExitCode::SUCCESS);
    }
    for ambiguity in &ambiguities {
        println!(
            "  \"{}\" is listed under {}",
            ambiguity.description,
            ambiguity.categories.join(", ")
        );
    }
    Ok(ExitCode::FAILURE)
}

/// Every `*.csv` directly inside `dir`, sorted by name
fn csv_files_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read assets directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn report_config_error(error: &ConfigError) {
    eprintln!("[{}] {}", error.code(), error);
    for suggestion in error.suggestions() {
        eprintln!("  - {}", suggestion);
    }
}

fn report_error(error: &anyhow::Error) {
    if let Some(core) = error.downcast_ref::<CoreError>() {
        log::debug!("{} failure: {:?}", core.severity(), core);
        eprintln!("{}", core.to_details());
    } else if let Some(config) = error.downcast_ref::<ConfigError>() {
        report_config_error(config);
    } else {
        eprintln!("Error: {:#}", error);
    }
}
