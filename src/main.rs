//! MC Welfare - Entry Point
//!
//! Command-line front end over the analysis library: welfare comparison,
//! essay summary tables, adoption bimodality and the BDP sweep.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mc_welfare::chart::{
    render_adoption_profile, render_bifurcation, render_confidence_panel, render_modality,
    render_response, render_sector_timeseries, render_welfare_panel,
};
use mc_welfare::core::error::{AnalysisError, Result};
use mc_welfare::core::{AnalysisConfig, Scenario};
use mc_welfare::data::terminal::{TerminalTable, COL_TOTAL_ADOPTION};
use mc_welfare::data::timeseries::TimeseriesTable;
use mc_welfare::overview::{
    ModalityContrast, ModalityReport, ResponseCurve, ScenarioOverview, ScenarioProfile,
};
use mc_welfare::stats::bimodality::split_at_threshold;
use mc_welfare::sweep::SweepAnalysis;
use mc_welfare::welfare::WelfareReport;
use tracing_subscriber::EnvFilter;

/// Monte Carlo welfare analysis of BDP scenarios
#[derive(Parser, Debug)]
#[command(name = "mc-welfare")]
#[command(about = "Welfare, summary, bimodality and sweep analysis of terminal simulation data")]
struct Cli {
    /// Analysis config (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the simulated population size
    #[arg(long, global = true)]
    population: Option<u64>,

    /// Override the marginal propensity to consume
    #[arg(long, global = true)]
    mpc: Option<f64>,

    /// Directory holding the scenario terminal CSVs
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Directory the PNG figures are written to
    #[arg(long, global = true)]
    figures_dir: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long, global = true)]
    no_charts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-scenario welfare metrics (real consumption, Gini, income floor)
    Welfare {
        /// Also write all welfare records as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Macro and sector summary statistics and the transfer response
    Summary,
    /// Attractor split and mixture-model selection of adoption, per scenario
    Bimodality,
    /// Per-level statistics of the BDP sweep
    Sweep,
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(population) = cli.population {
        config.welfare.population = population;
    }
    if let Some(mpc) = cli.mpc {
        config.welfare.mpc = mpc;
    }
    if let Some(dir) = &cli.results_dir {
        config.results_dir = dir.clone();
    }
    if let Some(dir) = &cli.figures_dir {
        config.figures_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run_welfare(config: &AnalysisConfig, json: Option<&PathBuf>, charts: bool) -> Result<()> {
    let report = WelfareReport::analyze(config)?;
    println!("{}", report);

    if let Some(path) = json {
        fs::write(path, report.to_json()?)?;
        tracing::info!("Wrote welfare records to {}", path.display());
    }

    if charts {
        fs::create_dir_all(&config.figures_dir)?;
        render_welfare_panel(
            &config.figures_dir.join("welfare_panel.png"),
            &report,
            &config.charts,
        )?;
    }
    Ok(())
}

fn bimodality_scenario(config: &AnalysisConfig) -> Result<&Scenario> {
    let label = &config.bimodality.scenario;
    config.find_scenario(label).ok_or_else(|| {
        AnalysisError::InvalidConfig(format!("bimodality scenario '{}' is not configured", label))
    })
}

fn run_summary(config: &AnalysisConfig, charts: bool) -> Result<()> {
    println!("{}", "=".repeat(70));
    println!("SUMMARY STATISTICS FOR ESSAY");
    println!("{}", "=".repeat(70));

    let mut profiles = Vec::with_capacity(config.scenarios.len());
    for scenario in &config.scenarios {
        let table = TerminalTable::load(&config.scenario_path(scenario))?;
        let overview = ScenarioOverview::from_table(&scenario.label, &table)?;
        println!("\n{}", overview);

        if scenario.label == config.bimodality.scenario {
            let adoption = table.scaled_column(COL_TOTAL_ADOPTION, 100.0)?;
            let split = split_at_threshold(&adoption, config.bimodality.threshold)?;
            println!("BIMODALITY CHECK ({}):", scenario.label);
            print!("{}", split);
        }

        profiles.push(ScenarioProfile::from_table(scenario, &table)?);
    }

    let response = ResponseCurve::from_profiles(&profiles);
    println!("\n{}", response);

    if charts {
        fs::create_dir_all(&config.figures_dir)?;
        render_adoption_profile(
            &config.figures_dir.join("adoption_profile.png"),
            &profiles,
            Some(config.bimodality.scenario.as_str()),
            &config.charts,
        )?;
        render_response(&config.figures_dir.join("nonlinear_response.png"), &response)?;
        render_timeseries(config)?;
    }
    Ok(())
}

/// Band figures from the per-month files; scenarios without one are skipped
fn render_timeseries(config: &AnalysisConfig) -> Result<()> {
    let mut series = Vec::new();
    for scenario in &config.scenarios {
        let path = config.timeseries_path(scenario);
        if !path.exists() {
            tracing::warn!("{}: no time series at {}, skipped", scenario.label, path.display());
            continue;
        }
        series.push((scenario.label.clone(), TimeseriesTable::load(&path)?));
    }

    if series.is_empty() {
        tracing::warn!("No time series files found; band figures skipped");
        return Ok(());
    }

    render_confidence_panel(
        &config.figures_dir.join("confidence_panel.png"),
        &series,
        &config.charts,
    )?;

    let label = &config.bimodality.scenario;
    match series.iter().find(|(l, _)| l == label) {
        Some((_, table)) => render_sector_timeseries(
            &config.figures_dir.join("sector_timeseries.png"),
            label,
            table,
            &config.charts,
        )?,
        None => tracing::warn!("{}: no time series, sector figure skipped", label),
    }
    Ok(())
}

fn run_bimodality(config: &AnalysisConfig, charts: bool) -> Result<()> {
    let detail_scenario = bimodality_scenario(config)?;

    let mut reports = Vec::with_capacity(config.scenarios.len());
    for scenario in &config.scenarios {
        let table = TerminalTable::load(&config.scenario_path(scenario))?;
        reports.push(ModalityReport::from_table(
            &scenario.label,
            &table,
            &config.bimodality,
        )?);
    }

    let detail = reports
        .iter()
        .find(|r| r.label == detail_scenario.label)
        .ok_or_else(|| AnalysisError::EmptySample(detail_scenario.label.clone()))?;
    println!("{}", detail);

    let contrast = ModalityContrast::from_reports(config.bimodality.threshold, &reports);
    print!("{}", contrast);

    if charts {
        fs::create_dir_all(&config.figures_dir)?;
        render_modality(
            &config.figures_dir.join("bimodality.png"),
            detail,
            &reports,
            &config.charts,
        )?;
    }
    Ok(())
}

fn run_sweep(config: &AnalysisConfig, charts: bool) -> Result<()> {
    let analysis = SweepAnalysis::load(&config.sweep)?;
    println!(
        "\nTotal: {} data points across {} levels",
        analysis.total_points(),
        analysis.levels.len()
    );

    if analysis.levels.is_empty() {
        tracing::warn!("No sweep data found in {}", config.sweep.dir.display());
        return Ok(());
    }

    println!("\n{}", analysis);

    if charts {
        fs::create_dir_all(&config.figures_dir)?;
        let marker = config
            .find_scenario(&config.bimodality.scenario)
            .map(|s| s.bdp_amount);
        render_bifurcation(&config.figures_dir.join("bifurcation.png"), &analysis, marker)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mc_welfare=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let charts = !cli.no_charts;

    let outcome = match &cli.command {
        Command::Welfare { json } => run_welfare(&config, json.as_ref(), charts),
        Command::Summary => run_summary(&config, charts),
        Command::Bimodality => run_bimodality(&config, charts),
        Command::Sweep => run_sweep(&config, charts),
    };

    if let Err(err) = &outcome {
        tracing::error!("{}", err);
    }
    outcome
}
