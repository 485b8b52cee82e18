use clap::{Parser, Subcommand};
use qc_app::{AppResult, RunOptions, RunRequest, query, run_service, scenario_service};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qc-cli")]
#[command(about = "Quasicycle CLI - stochastic population dynamics and early-warning signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// List scenarios in a file
    Scenarios {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// List built-in models
    Models,
    /// Run a scenario
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Scenario ID to run
        scenario_id: String,
        /// Run store directory (defaults to .quasicycle/runs next to the file)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Override the scenario seed
        #[arg(long)]
        seed: Option<u64>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored runs
    Runs {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Only runs of this scenario
        #[arg(long)]
        scenario: Option<String>,
        /// Run store directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show details of a stored run
    ShowRun {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
        /// Run store directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export one column of a stored table as time,value CSV
    ExportSeries {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Column name (e.g. x, x_mean, x_variance)
        column: String,
        /// Table to read from
        #[arg(long, default_value = "trajectory")]
        table: String,
        /// Run store directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Scenarios { scenario_path } => cmd_scenarios(&scenario_path),
        Commands::Models => {
            cmd_models();
            Ok(())
        }
        Commands::Run {
            scenario_path,
            scenario_id,
            out,
            seed,
            no_cache,
        } => cmd_run(&scenario_path, &scenario_id, out, seed, !no_cache),
        Commands::Runs {
            scenario_path,
            scenario,
            out,
        } => cmd_runs(&scenario_path, scenario.as_deref(), out.as_deref()),
        Commands::ShowRun {
            scenario_path,
            run_id,
            out,
        } => cmd_show_run(&scenario_path, &run_id, out.as_deref()),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            column,
            table,
            out,
            output,
        } => cmd_export_series(
            &scenario_path,
            &run_id,
            &table,
            &column,
            out.as_deref(),
            output.as_deref(),
        ),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenarios: {}", scenario_path.display());
    let file = scenario_service::load_scenarios(scenario_path)?;
    scenario_service::validate_scenarios(&file)?;
    println!("✓ {} scenario(s) valid", file.scenarios.len());
    Ok(())
}

fn cmd_scenarios(scenario_path: &Path) -> AppResult<()> {
    let file = scenario_service::load_scenarios(scenario_path)?;
    let scenarios = scenario_service::list_scenarios(&file);

    if scenarios.is_empty() {
        println!("No scenarios found in {}", scenario_path.display());
    } else {
        println!("Scenarios in '{}':", file.name);
        for s in scenarios {
            println!(
                "  {} - {} ({} model '{}', {} replicate(s), seed {}{})",
                s.id,
                s.name,
                s.kind,
                s.model,
                s.replicates,
                s.seed,
                if s.has_indicators { ", indicators" } else { "" }
            );
        }
    }
    Ok(())
}

fn cmd_models() {
    println!("Built-in models:");
    for m in qc_scenario::CATALOG {
        println!(
            "  {:<15} {:?}  vars [{}]  params [{}]",
            m.name,
            m.kind,
            m.variables.join(", "),
            m.params.join(", ")
        );
        println!("  {:<15} {}", "", m.description);
    }
}

fn cmd_run(
    scenario_path: &Path,
    scenario_id: &str,
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
    use_cache: bool,
) -> AppResult<()> {
    println!("Running scenario: {}", scenario_id);

    let request = RunRequest {
        scenario_path,
        scenario_id,
        options: RunOptions {
            use_cache,
            seed,
            out_dir,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!(
            "✓ Simulation completed in {:.3}s: {}",
            response.elapsed_s, response.run_id
        );
    }
    println!("  Output: {}", response.run_dir.display());
    for table in &response.manifest.tables {
        println!("  Table:  {}.csv", table);
    }
    for (name, tau) in &response.manifest.indicator_trends {
        match tau {
            Some(tau) => println!("  Trend {}: Kendall tau = {:.3}", name, tau),
            None => println!("  Trend {}: undefined", name),
        }
    }
    Ok(())
}

fn cmd_runs(scenario_path: &Path, scenario_id: Option<&str>, out_dir: Option<&Path>) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path, out_dir, scenario_id)?;

    if runs.is_empty() {
        println!("No stored runs found");
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!(
                "  {} {} seed={} ({})",
                manifest.run_id, manifest.scenario_id, manifest.seed, manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str, out_dir: Option<&Path>) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, tables) = run_service::load_run(scenario_path, out_dir, run_id)?;

    println!("\nRun Summary:");
    println!("  Scenario: {} ({})", manifest.scenario_id, manifest.scenario_name);
    println!("  Kind: {:?}", manifest.run_kind);
    println!("  Seed: {}  Replicates: {}", manifest.seed, manifest.replicates);
    println!("  Engine: {}  Created: {}", manifest.engine_version, manifest.timestamp);

    for (name, table) in &tables {
        let summary = query::get_run_summary(table)?;
        println!("\nTable '{}':", name);
        println!("  Rows: {}", summary.row_count);
        println!(
            "  Time range: {:.3} - {:.3}",
            summary.time_range.0, summary.time_range.1
        );
        println!("  Columns: {}", summary.columns.join(", "));
    }

    Ok(())
}

fn cmd_export_series(
    scenario_path: &Path,
    run_id: &str,
    table_name: &str,
    column: &str,
    out_dir: Option<&Path>,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, tables) = run_service::load_run(scenario_path, out_dir, run_id)?;
    let table = tables
        .iter()
        .find(|(name, _)| name == table_name)
        .map(|(_, t)| t)
        .ok_or_else(|| qc_app::AppError::InvalidInput(format!("Unknown table: {}", table_name)))?;

    let series = query::extract_series(table, column)?;

    let mut csv = String::from("time,value\n");
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
