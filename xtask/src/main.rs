use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use forkmaze::maze::GridMaze;
use forkmaze::search::{ForkPolicy, Solver, SolverConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "forkmaze workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the solve benchmarks and summarize them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Model-check the ledger with loom
    Loom,
    /// Solve a text maze and print the path
    Solve {
        /// Maze file (`#` wall, `.` open, `S` start, `G` goal)
        maze: PathBuf,

        /// Fork granularity; <= 0 never forks
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        fork_after: i64,

        #[arg(long, value_enum, default_value_t = PolicyArg::Depth)]
        policy: PolicyArg,

        /// Wait for forked children before continuing
        #[arg(long, default_value_t = false)]
        wait: bool,

        /// Worker threads
        #[arg(long)]
        threads: Option<usize>,

        /// JSON solver configuration; overrides the flags above
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Depth,
    Branch,
}

impl From<PolicyArg> for ForkPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Depth => ForkPolicy::Depth,
            PolicyArg::Branch => ForkPolicy::Branch,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Loom => run_loom()?,
        Commands::Solve {
            maze,
            fork_after,
            policy,
            wait,
            threads,
            config,
        } => {
            let config = match config {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    SolverConfig::from_json(&json)?
                }
                None => {
                    let mut config = SolverConfig::new(fork_after, policy.into()).with_wait(wait);
                    config.threads = threads;
                    config
                }
            };
            solve_file(&maze, config)?;
        }
    }

    Ok(())
}

fn solve_file(path: &Path, config: SolverConfig) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let maze = GridMaze::parse(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?
        .without_agent_trails();

    let solver = Solver::new(config)?;
    let start = Instant::now();
    let report = solver.search(&maze)?;
    let elapsed = start.elapsed();

    match &report.path {
        Some(path) => {
            print!("{}", maze.render(path));
            println!("path of {} cells", path.len());
        }
        None => println!("no path"),
    }
    tracing::info!(
        tasks = report.tasks.len(),
        claimed = report.visited.len(),
        ?elapsed,
        "search finished"
    );
    Ok(())
}

fn run_loom() -> Result<()> {
    tracing::info!("running loom models");
    let status = Command::new("cargo")
        .env("RUSTFLAGS", "--cfg loom")
        .args(["test", "--release", "--test", "loom_ledger"])
        .status()
        .context("Failed to run cargo test")?;
    if !status.success() {
        anyhow::bail!("loom models failed");
    }
    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    tracing::info!("running solve benchmarks");

    // Build first to avoid measuring build time
    tracing::info!("compiling benchmarks");
    let status = Command::new("cargo")
        .args(["build", "--bench", "solve_benchmark", "--release"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    let start = Instant::now();
    let mut cmd = Command::new("cargo");
    cmd.env("CARGO_INCREMENTAL", "0");
    cmd.args(["bench", "--bench", "solve_benchmark"]);

    // Args for the test runner (Criterion) go after --
    cmd.arg("--");
    if quick {
        cmd.arg("--measurement-time").arg("0.1");
        cmd.arg("--noplot");
        cmd.arg("--sample-size").arg("10");
    }

    let status = cmd.status().context("Failed to run solve_benchmark")?;
    if !status.success() {
        anyhow::bail!("Benchmark run failed");
    }
    tracing::info!(elapsed = ?start.elapsed(), "benchmarks finished");
    Ok(())
}

fn generate_report() -> Result<()> {
    tracing::info!("generating report");
    // workload -> configuration -> vertices per second
    let mut results: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        tracing::warn!(dir = %criterion_dir.display(), "no criterion output found");
        return Ok(());
    }

    collect_results(criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Solve Benchmark Report")?;

    for (workload, configs) in &results {
        writeln!(file, "\n## {workload}\n")?;
        writeln!(file, "| Configuration | Vertices/s | vs sequential |")?;
        writeln!(file, "|---|---|---|")?;

        let sequential = configs.get("sequential").copied().unwrap_or(0.0);
        for (name, ops) in configs {
            let rel = if sequential > 0.0 { ops / sequential } else { 0.0 };
            writeln!(file, "| {} | {} | **{:.2}x** |", name, format_rate(*ops), rel)?;
        }
    }

    tracing::info!(path = %report_path.display(), "report written");
    Ok(())
}

fn format_rate(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{:.0}", ops)
    }
}

fn collect_results(dir: &Path, results: &mut BTreeMap<String, BTreeMap<String, f64>>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results);
            continue;
        }
        // Structure: .../<group>/<config>/new/estimates.json
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(run_dir) = path.parent() else { continue };
        if run_dir.file_name().and_then(|s| s.to_str()) != Some("new") {
            continue;
        }
        let Some(config_dir) = run_dir.parent() else { continue };
        let Some(group_dir) = config_dir.parent() else { continue };
        let (Some(config), Some(group)) = (dir_name(config_dir), dir_name(group_dir)) else {
            continue;
        };
        if config == "report" || group == "report" {
            continue;
        }

        // Get throughput from benchmark.json
        let mut elements = 1.0;
        if let Ok(content) = fs::read_to_string(run_dir.join("benchmark.json")) {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) {
                if let Some(t) = json.get("throughput").and_then(|t| t.get("Elements")) {
                    elements = t.as_f64().unwrap_or(1.0);
                }
            }
        }

        let Ok(content) = fs::read_to_string(&path) else { continue };
        let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) else { continue };
        let time_ns = json
            .get("mean")
            .and_then(|m| m.get("point_estimate"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);
        if time_ns > 0.0 {
            results
                .entry(group)
                .or_default()
                .insert(config, (elements * 1e9) / time_ns);
        }
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_string)
}
