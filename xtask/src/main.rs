use std::path::Path;
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the delivery navigation workspace",
    long_about = "A unified CLI for running simulations, benchmarks,\n\
                  and CI checks in the delivery navigation workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo drive: start, divert after 10 s, two minutes of virtual time
    Simulate {
        /// Driver location as `lat,lng`
        #[arg(long, default_value = "-22.90,-47.06", allow_hyphen_values = true)]
        driver: String,
        /// Delivery address
        #[arg(long, default_value = "Av. Iguatemi, 777, Vila Brandina, Campinas, SP")]
        delivery: String,
        /// Use OpenRouteService instead of straight lines (needs ORS_API_KEY)
        #[arg(long)]
        ors: bool,
    },
    /// Run the unit and integration tests of every crate
    Test,
    /// Run Criterion benchmarks
    Bench,
    /// Benchmark the last commit, then the working tree against it
    BenchCompare,
    /// CI jobs
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// rustfmt, clippy and the test suites
    Check,
    /// Builds with default features turned off
    Minimal,
    Bench,
    /// Every job above, in order
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

/// Run `program` with `args`, exiting with its status code on failure.
fn run(program: &str, args: &[&str]) {
    eprintln!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .unwrap_or_else(|err| panic!("failed to execute {program}: {err}"));
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run("cargo", args);
}

/// Run the nav_core benchmarks, forwarding `criterion_args` to Criterion.
fn bench(criterion_args: &[&str]) {
    let mut args = vec!["bench", "-p", "nav_core", "--bench", "performance"];
    if !criterion_args.is_empty() {
        args.push("--");
        args.extend_from_slice(criterion_args);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("rustfmt");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("clippy (all features, warnings denied)");
    run_cargo(&["clippy", "--workspace", "--all-targets", "--all-features", "--", "-D", "warnings"]);

    step("Test nav_core");
    run_cargo(&["test", "-p", "nav_core", "--all-features"]);

    step("Test nav_cli");
    run_cargo(&["test", "-p", "nav_cli"]);
}

fn ci_minimal() {
    step("Build nav_core without default features");
    run_cargo(&["build", "-p", "nav_core", "--no-default-features"]);

    step("Build delivery-nav without the ORS client");
    run_cargo(&["build", "-p", "nav_cli", "--no-default-features"]);
}

fn ci_bench() {
    step("Criterion benchmarks");
    bench(&[]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            driver,
            delivery,
            ors,
        } => {
            let provider = if ors { "ors" } else { "straight-line" };
            run_cargo(&[
                "run",
                "-p",
                "nav_cli",
                "--release",
                "--",
                "simulate",
                "--driver",
                &driver,
                "--delivery",
                &delivery,
                "--wrong-route-at",
                "10000",
                "--duration-ms",
                "120000",
                "--provider",
                provider,
            ]);
        }
        Commands::Test => {
            run_cargo(&["test", "--workspace"]);
        }
        Commands::Bench => bench(&[]),
        Commands::BenchCompare => {
            let criterion_dir = Path::new("target/criterion");
            if criterion_dir.exists() {
                step("Clearing previous Criterion output");
                std::fs::remove_dir_all(criterion_dir).expect("failed to remove target/criterion");
            }

            step("Baseline from the last commit");
            run("git", &["stash", "push", "-m", "xtask bench-compare"]);
            bench(&["--save-baseline", "main"]);
            run("git", &["stash", "pop"]);

            step("Working tree against the baseline");
            bench(&["--baseline", "main"]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Minimal => ci_minimal(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_minimal();
                    ci_bench();
                }
            }
            eprintln!("\nci: ok");
        }
    }
}
