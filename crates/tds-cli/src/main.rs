//! tds-retag entry point.
//!
//! Sets up tracing (stderr) and config, gathers paths from the argument list or
//! stdin, and hands them to the batch loop. Stdout carries rename notices only.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use commands::retag::run_retag;
use tds_config::{ExitPolicy, LoadedConfig};
use tds_reconcile::Reconciler;
use tracing::debug;

#[derive(Parser)]
#[command(name = "tds-retag")]
#[command(
    about = "Verify or repair <yyyymmddhhmmss>.<md5> file names and force mtime/atime to the encoded time",
    long_about = None
)]
struct Cli {
    /// Config layers in merge order (appended after any listed in TDS_RETAG_CONFIG)
    #[arg(long = "config")]
    config_paths: Vec<String>,

    /// Read paths from stdin, one per line
    #[arg(long, default_value_t = false)]
    stdin: bool,

    /// Exit 0 even if some paths failed
    #[arg(long, default_value_t = false)]
    always_zero: bool,

    /// Print the merged config as JSON and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,

    /// Files in <tds>.<md5> (or legacy <tds>) form
    paths: Vec<OsString>,
}

fn main() -> Result<ExitCode> {
    // Dev convenience; silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    let mut loaded = load_config(&cli.config_paths)?;
    debug!(layers = ?loaded.layers, "config loaded");
    if cli.always_zero {
        loaded.config.exit_policy = ExitPolicy::AlwaysZero;
    }
    let cfg = loaded.config;

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg).context("serialize config failed")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    let paths = if commands::use_stdin(cli.stdin, cli.paths.len()) {
        commands::read_path_lines(io::stdin().lock(), &cfg).context("read paths from stdin")?
    } else {
        commands::normalize_args(&cli.paths, &cfg)
    };
    debug!(count = paths.len(), exit_policy = cfg.exit_policy.as_str(), "starting");

    let reconciler = Reconciler::new(cfg.reconcile_options());
    let summary = run_retag(&reconciler, &paths, &mut io::stdout().lock())?;

    let code = cfg.exit_policy.exit_code(summary.failed);
    Ok(ExitCode::from(code))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Env-listed layers first, then `--config` layers.
fn load_config(cli_paths: &[String]) -> Result<LoadedConfig> {
    let mut paths = tds_config::config_paths_from_env();
    paths.extend(cli_paths.iter().cloned());

    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    tds_config::load_layered_yaml(&path_refs).context("load config failed")
}
