use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::thread;

use disk_checker::config::load_config;
use disk_checker::monitor::check_worker;
use disk_checker::output::{build_outputs, output_worker};
use disk_checker::provider::SystemProvider;

/// Disk usage and block device monitor
#[derive(Parser, Debug)]
#[command(version, about)]
struct CmdOptions {
    /// Config file
    #[arg(short, long)]
    config: PathBuf,

    /// Run a single round and exit, ignoring the configured interval
    #[arg(long)]
    once: bool,

    /// Be verbose
    #[arg(short)]
    verbose: bool,
}

fn main() {
    let cmd_opts = CmdOptions::parse();
    let default_filter = if cmd_opts.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let cfg = match load_config(&cmd_opts.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };
    info!("Starting outputs...");
    let outputs = match build_outputs(&cfg.outputs) {
        Ok(outputs) => outputs,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };
    let interval = if cmd_opts.once { None } else { cfg.interval };

    let (sender_tx, sender_rx) = mpsc::channel();
    let output_handle = thread::spawn(move || output_worker(outputs, sender_rx));

    info!("Starting {} checks", cfg.checks.len());
    let checks = cfg.checks;
    let check_handle = thread::spawn(move || check_worker(checks, SystemProvider::new(), interval, sender_tx));

    if check_handle.join().is_err() {
        error!("Check worker panicked");
        process::exit(1);
    }
    match output_handle.join() {
        Ok(0) => {}
        Ok(_) => process::exit(2),
        Err(_) => {
            error!("Output worker panicked");
            process::exit(1);
        }
    }
}
