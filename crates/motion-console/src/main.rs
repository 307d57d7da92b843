//! Motion console entry point.
//!
//! Reads one command per line from stdin. Logs go to stderr, filtered by
//! `RUST_LOG` (default `info`).

use std::{
    io::{self, BufRead, Write},
    time::Duration,
};

use clap::Parser;
use motion_console::{Flow, Shell, ShellError, commands};
use motion_core::BridgeConfig;
use motion_proto::limits;
use tracing_subscriber::EnvFilter;

/// Motion console
#[derive(Parser, Debug)]
#[command(name = "motion-console")]
#[command(about = "Drive the motion-state bridge against a loopback native view")]
struct Args {
    /// Commands admitted per rate window
    #[arg(long, default_value_t = limits::RATE_LIMIT_MAX_MESSAGES)]
    rate_limit: usize,

    /// Rate window length in milliseconds
    #[arg(long, default_value_t = 1000)]
    window_ms: u64,

    /// Do not answer commands from the loopback view
    #[arg(long)]
    no_reply: bool,
}

fn main() -> Result<(), ShellError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();

    let args = Args::parse();
    let config = BridgeConfig {
        rate_limit_max_messages: args.rate_limit,
        rate_limit_window: Duration::from_millis(args.window_ms),
        ..BridgeConfig::default()
    };
    let mut shell = Shell::new(config, !args.no_reply);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "motion console, /help for commands")?;

    for line in stdin.lock().lines() {
        let command = commands::parse(&line?);
        let flow = shell.execute(command, &mut stdout)?;
        stdout.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }

    shell.execute(commands::Command::Cleanup, &mut stdout)?;
    Ok(())
}
