//! obsync: commit and push an Obsidian vault to its git remote.
//!
//! One run is one sync attempt (or one status check). Progress goes to
//! stdout, logs to stderr.

use anyhow::Result;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use obsync::config::{Args, Command, Config};
use obsync::render::{confirm, event_line, exit_status, failure_message, outcome_message};
use obsync::{build_engine, status_report, sync_and_record, vault_key, StateStore};
use obsync_core::local_clock;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Respects RUST_LOG, defaults to info (or debug with --verbose)
    let default_filter = if args.verbose {
        "debug,obsync=debug,obsync_core=debug"
    } else {
        "info,obsync=info,obsync_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<u8> {
    let config = Config::from_args(&args)?;
    debug!("Config: {:?}", config);

    let clock = local_clock();
    let engine = build_engine(&config, clock.clone());
    let mut store = StateStore::open(&config.state_file);
    let vault = vault_key(&config);

    match args.command() {
        Command::Sync { yes } => {
            if !yes {
                let prompt = format!("Commit and push all changes in {}?", vault);
                if !confirm(&prompt, &mut io::stdin().lock(), &mut io::stdout())? {
                    println!("Cancelled.");
                    return Ok(0);
                }
            }

            info!(
                "Syncing {} with {}",
                engine.vcs().work_dir().display(),
                engine.vcs().remote()
            );
            let _progress = engine.events().subscribe(|event| {
                if let Some(line) = event_line(&event) {
                    println!("{}", line);
                }
            });

            let result = sync_and_record(&engine, &mut store, &vault, &clock).await;
            match &result {
                Ok(outcome) => println!("{}", outcome_message(*outcome)),
                Err(e) => eprintln!("{}", failure_message(e)),
            }
            Ok(exit_status(&result))
        }
        Command::Status => match status_report(&engine, &store, &vault).await {
            Ok(report) => {
                println!("{}", report);
                Ok(0)
            }
            Err(e) => {
                eprintln!("{}", failure_message(&e));
                Ok(1)
            }
        },
    }
}
