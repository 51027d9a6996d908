//! ParcelAssist CLI - operator-side resolution tool
//!
//! Usage:
//!   parcelassist-cli resolve [--order N] [--email E] [--phone P] [--tracking T]
//!                            [--text "free text"] [--config <path>] [--json]
//!   parcelassist-cli phone-candidates <raw>
//!   parcelassist-cli help | version
//!
//! Credentials can come from the environment instead of the config file:
//! PARCELASSIST_ORDERS_TOKEN, PARCELASSIST_PARCELS_TOKEN,
//! PARCELASSIST_CARRIER_TOKEN.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use parcelassist::config::AppConfig;
use parcelassist::identifiers::{HeuristicExtractor, IdentifierExtractor};
use parcelassist::{IdentifierSet, ResolutionEngine};

#[derive(Debug)]
enum Command {
    Resolve {
        ids: IdentifierSet,
        text: Option<String>,
        config: Option<PathBuf>,
        json: bool,
    },
    PhoneCandidates {
        raw: String,
    },
    Help,
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    match parse_args(&args) {
        Ok(cmd) => match run_command(cmd) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => Ok(Command::Help),
        "version" | "--version" | "-V" => Ok(Command::Version),

        "resolve" => {
            let mut ids = IdentifierSet::default();
            let mut text = None;
            let mut config = None;
            let mut json = false;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--order" => ids.order_number = Some(take_value(args, &mut i)?),
                    "--email" => ids.email = Some(take_value(args, &mut i)?),
                    "--phone" => ids.phone = Some(take_value(args, &mut i)?),
                    "--tracking" => ids.tracking_number = Some(take_value(args, &mut i)?),
                    "--text" => text = Some(take_value(args, &mut i)?),
                    "--config" => config = Some(PathBuf::from(take_value(args, &mut i)?)),
                    "--json" => {
                        json = true;
                        i += 1;
                    }
                    other => return Err(format!("Unknown resolve option: {}", other)),
                }
            }

            Ok(Command::Resolve {
                ids,
                text,
                config,
                json,
            })
        }

        "phone-candidates" => {
            let raw = args
                .get(2)
                .cloned()
                .ok_or_else(|| "Missing phone value".to_string())?;
            Ok(Command::PhoneCandidates { raw })
        }

        other => Err(format!("Unknown command: {}", other)),
    }
}

fn take_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let value = args
        .get(*i + 1)
        .cloned()
        .ok_or_else(|| format!("Missing value for {}", args[*i]))?;
    *i += 2;
    Ok(value)
}

fn run_command(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("parcelassist-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::PhoneCandidates { raw } => {
            for candidate in parcelassist::phone::candidates(&raw) {
                println!("{}", candidate);
            }
            Ok(())
        }
        Command::Resolve {
            mut ids,
            text,
            config,
            json,
        } => {
            // Free text goes through the extraction boundary; explicit flags win
            if let Some(text) = text {
                let extracted = HeuristicExtractor.extract(&text);
                ids.email = ids.email.or(extracted.email);
                ids.phone = ids.phone.or(extracted.phone);
                ids.order_number = ids.order_number.or(extracted.order_number);
                ids.tracking_number = ids.tracking_number.or(extracted.tracking_number);
            }

            let config_path = config
                .or_else(|| env::var("PARCELASSIST_CONFIG").ok().map(PathBuf::from))
                .ok_or_else(|| anyhow!("No config file: pass --config or set PARCELASSIST_CONFIG"))?;
            let app_config = AppConfig::load(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;
            app_config.validate().context("invalid configuration")?;

            let engine = ResolutionEngine::from_config(&app_config)?;

            let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
            let result = runtime.block_on(engine.resolve(&ids))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("path:     {}", result.path);
                println!("outcome:  {}", result.outcome);
                if let Some(number) = &result.tracking_number {
                    println!("tracking: {}", number);
                }
                let summary = result.summary();
                if let Some(status) = &summary.status {
                    println!("status:   {}", status);
                }
                if let Some(link) = &summary.tracking_link {
                    println!("link:     {}", link);
                }
                if !summary.history_text.is_empty() {
                    println!("history:\n{}", summary.history_text);
                }
                println!("intl:     {}", result.is_international);
                println!("--- trace ---");
                for line in &result.trace {
                    println!("  {}", line);
                }
            }
            Ok(())
        }
    }
}

fn print_help() {
    println!("parcelassist-cli - shipment identifier resolution");
    println!();
    println!("USAGE:");
    println!("  parcelassist-cli resolve [--order N] [--email E] [--phone P] [--tracking T]");
    println!("                           [--text \"free text\"] [--config <path>] [--json]");
    println!("  parcelassist-cli phone-candidates <raw>");
    println!("  parcelassist-cli help");
    println!("  parcelassist-cli version");
    println!();
    println!("ENVIRONMENT:");
    println!("  PARCELASSIST_CONFIG          config file path (JSON)");
    println!("  PARCELASSIST_ORDERS_TOKEN    orders API token override");
    println!("  PARCELASSIST_PARCELS_TOKEN   parcels API token override");
    println!("  PARCELASSIST_CARRIER_TOKEN   carrier API token override");
    println!("  RUST_LOG                     e.g. parcelassist=debug for the trace log");
}
