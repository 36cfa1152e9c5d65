// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Operator CLI for lilith-warden
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use lilith_warden::engine_core::constants::config as env_keys;
use lilith_warden::{SecurityFacade, WardenConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file (falls back to LILITH_WARDEN_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print presence and format validity of every catalog key
    Check,
    /// Print catalog metadata and presence only, never values
    Info,
    /// Store a credential in the configured backend
    Set { key: String, value: String },
    /// Remove a credential from the configured backend
    Delete { key: String },
    /// Redact sensitive substrings (reads stdin when TEXT is omitted)
    Redact { text: Option<String> },
    /// Run the user-message validator
    ValidateMessage { text: String },
    /// Print the client-safe form of an error message
    SanitizeError { text: String },
}

fn main() -> ExitCode {
    install_panic_hook();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli
        .config
        .or_else(|| std::env::var(env_keys::ENV_CONFIG_PATH).ok().map(PathBuf::from));
    let config = match &config_path {
        Some(path) => WardenConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => WardenConfig::from_env().context("loading config from environment")?,
    };

    init_tracing(&config);
    debug!(config = ?config, "Configuration loaded");

    let facade = SecurityFacade::new(&config).context("initializing security facade")?;

    let code = match cli.command {
        Command::Check => {
            let status = facade.validate_api_keys();
            println!("{}", serde_json::to_string_pretty(&status)?);
            if facade.registry().has_missing_required() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::Info => {
            println!("{}", serde_json::to_string_pretty(&facade.credential_info())?);
            ExitCode::SUCCESS
        }
        Command::Set { key, value } => exit_for(facade.set_credential(&key, &value)),
        Command::Delete { key } => exit_for(facade.delete_credential(&key)),
        Command::Redact { text } => {
            let text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading stdin")?;
                    buf
                }
            };
            print!("{}", facade.redact_text(&text));
            if !text.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Command::ValidateMessage { text } => {
            let outcome = facade.validate_user_message(&text);
            match outcome.reason() {
                None => {
                    println!("ok");
                    ExitCode::SUCCESS
                }
                Some(reason) => {
                    println!("rejected: {}", reason);
                    ExitCode::FAILURE
                }
            }
        }
        Command::SanitizeError { text } => {
            println!("{}", facade.sanitize_error_message(&text));
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}

fn exit_for(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        // Payloads can carry caller input; redact before printing.
        eprintln!(
            "PANIC: {} at {}",
            lilith_warden::engine::redactor::redact_text(&message),
            location
        );
    }));
}

fn init_tracing(config: &WardenConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("lilith_warden=info,warn"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
