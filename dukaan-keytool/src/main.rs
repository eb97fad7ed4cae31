//! Dukaan Pro license keytool
//!
//! Operator CLI for the license engine:
//! 1. Issue license keys for a customer and plan
//! 2. Validate keys the way the shop front-end does
//! 3. Activate a key on this machine and check offline status
//!
//! Usage:
//!   dukaan-keytool issue --name "Asha Traders" --contact 9876543210 --plan "1 Year"
//!   dukaan-keytool validate <KEY>
//!
//! The operator secret comes from `--secret` or `APP_SECRET_KEY`. `plans` and
//! `status` need no secret.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use dukaan_keytool::{
    activate_key, issue_key, license_status, load_config, trust_store_from_env, validate_key,
};
use dukaan_license::{catalog, IssueRequest, Issuer, LicenseConfig, Validator};
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dukaan-keytool")]
#[command(about = "Issue and validate Dukaan Pro license keys")]
struct Args {
    /// Operator secret used to derive the token key
    #[arg(long, env = "APP_SECRET_KEY", hide_env_values = true, global = true)]
    secret: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a new license key
    Issue {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: String,
        /// Plan label, e.g. "6 Month" or "TRIAL 7"
        #[arg(long)]
        plan: String,
        #[arg(long)]
        address: Option<String>,
    },
    /// Validate a license key
    Validate { key: String },
    /// Validate a key and cache it for offline use on this machine
    Activate { key: String },
    /// Report access from the local cache without validating
    Status,
    /// List the plans on sale
    Plans,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Plans => print_json(&catalog()),
        Command::Status => {
            let store = trust_store_from_env();
            info!("Using license cache at {:?}", store.path());
            print_json(&license_status(&store))
        }
        Command::Issue {
            name,
            contact,
            plan,
            address,
        } => {
            let issuer = Issuer::new(config(args.secret)?.derive_key());
            let mut request = IssueRequest::new(name, contact, plan);
            if let Some(address) = address {
                request = request.with_address(address);
            }
            let response =
                issue_key(&issuer, &request, &Local::now()).context("Failed to issue key")?;
            print_json(&response)
        }
        Command::Validate { key: token } => {
            let validator = Validator::new(config(args.secret)?.derive_key());
            print_json(&validate_key(&validator, &token, &Local::now()))
        }
        Command::Activate { key: token } => {
            let settings = config(args.secret)?;
            let store = settings.trust_store();
            info!("Using license cache at {:?}", store.path());
            print_json(&activate_key(Validator::new(settings.derive_key()), store, &token))
        }
    }
}

fn config(secret: Option<String>) -> Result<LicenseConfig> {
    let config = load_config(secret).context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
