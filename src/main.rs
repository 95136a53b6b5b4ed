use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use vehicle_api::{Credential, ProxyChannel, ProxyConfig};
use vehicle_auth::{authenticate_blocking, load_credential, save_credential, OAuthClientConfig};
use wake_retry::{DeliveryConfig, DeliveryPolicy, WakeRetryCoordinator};

use tesla_cli::config::{AppConfig, DEFAULT_ENV_FILE};
use tesla_cli::{interrupt, logging, Session, VehicleAction};

#[derive(Debug, Parser)]
#[command(
    name = "tesla-cli",
    version,
    about = "Lock, unlock, and toggle Sentry Mode through a local vehicle command proxy"
)]
struct Cli {
    /// Dotenv file holding TESLA_* settings.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Base URL of the HTTPS command proxy (overrides TESLA_PROXY_URL).
    #[arg(long)]
    proxy_url: Option<String>,

    /// Token file (overrides TESLA_TOKENS_FILE).
    #[arg(long)]
    tokens_file: Option<PathBuf>,

    /// Delivery policy: probe-first or send-first.
    #[arg(long, default_value = DeliveryPolicy::PROBE_BEFORE_SEND)]
    policy: DeliveryPolicy,

    /// Per-request timeout in seconds.
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Give up once a single action has waited this many seconds.
    #[arg(long)]
    max_wait_secs: Option<u64>,

    /// Do not wake the vehicle before showing the menu.
    #[arg(long)]
    skip_initial_wake: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Lock the doors and exit.
    Lock,
    /// Unlock the doors and exit.
    Unlock,
    /// Enable Sentry Mode and exit.
    SentryOn,
    /// Disable Sentry Mode and exit.
    SentryOff,
    /// Wake the vehicle and exit.
    Wake,
    /// Print whether the vehicle is awake.
    Status,
    /// Run the OAuth login and save fresh tokens.
    Login,
}

impl Command {
    fn action(self) -> Option<VehicleAction> {
        match self {
            Self::Lock => Some(VehicleAction::Lock),
            Self::Unlock => Some(VehicleAction::Unlock),
            Self::SentryOn => Some(VehicleAction::SentryOn),
            Self::SentryOff => Some(VehicleAction::SentryOff),
            Self::Wake | Self::Status | Self::Login => None,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose).context("failed to install log subscriber")?;

    println!("Tesla Vehicle Command CLI");
    println!("=========================\n");

    let mut config = AppConfig::load(&cli.env_file)?;
    if !config.env_file_loaded {
        info!(path = %cli.env_file.display(), "no env file found; using process environment");
    }
    if let Some(proxy_url) = &cli.proxy_url {
        config.proxy_url = proxy_url.clone();
    }
    if let Some(tokens_file) = &cli.tokens_file {
        config.tokens_file = tokens_file.clone();
    }
    println!("Vehicle VIN: {}\n", config.vin);

    let login_requested = matches!(cli.command, Some(Command::Login));
    let credential = match stored_credential(&config) {
        Some(credential) if !login_requested => credential,
        _ => {
            if !login_requested {
                println!("No valid tokens found, performing authentication...");
            }
            let credential = login(&config).context("authentication failed")?;
            if let Err(error) = save_credential(&config.tokens_file, &credential) {
                warn!(%error, "failed to save tokens");
                println!("Warning: Failed to save tokens: {error}");
            } else {
                println!("Tokens saved to {}", config.tokens_file.display());
            }
            credential
        }
    };
    if login_requested {
        return Ok(ExitCode::SUCCESS);
    }

    let mut proxy =
        ProxyConfig::new(credential.access_token).with_base_url(config.proxy_url.clone());
    if let Some(secs) = cli.request_timeout_secs {
        proxy = proxy.with_timeout(Duration::from_secs(secs));
    }
    let channel = ProxyChannel::new(proxy).context("failed to set up proxy client")?;
    println!("Connected to proxy at {}\n", channel.base_url());

    let cancel = interrupt::new_cancel_signal();
    let _interrupt_guard =
        interrupt::install(cancel.clone()).context("failed to install interrupt handler")?;

    let mut delivery = DeliveryConfig::default();
    if let Some(secs) = cli.max_wait_secs {
        delivery = delivery.with_max_wait_units(secs);
    }
    let coordinator = WakeRetryCoordinator::new(channel, cli.policy)
        .with_config(delivery)
        .with_cancel_signal(cancel);
    let stdout = io::stdout();
    let mut session = Session::new(coordinator, config.vin.clone(), stdout.lock());

    let succeeded = match cli.command {
        Some(command) => match command.action() {
            Some(action) => session.run_action(action)?,
            None if matches!(command, Command::Wake) => session.wake()?,
            None => session.status()?.is_some(),
        },
        None => {
            if !cli.skip_initial_wake {
                session.initial_wake()?;
            }
            session.run_menu(io::stdin().lock())?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn stored_credential(config: &AppConfig) -> Option<Credential> {
    match load_credential(&config.tokens_file) {
        Ok(credential) if credential.has_access_token() => Some(credential),
        Ok(_) => {
            info!(path = %config.tokens_file.display(), "token file has no access token");
            None
        }
        Err(error) => {
            info!(%error, "no usable token file");
            None
        }
    }
}

fn login(config: &AppConfig) -> Result<Credential> {
    println!("\nOAuth Authentication");
    println!("====================\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let client_id = match &config.client_id {
        Some(value) => value.clone(),
        None => prompt(&mut input, "Enter Tesla CLIENT_ID: ")?,
    };
    let client_secret = match &config.client_secret {
        Some(value) => value.clone(),
        None => prompt(&mut input, "Enter Tesla CLIENT_SECRET: ")?,
    };
    let oauth = OAuthClientConfig::new(client_id, client_secret)
        .with_redirect_uri(config.redirect_uri.clone());

    let credential = authenticate_blocking(&oauth, |url| {
        println!("\nOpening browser for Tesla login...\n");
        println!("If browser doesn't open, copy and paste this URL:");
        println!("{url}\n");
        println!("Waiting for authorization callback...");
    })?;
    println!("Authorization complete.");
    Ok(credential)
}

fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
