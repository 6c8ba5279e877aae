//! GIF Portal command line client
//!
//! Connects a wallet, makes sure the shared GIF account exists, and lists or
//! appends entries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use gif_portal::config::Config;
use gif_portal::{
    Deployment, GifPortal, KeypairWallet, PortalError, PortalView, RpcLedger, WalletProvider,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the resulting view as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Silent connect and show the current state
    Status,
    /// Prompted connect and show the list
    Connect,
    /// One-time creation of the shared GIF account
    Init,
    /// Append a GIF to the shared list
    Submit {
        #[arg(long)]
        link: String,
        #[arg(long)]
        name: String,
    },
    /// Re-read and print the list
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    let filter = if args.verbose {
        "gif_portal=debug,info".to_string()
    } else {
        config.logging.filter.clone()
    };
    gif_portal::structured_logging::init_logging(&filter, config.logging.json);

    info!("Starting GIF portal client v{}", env!("CARGO_PKG_VERSION"));

    let mut portal = match build_portal(&config) {
        Ok(portal) => portal,
        Err(e) => {
            let error = PortalError::Configuration(format!("{:#}", e));
            report(&error);
            return Err(e);
        }
    };

    let outcome = run(&mut portal, args.command).await;
    if let Err(e) = &outcome {
        report(e);
    }

    print_view(&portal.view(), args.json)?;
    Ok(())
}

/// Resolve the deployment and the optional wallet from configuration
fn build_portal(config: &Config) -> Result<GifPortal> {
    config.validate().context("Invalid configuration")?;

    let commitment = config.commitment()?;
    let deployment = Deployment {
        ledger: Arc::new(RpcLedger::new(config.rpc.url.clone(), commitment)),
        commitment,
        program_id: config.program_id()?,
        data_account: Arc::new(config.base_account_keypair()?),
    };
    info!(
        endpoint = %config.rpc.url,
        program = %deployment.program_id,
        base_account = %deployment.data_account_id(),
        "Loaded deployment"
    );

    let wallet = match &config.wallet.keypair_path {
        Some(path) => {
            let wallet = KeypairWallet::from_file(path, config.wallet.trusted)
                .context("Failed to load wallet")?;
            Some(Arc::new(wallet) as Arc<dyn WalletProvider>)
        }
        None => None,
    };

    Ok(GifPortal::new(deployment, wallet))
}

async fn run(portal: &mut GifPortal, command: Command) -> Result<(), PortalError> {
    match command {
        Command::Status => portal.start().await,
        Command::Connect => portal.connect().await.map(|_| ()),
        Command::Init => {
            connect_if_needed(portal).await?;
            let signature = portal.initialize_account().await?;
            println!("Created GIF account: {}", signature);
            Ok(())
        }
        Command::Submit { link, name } => {
            connect_if_needed(portal).await?;
            let signature = portal.submit_entry(&link, &name).await?;
            println!("Submitted GIF: {}", signature);
            Ok(())
        }
        Command::List => {
            connect_if_needed(portal).await?;
            portal.refresh().await.map(|_| ())
        }
    }
}

/// Silent connect first, prompted connect if that did not work
async fn connect_if_needed(portal: &mut GifPortal) -> Result<(), PortalError> {
    portal.start().await?;
    if !portal.session().is_connected() {
        portal.connect().await?;
    }
    Ok(())
}

fn report(error: &PortalError) {
    let notice = error.notice();
    warn!(error = %error, "Action did not complete");
    eprintln!("{}\n  {}", notice.title, notice.text);
}

fn print_view(view: &PortalView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        for line in view.render() {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
