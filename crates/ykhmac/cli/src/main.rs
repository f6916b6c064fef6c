use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use ykhmac::{SecretKey, Slot};

mod commands;
mod store;

use commands::*;
use store::FileStore;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Simulate HMAC challenge-response authentication against an emulated token"
)]
struct Cli {
    /// File holding the simulated EEPROM image
    #[arg(short, long, default_value = "ykhmac-eeprom.bin")]
    store: PathBuf,

    /// Secret programmed into slot 1 of the emulated token, in hex
    #[arg(long, value_name = "HEX")]
    slot1_secret: Option<String>,

    /// Secret programmed into slot 2 of the emulated token, in hex
    #[arg(long, value_name = "HEX")]
    slot2_secret: Option<String>,

    /// Serial number of the emulated token
    #[arg(long, default_value_t = 1_234_567)]
    serial: u32,

    /// Trace level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wrap a secret key and store it
    Enroll {
        /// Secret key, up to 40 hex digits
        #[arg(required = true)]
        secret: String,
    },

    /// Authenticate the token and rotate the stored credential
    Authenticate {
        /// Slot to challenge (1 or 2)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        slot: u8,
    },

    /// Invalidate the enrollment
    Forget,

    /// Show serial number, firmware version and configured slots
    Scan,

    /// Run a single challenge-response
    Chalresp {
        /// Slot to challenge (1 or 2)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        slot: u8,

        /// Challenge in hex
        #[arg(long, default_value = DEMO_CHALLENGE)]
        challenge: String,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    let secrets = SlotSecrets::parse(cli.slot1_secret.as_deref(), cli.slot2_secret.as_deref())?;
    let mut token = secrets.token(cli.serial);

    match &cli.command {
        Commands::Enroll { secret } => {
            let secret = SecretKey::from_hex(secret).context("Invalid secret key")?;
            let mut store = open_store(&cli.store)?;
            enroll_command(&mut store, &mut token, &secret)?
        }
        Commands::Authenticate { slot } => {
            let mut store = open_store(&cli.store)?;
            authenticate_command(&mut store, &mut token, Slot::try_from(*slot)?)?
        }
        Commands::Forget => {
            let mut store = open_store(&cli.store)?;
            forget_command(&mut store)?
        }
        Commands::Scan => scan_command(&mut token, &secrets)?,
        Commands::Chalresp { slot, challenge } => {
            chalresp_command(&mut token, &secrets, Slot::try_from(*slot)?, challenge)?
        }
    }

    Ok(())
}

fn open_store(path: &std::path::Path) -> Result<FileStore> {
    debug!(path = %path.display(), "Opening EEPROM image");
    FileStore::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();
}
