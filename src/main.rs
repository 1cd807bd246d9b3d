use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
mod auth;
use keystore_mac::{MacAlgorithm, MacData, MacScheme, MacSettings};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "keystore-mac")]
#[command(
    version,
    about = "Compute, verify and inspect the integrity MAC of PKCS#12 keystores."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Computes the MAC of a payload and writes the DER MacData
    #[command(arg_required_else_help = true)]
    Compute {
        /// File holding the authenticated content
        #[arg(long, value_name = "PATH")]
        payload: PathBuf,

        /// Where to write the encoded MacData
        #[arg(long, value_name = "PATH")]
        out: PathBuf,

        /// MAC algorithm, e.g. HmacPBESHA256 or PBEWithHmacSHA256AndHmacSHA256
        #[arg(long)]
        algorithm: Option<String>,

        /// MAC iteration count (default: 10000)
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Verifies a payload against an encoded MacData
    #[command(arg_required_else_help = true)]
    Verify {
        #[arg(long, value_name = "PATH")]
        payload: PathBuf,

        #[arg(long, value_name = "PATH")]
        mac: PathBuf,

        /// Override the algorithm recorded in the MacData
        #[arg(long)]
        algorithm: Option<String>,
    },

    /// Prints the fields of an encoded MacData as JSON
    #[command(arg_required_else_help = true)]
    Inspect {
        #[arg(long, value_name = "PATH")]
        mac: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct MacSummary {
    scheme: &'static str,
    mac_algorithm: String,
    digest_algorithm: &'static str,
    kdf_hmac: Option<&'static str>,
    verify_hmac: Option<&'static str>,
    key_length_bits: Option<u32>,
    iterations: u32,
    salt: String,
    digest: String,
}

impl From<&MacData> for MacSummary {
    fn from(record: &MacData) -> Self {
        Self {
            scheme: match record.scheme() {
                MacScheme::Legacy { .. } => "legacy",
                MacScheme::Pbmac1 { .. } => "pbmac1",
            },
            mac_algorithm: record.mac_algorithm(),
            digest_algorithm: record.digest_algorithm_name(),
            kdf_hmac: record.kdf_hmac().map(|h| h.name()),
            verify_hmac: record.verify_hmac().map(|h| h.name()),
            key_length_bits: record.key_length_bits(),
            iterations: record.iterations(),
            salt: hex::encode(record.salt()),
            digest: hex::encode(record.digest()),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {what} '{}'", path.display()))
}

fn load_mac(path: &Path) -> Result<MacData> {
    let bytes = read_file(path, "MAC data")?;
    MacData::from_der(&bytes).context("invalid MAC data")
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();
    match args.command {
        Commands::Compute {
            payload,
            out,
            algorithm,
            iterations,
        } => {
            let mut settings = MacSettings::from_env()?;
            if let Some(alg) = algorithm {
                settings.algorithm = alg.parse::<MacAlgorithm>()?;
            }
            if let Some(count) = iterations {
                settings.iterations = count;
            }

            let data = read_file(&payload, "payload")?;
            let password = auth::read_new_password()?;
            let encoded = keystore_mac::compute_mac_with_settings(&password, &data, &settings)
                .context("failed to compute MAC")?;
            drop(password);

            fs::write(&out, &encoded)
                .with_context(|| format!("failed to write '{}'", out.display()))?;
            println!("{} MAC written to {}", settings.algorithm, out.display());
        }
        Commands::Verify {
            payload,
            mac,
            algorithm,
        } => {
            let record = load_mac(&mac)?;
            let data = read_file(&payload, "payload")?;
            let password = auth::read_password()?;

            let verified = match algorithm {
                Some(alg) => keystore_mac::verify_mac_with(&record, &password, &data, &alg),
                None => keystore_mac::verify_mac(&record, &password, &data),
            };
            verified.context("MAC verification failed")?;
            println!("MAC verified ({})", record.mac_algorithm());
        }
        Commands::Inspect { mac } => {
            let record = load_mac(&mac)?;
            let summary = MacSummary::from(&record);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
