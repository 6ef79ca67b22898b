use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{error, info, warn};
use std::path::PathBuf;

use coingen::capabilities::{Capabilities, Capability};
use coingen::config::Config;
use coingen::config_loader::{load_config, load_registry};
use coingen::pipeline::{self, CheckOptions};

/// Coin registry validation and signed coin definition generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to the tool configuration YAML file
    #[arg(short, long, default_value = "coingen.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Number of parallel workers (0 = auto-detect); overrides the config file
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate coin definitions
    ///
    /// Checks that every btc-like coin is properly filled out, reports address
    /// collisions and missing support information.
    Check {
        /// Fail if support info for a coin is missing
        #[arg(short = 's', long)]
        check_missing_support: bool,

        /// Also check blockbook/bitcore responses
        #[arg(short = 'b', long)]
        backend_check: bool,
    },

    /// Generate coins.json for downstream consumers
    CoinsJson {
        /// Output path (defaults to output.coins_json from the config)
        #[arg(short, long)]
        outfile: Option<PathBuf>,
    },

    /// Generate signed coin definitions
    Coindefs {
        /// Output path (defaults to output.coindefs_json from the config)
        #[arg(short, long)]
        outfile: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Config is loaded before logging so its log_level can apply; the
    // config source is reported once the logger exists
    let config = load_config(&args.config)?;

    let log_level = args
        .log_level
        .clone()
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if args.config.exists() {
        info!("Loaded configuration from {:?}", args.config);
    } else {
        info!("No configuration at {:?}, using defaults", args.config);
    }

    let threads = args.threads.unwrap_or(config.general.threads);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    let capabilities = Capabilities::detect();

    match args.command {
        Commands::Check { check_missing_support, backend_check } => {
            if backend_check {
                capabilities.require(Capability::BackendCheck)?;
            }
            let options = CheckOptions {
                fail_missing_support: check_missing_support || config.check.fail_missing_support,
            };
            let passed = run_check(&config, &options)?;
            if !passed {
                error!("Some checks failed.");
                std::process::exit(1);
            }
            info!("Everything is OK.");
        }
        Commands::CoinsJson { outfile } => {
            let registry = load_registry(&config.registry)?;
            let outfile = outfile.unwrap_or_else(|| config.output.coins_json.clone());
            pipeline::write_json(&pipeline::coins_json(&registry), &outfile)?;
        }
        Commands::Coindefs { outfile } => {
            capabilities.require(Capability::CoinDefs)?;
            let outfile = outfile.unwrap_or_else(|| config.output.coindefs_json.clone());
            if !build_coindefs(&config, &outfile)? {
                error!("Coin definitions were not generated.");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_check(config: &Config, options: &CheckOptions) -> Result<bool> {
    let registry = load_registry(&config.registry)?;
    let outcome = pipeline::run_check(&registry, options, None);
    outcome.report.log();
    Ok(outcome.passed())
}

#[cfg(feature = "coindefs")]
fn build_coindefs(config: &Config, outfile: &std::path::Path) -> Result<bool> {
    use coingen::coindef::Signer;
    use coingen::pipeline::PipelineOutcome;

    let registry = load_registry(&config.registry)?;
    let signer = match &config.signing.key_file {
        Some(path) => Signer::from_key_file(path)?,
        None => Signer::placeholder(),
    };

    match pipeline::run_build(&registry, &CheckOptions::default(), &signer) {
        PipelineOutcome::Failed(check) => {
            check.report.log();
            Ok(false)
        }
        PipelineOutcome::Done { check, build } => {
            check.report.log();
            for (key, failure) in &build.failures {
                warn!("Skipped {}: {}", key, failure);
            }
            pipeline::write_json(&build.definitions, outfile)?;
            Ok(true)
        }
    }
}

#[cfg(not(feature = "coindefs"))]
fn build_coindefs(_config: &Config, _outfile: &std::path::Path) -> Result<bool> {
    Capabilities::detect().require(Capability::CoinDefs)?;
    Ok(false)
}
