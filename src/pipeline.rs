//! Validation and artifact pipeline.
//!
//! A run always validates every record before deciding anything:
//!
//! 1. validate coin records, key uniqueness and support data
//! 2. report address collisions (warnings, never fatal)
//! 3. stop if any hard error was recorded
//! 4. otherwise encode, compress and sign each coin independently
//!
//! Per-coin work fans out over the rayon pool. Results are collected in
//! registry order and keyed by coin key, so output does not depend on
//! scheduling.

use crate::backends::{check_backends, BackendProbe};
use crate::coin::{CoinRecord, Registry, SupportFlags};
use crate::validation::{
    check_support, find_address_collisions, find_duplicate_keys, validate_record,
    validate_support, CollisionReport, Finding, ValidationReport,
};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[cfg(feature = "coindefs")]
use crate::coindef::{
    encode_definition, encode_icon, EncodeError, IconError, SignedDefinition, Signer,
};

/// Caller-chosen strictness
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Missing support info is an error instead of a warning
    pub fail_missing_support: bool,
}

/// Result of the validation stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckOutcome {
    pub report: ValidationReport,
    pub collisions: CollisionReport,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.report.passed()
    }
}

/// Validate the whole registry
///
/// Backends are only probed when `probe` is given. Never stops early: every
/// record is checked before returning.
pub fn run_check(
    registry: &Registry,
    options: &CheckOptions,
    probe: Option<&dyn BackendProbe>,
) -> CheckOutcome {
    let mut report = ValidationReport::new();

    log::info!("Checking BTC-like coins...");
    let record_errors: Vec<(&CoinRecord, Vec<String>)> = registry
        .coins
        .par_iter()
        .map(|coin| (coin, validate_record(coin)))
        .collect();
    for rejected in &registry.rejected {
        report.push(Finding::error(format!(
            "invalid definition for {}: {}",
            rejected.key, rejected.error
        )));
    }
    for (coin, errors) in record_errors {
        for error in errors {
            report.push(Finding::error(format!(
                "invalid definition for {}: {}",
                coin.name(),
                error
            )));
        }
    }

    for key in find_duplicate_keys(&registry.coins, &registry.misc) {
        report.push(Finding::error(format!("duplicate coin key {}", key)));
    }

    let collisions = find_address_collisions(&registry.coins);
    report.extend(collisions.warnings().into_iter().map(Finding::warning));

    log::info!("Checking support data...");
    let support = check_support(
        &registry.expected_keys(),
        &registry.support,
        options.fail_missing_support,
        |key| registry.describe_key(key),
    );
    report.extend(support.findings);

    if let Some(probe) = probe {
        log::info!("Checking backend responses...");
        report.extend(check_backends(&registry.coins, probe));
    }

    CheckOutcome { report, collisions }
}

/// Per-coin artifact failure
#[cfg(feature = "coindefs")]
#[derive(Debug, thiserror::Error)]
pub enum CoinDefError {
    #[error("no icon defined")]
    MissingIcon,

    #[error("failed to read icon {path}: {source}")]
    ReadIcon {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Icon(#[from] IconError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Icon, payload and signature for one coin
#[cfg(feature = "coindefs")]
pub fn build_definition(
    coin: &CoinRecord,
    signer: &Signer,
) -> Result<SignedDefinition, CoinDefError> {
    let path = coin.icon.as_ref().ok_or(CoinDefError::MissingIcon)?;
    let image = fs::read(path).map_err(|source| CoinDefError::ReadIcon {
        path: path.display().to_string(),
        source,
    })?;
    let icon = encode_icon(&image)?;
    let payload = encode_definition(coin, &icon)?;
    log::debug!("{}: {} byte payload, {} byte icon", coin.key, payload.len(), icon.len());
    Ok(signer.sign_definition(payload))
}

/// Signed definitions of every coin that could be built
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOutcome {
    /// Coin key -> hex `signature ‖ payload`
    pub definitions: BTreeMap<String, String>,
    /// Coin key -> failure message
    pub failures: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Validation recorded hard errors; nothing was encoded
    Failed(CheckOutcome),
    Done { check: CheckOutcome, build: BuildOutcome },
}

/// Validate, then build signed definitions for every coin
#[cfg(feature = "coindefs")]
pub fn run_build(registry: &Registry, options: &CheckOptions, signer: &Signer) -> PipelineOutcome {
    let check = run_check(registry, options, None);
    if !check.passed() {
        return PipelineOutcome::Failed(check);
    }

    log::info!("Building definitions for {} coins...", registry.coins.len());
    let results: Vec<(&str, Result<SignedDefinition, CoinDefError>)> = registry
        .coins
        .par_iter()
        .map(|coin| (coin.key.as_str(), build_definition(coin, signer)))
        .collect();

    let mut build = BuildOutcome::default();
    for (key, result) in results {
        match result {
            Ok(definition) => {
                build.definitions.insert(key.to_string(), definition.to_hex());
            }
            Err(e) => {
                log::error!("{}: {}", key, e);
                build.failures.insert(key.to_string(), e.to_string());
            }
        }
    }
    log::info!(
        "Built {} definitions, {} failures",
        build.definitions.len(),
        build.failures.len()
    );

    PipelineOutcome::Done { check, build }
}

/// One `coins.json` entry: the record plus its support flags
#[derive(Debug, Serialize)]
pub struct CoinEntry<'a> {
    #[serde(flatten)]
    pub coin: &'a CoinRecord,
    pub support: SupportFlags,
}

/// Consolidated dataset keyed by coin name
///
/// Coins without (valid) support data get empty support flags.
pub fn coins_json(registry: &Registry) -> BTreeMap<String, CoinEntry<'_>> {
    registry
        .coins
        .iter()
        .map(|coin| {
            let support = registry
                .support
                .get(&coin.key)
                .and_then(|record| validate_support(record).ok())
                .unwrap_or_default();
            (coin.name().to_string(), CoinEntry { coin, support })
        })
        .collect()
}

/// Write JSON with sorted keys, 4-space indent and a trailing newline
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    // Going through Value sorts object keys
    let value = serde_json::to_value(value).wrap_err("Failed to serialize output")?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).wrap_err("Failed to format output")?;
    buf.push(b'\n');

    fs::write(path, buf).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
