use crate::coin::{CoinRecord, MiscCoin, Registry, RejectedRecord, SupportRecord};
use crate::config::{Config, RegistryConfig};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load and parse configuration from a YAML file
///
/// A missing file is not an error: built-in defaults are used instead.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let config: Config = if config_path.exists() {
        let file = File::open(config_path)
            .wrap_err_with(|| format!("Failed to open config '{}'", config_path.display()))?;
        serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse config '{}'", config_path.display()))?
    } else {
        Config::default()
    };

    config.validate()?;

    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).wrap_err_with(|| format!("Failed to open '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse '{}'", path.display()))
}

/// Split raw coin entries into parsed records and rejected entries
///
/// Each entry is parsed on its own so one malformed record does not hide the
/// rest of the registry from validation.
pub fn parse_coins(entries: Vec<serde_json::Value>) -> (Vec<CoinRecord>, Vec<RejectedRecord>) {
    let mut coins = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let key = match entry.get("key").and_then(serde_json::Value::as_str) {
            Some(key) => key.to_string(),
            None => format!("#{}", index),
        };
        match serde_json::from_value::<CoinRecord>(entry) {
            Ok(coin) => coins.push(coin),
            Err(e) => {
                warn!("Rejected registry entry {}: {}", key, e);
                rejected.push(RejectedRecord { key, error: e.to_string() });
            }
        }
    }

    (coins, rejected)
}

/// Load coin, misc and support records
///
/// Relative icon paths are resolved against `icons_dir`, or the directory of
/// the coins file when no icons directory is configured. Entries that do not
/// parse end up in [`Registry::rejected`].
pub fn load_registry(registry: &RegistryConfig) -> Result<Registry> {
    let entries: Vec<serde_json::Value> = read_json(&registry.coins)?;
    let (mut coins, rejected) = parse_coins(entries);
    info!(
        "Loaded {} bitcoin-like coins from {:?} ({} rejected)",
        coins.len(),
        registry.coins,
        rejected.len()
    );

    let icons_dir = registry
        .icons_dir
        .clone()
        .or_else(|| registry.coins.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    for coin in &mut coins {
        if let Some(icon) = &coin.icon {
            if icon.is_relative() {
                coin.icon = Some(icons_dir.join(icon));
            }
        }
        if !coin.extensions.is_empty() {
            debug!(
                "{}: carrying extension fields {:?}",
                coin.key,
                coin.extensions.keys().collect::<Vec<_>>()
            );
        }
    }

    let misc: Vec<MiscCoin> = match &registry.misc {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let support: BTreeMap<String, SupportRecord> = match &registry.support {
        Some(path) => read_json(path)?,
        None => BTreeMap::new(),
    };
    info!("Loaded {} misc coins and {} support entries", misc.len(), support.len());

    Ok(Registry { coins, rejected, misc, support })
}
