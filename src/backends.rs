//! Backend reachability checks.
//!
//! Each coin's blockbook and bitcore backends are asked for the hash of block
//! 0, which must equal the coin's `hash_genesis_block`. The network side is an
//! external collaborator behind [`BackendProbe`]; this module only fans the
//! probes out and collects the results.

use crate::coin::CoinRecord;
use crate::validation::Finding;
use rayon::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response: {0}")]
    BadResponse(String),
}

/// Fetches the genesis block hash from one backend
///
/// Implementations are called from multiple threads and must enforce their
/// own per-call timeout.
pub trait BackendProbe: Sync {
    fn genesis_block_hash(&self, backend: &str) -> Result<String, ProbeError>;
}

/// Probe every backend of every coin that has a genesis hash
///
/// One finding per backend: `Info` when the hash matches, `Error` otherwise.
/// Findings are in registry order regardless of completion order.
pub fn check_backends(coins: &[CoinRecord], probe: &dyn BackendProbe) -> Vec<Finding> {
    let targets: Vec<(&CoinRecord, &str, &str)> = coins
        .iter()
        .filter_map(|coin| coin.hash_genesis_block.as_deref().map(|hash| (coin, hash)))
        .flat_map(|(coin, hash)| coin.backends().map(move |backend| (coin, hash, backend)))
        .collect();

    log::info!("Checking {} backends...", targets.len());

    targets
        .par_iter()
        .map(|&(coin, genesis, backend)| match probe.genesis_block_hash(backend) {
            Ok(hash) if hash.eq_ignore_ascii_case(genesis) => {
                Finding::info(format!("{} ({}): OK", backend, coin.key))
            }
            Ok(hash) => Finding::error(format!(
                "{} ({}): genesis block mismatch, got {}",
                backend, coin.key, hash
            )),
            Err(e) => Finding::error(format!("{} ({}): {}", backend, coin.key, e)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const GENESIS: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    struct FakeProbe {
        responses: HashMap<&'static str, Result<&'static str, ()>>,
    }

    impl BackendProbe for FakeProbe {
        fn genesis_block_hash(&self, backend: &str) -> Result<String, ProbeError> {
            match self.responses.get(backend) {
                Some(Ok(hash)) => Ok(hash.to_string()),
                Some(Err(())) => Err(ProbeError::Timeout),
                None => Err(ProbeError::Unreachable(backend.to_string())),
            }
        }
    }

    #[test]
    fn test_failures_do_not_block_other_backends() {
        let coin = CoinRecord {
            key: "bitcoin:BTC".to_string(),
            hash_genesis_block: Some(GENESIS.to_string()),
            blockbook: vec!["https://bb1".to_string(), "https://bb2".to_string()],
            bitcore: vec!["https://insight".to_string()],
            ..Default::default()
        };
        let no_genesis = CoinRecord {
            key: "bitcoin:NOG".to_string(),
            blockbook: vec!["https://never".to_string()],
            ..Default::default()
        };
        let probe = FakeProbe {
            responses: HashMap::from([
                ("https://bb1", Err(())),
                ("https://bb2", Ok(GENESIS)),
                ("https://insight", Ok("00ff")),
            ]),
        };

        let findings = check_backends(&[coin, no_genesis], &probe);
        assert_eq!(findings.len(), 3);
        assert!(findings[0].is_error());
        assert!(findings[0].message.contains("timed out"));
        assert!(!findings[1].is_error());
        assert!(findings[2].message.contains("genesis block mismatch"));
    }
}
