//! # Coingen - Coin registry validation and signed coin definitions
//!
//! This library checks a registry of bitcoin-like network definitions and
//! turns validated entries into build artifacts for downstream consumers.
//!
//! ## Overview
//!
//! Each registry entry describes one network: address version bytes, extended
//! key magics, the genesis block hash, an icon and optional backend endpoints.
//! From these the tool produces:
//!
//! - **`coins.json`**: the consolidated dataset, keyed by coin name, with
//!   support flags attached
//! - **`coindefs.json`**: one signed binary definition per coin, hex-encoded,
//!   that a device can load at runtime without a firmware update
//!
//! ## Architecture
//!
//! - `coin`: typed coin, misc and support records
//! - `validation`: per-record checks, address collisions, support coverage
//! - `coindef`: icon encoding, payload encoding and signing
//! - `pipeline`: validate, report, decide, then encode every coin
//! - `backends`: parallel backend genesis-hash checks behind a probe trait
//! - `capabilities`: compile-time feature detection with typed errors
//! - `config` / `config_loader`: YAML tool configuration and registry loading
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use coingen::{config_loader, pipeline};
//!
//! let config = config_loader::load_config("coingen.yaml".as_ref())?;
//! let registry = config_loader::load_registry(&config.registry)?;
//!
//! let outcome = pipeline::run_check(&registry, &pipeline::CheckOptions::default(), None);
//! outcome.report.log();
//! assert!(outcome.passed());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Definition Format
//!
//! ```text
//! [64-byte Ed25519 signature over SHA-256(payload)][payload]
//! ```
//!
//! The payload is protobuf wire format: chain parameters in field table order,
//! then the icon (32x32 RGB565, raw deflate) as the final field.
//!
//! ## Error Handling
//!
//! Validation never returns errors; findings are data. Per-coin artifact
//! failures are recorded against the coin and the batch continues. I/O and
//! configuration failures use `color_eyre` reports with context.

pub mod backends;
pub mod capabilities;
pub mod coin;
pub mod coindef;
pub mod config;
pub mod config_loader;
pub mod pipeline;
pub mod validation;
