//! Optional capabilities.
//!
//! Icon encoding and signing depend on the `coindefs` cargo feature. Backend
//! checks need a [`BackendProbe`](crate::backends::BackendProbe)
//! implementation, which this crate does not ship. Commands check the
//! capability they need up front and refuse to start without it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Icon encoding and definition signing
    CoinDefs,
    /// Probing blockbook/bitcore backends
    BackendCheck,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::CoinDefs => write!(f, "coin definition generation"),
            Capability::BackendCheck => write!(f, "backend check"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("{capability} is unavailable: {hint}")]
    Unavailable {
        capability: Capability,
        hint: &'static str,
    },
}

/// What this build of the tool can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub coindefs: bool,
    pub backend_probe: bool,
}

impl Capabilities {
    /// Capabilities compiled into this binary
    pub fn detect() -> Self {
        Self {
            coindefs: cfg!(feature = "coindefs"),
            backend_probe: false,
        }
    }

    /// Capabilities with a caller-provided backend probe available
    pub fn with_backend_probe(mut self) -> Self {
        self.backend_probe = true;
        self
    }

    pub fn require(&self, capability: Capability) -> Result<(), CapabilityError> {
        let (available, hint) = match capability {
            Capability::CoinDefs => (
                self.coindefs,
                "rebuild with the `coindefs` feature enabled",
            ),
            Capability::BackendCheck => (
                self.backend_probe,
                "no backend probe is available in this build",
            ),
        };
        if available {
            Ok(())
        } else {
            Err(CapabilityError::Unavailable { capability, hint })
        }
    }
}
