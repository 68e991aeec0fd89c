//! # Configuration Surface
//!
//! Startup configuration for a raffle deployment. Loaded once from YAML,
//! validated before the state machine will accept it, and never mutated
//! at runtime.
//!
//! ```yaml
//! entrance_fee: 1000000000
//! max_entrants: 2
//! settlement_split: 1000
//! treasury_controller: "1b4e28ba-2fa1-11d2-883f-0016d3cca427"
//! oracle:
//!   gas_lane: "0xd89b2bf150e3b9e13446986e571fb9cab24b13cea0a43ea20a6049a85cc807cc"
//!   subscription_id: 588
//!   callback_gas_limit: 500000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::{Amount, BasisPoints};
use crate::identity::AccountId;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// The entrance fee is zero — a free raffle accumulates no pot.
    #[error("entrance fee must be nonzero")]
    ZeroEntranceFee,

    /// The entrant capacity is zero — no round could ever be drawn.
    #[error("max entrants must be at least 1")]
    ZeroCapacity,
}

/// Connection parameters for the randomness oracle.
///
/// Opaque to the core: these are handed to the oracle binding when a
/// request is issued and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParams {
    /// The key lane (maximum-gas ceiling hash) the oracle should use.
    pub gas_lane: String,
    /// Funded oracle subscription to bill requests against.
    pub subscription_id: u64,
    /// Gas budget for the oracle's delivery callback.
    pub callback_gas_limit: u32,
}

/// Full startup configuration for one raffle deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleConfig {
    /// Exact fee each entrant must pay, in base units.
    pub entrance_fee: Amount,
    /// Maximum paid admissions per round.
    pub max_entrants: u64,
    /// Treasury share of each settled pot, in basis points.
    pub settlement_split: BasisPoints,
    /// The only identity allowed to sweep the treasury balance.
    pub treasury_controller: AccountId,
    /// Oracle connection parameters.
    pub oracle: OracleParams,
}

impl RaffleConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RaffleConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Check the cross-field invariants a raffle cannot run without.
    ///
    /// The settlement split needs no check here — [`BasisPoints`] rejects
    /// out-of-range shares at deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entrance_fee.is_zero() {
            return Err(ConfigError::ZeroEntranceFee);
        }
        if self.max_entrants == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
