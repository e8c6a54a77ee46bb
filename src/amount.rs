//! Conversion between human readable amounts and the scaled integers the
//! contract stores.

use serde::{Deserialize, Serialize};

/// Decimals of the native coin on the deployed network.
pub const DEFAULT_DECIMALS: u8 = 8;

/// 10^19 is the largest power of ten that fits a u64.
pub const MAX_DECIMALS: u8 = 19;

// 2^64, exactly representable as f64.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AmountError {
    #[error("amount {0} is negative")]
    Negative(f64),
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount {value} scaled by 10^{decimals} does not fit in a u64")]
    Overflow { value: f64, decimals: u8 },
    #[error("{0} decimals is more than the {} a u64 can scale", MAX_DECIMALS)]
    TooManyDecimals(u8),
}

fn scale(decimals: u8) -> Result<f64, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::TooManyDecimals(decimals));
    }
    Ok(10f64.powi(decimals as i32))
}

/// Scales `human` by 10^`decimals`, rounding to the nearest chain unit.
pub fn to_chain_amount(human: f64, decimals: u8) -> Result<u64, AmountError> {
    if !human.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if human < 0.0 {
        return Err(AmountError::Negative(human));
    }
    let scaled = (human * scale(decimals)?).round();
    if scaled >= U64_LIMIT {
        return Err(AmountError::Overflow {
            value: human,
            decimals,
        });
    }
    Ok(scaled as u64)
}

/// Presentation value of a chain amount. Never send this back on chain.
pub fn to_human_amount(chain: u64, decimals: u8) -> f64 {
    chain as f64 / 10f64.powi(decimals.min(MAX_DECIMALS) as i32)
}

/// Codec bound to the decimals of one deployment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountCodec {
    pub decimals: u8,
}

impl Default for AmountCodec {
    fn default() -> Self {
        AmountCodec {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl AmountCodec {
    pub fn new(decimals: u8) -> Result<Self, AmountError> {
        scale(decimals)?;
        Ok(AmountCodec { decimals })
    }

    pub fn to_chain(&self, human: f64) -> Result<u64, AmountError> {
        to_chain_amount(human, self.decimals)
    }

    pub fn to_human(&self, chain: u64) -> f64 {
        to_human_amount(chain, self.decimals)
    }

    /// Same as [`Self::to_human`] for fields the node may not have sent.
    pub fn to_human_opt(&self, chain: Option<u64>) -> Option<f64> {
        chain.map(|c| self.to_human(c))
    }
}
