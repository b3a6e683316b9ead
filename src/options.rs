use crate::error::{Error, Result};
use crate::hash::HashMethod;

/// Default weight of the cubic size-balancing term used by PickSplit.
pub const DEFAULT_BALANCE_FACTOR: f64 = 1e-4;

/// Index-wide configuration shared by leaf construction, the node algebra and
/// query evaluation. Leaves and queries must agree on the hash method, otherwise
/// verdicts are meaningless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GistOptions {
    hash_method: HashMethod,
    balance_factor: f64,
}

impl GistOptions {
    pub fn new(hash_method: HashMethod, balance_factor: f64) -> Result<Self> {
        validate_balance_factor(balance_factor)?;
        Ok(Self {
            hash_method,
            balance_factor,
        })
    }

    pub fn with_hash_method(mut self, hash_method: HashMethod) -> Self {
        self.hash_method = hash_method;
        self
    }

    pub fn with_balance_factor(mut self, balance_factor: f64) -> Result<Self> {
        validate_balance_factor(balance_factor)?;
        self.balance_factor = balance_factor;
        Ok(self)
    }

    pub fn hash_method(&self) -> HashMethod {
        self.hash_method
    }

    pub fn balance_factor(&self) -> f64 {
        self.balance_factor
    }
}

impl Default for GistOptions {
    fn default() -> Self {
        Self {
            hash_method: HashMethod::default(),
            balance_factor: DEFAULT_BALANCE_FACTOR,
        }
    }
}

fn validate_balance_factor(balance_factor: f64) -> Result<()> {
    if !balance_factor.is_finite() || balance_factor < 0.0 {
        return Err(Error::InvalidBalanceFactor(balance_factor));
    }
    Ok(())
}
