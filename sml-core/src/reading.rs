//! Flat meter reading record

use serde::{Deserialize, Serialize};

/// Values extracted from one SML package
///
/// Every field is independently optional: a quantity the meter did not
/// transmit stays `None`. Energies are in kWh, power in W.
///
/// Numeric values are the transmitted integer divided by the field's
/// divisor in `f64`. Both operands are exact, so each value is the `f64`
/// nearest to the decimal quotient (`12345678 / 10000` gives the same
/// value as the literal `1234.5678`), not an exact decimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Manufacturer identifier, rendered as uppercase hex of the raw element
    pub manufacturer_id: Option<String>,
    /// Device (server) identifier, rendered as uppercase hex of the raw element
    pub device_id: Option<String>,
    pub consumption_energy_total: Option<f64>,
    pub consumption_energy_tariff1: Option<f64>,
    pub consumption_energy_tariff2: Option<f64>,
    pub feed_energy_total: Option<f64>,
    pub feed_energy_tariff1: Option<f64>,
    pub feed_energy_tariff2: Option<f64>,
    /// Instantaneous effective power
    pub power: Option<f64>,
}

impl Reading {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field was found in the package
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
