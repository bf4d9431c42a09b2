//! Lapse-rate models that feed the convective adjustment.
//!
//! Lapse rates are returned per full level in K/km, positive when the
//! temperature decreases with height.

use crate::atmosphere::Atmosphere;
use crate::physics::moist_lapse_rate;
use crate::FloatValue;
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Source of the critical lapse rate used for convective adjustment.
#[typetag::serde(tag = "type")]
pub trait LapseRate: Debug + Send + Sync {
    /// Critical lapse rate on the full levels of `atmosphere` [K/km].
    fn lapse_rate(&self, atmosphere: &Atmosphere) -> Array1<FloatValue>;
}

/// Uniform lapse rate at every level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedLapseRate {
    /// Lapse rate [K/km].
    /// Default: 6.5
    pub lapserate: FloatValue,
}

impl Default for FixedLapseRate {
    fn default() -> Self {
        Self { lapserate: 6.5 }
    }
}

#[typetag::serde]
impl LapseRate for FixedLapseRate {
    fn lapse_rate(&self, atmosphere: &Atmosphere) -> Array1<FloatValue> {
        Array1::from_elem(atmosphere.n_levels(), self.lapserate)
    }
}

/// Saturated adiabatic lapse rate diagnosed from the current column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoistLapseRate {}

#[typetag::serde]
impl LapseRate for MoistLapseRate {
    fn lapse_rate(&self, atmosphere: &Atmosphere) -> Array1<FloatValue> {
        Zip::from(atmosphere.plev())
            .and(atmosphere.temperature())
            .map_collect(|&p, &t| moist_lapse_rate(p, t))
    }
}
