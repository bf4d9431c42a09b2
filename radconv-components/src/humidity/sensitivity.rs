//! Relative-humidity response to surface warming.

use ndarray::Array1;
use radconv_core::atmosphere::Atmosphere;
use radconv_core::interpolate::linear;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Per-level change in relative humidity for a given surface temperature change.
#[typetag::serde(tag = "type")]
pub trait RhSensitivity: Debug + Send + Sync {
    fn rh_change(
        &self,
        atmosphere: &Atmosphere,
        temperature_change: FloatValue,
    ) -> Array1<FloatValue>;
}

/// The same change per kelvin at every level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformSensitivity {
    /// Relative-humidity change per kelvin [1/K].
    /// Default: 0.0
    pub rate: FloatValue,
}

#[typetag::serde]
impl RhSensitivity for UniformSensitivity {
    fn rh_change(
        &self,
        atmosphere: &Atmosphere,
        temperature_change: FloatValue,
    ) -> Array1<FloatValue> {
        Array1::from_elem(atmosphere.n_levels(), self.rate * temperature_change)
    }
}

/// Change per kelvin varying linearly in pressure, from `surface_rate` at the
/// lowest level to `top_rate` at the highest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureSensitivity {
    /// Default: 0.0
    pub surface_rate: FloatValue,
    /// Default: 0.0
    pub top_rate: FloatValue,
}

#[typetag::serde]
impl RhSensitivity for PressureSensitivity {
    fn rh_change(
        &self,
        atmosphere: &Atmosphere,
        temperature_change: FloatValue,
    ) -> Array1<FloatValue> {
        let plev = atmosphere.plev();
        let p_bottom = plev[0];
        let p_top = plev[plev.len() - 1];
        plev.mapv(|p| {
            linear(p_bottom, p_top, self.surface_rate, self.top_rate, p) * temperature_change
        })
    }
}
