//! Vertical relative-humidity distributions.

use ndarray::Array1;
use radconv_core::atmosphere::Atmosphere;
use radconv_core::surface::Surface;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Fraction of the surface pressure at which the Manabe profile reaches zero.
const MANABE_PRESSURE_OFFSET: FloatValue = 0.02;

/// Relative humidity on the full levels of a column.
#[typetag::serde(tag = "type")]
pub trait RelativeHumidityModel: Debug + Send + Sync {
    fn relative_humidity(&self, atmosphere: &Atmosphere, surface: &Surface) -> Array1<FloatValue>;
}

/// The same relative humidity at every level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticallyUniform {
    /// Default: 0.8
    pub rh_surface: FloatValue,
}

impl Default for VerticallyUniform {
    fn default() -> Self {
        Self { rh_surface: 0.8 }
    }
}

#[typetag::serde]
impl RelativeHumidityModel for VerticallyUniform {
    fn relative_humidity(&self, atmosphere: &Atmosphere, _surface: &Surface) -> Array1<FloatValue> {
        Array1::from_elem(atmosphere.n_levels(), self.rh_surface)
    }
}

/// Normalised pressure shape shared by [`Manabe67`] and [`Cess76`].
///
/// One at the lowest level, falling linearly in pressure to zero at 2 % of
/// the lowest-level pressure; clipped at zero above.
fn manabe_shape(atmosphere: &Atmosphere) -> Array1<FloatValue> {
    let plev = atmosphere.plev();
    let p_s = plev[0];
    plev.mapv(|p| ((p / p_s - MANABE_PRESSURE_OFFSET) / (1.0 - MANABE_PRESSURE_OFFSET)).max(0.0))
}

/// Relative humidity decreasing linearly with pressure (Manabe & Wetherald, 1967).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manabe67 {
    /// Default: 0.77
    pub rh_surface: FloatValue,
}

impl Default for Manabe67 {
    fn default() -> Self {
        Self { rh_surface: 0.77 }
    }
}

#[typetag::serde]
impl RelativeHumidityModel for Manabe67 {
    fn relative_humidity(&self, atmosphere: &Atmosphere, _surface: &Surface) -> Array1<FloatValue> {
        manabe_shape(atmosphere) * self.rh_surface
    }
}

/// Manabe profile whose curvature depends on the surface temperature (Cess, 1976).
///
/// The shape is raised to the power `1 - 0.03 (T_s - T_ref)`, so a warmer
/// surface moistens the free troposphere. The exponent is clamped at zero
/// (reached about 33 K above `T_ref`), where the profile becomes uniform below
/// the zero crossing of the shape. Levels above the crossing stay dry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cess76 {
    /// Default: 0.8
    pub rh_surface: FloatValue,
    /// Reference surface temperature [K].
    /// Default: 288.0
    pub reference_temperature: FloatValue,
}

impl Default for Cess76 {
    fn default() -> Self {
        Self {
            rh_surface: 0.8,
            reference_temperature: 288.0,
        }
    }
}

impl Cess76 {
    /// Exponent applied to the Manabe shape, never negative.
    pub fn omega(&self, surface_temperature: FloatValue) -> FloatValue {
        (1.0 - 0.03 * (surface_temperature - self.reference_temperature)).max(0.0)
    }
}

#[typetag::serde]
impl RelativeHumidityModel for Cess76 {
    fn relative_humidity(&self, atmosphere: &Atmosphere, surface: &Surface) -> Array1<FloatValue> {
        let omega = self.omega(surface.temperature);
        manabe_shape(atmosphere).mapv(|shape| {
            if shape > 0.0 {
                self.rh_surface * shape.powf(omega)
            } else {
                0.0
            }
        })
    }
}
