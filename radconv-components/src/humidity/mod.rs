//! Humidity policies.
//!
//! After every convective/radiative step a policy rebuilds the water vapour
//! profile of the column. Policies are composed from a relative-humidity
//! shape ([`RelativeHumidityModel`]) and a [`StratosphereCoupling`] that runs
//! after every update.

mod relative_humidity;
mod sensitivity;
mod stratosphere;

pub use relative_humidity::{Cess76, Manabe67, RelativeHumidityModel, VerticallyUniform};
pub use sensitivity::{PressureSensitivity, RhSensitivity, UniformSensitivity};
pub use stratosphere::{ColdPointCoupling, FixedStratosphericH2O, StratosphereCoupling};

use log::{debug, warn};
use ndarray::Array1;
use radconv_core::atmosphere::Atmosphere;
use radconv_core::errors::RadConvResult;
use radconv_core::physics::{integrate_vmr, relative_humidity2vmr};
use radconv_core::surface::Surface;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Updates the water vapour of a column.
#[typetag::serde(tag = "type")]
pub trait HumidityPolicy: Debug + Send + Sync {
    /// Rebuild the water vapour profile in place.
    ///
    /// `temperature_change` is the surface warming [K] the policy responds
    /// to, measured from the reference climate of the column.
    fn adjust_humidity(
        &mut self,
        atmosphere: &mut Atmosphere,
        surface: &Surface,
        temperature_change: FloatValue,
    ) -> RadConvResult<()>;
}

fn default_rh_model() -> Box<dyn RelativeHumidityModel> {
    Box::new(VerticallyUniform::default())
}

fn default_stratosphere_coupling() -> Box<dyn StratosphereCoupling> {
    Box::new(ColdPointCoupling::default())
}

fn default_sensitivity() -> Box<dyn RhSensitivity> {
    Box::new(UniformSensitivity::default())
}

/// Write the water vapour implied by `relative_humidity` at the current temperature.
fn set_relative_humidity(
    atmosphere: &mut Atmosphere,
    relative_humidity: &Array1<FloatValue>,
) -> RadConvResult<()> {
    let vmr = relative_humidity2vmr(
        relative_humidity,
        atmosphere.plev(),
        atmosphere.temperature(),
    )?;
    atmosphere.set_h2o(vmr)
}

/// Scale the water vapour so that its column integral matches `target`.
///
/// Without a target the current integral is recorded as the target and the
/// profile is left unchanged.
fn rescale_to_target(
    target: &mut Option<FloatValue>,
    atmosphere: &mut Atmosphere,
) -> RadConvResult<()> {
    let current = integrate_vmr(atmosphere.h2o(), atmosphere.plev())?;

    let iwv = match *target {
        Some(iwv) => iwv,
        None => {
            warn!(
                "No integrated water vapour target given; keeping the current {} kg/m^2",
                current
            );
            *target = Some(current);
            return Ok(());
        }
    };

    if !(current > 0.0) {
        warn!("Column holds no water vapour; cannot rescale to {} kg/m^2", iwv);
        return Ok(());
    }

    debug!("Rescaling water vapour from {} to {} kg/m^2", current, iwv);
    atmosphere.h2o_mut().mapv_inplace(|vmr| vmr * iwv / current);
    Ok(())
}

/// Keep the relative humidity profile fixed while the temperature changes.
#[derive(Debug, Serialize, Deserialize)]
pub struct FixedRH {
    #[serde(default = "default_rh_model")]
    pub rh_model: Box<dyn RelativeHumidityModel>,
    #[serde(default = "default_stratosphere_coupling")]
    pub stratosphere_coupling: Box<dyn StratosphereCoupling>,
}

impl Default for FixedRH {
    fn default() -> Self {
        Self {
            rh_model: default_rh_model(),
            stratosphere_coupling: default_stratosphere_coupling(),
        }
    }
}

impl FixedRH {
    pub fn new(
        rh_model: Box<dyn RelativeHumidityModel>,
        stratosphere_coupling: Box<dyn StratosphereCoupling>,
    ) -> Self {
        Self {
            rh_model,
            stratosphere_coupling,
        }
    }
}

#[typetag::serde]
impl HumidityPolicy for FixedRH {
    fn adjust_humidity(
        &mut self,
        atmosphere: &mut Atmosphere,
        surface: &Surface,
        _temperature_change: FloatValue,
    ) -> RadConvResult<()> {
        let rh = self.rh_model.relative_humidity(atmosphere, surface);
        set_relative_humidity(atmosphere, &rh)?;
        self.stratosphere_coupling.adjust_stratospheric_vmr(atmosphere);
        Ok(())
    }
}

/// Keep the column-integrated water vapour fixed.
///
/// The profile follows the relative-humidity shape and is then scaled to the
/// target integral. Without a target, the first update records the integral
/// it produces.
#[derive(Debug, Serialize, Deserialize)]
pub struct FixedIWV {
    #[serde(default = "default_rh_model")]
    pub rh_model: Box<dyn RelativeHumidityModel>,
    #[serde(default = "default_stratosphere_coupling")]
    pub stratosphere_coupling: Box<dyn StratosphereCoupling>,
    /// Target integrated water vapour [kg/m^2].
    #[serde(default)]
    pub iwv: Option<FloatValue>,
}

impl Default for FixedIWV {
    fn default() -> Self {
        Self {
            rh_model: default_rh_model(),
            stratosphere_coupling: default_stratosphere_coupling(),
            iwv: None,
        }
    }
}

impl FixedIWV {
    pub fn with_target(iwv: FloatValue) -> Self {
        Self {
            iwv: Some(iwv),
            ..Self::default()
        }
    }

    /// Scale the water vapour of `atmosphere` to the target integral.
    pub fn rescale_iwv(&mut self, atmosphere: &mut Atmosphere) -> RadConvResult<()> {
        rescale_to_target(&mut self.iwv, atmosphere)
    }
}

#[typetag::serde]
impl HumidityPolicy for FixedIWV {
    fn adjust_humidity(
        &mut self,
        atmosphere: &mut Atmosphere,
        surface: &Surface,
        _temperature_change: FloatValue,
    ) -> RadConvResult<()> {
        let rh = self.rh_model.relative_humidity(atmosphere, surface);
        set_relative_humidity(atmosphere, &rh)?;
        self.stratosphere_coupling.adjust_stratospheric_vmr(atmosphere);
        self.rescale_iwv(atmosphere)
    }
}

/// Relative humidity perturbed linearly with the surface temperature change,
/// at a fixed integrated water vapour.
///
/// The [`RhSensitivity`] decides how the perturbation varies with height.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeRH {
    #[serde(default = "default_rh_model")]
    pub rh_model: Box<dyn RelativeHumidityModel>,
    #[serde(default = "default_stratosphere_coupling")]
    pub stratosphere_coupling: Box<dyn StratosphereCoupling>,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: Box<dyn RhSensitivity>,
    /// Target integrated water vapour [kg/m^2].
    #[serde(default)]
    pub iwv: Option<FloatValue>,
}

impl Default for ChangeRH {
    fn default() -> Self {
        Self {
            rh_model: default_rh_model(),
            stratosphere_coupling: default_stratosphere_coupling(),
            sensitivity: default_sensitivity(),
            iwv: None,
        }
    }
}

impl ChangeRH {
    /// Same relative-humidity change per kelvin at every level.
    pub fn with_temperature(rate: FloatValue) -> Self {
        Self {
            sensitivity: Box::new(UniformSensitivity { rate }),
            ..Self::default()
        }
    }

    /// Relative-humidity change per kelvin varying linearly in pressure
    /// between the lowest and highest level.
    pub fn with_pressure(surface_rate: FloatValue, top_rate: FloatValue) -> Self {
        Self {
            sensitivity: Box::new(PressureSensitivity {
                surface_rate,
                top_rate,
            }),
            ..Self::default()
        }
    }
}

#[typetag::serde]
impl HumidityPolicy for ChangeRH {
    fn adjust_humidity(
        &mut self,
        atmosphere: &mut Atmosphere,
        surface: &Surface,
        temperature_change: FloatValue,
    ) -> RadConvResult<()> {
        let rh = self.rh_model.relative_humidity(atmosphere, surface)
            + self.sensitivity.rh_change(atmosphere, temperature_change);
        set_relative_humidity(atmosphere, &rh)?;
        self.stratosphere_coupling.adjust_stratospheric_vmr(atmosphere);
        rescale_to_target(&mut self.iwv, atmosphere)
    }
}

/// Leave the water vapour untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedVMR {}

#[typetag::serde]
impl HumidityPolicy for FixedVMR {
    fn adjust_humidity(
        &mut self,
        _atmosphere: &mut Atmosphere,
        _surface: &Surface,
        _temperature_change: FloatValue,
    ) -> RadConvResult<()> {
        Ok(())
    }
}
