//! Treatment of water vapour above the cold point.

use ndarray::s;
use radconv_core::atmosphere::Atmosphere;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Sets the stratospheric water vapour after the tropospheric profile is updated.
#[typetag::serde(tag = "type")]
pub trait StratosphereCoupling: Debug + Send + Sync {
    fn adjust_stratospheric_vmr(&self, atmosphere: &mut Atmosphere);
}

/// Hold the volume mixing ratio above the cold point at its cold-point value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColdPointCoupling {}

#[typetag::serde]
impl StratosphereCoupling for ColdPointCoupling {
    fn adjust_stratospheric_vmr(&self, atmosphere: &mut Atmosphere) {
        let cold_point = atmosphere.cold_point_index();
        let vmr = atmosphere.h2o()[cold_point];
        atmosphere.h2o_mut().slice_mut(s![cold_point..]).fill(vmr);
    }
}

/// Prescribe the volume mixing ratio from the cold point upwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedStratosphericH2O {
    /// Default: 5e-6
    pub stratospheric_vmr: FloatValue,
}

impl Default for FixedStratosphericH2O {
    fn default() -> Self {
        Self {
            stratospheric_vmr: 5e-6,
        }
    }
}

#[typetag::serde]
impl StratosphereCoupling for FixedStratosphericH2O {
    fn adjust_stratospheric_vmr(&self, atmosphere: &mut Atmosphere) {
        let cold_point = atmosphere.cold_point_index();
        atmosphere
            .h2o_mut()
            .slice_mut(s![cold_point..])
            .fill(self.stratospheric_vmr);
    }
}
