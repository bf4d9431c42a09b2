//! Surface state coupled to the bottom of the column.

use crate::constants::{DENSITY_SEA_WATER, SPECIFIC_HEAT_CAPACITY_SEA_WATER};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// How the surface temperature responds to energy exchange with the atmosphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SurfaceModel {
    /// Prescribed temperature; never changed by convection.
    FixedTemperature,
    /// Well-mixed slab of sea water with the given depth [m].
    HeatCapacity {
        #[serde(default = "default_depth")]
        depth: FloatValue,
    },
}

fn default_depth() -> FloatValue {
    50.0
}

impl Default for SurfaceModel {
    fn default() -> Self {
        SurfaceModel::HeatCapacity {
            depth: default_depth(),
        }
    }
}

/// Surface temperature plus the model that defines its heat capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Surface temperature [K].
    pub temperature: FloatValue,
    #[serde(default)]
    pub model: SurfaceModel,
}

impl Surface {
    pub fn fixed_temperature(temperature: FloatValue) -> Self {
        Self {
            temperature,
            model: SurfaceModel::FixedTemperature,
        }
    }

    pub fn heat_capacity_slab(temperature: FloatValue, depth: FloatValue) -> Self {
        Self {
            temperature,
            model: SurfaceModel::HeatCapacity { depth },
        }
    }

    /// Effective heat capacity per unit area [J/m^2/K].
    ///
    /// `None` for a fixed-temperature surface, which has no finite heat capacity.
    pub fn heat_capacity(&self) -> Option<FloatValue> {
        match self.model {
            SurfaceModel::FixedTemperature => None,
            SurfaceModel::HeatCapacity { depth } => {
                Some(DENSITY_SEA_WATER * SPECIFIC_HEAT_CAPACITY_SEA_WATER * depth)
            }
        }
    }

    pub fn is_fixed_temperature(&self) -> bool {
        matches!(self.model, SurfaceModel::FixedTemperature)
    }
}
