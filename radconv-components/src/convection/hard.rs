use super::adjustment::{AdjustmentOutcome, ConvectiveColumn, ProfileBuilder};
use super::diagnostics::{self, DEFAULT_HEATING_THRESHOLD};
use super::{stabilize_column, Convection};
use ndarray::{s, Array1};
use radconv_core::atmosphere::Atmosphere;
use radconv_core::errors::RadConvResult;
use radconv_core::surface::Surface;
use radconv_core::variable_store::VariableStore;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Replace the unstable part of the column by the adiabat.
///
/// Every level up to the highest one where the adiabat is warmer than the
/// radiative profile takes the adiabat; the levels above keep the radiative
/// temperature. A column where the adiabat is nowhere warmer is returned
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantaneousProfile;

impl ProfileBuilder for InstantaneousProfile {
    fn candidate_profile(
        &self,
        column: &ConvectiveColumn<'_>,
        surface_temperature: FloatValue,
    ) -> Array1<FloatValue> {
        let adiabat = column.adiabat(surface_temperature);

        let contop = adiabat
            .iter()
            .zip(column.t_rad.iter())
            .rposition(|(&adiabatic, &radiative)| adiabatic > radiative);

        match contop {
            Some(contop) => {
                let mut candidate = column.t_rad.clone();
                candidate
                    .slice_mut(s![..=contop])
                    .assign(&adiabat.slice(s![..=contop]));
                candidate
            }
            None => column.t_rad.clone(),
        }
    }
}

/// Instantaneous convective adjustment.
///
/// The unstable part of the column is mixed to the critical lapse rate within
/// a single timestep, with the surface temperature chosen so that the column
/// plus the surface conserve energy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardAdjustment {
    /// Convective heating rate that marks the convective top [K/day].
    /// Default: 0.2
    pub heating_threshold: FloatValue,
    #[serde(skip)]
    variables: VariableStore,
}

impl Default for HardAdjustment {
    fn default() -> Self {
        Self {
            heating_threshold: DEFAULT_HEATING_THRESHOLD,
            variables: VariableStore::new(),
        }
    }
}

impl HardAdjustment {
    pub fn new() -> Self {
        Self::default()
    }
}

#[typetag::serde]
impl Convection for HardAdjustment {
    fn stabilize(
        &mut self,
        atmosphere: &mut Atmosphere,
        lapse: &Array1<FloatValue>,
        surface: &mut Surface,
        timestep: FloatValue,
    ) -> RadConvResult<AdjustmentOutcome> {
        stabilize_column(
            &InstantaneousProfile,
            &mut self.variables,
            self.heating_threshold,
            atmosphere,
            lapse,
            surface,
            timestep,
        )
    }

    fn calculate_convective_top_height(
        &mut self,
        z: &Array1<FloatValue>,
    ) -> RadConvResult<FloatValue> {
        diagnostics::calculate_convective_top_height(&mut self.variables, z, self.heating_threshold)
    }

    fn variables(&self) -> &VariableStore {
        &self.variables
    }
}
