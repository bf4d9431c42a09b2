use super::adjustment::{AdjustmentOutcome, ConvectiveColumn, ProfileBuilder};
use super::diagnostics::{self, DEFAULT_HEATING_THRESHOLD};
use super::{stabilize_column, Convection};
use ndarray::{Array1, Zip};
use radconv_core::atmosphere::Atmosphere;
use radconv_core::errors::{ensure_levels, RadConvResult};
use radconv_core::surface::Surface;
use radconv_core::variable_store::VariableStore;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Relax every level towards the adiabat with its own timescale.
///
/// $$ T = T_{rad} (1 - f) + f \, T_{adiabat}, \quad f = 1 - e^{-\Delta t / \tau} $$
///
/// # Panics
/// Building a candidate panics if the column has a different number of
/// levels than the timescale profile.
#[derive(Debug, Clone)]
pub struct RelaxedProfile {
    /// Convective timescale per full level [day].
    tau: Array1<FloatValue>,
}

impl RelaxedProfile {
    /// Relaxation with timescale `tau` [day] on a column of `n_levels` full levels.
    pub fn new(tau: Array1<FloatValue>, n_levels: usize) -> RadConvResult<Self> {
        ensure_levels("convective timescale", n_levels, tau.len())?;
        Ok(Self { tau })
    }

    pub fn tau(&self) -> &Array1<FloatValue> {
        &self.tau
    }
}

impl ProfileBuilder for RelaxedProfile {
    fn candidate_profile(
        &self,
        column: &ConvectiveColumn<'_>,
        surface_temperature: FloatValue,
    ) -> Array1<FloatValue> {
        let adiabat = column.adiabat(surface_temperature);
        let timestep = column.timestep;

        Zip::from(column.t_rad)
            .and(&adiabat)
            .and(&self.tau)
            .map_collect(|&t_rad, &t_adiabat, &tau| {
                let tf = 1.0 - (-timestep / tau).exp();
                t_rad * (1.0 - tf) + tf * t_adiabat
            })
    }
}

/// Convective adjustment that relaxes towards the adiabat over a finite
/// timescale instead of removing the instability at once.
///
/// The timescale is either given per level or derived from the pressure as
/// `tau0 * exp(p0 / p)`, so convection acts slower with height.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxedAdjustment {
    /// Convective timescale per full level [day].
    /// Derived from `tau0` when not given.
    pub tau: Option<Vec<FloatValue>>,
    /// Timescale scale factor [day].
    /// Default: 1/24 (one hour)
    pub tau0: FloatValue,
    /// Convective heating rate that marks the convective top [K/day].
    /// Default: 0.2
    pub heating_threshold: FloatValue,
    #[serde(skip)]
    variables: VariableStore,
}

impl Default for RelaxedAdjustment {
    fn default() -> Self {
        Self {
            tau: None,
            tau0: 1.0 / 24.0,
            heating_threshold: DEFAULT_HEATING_THRESHOLD,
            variables: VariableStore::new(),
        }
    }
}

impl RelaxedAdjustment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a prescribed timescale profile [day].
    pub fn with_tau(tau: Vec<FloatValue>) -> Self {
        Self {
            tau: Some(tau),
            ..Self::default()
        }
    }

    /// Convective timescale on the full levels `p` [day].
    pub fn convective_tau(&self, p: &Array1<FloatValue>) -> RadConvResult<Array1<FloatValue>> {
        match &self.tau {
            Some(tau) => {
                ensure_levels("convective timescale", p.len(), tau.len())?;
                Ok(Array1::from(tau.clone()))
            }
            None => match p.first() {
                Some(&p0) => Ok(p.mapv(|p| self.tau0 * (p0 / p).exp())),
                None => Ok(Array1::zeros(0)),
            },
        }
    }
}

#[typetag::serde]
impl Convection for RelaxedAdjustment {
    fn stabilize(
        &mut self,
        atmosphere: &mut Atmosphere,
        lapse: &Array1<FloatValue>,
        surface: &mut Surface,
        timestep: FloatValue,
    ) -> RadConvResult<AdjustmentOutcome> {
        let builder = RelaxedProfile::new(
            self.convective_tau(atmosphere.plev())?,
            atmosphere.n_levels(),
        )?;
        stabilize_column(
            &builder,
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
