//! Post-radiation adjustment of a single column.
//!
//! A [`Column`] couples an [`Atmosphere`] and a [`Surface`] with the
//! components configured in a [`ColumnConfig`]. Each call to
//! [`Column::adjust`] runs, in order:
//! 1. the lapse-rate model on the current state
//! 2. the convection scheme
//! 3. the humidity policy

use log::debug;
use radconv_components::convection::{AdjustmentOutcome, Convection, HardAdjustment};
use radconv_components::humidity::{FixedRH, HumidityPolicy};
use radconv_core::atmosphere::Atmosphere;
use radconv_core::errors::{RadConvError, RadConvResult};
use radconv_core::lapse_rate::{LapseRate, MoistLapseRate};
use radconv_core::surface::Surface;
use radconv_core::variable_store::VariableStore;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};

fn default_timestep() -> FloatValue {
    0.25
}

fn default_convection() -> Box<dyn Convection> {
    Box::new(HardAdjustment::default())
}

fn default_humidity() -> Box<dyn HumidityPolicy> {
    Box::new(FixedRH::default())
}

fn default_lapse_rate() -> Box<dyn LapseRate> {
    Box::new(MoistLapseRate::default())
}

/// Components and surface of one column.
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Model timestep [day].
    /// Default: 0.25
    #[serde(default = "default_timestep")]
    pub timestep: FloatValue,
    #[serde(default = "default_convection")]
    pub convection: Box<dyn Convection>,
    #[serde(default = "default_humidity")]
    pub humidity: Box<dyn HumidityPolicy>,
    #[serde(default = "default_lapse_rate")]
    pub lapse_rate: Box<dyn LapseRate>,
    pub surface: Surface,
}

impl ColumnConfig {
    /// Default components above the given surface.
    pub fn new(surface: Surface) -> Self {
        Self {
            timestep: default_timestep(),
            convection: default_convection(),
            humidity: default_humidity(),
            lapse_rate: default_lapse_rate(),
            surface,
        }
    }

    pub fn from_toml(content: &str) -> RadConvResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| RadConvError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> RadConvResult<String> {
        toml::to_string(self).map_err(|e| RadConvError::Config(e.to_string()))
    }

    fn validate(&self) -> RadConvResult<()> {
        if !(self.timestep > 0.0) {
            return Err(RadConvError::Config(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        Ok(())
    }
}

/// One column together with the components that adjust it.
#[derive(Debug)]
pub struct Column {
    pub atmosphere: Atmosphere,
    pub surface: Surface,
    timestep: FloatValue,
    convection: Box<dyn Convection>,
    humidity: Box<dyn HumidityPolicy>,
    lapse_rate: Box<dyn LapseRate>,
    /// Surface temperature the humidity perturbations are measured from [K].
    reference_surface_temperature: FloatValue,
}

impl Column {
    pub fn new(config: ColumnConfig, atmosphere: Atmosphere) -> RadConvResult<Self> {
        config.validate()?;
        Ok(Self {
            reference_surface_temperature: config.surface.temperature,
            atmosphere,
            surface: config.surface,
            timestep: config.timestep,
            convection: config.convection,
            humidity: config.humidity,
            lapse_rate: config.lapse_rate,
        })
    }

    pub fn timestep(&self) -> FloatValue {
        self.timestep
    }

    /// Surface warming since the column was set up [K].
    pub fn surface_warming(&self) -> FloatValue {
        self.surface.temperature - self.reference_surface_temperature
    }

    /// Stabilize the column and update its water vapour.
    pub fn adjust(&mut self) -> RadConvResult<AdjustmentOutcome> {
        let lapse = self.lapse_rate.lapse_rate(&self.atmosphere);

        let outcome = self.convection.stabilize(
            &mut self.atmosphere,
            &lapse,
            &mut self.surface,
            self.timestep,
        )?;

        let warming = self.surface_warming();
        self.humidity
            .adjust_humidity(&mut self.atmosphere, &self.surface, warming)?;

        debug!(
            "Column adjusted ({:?}), surface at {} K ({:+} K)",
            outcome, self.surface.temperature, warming
        );
        Ok(outcome)
    }

    /// Height of the convective top of the last adjustment [m].
    pub fn convective_top_height(&mut self) -> RadConvResult<FloatValue> {
        let z = self.atmosphere.height();
        self.convection.calculate_convective_top_height(&z)
    }

    /// Diagnostics published by the convection scheme.
    pub fn convection_variables(&self) -> &VariableStore {
        self.convection.variables()
    }
}
