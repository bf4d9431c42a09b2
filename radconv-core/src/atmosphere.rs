//! Column atmosphere state.
//!
//! An [`Atmosphere`] holds one column on a fixed pressure grid: full levels
//! `plev` (n) bracketed by half levels `phlev` (n + 1), both decreasing with
//! height, together with the temperature and water vapour profiles that the
//! convection and humidity components update in place.

use crate::constants::{EARTH_STANDARD_GRAVITY, GAS_CONSTANT_DRY_AIR};
use crate::errors::{ensure_levels, RadConvError, RadConvResult};
use crate::FloatValue;
use ndarray::{Array1, ArrayViewMut1};
use serde::{Deserialize, Serialize};

/// Levels above this pressure [Pa] are ignored when searching the cold point.
///
/// Keeps the upper stratosphere, which warms with height, from being mistaken
/// for the tropopause region.
pub const COLD_POINT_MIN_PRESSURE: FloatValue = 1e3;

/// Single-column atmosphere on a time-invariant pressure grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    plev: Array1<FloatValue>,
    phlev: Array1<FloatValue>,
    temperature: Array1<FloatValue>,
    h2o: Array1<FloatValue>,
}

/// Check the ordering `phlev[0] > plev[0] > phlev[1] > ... > plev[n-1] > phlev[n]`.
pub fn validate_grid(plev: &Array1<FloatValue>, phlev: &Array1<FloatValue>) -> RadConvResult<()> {
    let n = plev.len();
    if n == 0 {
        return Err(RadConvError::InvalidGrid(
            "at least one full level is required".to_string(),
        ));
    }
    ensure_levels("half levels", n + 1, phlev.len())?;

    if plev.iter().any(|&p| !(p > 0.0)) {
        return Err(RadConvError::InvalidGrid(
            "full-level pressures must be positive".to_string(),
        ));
    }
    for i in 0..n {
        if !(phlev[i] > plev[i] && plev[i] > phlev[i + 1]) {
            return Err(RadConvError::InvalidGrid(format!(
                "level {} at {} Pa is not bracketed by half levels {} Pa and {} Pa",
                i,
                plev[i],
                phlev[i],
                phlev[i + 1]
            )));
        }
    }
    Ok(())
}

impl Atmosphere {
    /// Create a column from a full set of profiles.
    ///
    /// # Errors
    /// Fails if the grid violates the ordering invariant or any profile does
    /// not have one value per full level.
    pub fn new(
        plev: Array1<FloatValue>,
        phlev: Array1<FloatValue>,
        temperature: Array1<FloatValue>,
        h2o: Array1<FloatValue>,
    ) -> RadConvResult<Self> {
        validate_grid(&plev, &phlev)?;
        ensure_levels("temperature", plev.len(), temperature.len())?;
        ensure_levels("H2O", plev.len(), h2o.len())?;

        Ok(Self {
            plev,
            phlev,
            temperature,
            h2o,
        })
    }

    /// Create a column from half levels only.
    ///
    /// Full levels are placed at the log-pressure midpoint of each layer, so
    /// all half levels must be strictly positive.
    pub fn from_half_levels(
        phlev: Array1<FloatValue>,
        temperature: Array1<FloatValue>,
        h2o: Array1<FloatValue>,
    ) -> RadConvResult<Self> {
        if phlev.iter().any(|&p| !(p > 0.0)) {
            return Err(RadConvError::InvalidGrid(
                "half-level pressures must be positive to derive full levels".to_string(),
            ));
        }
        let plev = Array1::from_iter(
            phlev
                .windows(2)
                .into_iter()
                .map(|w| (0.5 * (w[0].ln() + w[1].ln())).exp()),
        );
        Self::new(plev, phlev, temperature, h2o)
    }

    /// Number of full levels.
    pub fn n_levels(&self) -> usize {
        self.plev.len()
    }

    /// Full-level pressures [Pa].
    pub fn plev(&self) -> &Array1<FloatValue> {
        &self.plev
    }

    /// Half-level pressures [Pa].
    pub fn phlev(&self) -> &Array1<FloatValue> {
        &self.phlev
    }

    /// Temperature profile [K].
    pub fn temperature(&self) -> &Array1<FloatValue> {
        &self.temperature
    }

    /// Water vapour volume mixing ratio profile.
    pub fn h2o(&self) -> &Array1<FloatValue> {
        &self.h2o
    }

    /// Mutable view of the temperature profile. The number of levels is fixed.
    pub fn temperature_mut(&mut self) -> ArrayViewMut1<'_, FloatValue> {
        self.temperature.view_mut()
    }

    /// Mutable view of the water vapour profile. The number of levels is fixed.
    pub fn h2o_mut(&mut self) -> ArrayViewMut1<'_, FloatValue> {
        self.h2o.view_mut()
    }

    /// Replace the temperature profile.
    pub fn set_temperature(&mut self, temperature: Array1<FloatValue>) -> RadConvResult<()> {
        ensure_levels("temperature", self.n_levels(), temperature.len())?;
        self.temperature = temperature;
        Ok(())
    }

    /// Replace the water vapour profile.
    pub fn set_h2o(&mut self, h2o: Array1<FloatValue>) -> RadConvResult<()> {
        ensure_levels("H2O", self.n_levels(), h2o.len())?;
        self.h2o = h2o;
        Ok(())
    }

    /// Index of the coldest level at pressures of at least [`COLD_POINT_MIN_PRESSURE`].
    ///
    /// Falls back to the whole column if no level is that deep.
    pub fn cold_point_index(&self) -> usize {
        let n = self.n_levels();
        self.coldest_of((0..n).filter(|&i| self.plev[i] >= COLD_POINT_MIN_PRESSURE))
            .or_else(|| self.coldest_of(0..n))
            .unwrap_or(0)
    }

    fn coldest_of(&self, levels: impl Iterator<Item = usize>) -> Option<usize> {
        levels.fold(None, |best, i| match best {
            Some(b) if self.temperature[b] <= self.temperature[i] => Some(b),
            _ => Some(i),
        })
    }

    /// Geopotential height of the full levels above the surface [m].
    ///
    /// Integrates the dry hypsometric equation upwards from the lowest half
    /// level, using the mean temperature of adjacent levels for each layer.
    pub fn height(&self) -> Array1<FloatValue> {
        let scale = GAS_CONSTANT_DRY_AIR / EARTH_STANDARD_GRAVITY;
        let mut z = Array1::zeros(self.n_levels());

        z[0] = scale * self.temperature[0] * (self.phlev[0] / self.plev[0]).ln();
        for i in 1..self.n_levels() {
            let t_mean = 0.5 * (self.temperature[i - 1] + self.temperature[i]);
            z[i] = z[i - 1] + scale * t_mean * (self.plev[i - 1] / self.plev[i]).ln();
        }
        z
    }
}
