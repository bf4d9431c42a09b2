//! Energy-conserving convective adjustment.
//!
//! The adjustment searches for the surface temperature whose convective
//! profile leaves the combined atmosphere and surface energy unchanged. The
//! imbalance is positive when the surface keeps its current temperature (the
//! adjusted atmosphere has warmed) and negative when the surface is as cold
//! as the coldest radiative level, so the root is bracketed and refined with
//! the secant (regula falsi) update.

use super::energy::{energy_difference, energy_threshold};
use log::{debug, trace};
use ndarray::{s, Array1};
use radconv_core::constants::EARTH_STANDARD_GRAVITY;
use radconv_core::errors::{ensure_levels, RadConvError, RadConvResult};
use radconv_core::interpolate::interp_extrapolate_all;
use radconv_core::physics::density;
use radconv_core::surface::Surface;
use radconv_core::FloatValue;

/// Maximum number of secant refinements before giving up.
pub const MAX_ITERATIONS: usize = 100;

/// The radiative column being adjusted, with the quantities every test
/// profile shares precomputed.
#[derive(Debug, Clone)]
pub struct ConvectiveColumn<'a> {
    /// Radiative (pre-adjustment) temperature [K].
    pub t_rad: &'a Array1<FloatValue>,
    /// Full-level pressure [Pa].
    pub p: &'a Array1<FloatValue>,
    /// Half-level pressure [Pa].
    pub phlev: &'a Array1<FloatValue>,
    pub surface: &'a Surface,
    /// Model timestep [day].
    pub timestep: FloatValue,
    /// Lapse rate on the lower half level of each layer [K/Pa].
    lapse_pa: Array1<FloatValue>,
    /// Layer thicknesses `diff(phlev)` [Pa], negative.
    dp: Array1<FloatValue>,
    /// Pressure steps used to integrate the lapse rate upwards [Pa].
    dp_lapse: Array1<FloatValue>,
}

impl<'a> ConvectiveColumn<'a> {
    /// Prepare a column for adjustment.
    ///
    /// `lapse` is the critical lapse rate on the full levels [K/km]. It is
    /// converted to K/Pa with the air density, which is linearly
    /// interpolated (and extrapolated at the bottom) onto the half levels.
    pub fn new(
        t_rad: &'a Array1<FloatValue>,
        p: &'a Array1<FloatValue>,
        phlev: &'a Array1<FloatValue>,
        lapse: &Array1<FloatValue>,
        surface: &'a Surface,
        timestep: FloatValue,
    ) -> RadConvResult<Self> {
        let n = p.len();
        if n == 0 {
            return Err(RadConvError::InvalidGrid(
                "at least one full level is required".to_string(),
            ));
        }
        ensure_levels("half levels", n + 1, phlev.len())?;
        ensure_levels("lapse rate", n, lapse.len())?;

        let full_level_density = density(p, t_rad)?;
        let half_level_density = if n < 2 {
            full_level_density
        } else {
            interp_extrapolate_all(
                &p.to_vec(),
                &full_level_density.to_vec(),
                &phlev.slice(s![..n]).to_vec(),
            )?
        };

        let lapse_pa = lapse
            .iter()
            .zip(half_level_density.iter())
            .map(|(&gamma, &rho)| -(gamma / 1e3) / (EARTH_STANDARD_GRAVITY * rho))
            .collect::<Array1<_>>();

        let dp = &phlev.slice(s![1..]) - &phlev.slice(s![..n]);

        let mut dp_lapse = Array1::zeros(n);
        dp_lapse[0] = p[0] - phlev[0];
        for i in 1..n {
            dp_lapse[i] = p[i] - p[i - 1];
        }

        Ok(Self {
            t_rad,
            p,
            phlev,
            surface,
            timestep,
            lapse_pa,
            dp,
            dp_lapse,
        })
    }

    pub fn n_levels(&self) -> usize {
        self.p.len()
    }

    /// Temperature following the lapse rate all the way up from `surface_temperature`.
    pub fn adiabat(&self, surface_temperature: FloatValue) -> Array1<FloatValue> {
        let mut cooling = 0.0;
        self.dp_lapse
            .iter()
            .zip(self.lapse_pa.iter())
            .map(|(&dp, &lp)| {
                cooling += dp * lp;
                surface_temperature - cooling
            })
            .collect()
    }

    /// Energy added by `candidate` with surface temperature `surface_temperature`
    /// relative to the radiative state. Zero for a fixed-temperature surface.
    pub fn energy_imbalance(
        &self,
        candidate: &Array1<FloatValue>,
        surface_temperature: FloatValue,
    ) -> FloatValue {
        match self.surface.heat_capacity() {
            Some(heat_capacity) => energy_difference(
                candidate,
                self.t_rad,
                surface_temperature,
                self.surface.temperature,
                &self.dp,
                heat_capacity,
            ),
            None => 0.0,
        }
    }

    /// The coldest radiative temperature, a lower bound for the adjusted surface.
    fn coldest_temperature(&self) -> FloatValue {
        self.t_rad
            .iter()
            .copied()
            .fold(FloatValue::INFINITY, FloatValue::min)
    }
}

/// Builds candidate profiles for a trial surface temperature.
///
/// Each convection scheme supplies its own candidate rule; the root finder
/// in [`convective_adjustment`] is shared.
pub trait ProfileBuilder {
    /// Candidate temperature profile for the column when the surface has
    /// temperature `surface_temperature`.
    fn candidate_profile(
        &self,
        column: &ConvectiveColumn<'_>,
        surface_temperature: FloatValue,
    ) -> Array1<FloatValue>;

    /// Candidate profile together with its energy imbalance [J/m^2].
    fn test_profile(
        &self,
        column: &ConvectiveColumn<'_>,
        surface_temperature: FloatValue,
    ) -> (Array1<FloatValue>, FloatValue) {
        let candidate = self.candidate_profile(column, surface_temperature);
        let diff = column.energy_imbalance(&candidate, surface_temperature);
        (candidate, diff)
    }
}

/// Terminal state reached by one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    /// Convection is switched off.
    Inactive,
    /// The column is not convectively unstable; nothing changed.
    Stable,
    /// Adjusted against a fixed-temperature surface, energy is not conserved.
    FixedSurface,
    /// An energy-conserving profile was found after `iterations` refinements.
    Converged { iterations: usize },
}

/// Result of a convective adjustment.
#[derive(Debug, Clone)]
pub struct Adjustment {
    pub temperature: Array1<FloatValue>,
    pub surface_temperature: FloatValue,
    pub outcome: AdjustmentOutcome,
}

/// Secant estimate of the surface temperature with zero imbalance.
fn secant(
    t_neg: FloatValue,
    t_pos: FloatValue,
    diffneg: FloatValue,
    diffpos: FloatValue,
) -> FloatValue {
    t_neg + (t_pos - t_neg) * (-diffneg) / (-diffneg + diffpos)
}

/// Find the energy-conserving convective profile of `column`.
///
/// # Errors
/// Returns [`RadConvError::NoEnergyConservingProfile`] when the imbalance is
/// still above the threshold after [`MAX_ITERATIONS`] refinements.
pub fn convective_adjustment<B: ProfileBuilder + ?Sized>(
    builder: &B,
    column: &ConvectiveColumn<'_>,
) -> RadConvResult<Adjustment> {
    let near_zero = energy_threshold(column.surface);

    // Keeping the current surface temperature gives an upper bound: an
    // unstable column gains energy when it is adjusted.
    let mut t_pos = column.surface.temperature;
    let (t_con, mut diffpos) = builder.test_profile(column, t_pos);

    if column.surface.is_fixed_temperature() {
        return Ok(Adjustment {
            temperature: t_con,
            surface_temperature: t_pos,
            outcome: AdjustmentOutcome::FixedSurface,
        });
    }

    if diffpos < near_zero {
        return Ok(Adjustment {
            temperature: column.t_rad.clone(),
            surface_temperature: column.surface.temperature,
            outcome: AdjustmentOutcome::Stable,
        });
    }

    let mut t_neg = column.coldest_temperature();
    let (t_con, mut diffneg) = builder.test_profile(column, t_neg);

    if diffneg.abs() < near_zero {
        return Ok(Adjustment {
            temperature: t_con,
            surface_temperature: t_neg,
            outcome: AdjustmentOutcome::Converged { iterations: 0 },
        });
    }
    if diffneg > 0.0 {
        return Err(RadConvError::Error(format!(
            "Energy imbalance is positive ({} J/m^2) at the coldest radiative temperature {} K; \
             the surface temperature cannot be bracketed",
            diffneg, t_neg
        )));
    }

    debug!(
        "Bracketed surface temperature between {} K ({}) and {} K ({})",
        t_neg, diffneg, t_pos, diffpos
    );

    let mut surface_temperature = secant(t_neg, t_pos, diffneg, diffpos);
    let mut t_con = t_con;
    let mut iterations = 0;

    while diffpos >= near_zero && -diffneg >= near_zero {
        if iterations == MAX_ITERATIONS {
            return Err(RadConvError::NoEnergyConservingProfile { iterations });
        }

        surface_temperature = secant(t_neg, t_pos, diffneg, diffpos);
        let (candidate, diff) = builder.test_profile(column, surface_temperature);
        t_con = candidate;
        iterations += 1;

        trace!(
            "Iteration {}: surface temperature {} K, imbalance {} J/m^2",
            iterations, surface_temperature, diff
        );

        if diff > 0.0 {
            diffpos = diff;
            t_pos = surface_temperature;
        } else {
            diffneg = diff;
            t_neg = surface_temperature;
        }
    }

    debug!(
        "Energy-conserving surface temperature {} K after {} iterations",
        surface_temperature, iterations
    );

    Ok(Adjustment {
        temperature: t_con,
        surface_temperature,
        outcome: AdjustmentOutcome::Converged { iterations },
    })
}
