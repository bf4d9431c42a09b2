//! Thermodynamic conversions used by the convection and humidity components.
//!
//! Saturation pressures follow Murphy & Koop (2005), with a quadratic blend
//! between the ice and liquid formulations in the mixed-phase range.

use crate::constants::{
    EARTH_STANDARD_GRAVITY, GAS_CONSTANT_DRY_AIR, HEAT_OF_VAPORIZATION, ICE_ONLY_TEMPERATURE,
    ISOBARIC_MASS_HEAT_CAPACITY, MOLAR_MASS_RATIO, TRIPLE_POINT_WATER,
};
use crate::errors::{ensure_levels, RadConvResult};
use crate::FloatValue;
use ndarray::{Array1, Zip};

/// Density of dry air from the ideal gas law [kg/m^3].
pub fn density(
    p: &Array1<FloatValue>,
    t: &Array1<FloatValue>,
) -> RadConvResult<Array1<FloatValue>> {
    ensure_levels("temperature", p.len(), t.len())?;
    Ok(Zip::from(p)
        .and(t)
        .map_collect(|&p, &t| p / (GAS_CONSTANT_DRY_AIR * t)))
}

/// Equilibrium water vapour pressure over liquid water [Pa].
pub fn e_eq_water_mk(t: FloatValue) -> FloatValue {
    (54.842763 - 6763.22 / t - 4.210 * t.ln() + 0.000367 * t
        + (0.0415 * (t - 218.8)).tanh() * (53.878 - 1331.22 / t - 9.44523 * t.ln() + 0.014025 * t))
        .exp()
}

/// Equilibrium water vapour pressure over ice [Pa].
pub fn e_eq_ice_mk(t: FloatValue) -> FloatValue {
    (9.550426 - 5723.265 / t + 3.53068 * t.ln() - 0.00728332 * t).exp()
}

/// Equilibrium water vapour pressure of a mixed-phase cloud [Pa].
///
/// Pure ice below 250.16 K, pure liquid above the triple point and a
/// quadratic weighting in between.
pub fn e_eq_mixed_mk(t: FloatValue) -> FloatValue {
    if t <= ICE_ONLY_TEMPERATURE {
        e_eq_ice_mk(t)
    } else if t >= TRIPLE_POINT_WATER {
        e_eq_water_mk(t)
    } else {
        let alpha =
            ((t - ICE_ONLY_TEMPERATURE) / (TRIPLE_POINT_WATER - ICE_ONLY_TEMPERATURE)).powi(2);
        alpha * e_eq_water_mk(t) + (1.0 - alpha) * e_eq_ice_mk(t)
    }
}

/// Convert relative humidity into water vapour volume mixing ratio.
pub fn relative_humidity2vmr(
    relative_humidity: &Array1<FloatValue>,
    pressure: &Array1<FloatValue>,
    temperature: &Array1<FloatValue>,
) -> RadConvResult<Array1<FloatValue>> {
    ensure_levels("relative humidity", pressure.len(), relative_humidity.len())?;
    ensure_levels("temperature", pressure.len(), temperature.len())?;
    Ok(Zip::from(relative_humidity)
        .and(pressure)
        .and(temperature)
        .map_collect(|&rh, &p, &t| rh * e_eq_mixed_mk(t) / p))
}

/// Convert water vapour volume mixing ratio into relative humidity.
pub fn vmr2relative_humidity(
    vmr: &Array1<FloatValue>,
    pressure: &Array1<FloatValue>,
    temperature: &Array1<FloatValue>,
) -> RadConvResult<Array1<FloatValue>> {
    ensure_levels("water vapour", pressure.len(), vmr.len())?;
    ensure_levels("temperature", pressure.len(), temperature.len())?;
    Ok(Zip::from(vmr)
        .and(pressure)
        .and(temperature)
        .map_collect(|&x, &p, &t| x * p / e_eq_mixed_mk(t)))
}

/// Convert water vapour volume mixing ratio into specific humidity [kg/kg].
pub fn vmr2specific_humidity(vmr: FloatValue) -> FloatValue {
    let mixing_ratio = MOLAR_MASS_RATIO * vmr;
    mixing_ratio / (1.0 + mixing_ratio)
}

/// Column-integrated water vapour [kg/m^2].
///
/// Specific humidity is integrated over pressure with the trapezoidal rule
/// and divided by the gravitational acceleration. The sign is independent of
/// the ordering of `pressure`.
pub fn integrate_vmr(
    vmr: &Array1<FloatValue>,
    pressure: &Array1<FloatValue>,
) -> RadConvResult<FloatValue> {
    ensure_levels("water vapour", pressure.len(), vmr.len())?;
    let q = vmr.mapv(vmr2specific_humidity);
    let integral: FloatValue = (1..q.len())
        .map(|i| 0.5 * (q[i] + q[i - 1]) * (pressure[i - 1] - pressure[i]).abs())
        .sum();
    Ok(integral / EARTH_STANDARD_GRAVITY)
}

/// Saturated (moist) adiabatic lapse rate [K/km].
pub fn moist_lapse_rate(p: FloatValue, t: FloatValue) -> FloatValue {
    let e_s = e_eq_mixed_mk(t);
    let r_s = MOLAR_MASS_RATIO * e_s / (p - e_s);
    let lv = HEAT_OF_VAPORIZATION;
    let rd = GAS_CONSTANT_DRY_AIR;

    let gamma = EARTH_STANDARD_GRAVITY * (1.0 + lv * r_s / (rd * t))
        / (ISOBARIC_MASS_HEAT_CAPACITY + lv.powi(2) * r_s * MOLAR_MASS_RATIO / (rd * t.powi(2)));

    gamma * 1e3
}
