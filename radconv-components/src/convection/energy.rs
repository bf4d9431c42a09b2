use ndarray::{Array1, Zip};
use radconv_core::constants::{EARTH_STANDARD_GRAVITY, ISOBARIC_MASS_HEAT_CAPACITY};
use radconv_core::surface::Surface;
use radconv_core::FloatValue;

/// Tolerance used when the surface has no finite heat capacity.
pub const FIXED_SURFACE_ENERGY_THRESHOLD: FloatValue = 1e-8;

/// Energy difference between two column states (2 - 1) [J/m^2].
///
/// $$ \Delta E = -\sum_i \frac{C_p}{g} (T_{2,i} - T_{1,i}) \Delta p_i + C_s (T_{s,2} - T_{s,1}) $$
///
/// `dp` are the layer thicknesses `diff(phlev)`, which are negative because
/// pressure decreases with height, so warming the atmosphere adds energy.
///
/// # Panics
/// Panics if the profiles and `dp` differ in length.
pub fn energy_difference(
    t_2: &Array1<FloatValue>,
    t_1: &Array1<FloatValue>,
    sst_2: FloatValue,
    sst_1: FloatValue,
    dp: &Array1<FloatValue>,
    eff_cp_s: FloatValue,
) -> FloatValue {
    let cp_over_g = ISOBARIC_MASS_HEAT_CAPACITY / EARTH_STANDARD_GRAVITY;

    let atmosphere = Zip::from(t_2)
        .and(t_1)
        .and(dp)
        .fold(0.0, |acc, &t2, &t1, &dp| acc + cp_over_g * (t2 - t1) * dp);

    -atmosphere + eff_cp_s * (sst_2 - sst_1)
}

/// How close a test profile must come to energy conservation.
///
/// Scaled with the surface heat capacity so that very thick surfaces, whose
/// energy changes are large, can still reach the target.
pub fn energy_threshold(surface: &Surface) -> FloatValue {
    match surface.heat_capacity() {
        Some(heat_capacity) => heat_capacity / 1e13,
        None => FIXED_SURFACE_ENERGY_THRESHOLD,
    }
}
