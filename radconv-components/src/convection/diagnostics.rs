//! Convective-top diagnostics.
//!
//! The convective top is where the convective heating rate falls through a
//! threshold. Pressure, temperature, level index and height at that point are
//! found by linear interpolation in the heating rate.

use ndarray::Array1;
use radconv_core::errors::{ensure_levels, RadConvError, RadConvResult};
use radconv_core::interpolate::linear;
use radconv_core::standard_variables::{
    VAR_CONVECTIVE_HEATING_RATE, VAR_CONVECTIVE_TOP_HEIGHT, VAR_CONVECTIVE_TOP_INDEX,
    VAR_CONVECTIVE_TOP_PLEV, VAR_CONVECTIVE_TOP_TEMPERATURE,
};
use radconv_core::variable_store::VariableStore;
use radconv_core::FloatValue;

/// Default heating rate that marks the convective top [K/day].
pub const DEFAULT_HEATING_THRESHOLD: FloatValue = 0.2;

/// Location of the convective top. All fields are NaN when no level is
/// heated above the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvectiveTop {
    /// Pressure [Pa].
    pub plev: FloatValue,
    /// Temperature [K].
    pub temperature: FloatValue,
    /// Fractional full-level index.
    pub index: FloatValue,
}

impl ConvectiveTop {
    pub fn undefined() -> Self {
        Self {
            plev: FloatValue::NAN,
            temperature: FloatValue::NAN,
            index: FloatValue::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.plev.is_nan()
    }
}

/// Value of `variable` where `convective_heating` equals `lim`.
///
/// The bracket runs from the level below the first level where the heating
/// stops exceeding `lim` (searching upwards from the first level that exceeds
/// it) to that level. If the heating never falls back below `lim`, the
/// crossing where it first rises above `lim` is used instead, and if the whole
/// column exceeds `lim` the value at the top level is returned. NaN when no
/// level exceeds `lim`.
pub fn interp_variable(
    variable: &Array1<FloatValue>,
    convective_heating: &Array1<FloatValue>,
    lim: FloatValue,
) -> RadConvResult<FloatValue> {
    ensure_levels("interpolated variable", convective_heating.len(), variable.len())?;

    let n = convective_heating.len();
    let Some(positive_i) = convective_heating.iter().position(|&h| h > lim) else {
        return Ok(FloatValue::NAN);
    };
    let contop_index = (positive_i..n)
        .find(|&i| convective_heating[i] < lim)
        .unwrap_or(positive_i);

    if contop_index == 0 {
        return Ok(variable[n - 1]);
    }

    Ok(linear(
        convective_heating[contop_index - 1],
        convective_heating[contop_index],
        variable[contop_index - 1],
        variable[contop_index],
        lim,
    ))
}

/// Diagnose the convective top from the radiative and adjusted profiles.
///
/// Publishes the heating rate and the convective-top pressure, temperature
/// and index into `variables`.
pub fn calculate_convective_top(
    variables: &mut VariableStore,
    t_rad: &Array1<FloatValue>,
    t_con: &Array1<FloatValue>,
    p: &Array1<FloatValue>,
    timestep: FloatValue,
    lim: FloatValue,
) -> RadConvResult<ConvectiveTop> {
    ensure_levels("convective temperature", t_rad.len(), t_con.len())?;
    ensure_levels("pressure", t_rad.len(), p.len())?;

    let convective_heating = (t_con - t_rad) / timestep;

    let top = if convective_heating.iter().any(|&h| h > lim) {
        let levels = Array1::range(0.0, p.len() as FloatValue, 1.0);
        ConvectiveTop {
            plev: interp_variable(p, &convective_heating, lim)?,
            temperature: interp_variable(t_con, &convective_heating, lim)?,
            index: interp_variable(&levels, &convective_heating, lim)?,
        }
    } else {
        ConvectiveTop::undefined()
    };

    variables.create_variable(VAR_CONVECTIVE_HEATING_RATE, convective_heating);
    variables.create_scalar(VAR_CONVECTIVE_TOP_PLEV, top.plev);
    variables.create_scalar(VAR_CONVECTIVE_TOP_TEMPERATURE, top.temperature);
    variables.create_scalar(VAR_CONVECTIVE_TOP_INDEX, top.index);

    Ok(top)
}

/// Height of the convective top [m], using the heating rate stored by the
/// last [`calculate_convective_top`].
pub fn calculate_convective_top_height(
    variables: &mut VariableStore,
    z: &Array1<FloatValue>,
    lim: FloatValue,
) -> RadConvResult<FloatValue> {
    let convective_heating = variables.get(VAR_CONVECTIVE_HEATING_RATE).ok_or_else(|| {
        RadConvError::Error(
            "No convective heating rate available; stabilize the column first".to_string(),
        )
    })?;

    let contop_z = if convective_heating.iter().any(|&h| h > lim) {
        interp_variable(z, convective_heating, lim)?
    } else {
        FloatValue::NAN
    };

    variables.create_scalar(VAR_CONVECTIVE_TOP_HEIGHT, contop_z);
    Ok(contop_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_interp_rising_crossing() {
        let heating = array![-1.0, -1.0, 1.0, 1.0];
        let index = array![0.0, 1.0, 2.0, 3.0];
        assert_relative_eq!(interp_variable(&index, &heating, 0.0).unwrap(), 1.5);
    }

    #[test]
    fn test_interp_falling_crossing() {
        // Heated near the surface, cooling off aloft
        let heating = array![2.0, 1.0, 0.6, 0.0, 0.0];
        let p = array![95000.0, 85000.0, 75000.0, 65000.0, 55000.0];
        // Between 75000 (0.6) and 65000 (0.0) at 0.2
        let expected = 75000.0 + (0.2 - 0.6) * (65000.0 - 75000.0) / (0.0 - 0.6);
        assert_relative_eq!(interp_variable(&p, &heating, 0.2).unwrap(), expected);
    }

    #[test]
    fn test_interp_threshold_on_a_level() {
        let heating = array![1.0, 0.2, 0.0];
        let t = array![290.0, 280.0, 270.0];
        // Heating at level 1 equals the threshold exactly
        assert_relative_eq!(interp_variable(&t, &heating, 0.2).unwrap(), 280.0);
    }

    #[test]
    fn test_interp_whole_column_heated() {
        let heating = array![1.0, 1.0, 1.0];
        let t = array![290.0, 280.0, 270.0];
        assert_eq!(interp_variable(&t, &heating, 0.2).unwrap(), 270.0);
    }

    #[test]
    fn test_interp_no_heating_is_nan() {
        let heating = array![0.0, 0.1, 0.0];
        let t = array![290.0, 280.0, 270.0];
        assert!(interp_variable(&t, &heating, 0.2).unwrap().is_nan());
    }

    #[test]
    fn test_interp_length_mismatch() {
        assert!(interp_variable(&array![1.0], &array![1.0, 0.0], 0.2).is_err());
    }

    #[test]
    fn test_convective_top_published() {
        let mut variables = VariableStore::new();
        let p = array![95000.0, 85000.0, 75000.0, 65000.0];
        let t_rad = array![290.0, 282.0, 274.0, 266.0];
        let t_con = array![291.0, 282.5, 274.1, 266.0];

        let top = calculate_convective_top(&mut variables, &t_rad, &t_con, &p, 0.5, 0.2).unwrap();
        assert!(top.is_defined());

        // Heating [2.0, 1.0, 0.2, 0.0]: crossing at level 2 exactly
        let heating = variables.get(VAR_CONVECTIVE_HEATING_RATE).unwrap();
        assert_relative_eq!(heating[0], 2.0, max_relative = 1e-9);
        assert_relative_eq!(top.index, 2.0, epsilon = 1e-6);
        assert_relative_eq!(top.plev, 75000.0, epsilon = 1e-1);
        assert_relative_eq!(top.temperature, 274.1, epsilon = 1e-6);

        assert_eq!(variables.get_scalar(VAR_CONVECTIVE_TOP_INDEX), Some(top.index));
        assert_eq!(variables.get_scalar(VAR_CONVECTIVE_TOP_PLEV), Some(top.plev));
    }

    #[test]
    fn test_convective_top_undefined_without_heating() {
        let mut variables = VariableStore::new();
        let p = array![95000.0, 85000.0];
        let t = array![290.0, 280.0];

        let top = calculate_convective_top(&mut variables, &t, &t, &p, 1.0, 0.2).unwrap();
        assert!(!top.is_defined());
        assert!(top.temperature.is_nan() && top.index.is_nan());
        assert!(variables.get_scalar(VAR_CONVECTIVE_TOP_TEMPERATURE).unwrap().is_nan());
    }

    #[test]
    fn test_convective_top_height() {
        let mut variables = VariableStore::new();
        assert!(calculate_convective_top_height(&mut variables, &array![0.0], 0.2).is_err());

        variables.create_variable(VAR_CONVECTIVE_HEATING_RATE, array![1.0, 0.6, -0.2]);
        let z = array![500.0, 1500.0, 2500.0];
        let height = calculate_convective_top_height(&mut variables, &z, 0.2).unwrap();
        assert_relative_eq!(height, 2000.0);
        assert_eq!(variables.get_scalar(VAR_CONVECTIVE_TOP_HEIGHT), Some(height));
    }
}
