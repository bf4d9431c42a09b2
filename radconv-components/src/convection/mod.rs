//! Convection schemes.
//!
//! A scheme takes the column after the radiative update and removes its
//! convective instability against a critical lapse rate, adjusting the
//! surface temperature so that the atmosphere and the surface together
//! conserve energy. Schemes differ only in how they build candidate profiles
//! (see [`adjustment::ProfileBuilder`]); the energy-conserving search is
//! shared.

pub mod adjustment;
pub mod diagnostics;
pub mod energy;
mod hard;
mod relaxed;

pub use adjustment::{AdjustmentOutcome, ConvectiveColumn, ProfileBuilder};
pub use diagnostics::ConvectiveTop;
pub use hard::{HardAdjustment, InstantaneousProfile};
pub use relaxed::{RelaxedAdjustment, RelaxedProfile};

use adjustment::convective_adjustment;
use diagnostics::calculate_convective_top;
use log::debug;
use ndarray::Array1;
use radconv_core::atmosphere::Atmosphere;
use radconv_core::errors::{RadConvError, RadConvResult};
use radconv_core::surface::Surface;
use radconv_core::variable_store::VariableStore;
use radconv_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A convection scheme operating on one column.
#[typetag::serde(tag = "type")]
pub trait Convection: Debug + Send + Sync {
    /// Stabilize the column in place.
    ///
    /// `lapse` is the critical lapse rate on the full levels [K/km] and
    /// `timestep` the model timestep [day]. The surface temperature is
    /// updated unless the surface has a fixed temperature.
    fn stabilize(
        &mut self,
        atmosphere: &mut Atmosphere,
        lapse: &Array1<FloatValue>,
        surface: &mut Surface,
        timestep: FloatValue,
    ) -> RadConvResult<AdjustmentOutcome>;

    /// Height of the convective top [m] given the full-level heights `z`,
    /// based on the heating rate of the last [`Convection::stabilize`].
    fn calculate_convective_top_height(
        &mut self,
        z: &Array1<FloatValue>,
    ) -> RadConvResult<FloatValue>;

    /// Diagnostics published by the last call.
    fn variables(&self) -> &VariableStore;
}

/// Scheme without convection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NonConvective {
    #[serde(skip)]
    variables: VariableStore,
}

#[typetag::serde]
impl Convection for NonConvective {
    fn stabilize(
        &mut self,
        _atmosphere: &mut Atmosphere,
        _lapse: &Array1<FloatValue>,
        _surface: &mut Surface,
        _timestep: FloatValue,
    ) -> RadConvResult<AdjustmentOutcome> {
        Ok(AdjustmentOutcome::Inactive)
    }

    fn calculate_convective_top_height(
        &mut self,
        _z: &Array1<FloatValue>,
    ) -> RadConvResult<FloatValue> {
        Ok(FloatValue::NAN)
    }

    fn variables(&self) -> &VariableStore {
        &self.variables
    }
}

/// Run the energy-conserving adjustment with `builder` and write the result
/// back into the column and the surface.
pub(crate) fn stabilize_column<B: ProfileBuilder + ?Sized>(
    builder: &B,
    variables: &mut VariableStore,
    heating_threshold: FloatValue,
    atmosphere: &mut Atmosphere,
    lapse: &Array1<FloatValue>,
    surface: &mut Surface,
    timestep: FloatValue,
) -> RadConvResult<AdjustmentOutcome> {
    if !(timestep > 0.0) {
        return Err(RadConvError::Error(format!(
            "Timestep must be positive, got {} day",
            timestep
        )));
    }

    let t_rad = atmosphere.temperature().clone();
    let adjustment = {
        let column = ConvectiveColumn::new(
            &t_rad,
            atmosphere.plev(),
            atmosphere.phlev(),
            lapse,
            surface,
            timestep,
        )?;
        convective_adjustment(builder, &column)?
    };

    let top = calculate_convective_top(
        variables,
        &t_rad,
        &adjustment.temperature,
        atmosphere.plev(),
        timestep,
        heating_threshold,
    )?;
    debug!(
        "Convection {:?}: surface {} K -> {} K, convective top at {} Pa",
        adjustment.outcome, surface.temperature, adjustment.surface_temperature, top.plev
    );

    atmosphere.set_temperature(adjustment.temperature)?;
    surface.temperature = adjustment.surface_temperature;

    Ok(adjustment.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use energy::energy_threshold;
    use ndarray::array;
    use radconv_core::standard_variables::{
        VAR_CONVECTIVE_HEATING_RATE, VAR_CONVECTIVE_TOP_INDEX, VAR_CONVECTIVE_TOP_PLEV,
    };

    fn three_level_column(temperature: Array1<FloatValue>) -> Atmosphere {
        Atmosphere::new(
            array![90000.0, 80000.0, 70000.0],
            array![95000.0, 85000.0, 75000.0, 65000.0],
            temperature,
            array![0.01, 0.005, 0.002],
        )
        .unwrap()
    }

    fn schemes() -> Vec<Box<dyn Convection>> {
        vec![
            Box::new(HardAdjustment::new()),
            Box::new(RelaxedAdjustment::new()),
        ]
    }

    #[test]
    fn test_fixed_surface_follows_adiabat() {
        let t_rad = array![290.0, 280.0, 270.0];
        let mut atmosphere = three_level_column(t_rad.clone());
        let mut surface = Surface::fixed_temperature(295.0);
        let lapse = Array1::from_elem(3, 6.5);

        let mut scheme = HardAdjustment::new();
        let outcome = scheme
            .stabilize(&mut atmosphere, &lapse, &mut surface, 1.0)
            .unwrap();

        assert_eq!(outcome, AdjustmentOutcome::FixedSurface);
        assert_eq!(surface.temperature, 295.0);

        let column = ConvectiveColumn::new(
            &t_rad,
            atmosphere.plev(),
            atmosphere.phlev(),
            &lapse,
            &surface,
            1.0,
        )
        .unwrap();
        let expected = column.adiabat(295.0);
        assert_eq!(atmosphere.temperature(), &expected);
        assert_relative_eq!(expected[0], 292.05, epsilon = 0.01);
        assert_eq!(column.energy_imbalance(atmosphere.temperature(), 295.0), 0.0);
    }

    #[test]
    fn test_stable_column_is_unchanged() {
        for mut scheme in schemes() {
            let t_rad = array![290.0, 285.0, 280.0];
            let mut atmosphere = three_level_column(t_rad.clone());
            let mut surface = Surface::heat_capacity_slab(280.0, 50.0);
            let lapse = Array1::from_elem(3, 6.5);

            for _ in 0..2 {
                let outcome = scheme
                    .stabilize(&mut atmosphere, &lapse, &mut surface, 1.0)
                    .unwrap();
                assert_eq!(outcome, AdjustmentOutcome::Stable);
                assert_eq!(atmosphere.temperature(), &t_rad);
                assert_eq!(surface.temperature, 280.0);
            }

            assert!(scheme
                .variables()
                .get_scalar(VAR_CONVECTIVE_TOP_PLEV)
                .unwrap()
                .is_nan());
        }
    }

    #[test]
    fn test_converged_adjustment_conserves_energy() {
        for mut scheme in schemes() {
            let t_rad = array![280.0, 276.0, 272.0];
            let mut atmosphere = three_level_column(t_rad.clone());
            let surface_before = Surface::heat_capacity_slab(290.0, 50.0);
            let mut surface = surface_before.clone();
            let lapse = Array1::from_elem(3, 6.5);

            let outcome = scheme
                .stabilize(&mut atmosphere, &lapse, &mut surface, 1.0)
                .unwrap();
            assert!(
                matches!(outcome, AdjustmentOutcome::Converged { .. }),
                "{:?}",
                outcome
            );

            // The surface pays for the atmospheric warming
            assert!(surface.temperature < 290.0);
            assert!(atmosphere.temperature()[0] > t_rad[0]);

            let column = ConvectiveColumn::new(
                &t_rad,
                atmosphere.plev(),
                atmosphere.phlev(),
                &lapse,
                &surface_before,
                1.0,
            )
            .unwrap();
            let residual = column.energy_imbalance(atmosphere.temperature(), surface.temperature);
            assert!(
                residual.abs() <= energy_threshold(&surface_before),
                "residual {} J/m^2",
                residual
            );

            let heating = scheme
                .variables()
                .get(VAR_CONVECTIVE_HEATING_RATE)
                .unwrap();
            assert_eq!(heating.len(), 3);
            assert!(scheme
                .variables()
                .get_scalar(VAR_CONVECTIVE_TOP_INDEX)
                .is_some());
        }
    }

    #[test]
    fn test_relaxed_limits_through_stabilize() {
        let t_rad = array![280.0, 276.0, 272.0];
        let lapse = Array1::from_elem(3, 6.5);

        // An infinitely slow scheme never changes anything
        let mut slow = RelaxedAdjustment::with_tau(vec![FloatValue::INFINITY; 3]);
        let mut atmosphere = three_level_column(t_rad.clone());
        let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
        let outcome = slow
            .stabilize(&mut atmosphere, &lapse, &mut surface, 1.0)
            .unwrap();
        assert_eq!(outcome, AdjustmentOutcome::Stable);
        assert_eq!(atmosphere.temperature(), &t_rad);
        assert_eq!(surface.temperature, 290.0);

        // An instantaneous one ends on the adiabat of the new surface temperature
        let mut fast = RelaxedAdjustment::with_tau(vec![1e-12; 3]);
        let mut atmosphere = three_level_column(t_rad.clone());
        let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
        fast.stabilize(&mut atmosphere, &lapse, &mut surface, 1.0)
            .unwrap();

        let column = ConvectiveColumn::new(
            &t_rad,
            atmosphere.plev(),
            atmosphere.phlev(),
            &lapse,
            &surface,
            1.0,
        )
        .unwrap();
        let expected = column.adiabat(surface.temperature);
        for (actual, expected) in atmosphere.temperature().iter().zip(expected.iter()) {
            assert_relative_eq!(*actual, *expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_non_convective_is_inactive() {
        let t_rad = array![280.0, 276.0, 272.0];
        let mut atmosphere = three_level_column(t_rad.clone());
        let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
        let mut scheme: Box<dyn Convection> = Box::new(NonConvective::default());

        let outcome = scheme
            .stabilize(&mut atmosphere, &array![6.5, 6.5, 6.5], &mut surface, 1.0)
            .unwrap();
        assert_eq!(outcome, AdjustmentOutcome::Inactive);
        assert_eq!(atmosphere.temperature(), &t_rad);
        assert!(scheme
            .calculate_convective_top_height(&array![0.0, 1.0, 2.0])
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_rejects_non_positive_timestep() {
        let mut atmosphere = three_level_column(array![280.0, 276.0, 272.0]);
        let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
        let result = HardAdjustment::new().stabilize(
            &mut atmosphere,
            &array![6.5, 6.5, 6.5],
            &mut surface,
            0.0,
        );
        assert!(matches!(result, Err(RadConvError::Error(_))));
    }

    #[test]
    fn test_convective_top_height_after_stabilize() {
        let mut atmosphere = three_level_column(array![280.0, 276.0, 272.0]);
        let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
        let mut scheme = HardAdjustment::new();
        scheme
            .stabilize(&mut atmosphere, &array![6.5, 6.5, 6.5], &mut surface, 1.0)
            .unwrap();

        let z = atmosphere.height();
        let height = scheme.calculate_convective_top_height(&z).unwrap();
        assert!(height >= z[0] && height <= z[2], "height {} m", height);
    }
}
