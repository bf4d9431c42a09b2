//! Conservation tests for the convection and humidity components.
//!
//! These tests drive a ten-level column through several warming steps and
//! verify that:
//! - every convective adjustment conserves the column plus surface energy
//! - a fixed integrated water vapour survives repeated humidity updates

use approx::assert_relative_eq;
use is_close::is_close;
use ndarray::Array1;
use radconv_components::convection::energy::energy_threshold;
use radconv_components::convection::{
    AdjustmentOutcome, Convection, ConvectiveColumn, HardAdjustment, RelaxedAdjustment,
};
use radconv_components::humidity::{FixedIWV, HumidityPolicy};
use radconv_core::atmosphere::Atmosphere;
use radconv_core::physics::integrate_vmr;
use radconv_core::surface::Surface;
use radconv_core::FloatValue;

const TIMESTEP: FloatValue = 0.5;

fn ten_level_column() -> Atmosphere {
    let phlev = Array1::from_iter((0..11).map(|i| 100000.0 - 9000.0 * i as FloatValue));
    let plev = Array1::from_iter((0..10).map(|i| (phlev[i] + phlev[i + 1]) / 2.0));
    let temperature = Array1::from(vec![
        288.0, 282.0, 275.0, 268.0, 260.0, 251.0, 241.0, 230.0, 218.0, 205.0,
    ]);
    let h2o = Array1::from_elem(10, 1e-3);
    Atmosphere::new(plev, phlev, temperature, h2o).unwrap()
}

/// Warm the surface and the lowest level, as a radiative step would.
fn radiative_warming(atmosphere: &mut Atmosphere, surface: &mut Surface) {
    atmosphere.temperature_mut()[0] += 0.5;
    surface.temperature += 1.0;
}

fn run_energy_budget(mut scheme: Box<dyn Convection>) {
    let mut atmosphere = ten_level_column();
    let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
    let lapse = Array1::from_elem(10, 6.5);

    for step in 0..5 {
        radiative_warming(&mut atmosphere, &mut surface);
        let t_rad = atmosphere.temperature().clone();
        let surface_rad = surface.clone();

        let outcome = scheme
            .stabilize(&mut atmosphere, &lapse, &mut surface, TIMESTEP)
            .unwrap();
        assert!(
            matches!(outcome, AdjustmentOutcome::Converged { .. }),
            "step {}: {:?}",
            step, outcome
        );

        let column = ConvectiveColumn::new(
            &t_rad,
            atmosphere.plev(),
            atmosphere.phlev(),
            &lapse,
            &surface_rad,
            TIMESTEP,
        )
        .unwrap();
        let residual = column.energy_imbalance(atmosphere.temperature(), surface.temperature);
        assert!(
            residual.abs() <= energy_threshold(&surface_rad),
            "step {}: residual {} J/m^2",
            step, residual
        );

        // Convection moves energy from the surface into the atmosphere
        assert!(surface.temperature < surface_rad.temperature);
    }
}

#[test]
fn test_hard_adjustment_conserves_energy() {
    run_energy_budget(Box::new(HardAdjustment::new()));
}

#[test]
fn test_relaxed_adjustment_conserves_energy() {
    run_energy_budget(Box::new(RelaxedAdjustment::new()));
}

#[test]
fn test_fixed_surface_keeps_its_temperature() {
    let mut atmosphere = ten_level_column();
    let mut surface = Surface::fixed_temperature(300.0);
    let lapse = Array1::from_elem(10, 6.5);

    let mut scheme = HardAdjustment::new();
    for _ in 0..3 {
        let outcome = scheme
            .stabilize(&mut atmosphere, &lapse, &mut surface, TIMESTEP)
            .unwrap();
        assert_eq!(outcome, AdjustmentOutcome::FixedSurface);
        assert!(is_close!(surface.temperature, 300.0));
    }
}

#[test]
fn test_integrated_water_vapour_is_conserved() {
    let mut atmosphere = ten_level_column();
    let mut surface = Surface::heat_capacity_slab(290.0, 50.0);
    let lapse = Array1::from_elem(10, 6.5);

    let mut convection = HardAdjustment::new();
    let mut humidity = FixedIWV::with_target(25.0);

    for _ in 0..5 {
        radiative_warming(&mut atmosphere, &mut surface);
        let surface_before = surface.temperature;
        convection
            .stabilize(&mut atmosphere, &lapse, &mut surface, TIMESTEP)
            .unwrap();
        humidity
            .adjust_humidity(&mut atmosphere, &surface, surface.temperature - surface_before)
            .unwrap();

        let iwv = integrate_vmr(atmosphere.h2o(), atmosphere.plev()).unwrap();
        assert_relative_eq!(iwv, 25.0, max_relative = 1e-12);
    }
}
