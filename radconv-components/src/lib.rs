//! Convection and humidity components for single-column radiative-convective
//! equilibrium models.
//!
//! # Module Organisation
//!
//! - `convection`: energy-conserving convective adjustment (instantaneous and
//!   relaxed) and convective-top diagnostics
//! - `humidity`: water vapour policies built from relative-humidity shapes and
//!   stratosphere couplings

pub mod convection;
pub mod humidity;
