//! Convective adjustment and humidity maintenance for single-column
//! radiative-convective equilibrium models.
//!
//! The physics lives in two workspace crates:
//! - `radconv-core`: column state, physical constants and conversions,
//!   lapse-rate models and error types
//! - `radconv-components`: convection schemes and humidity policies
//!
//! This crate wires them together into the adjustment stage that follows the
//! radiative update of a column, configured from TOML.

pub mod column;

pub use column::{Column, ColumnConfig};
