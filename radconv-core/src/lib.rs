//! Core state and physics for single-column radiative-convective models.
//!
//! - `atmosphere` / `surface`: column state mutated by the components
//! - `constants`, `physics`: thermodynamic constants and conversions
//! - `lapse_rate`: critical lapse rates for convective adjustment
//! - `variable_store`, `standard_variables`: named diagnostic outputs

pub mod atmosphere;
pub mod constants;
pub mod errors;
pub mod interpolate;
pub mod lapse_rate;
pub mod physics;
pub mod standard_variables;
pub mod surface;
pub mod variable_store;

/// Floating point type used for all physical quantities.
pub type FloatValue = f64;
