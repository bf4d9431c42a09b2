//! Names of the diagnostics published into component variable stores.
//!
//! Scalar diagnostics are stored as one-element arrays.

/// Convective heating rate per full level [K/day].
pub const VAR_CONVECTIVE_HEATING_RATE: &str = "convective_heating_rate";

/// Pressure at the convective top [Pa].
pub const VAR_CONVECTIVE_TOP_PLEV: &str = "convective_top_plev";

/// Temperature at the convective top [K].
pub const VAR_CONVECTIVE_TOP_TEMPERATURE: &str = "convective_top_temperature";

/// Fractional full-level index of the convective top.
pub const VAR_CONVECTIVE_TOP_INDEX: &str = "convective_top_index";

/// Height of the convective top [m].
pub const VAR_CONVECTIVE_TOP_HEIGHT: &str = "convective_top_height";

