//! Physical constants shared by the convection and humidity components.
//!
//! Values follow the conventions used by common radiative-convective
//! equilibrium codes so that results are comparable.

use crate::FloatValue;

// -- Thermodynamics of air --

/// Isobaric mass heat capacity of dry air [J/kg/K].
pub const ISOBARIC_MASS_HEAT_CAPACITY: FloatValue = 1003.5;

/// Standard gravitational acceleration [m/s^2].
pub const EARTH_STANDARD_GRAVITY: FloatValue = 9.80665;

/// Specific gas constant of dry air [J/kg/K].
pub const GAS_CONSTANT_DRY_AIR: FloatValue = 287.0570048852906;

/// Specific gas constant of water vapour [J/kg/K].
pub const GAS_CONSTANT_WATER_VAPOR: FloatValue = 461.52280831710604;

/// Ratio of the molar masses of water and dry air.
pub const MOLAR_MASS_RATIO: FloatValue = GAS_CONSTANT_DRY_AIR / GAS_CONSTANT_WATER_VAPOR;

/// Latent heat of vaporisation at 0 °C [J/kg].
pub const HEAT_OF_VAPORIZATION: FloatValue = 2.501e6;

// -- Phase boundaries for the mixed-phase saturation pressure --

/// Triple point of water [K].
pub const TRIPLE_POINT_WATER: FloatValue = 273.16;

/// Temperature below which only ice is assumed [K].
pub const ICE_ONLY_TEMPERATURE: FloatValue = 250.16;

// -- Sea water (slab surfaces) --

/// Density of sea water [kg/m^3].
pub const DENSITY_SEA_WATER: FloatValue = 1025.0;

/// Specific heat capacity of sea water [J/kg/K].
pub const SPECIFIC_HEAT_CAPACITY_SEA_WATER: FloatValue = 4185.0;
