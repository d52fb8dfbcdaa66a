//! Physical constants in CGS units unless noted.

use std::f64::consts::PI;

/// Speed of light [cm/s]
pub const C: f64 = 2.99792458e10;
/// Elementary charge [statC]
pub const ESU: f64 = 4.80320451e-10;
/// Electron mass [g]
pub const ME: f64 = 9.10938291e-28;
/// Atomic mass unit [g]
pub const AMU: f64 = 1.66053892e-24;
/// Electron rest energy [keV]
pub const MEC2_KEV: f64 = 510.998928;
/// Atomic mass unit rest energy [keV]
pub const AMUC2_KEV: f64 = 931494.061;
/// Boltzmann constant [erg/K]
pub const KB: f64 = 1.3806488e-16;
/// Planck constant [erg s]
pub const H: f64 = 6.62606957e-27;
/// Reduced Planck constant [erg s]
pub const HBAR: f64 = 1.054571726e-27;
/// Avogadro's number [1/mol]
pub const NA: f64 = 6.02214129e23;
/// keV -> K
pub const KEV_TO_K: f64 = 1.1604505e7;
/// keV -> erg
pub const KEV_TO_ERG: f64 = 1.602176565e-9;
/// eV -> erg
pub const EV_TO_ERG: f64 = 1.602176565e-12;
/// erg -> MeV
pub const ERG_TO_MEV: f64 = 624150.934;
/// Electron mass in amu
pub const ME_AMU: f64 = ME / AMU;

/// MeV/cm -> MeV/um
pub const PER_CM_TO_PER_UM: f64 = 1e-4;

/// Non-relativistic velocity [cm/s] of a particle with kinetic energy `e_mev`
/// and mass `m_amu`.
pub fn velocity(e_mev: f64, m_amu: f64) -> f64 {
    C * (2e3 * e_mev / (m_amu * AMUC2_KEV)).sqrt()
}

/// Relativistic (beta, gamma) of a particle with kinetic energy `e_mev` and
/// mass `m_amu`.
pub fn beta_gamma(e_mev: f64, m_amu: f64) -> (f64, f64) {
    let gamma = 1.0 + 1e3 * e_mev / (m_amu * AMUC2_KEV);
    let beta = (1.0 - 1.0 / (gamma * gamma)).sqrt();
    (beta, gamma)
}

/// Thermal velocity sqrt(k T / m) scaled by `factor`, i.e. sqrt(factor k T / m).
pub fn thermal_velocity(t_kev: f64, m_amu: f64, factor: f64) -> f64 {
    C * (factor * t_kev / (m_amu * AMUC2_KEV)).sqrt()
}

/// Plasma frequency squared [1/s^2] of a species.
pub fn plasma_frequency_sq(n: f64, z: f64, m_amu: f64) -> f64 {
    4.0 * PI * n * (z * ESU).powi(2) / (m_amu * AMU)
}
