//! Plasma field descriptions shared by the plasma stopping-power models.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{AMU, ESU, KEV_TO_ERG, ME_AMU};
use crate::error::{Error, Result};

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Check a projectile's mass (amu) and charge.
pub(crate) fn check_projectile(mt: f64, zt: f64) -> Result<()> {
    if positive(mt) && positive(zt) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "projectile needs positive mass and charge, got m={} Z={}",
            mt, zt
        )))
    }
}

/// One fully ionized field species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// amu
    pub mass: f64,
    /// units of e, fractional values allowed
    pub charge: f64,
    /// keV
    pub temperature: f64,
    /// 1/cm^3
    pub density: f64,
}

impl Species {
    pub fn new(mass: f64, charge: f64, temperature: f64, density: f64) -> Self {
        Self {
            mass,
            charge,
            temperature,
            density,
        }
    }

    /// Free electrons at temperature `te` (keV) and density `ne` (1/cm^3).
    pub fn electrons(te: f64, ne: f64) -> Self {
        Self::new(ME_AMU, -1.0, te, ne)
    }

    fn validate(&self) -> Result<()> {
        if positive(self.mass)
            && self.charge.is_finite()
            && self.charge != 0.0
            && positive(self.temperature)
            && positive(self.density)
        {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!("bad field species {:?}", self)))
        }
    }

    /// Inverse square Debye length contribution, 1/cm^2.
    fn inverse_debye_sq(&self) -> f64 {
        4.0 * PI * self.density * (self.charge * ESU).powi(2) / (self.temperature * KEV_TO_ERG)
    }
}

/// An ordered set of field species. Electrons, if any, are ordinary species.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    species: Vec<Species>,
}

impl Field {
    pub fn new(species: Vec<Species>) -> Result<Self> {
        if species.is_empty() {
            return Err(Error::InvalidArgument(
                "a plasma field needs at least one species".to_string(),
            ));
        }
        for s in &species {
            s.validate()?;
        }
        Ok(Self { species })
    }

    /// Ion species plus the free electrons that neutralize them, at `te` keV.
    pub fn with_electrons(mut species: Vec<Species>, te: f64) -> Result<Self> {
        let ne = species.iter().map(|s| s.charge * s.density).sum();
        species.push(Species::electrons(te, ne));
        Self::new(species)
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// g/cm^3
    pub fn mass_density(&self) -> f64 {
        self.species.iter().map(|s| s.mass * AMU * s.density).sum()
    }

    /// Debye length in cm.
    pub fn debye_length(&self) -> f64 {
        let sum: f64 = self.species.iter().map(Species::inverse_debye_sq).sum();
        1.0 / sum.sqrt()
    }
}

/// A field species that keeps some of its electrons bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialSpecies {
    /// amu
    pub mass: f64,
    /// nuclear charge
    pub z: f64,
    /// keV
    pub temperature: f64,
    /// 1/cm^3
    pub density: f64,
    /// mean ionization state, `0 <= zbar <= z`
    pub zbar: f64,
}

impl PartialSpecies {
    pub fn new(mass: f64, z: f64, temperature: f64, density: f64, zbar: f64) -> Self {
        Self {
            mass,
            z,
            temperature,
            density,
            zbar,
        }
    }

    /// Electrons still bound to each ion.
    pub fn bound(&self) -> f64 {
        self.z - self.zbar
    }
}

/// Partially ionized field: ions with their ionization state and the free
/// electron temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialField {
    species: Vec<PartialSpecies>,
    te: f64,
}

impl PartialField {
    pub fn new(species: Vec<PartialSpecies>, te: f64) -> Result<Self> {
        if species.is_empty() {
            return Err(Error::InvalidArgument(
                "a plasma field needs at least one species".to_string(),
            ));
        }
        if !positive(te) {
            return Err(Error::InvalidArgument(format!(
                "electron temperature must be positive, got {}",
                te
            )));
        }
        for s in &species {
            let ok = positive(s.mass)
                && positive(s.z)
                && positive(s.temperature)
                && positive(s.density)
                && s.zbar >= 0.0
                && s.zbar <= s.z;
            if !ok {
                return Err(Error::InvalidArgument(format!(
                    "bad partially ionized species {:?}",
                    s
                )));
            }
        }
        Ok(Self { species, te })
    }

    pub fn species(&self) -> &[PartialSpecies] {
        &self.species
    }

    /// Electron temperature in keV.
    pub fn electron_temperature(&self) -> f64 {
        self.te
    }

    /// Free electron density, 1/cm^3.
    pub fn electron_density(&self) -> f64 {
        self.species.iter().map(|s| s.zbar * s.density).sum()
    }

    /// g/cm^3
    pub fn mass_density(&self) -> f64 {
        self.species.iter().map(|s| s.mass * AMU * s.density).sum()
    }

    /// Debye length in cm, screening by the ions at their nuclear charge and
    /// by the free electrons.
    pub fn debye_length(&self) -> f64 {
        let ions: f64 = self
            .species
            .iter()
            .map(|s| Species::new(s.mass, s.z, s.temperature, s.density).inverse_debye_sq())
            .sum();
        let ne = self.electron_density();
        let electrons = if ne > 0.0 {
            Species::electrons(self.te, ne).inverse_debye_sq()
        } else {
            0.0
        };
        1.0 / (ions + electrons).sqrt()
    }
}
