//! Relativistic Bethe-Bloch stopping power in cold matter.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{beta_gamma, AMU, C, ERG_TO_MEV, ESU, EV_TO_ERG, ME, PER_CM_TO_PER_UM};
use crate::error::{check_domain, Error, Result};
use crate::model::{ModelState, StoppingPower};

/// Approximate mean excitation energy of an element, in eV.
pub fn mean_excitation_ev(z: f64) -> f64 {
    if z < 1.5 {
        19.0
    } else if z <= 13.0 {
        11.2 + 11.7 * z
    } else {
        52.8 + 8.71 * z
    }
}

/// One element of a cold target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Element {
    /// amu
    pub mass: f64,
    /// nuclear charge
    pub z: f64,
    /// atoms/cm^3
    pub density: f64,
    /// eV, `None` for the built-in approximation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_excitation: Option<f64>,
}

impl Element {
    pub fn new(mass: f64, z: f64, density: f64) -> Self {
        Self {
            mass,
            z,
            density,
            mean_excitation: None,
        }
    }

    pub fn with_mean_excitation(mut self, ev: f64) -> Self {
        self.mean_excitation = Some(ev);
        self
    }

    /// Mean excitation energy in eV.
    pub fn excitation_ev(&self) -> f64 {
        self.mean_excitation
            .unwrap_or_else(|| mean_excitation_ev(self.z))
    }

    fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.mass) || !positive(self.z) || !positive(self.density) {
            return Err(Error::InvalidArgument(format!(
                "element needs positive mass, Z and density: {:?}",
                self
            )));
        }
        if let Some(i) = self.mean_excitation {
            if !positive(i) {
                return Err(Error::InvalidArgument(format!(
                    "mean excitation energy must be positive, got {} eV",
                    i
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BetheBloch {
    mt: f64,
    zt: f64,
    elements: Vec<Element>,
    rho: f64,
    state: ModelState,
}

impl BetheBloch {
    /// Projectile of mass `mt` (amu) and charge `zt` in a target made of `elements`.
    pub fn new(mt: f64, zt: f64, elements: Vec<Element>) -> Result<Self> {
        if !(mt.is_finite() && mt > 0.0 && zt.is_finite() && zt > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "projectile needs positive mass and charge, got m={} Z={}",
                mt, zt
            )));
        }
        if elements.is_empty() {
            return Err(Error::InvalidArgument("target has no elements".to_string()));
        }
        for el in &elements {
            el.validate()?;
        }
        let rho = elements.iter().map(|el| el.mass * AMU * el.density).sum();
        Ok(Self {
            mt,
            zt,
            elements,
            rho,
            state: ModelState::default(),
        })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn dedx_element(&self, el: &Element, beta: f64, gamma: f64) -> f64 {
        let mec2 = ME * C * C;
        let b2 = beta * beta;
        let prefac = 4.0 * PI * el.density * el.z * (self.zt * ESU * ESU).powi(2) / (mec2 * b2);
        let i = el.excitation_ev() * EV_TO_ERG;
        let log = (2.0 * mec2 * b2 * gamma * gamma / i).ln() - b2;
        prefac * log
    }
}

impl StoppingPower for BetheBloch {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        check_domain(e, self.emin(), self.emax())?;
        let (beta, gamma) = beta_gamma(e, self.mt);
        let erg_cm: f64 = self
            .elements
            .iter()
            .map(|el| self.dedx_element(el, beta, gamma))
            .sum();
        Ok(erg_cm * ERG_TO_MEV * PER_CM_TO_PER_UM)
    }

    fn emin(&self) -> f64 {
        0.6 * self.mt
    }

    fn emax(&self) -> f64 {
        30.0
    }

    fn density(&self) -> f64 {
        self.rho
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    fn model_type(&self) -> &str {
        "Bethe-Bloch"
    }

    fn info(&self) -> String {
        format!(
            "m={} amu, Z={}, {} element(s), rho={:.4e} g/cm3",
            self.mt,
            self.zt,
            self.elements.len(),
            self.rho
        )
    }
}
