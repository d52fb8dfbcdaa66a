//! Mehlhorn stopping power for partially ionized matter.
//!
//! Bound electrons and nuclei stop the projectile as cold matter: the smaller
//! of the Bethe and LSS electronic stopping, plus nuclear stopping. Free
//! electrons and the ionized part of each species stop it as a hot plasma,
//! through [`LiPetrasso`].

use std::f64::consts::PI;

use tracing::debug;

use crate::bethe_bloch::mean_excitation_ev;
use crate::constants::{
    beta_gamma, AMUC2_KEV, C, ERG_TO_MEV, ESU, EV_TO_ERG, KEV_TO_ERG, ME, PER_CM_TO_PER_UM,
};
use crate::error::{check_domain, Error, Result};
use crate::li_petrasso::LiPetrasso;
use crate::model::{ModelState, StoppingPower};
use crate::plasma::{check_projectile, Field, PartialField, PartialSpecies, Species};

const EMIN: f64 = 0.1;
const EMAX: f64 = 30.0;

/// Thomas-Fermi screening length prefactor, cm.
const SCREENING: f64 = 4.683e-9;

#[derive(Debug, Clone)]
pub struct Mehlhorn {
    mt: f64,
    zt: f64,
    field: PartialField,
    hot: Option<LiPetrasso>,
    /// per species, eV
    mean_excitation: Option<Vec<f64>>,
    state: ModelState,
}

impl Mehlhorn {
    pub fn new(mt: f64, zt: f64, field: PartialField) -> Result<Self> {
        check_projectile(mt, zt)?;
        let ne = field.electron_density();
        let hot = if ne > 0.0 {
            let mut species = vec![Species::electrons(field.electron_temperature(), ne)];
            species.extend(
                field
                    .species()
                    .iter()
                    .filter(|s| s.zbar > 0.0)
                    .map(|s| Species::new(s.mass, s.zbar, s.temperature, s.density)),
            );
            Some(LiPetrasso::new(mt, zt, Field::new(species)?)?)
        } else {
            None
        };
        debug!(ne, hot = hot.is_some(), "Mehlhorn field");
        Ok(Self {
            mt,
            zt,
            field,
            hot,
            mean_excitation: None,
            state: ModelState::default(),
        })
    }

    pub fn field(&self) -> &PartialField {
        &self.field
    }

    /// Override the mean excitation energy (eV) of each species' bound
    /// electrons, one value per species in field order.
    pub fn set_mean_excitation(&mut self, ibar: Vec<f64>) -> Result<()> {
        if ibar.len() != self.field.species().len() {
            return Err(Error::InvalidArgument(format!(
                "{} mean excitation energies for {} species",
                ibar.len(),
                self.field.species().len()
            )));
        }
        if let Some(bad) = ibar.iter().find(|i| !(i.is_finite() && **i > 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "mean excitation energy must be positive, got {}",
                bad
            )));
        }
        self.mean_excitation = Some(ibar);
        Ok(())
    }

    /// Mean excitation energy of species `index`'s bound electrons, eV.
    pub fn mean_excitation(&self, index: usize) -> Result<f64> {
        let s = self.field.species().get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("no field species with index {}", index))
        })?;
        Ok(self.ibar(index, s))
    }

    fn ibar(&self, index: usize, s: &PartialSpecies) -> f64 {
        if let Some(ibar) = &self.mean_excitation {
            return ibar[index];
        }
        // neutral-atom values for the bound electron count, scaled to the
        // nuclear charge
        let n = s.bound();
        let at = |k: f64| if k < 0.5 { 0.0 } else { mean_excitation_ev(k) };
        let (lo, hi) = (n.floor(), n.ceil());
        let i_n = if lo == hi {
            at(lo)
        } else {
            at(lo) + (n - lo) * (at(hi) - at(lo))
        };
        s.z * s.z * i_n / (n * n)
    }

    /// Effective projectile charge, reduced at low speed by electron capture.
    pub fn effective_charge(&self, e: f64) -> f64 {
        let beta = (2e3 * e / (self.mt * AMUC2_KEV)).sqrt();
        let capture = 1.034 * (-137.04 * beta / self.zt.powf(0.69)).exp();
        (self.zt * (1.0 - capture)).max(0.0)
    }

    /// Bethe stopping by the bound electrons of `s`, MeV/um.
    fn bethe(&self, e: f64, ze: f64, index: usize, s: &PartialSpecies) -> f64 {
        let (beta, gamma) = beta_gamma(e, self.mt);
        let b2 = beta * beta;
        let mec2 = ME * C * C;
        let prefac = 4.0 * PI * s.density * s.bound() * (ze * ESU * ESU).powi(2) / (mec2 * b2);
        let i = self.ibar(index, s) * EV_TO_ERG;
        let log = ((2.0 * mec2 * b2 * gamma * gamma / i).ln() - b2).max(0.0);
        prefac * log * ERG_TO_MEV * PER_CM_TO_PER_UM
    }

    /// LSS electronic stopping, proportional to the projectile speed, MeV/um.
    fn lss(&self, e: f64, ze: f64, s: &PartialSpecies) -> f64 {
        let a_ratio = s.mass / self.mt;
        let z23 = ze.powf(2.0 / 3.0);
        let sum23 = z23 + s.z.powf(2.0 / 3.0);
        let k = 0.0793 * z23 * s.z.sqrt() * (1.0 + a_ratio).powf(1.5)
            / (sum23.powf(0.75) * s.mass.sqrt());
        let a = SCREENING / sum23.sqrt();
        // reduced energy and length units
        let e_unit = (1.0 + a_ratio) * s.z * ze * ESU * ESU / (a_ratio * a);
        let r_unit = (1.0 + a_ratio).powi(2) / (4.0 * PI * a_ratio * s.density * a * a);
        // keV^(1/2)/um
        let c = k * (e_unit / KEV_TO_ERG).sqrt() / (r_unit * 1e4);
        1e-3 * c * (1e3 * e).sqrt()
    }

    /// Nuclear stopping, MeV/um.
    fn nuclear(&self, e: f64, ze: f64, s: &PartialSpecies) -> f64 {
        let sum23 = ze.powf(2.0 / 3.0) + s.z.powf(2.0 / 3.0);
        let e_per_amu = e / self.mt;
        let cn = 4.14e6 * (self.mt / (self.mt + s.mass)).powf(1.5) * (ze * s.z / s.mass).sqrt()
            / sum23.powf(0.75);
        let cn_reduced = s.mass * self.mt / (s.mass + self.mt) / (ze * s.z) / sum23.sqrt();
        // eV per 1e15 atoms/cm^2
        let per_atom =
            cn * e_per_amu.sqrt() * (-45.2 * (cn_reduced * e_per_amu).powf(0.277)).exp();
        per_atom * s.density * 1e-25
    }

    /// Stopping by bound electrons and nuclei, MeV/um.
    pub fn dedx_cold(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let ze = self.effective_charge(e);
        if ze <= 0.0 {
            return Ok(0.0);
        }
        Ok(self
            .field
            .species()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.bound() > 0.0)
            .map(|(i, s)| {
                let electronic = self.bethe(e, ze, i, s).min(self.lss(e, ze, s));
                electronic + self.nuclear(e, ze, s)
            })
            .sum())
    }

    /// Stopping by free electrons and ionized nuclei, MeV/um.
    pub fn dedx_hot(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        match &self.hot {
            Some(lp) => lp.dedx_mev_um(e),
            None => Ok(0.0),
        }
    }
}

impl StoppingPower for Mehlhorn {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        Ok(self.dedx_cold(e)? + self.dedx_hot(e)?)
    }

    fn emin(&self) -> f64 {
        EMIN
    }

    fn emax(&self) -> f64 {
        EMAX
    }

    fn density(&self) -> f64 {
        self.field.mass_density()
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    fn model_type(&self) -> &str {
        "Mehlhorn"
    }

    fn info(&self) -> String {
        format!(
            "m={} amu, Z={}, {} species, Te={} keV",
            self.mt,
            self.zt,
            self.field.species().len(),
            self.field.electron_temperature()
        )
    }
}
