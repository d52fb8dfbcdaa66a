//! Li-Petrasso Fokker-Planck stopping power in a fully ionized plasma.
//!
//! Each field species contributes
//! `(Zt e / vt)^2 wp^2 [G(x) lnL + collective]`, where `G` is the
//! Chandrasekhar function of the velocity ratio `x = vt^2 / vf^2`. The
//! erf-based form of `G` covers the fast, thermal and slow regimes without
//! switching.

use std::f64::consts::PI;

use tracing::debug;

use crate::constants::{
    plasma_frequency_sq, thermal_velocity, velocity, AMU, ERG_TO_MEV, ESU, HBAR, PER_CM_TO_PER_UM,
};
use crate::error::{check_domain, Error, Result};
use crate::model::{ModelState, StoppingPower};
use crate::plasma::{check_projectile, Field, Species};
use crate::special::{bessel_k0, bessel_k1, erf};

const EMIN: f64 = 0.1;
const EMAX: f64 = 30.0;
/// 2 / sqrt(pi)
const TWO_OVER_SQRT_PI: f64 = 1.12838;

#[derive(Debug, Clone)]
pub struct LiPetrasso {
    mt: f64,
    zt: f64,
    field: Field,
    debye: f64,
    collective: bool,
    state: ModelState,
}

impl LiPetrasso {
    /// Projectile of mass `mt` (amu) and charge `zt` in `field`. Electrons must
    /// be part of the field, see [`Field::with_electrons`].
    pub fn new(mt: f64, zt: f64, field: Field) -> Result<Self> {
        check_projectile(mt, zt)?;
        let debye = field.debye_length();
        debug!(debye, species = field.species().len(), "Li-Petrasso field");
        Ok(Self {
            mt,
            zt,
            field,
            debye,
            collective: true,
            state: ModelState::default(),
        })
    }

    /// Turn the collective (plasma wave) term on or off.
    pub fn set_collective(&mut self, collective: bool) {
        self.collective = collective;
    }

    pub fn collective(&self) -> bool {
        self.collective
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Stopping power in MeV/um due to field species `index` alone.
    pub fn dedx_species(&self, e: f64, index: usize) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let s = self.field.species().get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("no field species with index {}", index))
        })?;
        Ok(self.species_term(velocity(e, self.mt), s))
    }

    /// Mean relative speed of projectile and field particles, cm/s.
    fn relative_velocity(vt: f64, s: &Species) -> f64 {
        let vf = thermal_velocity(s.temperature, s.mass, 8.0 / PI);
        let r = 4.0 * vt * vt / (PI * vf * vf);
        (vf / 2.0) * (-r).exp() + vt * (1.0 + PI * vf * vf / (8.0 * vt * vt)) * erf(r.sqrt())
    }

    fn coulomb_log(&self, vt: f64, s: &Species) -> f64 {
        let mr = AMU * self.mt * s.mass / (self.mt + s.mass);
        let u = Self::relative_velocity(vt, s);
        let p_perp = s.charge * self.zt * ESU * ESU / (mr * u * u);
        let p_min = (p_perp.powi(2) + (HBAR / (2.0 * mr * u)).powi(2)).sqrt();
        (0.5 * (1.0 + (self.debye / p_min).powi(2)).ln()).max(0.0)
    }

    /// MeV/um
    fn species_term(&self, vt: f64, s: &Species) -> f64 {
        let x = (vt / thermal_velocity(s.temperature, s.mass, 2.0)).powi(2);
        let ratio = s.mass / self.mt;
        let mu = TWO_OVER_SQRT_PI * x.sqrt() * (-x).exp();
        let erfx = erf(x.sqrt());
        let log = self.coulomb_log(vt, s);

        // G(x) lnL, multiplied out so lnL never divides
        let mut bracket = log * (erfx - mu) - ratio * (log * mu - erfx);
        if self.collective {
            let xc = (vt / thermal_velocity(s.temperature, s.mass, 1.0)).powi(2);
            let y = 1.0 / xc.sqrt();
            bracket += bessel_k0(y) * bessel_k1(y) * y;
        }

        let prefac = (self.zt * ESU / vt).powi(2) * plasma_frequency_sq(s.density, s.charge, s.mass);
        prefac * bracket * ERG_TO_MEV * PER_CM_TO_PER_UM
    }
}

impl StoppingPower for LiPetrasso {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let vt = velocity(e, self.mt);
        Ok(self
            .field
            .species()
            .iter()
            .map(|s| self.species_term(vt, s))
            .sum())
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
        "Li-Petrasso"
    }

    fn info(&self) -> String {
        format!(
            "m={} amu, Z={}, {} species, collective {}",
            self.mt,
            self.zt,
            self.field.species().len(),
            if self.collective { "on" } else { "off" }
        )
    }
}
