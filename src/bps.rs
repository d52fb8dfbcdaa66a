//! Brown-Preston-Singleton stopping power in a fully ionized plasma.
//!
//! Dimensional continuation splits the stopping into a short-range
//! (binary collision) part, a long-range (dielectric) part and a quantum
//! correction, each summed over the field species. Charges are in
//! Heaviside-Lorentz units, `e_LH = e sqrt(4 pi)`.

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::debug;

use crate::constants::{velocity, AMU, ERG_TO_MEV, ESU, HBAR, KEV_TO_ERG, PER_CM_TO_PER_UM};
use crate::error::{check_domain, Error, Result};
use crate::model::{ModelState, StoppingPower};
use crate::plasma::{check_projectile, Field, Species};
use crate::quadrature::{self, MAX_INTERVALS};
use crate::special::{dawson, digamma_1piy_re};

const EMIN: f64 = 0.01;
const EMAX: f64 = 50.0;

/// erg/cm -> MeV/um
const UNITS: f64 = ERG_TO_MEV * PER_CM_TO_PER_UM;
/// sqrt(4 pi)
const SQRT_4PI: f64 = 3.5449077018110318;
const E_LH: f64 = ESU * SQRT_4PI;
const EULER_GAMMA: f64 = 0.5772156649015329;
/// Midpoint step of the long-range angular integral.
const ANGLE_STEP: f64 = 0.01;
const QUAD_RTOL: f64 = 1e-8;

/// Field species quantities in CGS.
#[derive(Debug, Clone, Copy)]
struct Coupling {
    /// g
    mass: f64,
    charge: f64,
    /// 1/kT, 1/erg
    beta: f64,
    /// Debye wavenumber squared, 1/cm^2
    kappa_sq: f64,
}

impl Coupling {
    fn new(s: &Species) -> Self {
        let beta = 1.0 / (s.temperature * KEV_TO_ERG);
        Self {
            mass: s.mass * AMU,
            charge: s.charge,
            beta,
            kappa_sq: beta * (s.charge * E_LH).powi(2) * s.density,
        }
    }

    fn gauss(&self, v: f64) -> f64 {
        (-0.5 * self.beta * self.mass * v * v).exp()
    }

    /// Spectral weight `rho_b(v)`, odd in `v`.
    fn spectral_weight(&self, v: f64) -> f64 {
        self.kappa_sq * (self.beta * self.mass / (2.0 * PI)).sqrt() * v * self.gauss(v)
    }

    /// Real part of this species' dielectric susceptibility integral.
    fn susceptibility_re(&self, u: f64) -> f64 {
        let a = 0.5 * self.beta * self.mass;
        let rho = self.kappa_sq * (self.beta * self.mass / (2.0 * PI)).sqrt();
        rho * ((PI / a).sqrt() - 2.0 * PI.sqrt() * u * dawson(a.sqrt() * u))
    }
}

#[derive(Debug, Clone)]
pub struct Bps {
    mt: f64,
    zt: f64,
    field: Field,
    couplings: Vec<Coupling>,
    /// screening wavenumber, 1/cm
    k: f64,
    state: ModelState,
}

impl Bps {
    /// Projectile of mass `mt` (amu) and charge `zt` in `field`. Electrons must
    /// be part of the field, see [`Field::with_electrons`].
    pub fn new(mt: f64, zt: f64, field: Field) -> Result<Self> {
        check_projectile(mt, zt)?;
        let couplings: Vec<Coupling> = field.species().iter().map(Coupling::new).collect();
        // electron Debye wavenumber, or the first species' without electrons
        let screening = field
            .species()
            .iter()
            .rposition(|s| s.mass < 0.9)
            .unwrap_or(0);
        let k = couplings[screening].kappa_sq.sqrt();
        debug!(k, species = couplings.len(), "BPS field");
        Ok(Self {
            mt,
            zt,
            field,
            couplings,
            k,
            state: ModelState::default(),
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    fn rho_total(&self, v: f64) -> f64 {
        self.couplings.iter().map(|b| b.spectral_weight(v)).sum()
    }

    fn susceptibility(&self, u: f64) -> Complex64 {
        let re = self.couplings.iter().map(|b| b.susceptibility_re(u)).sum();
        Complex64::new(re, PI * self.rho_total(u))
    }

    fn short_range(&self, vp: f64, b: &Coupling) -> f64 {
        let mp = self.mt * AMU;
        let reduced = mp * b.mass / (mp + b.mass);
        let total = mp + b.mass;
        let prefac = (self.zt * E_LH).powi(2) / (4.0 * PI) * b.kappa_sq / (mp * vp)
            * (b.mass / (2.0 * PI * b.beta)).sqrt();
        let scale = b.beta * (self.zt * E_LH * b.charge * E_LH).abs() * self.k / (4.0 * PI)
            * (b.mass / reduced);
        let integrand = |u: f64| {
            if !(u > 0.0 && u < 1.0) {
                return 0.0;
            }
            let weight = u.sqrt() * (-0.5 * b.beta * b.mass * vp * vp * u).exp();
            let log = -(scale * u / (1.0 - u)).ln() + 2.0 - 2.0 * EULER_GAMMA;
            weight * (log * (b.beta * total * vp * vp - 1.0 / u) + 2.0 / u)
        };
        prefac * quadrature::integrate(integrand, 0.0, 1.0, QUAD_RTOL, MAX_INTERVALS)
    }

    fn long_range(&self, vp: f64, b: &Coupling) -> f64 {
        let mp = self.mt * AMU;
        let k2 = self.k * self.k;
        let coeff = Complex64::i() * (self.zt * E_LH).powi(2) / (8.0 * PI * PI);
        let f_log_f = |f: Complex64| f * (f / k2).ln();

        let steps = (2.0 / ANGLE_STEP).round() as usize;
        let mut angular = 0.0;
        for j in 0..steps {
            let x = -1.0 + (j as f64 + 0.5) * ANGLE_STEP;
            let v = vp * x;
            let weight = b.spectral_weight(v) / self.rho_total(v);
            let term = (coeff * x * weight * f_log_f(self.susceptibility(v))).re * ANGLE_STEP;
            if term.is_finite() {
                angular += term;
            }
        }

        let total = self.rho_total(vp);
        let weight = if total != 0.0 {
            b.spectral_weight(vp) / total
        } else {
            0.0
        };
        let f = self.susceptibility(vp);
        let edge = (coeff / (b.beta * mp * vp * vp) * weight * (f_log_f(f) - f_log_f(f.conj()))).re;
        angular - edge
    }

    fn quantum(&self, vp: f64, b: &Coupling) -> f64 {
        let mp = self.mt * AMU;
        let total = mp + b.mass;
        let prefac = (self.zt * E_LH).powi(2) / (4.0 * PI) * b.kappa_sq
            / (2.0 * b.beta * mp * vp * vp)
            * (b.beta * b.mass / (2.0 * PI)).sqrt();
        let vb = (3.0 / (b.beta * b.mass)).sqrt();
        let (lo, hi) = (vb.min(vp) / 5.0, vb.max(vp) * 5.0);
        let integrand = |w: f64| {
            let eta = b.charge * self.zt * ESU * ESU / (HBAR * w);
            let log = 2.0 * digamma_1piy_re(eta) - (eta * eta).ln();
            let lead = total * vp / (b.mass * w);
            let recoil = 1.0 / (b.beta * b.mass * vp * w);
            let ahead = (1.0 + lead * (recoil - 1.0)) * b.gauss(vp - w);
            let behind = (1.0 + lead * (recoil + 1.0)) * b.gauss(vp + w);
            log * (ahead - behind)
        };
        prefac * quadrature::integrate(integrand, lo, hi, QUAD_RTOL, MAX_INTERVALS)
    }

    fn summed<F: Fn(f64, &Coupling) -> f64>(&self, e: f64, part: F) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let vp = velocity(e, self.mt);
        let erg_cm: f64 = self.couplings.iter().map(|b| part(vp, b)).sum();
        Ok(erg_cm * UNITS)
    }

    /// Short-range (binary collision) part, MeV/um.
    pub fn dedx_short(&self, e: f64) -> Result<f64> {
        self.summed(e, |vp, b| self.short_range(vp, b))
    }

    /// Long-range (collective) part, MeV/um.
    pub fn dedx_long(&self, e: f64) -> Result<f64> {
        self.summed(e, |vp, b| self.long_range(vp, b))
    }

    /// Quantum correction, MeV/um.
    pub fn dedx_quantum(&self, e: f64) -> Result<f64> {
        self.summed(e, |vp, b| self.quantum(vp, b))
    }

    /// Stopping power in MeV/um due to field species `index` alone.
    pub fn dedx_species(&self, e: f64, index: usize) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let b = self.couplings.get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("no field species with index {}", index))
        })?;
        let vp = velocity(e, self.mt);
        Ok((self.short_range(vp, b) + self.long_range(vp, b) + self.quantum(vp, b)) * UNITS)
    }
}

impl StoppingPower for Bps {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        self.summed(e, |vp, b| {
            self.short_range(vp, b) + self.long_range(vp, b) + self.quantum(vp, b)
        })
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
        "BPS"
    }

    fn info(&self) -> String {
        format!(
            "m={} amu, Z={}, {} species",
            self.mt,
            self.zt,
            self.field.species().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::li_petrasso::LiPetrasso;

    const PROTON: f64 = 1.007276;

    fn deuterium(t: f64, n: f64) -> Field {
        Field::with_electrons(vec![Species::new(2.0, 1.0, t, n)], t).unwrap()
    }

    #[test]
    fn positive_inside_domain() {
        let m = Bps::new(PROTON, 1.0, deuterium(1.0, 1e24)).unwrap();
        for &e in &[0.05, 0.2, 1.0, 3.0, 14.7] {
            let s = m.dedx(e).unwrap();
            assert!(s > 0.0 && s.is_finite(), "dE/dx({}) = {}", e, s);
        }
        assert!(m.dedx(0.005).unwrap_err().is_domain());
        assert!(m.dedx(51.0).unwrap_err().is_domain());
    }

    #[test]
    fn close_to_li_petrasso() {
        let field = deuterium(1.0, 1e24);
        let bps = Bps::new(PROTON, 1.0, field.clone()).unwrap();
        let lp = LiPetrasso::new(PROTON, 1.0, field).unwrap();
        for &e in &[1.0, 3.0, 10.0] {
            let ratio = bps.dedx(e).unwrap() / lp.dedx(e).unwrap();
            assert!(ratio > 0.6 && ratio < 1.1, "BPS/LP at {} MeV = {}", e, ratio);
        }
    }

    #[test]
    fn parts_add_up() {
        let m = Bps::new(PROTON, 1.0, deuterium(1.0, 1e24)).unwrap();
        let e = 2.0;
        let total = m.dedx_mev_um(e).unwrap();
        let parts =
            m.dedx_short(e).unwrap() + m.dedx_long(e).unwrap() + m.dedx_quantum(e).unwrap();
        assert!(f64::abs(total - parts) <= 1e-10 * total);
        let species = m.dedx_species(e, 0).unwrap() + m.dedx_species(e, 1).unwrap();
        assert!(f64::abs(total - species) <= 1e-10 * total);
        assert!(m.dedx_species(e, 2).is_err());
        // the binary collisions carry most of the stopping
        assert!(m.dedx_short(e).unwrap() > 0.5 * total);
    }

    #[test]
    fn denser_plasma_stops_harder() {
        let thin = Bps::new(PROTON, 1.0, deuterium(1.0, 1e23)).unwrap();
        let dense = Bps::new(PROTON, 1.0, deuterium(1.0, 1e24)).unwrap();
        assert!(dense.dedx(3.0).unwrap() > thin.dedx(3.0).unwrap());
    }

    #[test]
    fn areal_mode_uses_field_density() {
        let mut m = Bps::new(PROTON, 1.0, deuterium(1.0, 1e24)).unwrap();
        let length = m.dedx(5.0).unwrap();
        m.set_mode(crate::model::Mode::ArealDensity);
        let areal = m.dedx(5.0).unwrap();
        assert!(f64::abs(length - areal * m.density() * 0.1) < 1e-12 * length);
        assert_eq!(m.model_type(), "BPS");
    }
}
