//! Grabowski et al. fit to molecular-dynamics stopping powers, valid from weak
//! to moderately strong coupling (Phys. Rev. Lett. 111, 215002, 2013).

use std::f64::consts::{E, PI, SQRT_2};

use crate::constants::{thermal_velocity, velocity, ERG_TO_MEV, ESU, KEV_TO_ERG, PER_CM_TO_PER_UM};
use crate::error::{check_domain, Error, Result};
use crate::model::{ModelState, StoppingPower};
use crate::plasma::{check_projectile, Field, Species};
use crate::special::erf;

/// Domain limits per nucleon, MeV.
const EMIN_PER_AMU: f64 = 0.1;
const EMAX_PER_AMU: f64 = 30.0;

const EULER_GAMMA: f64 = 0.577216;
const FIT_A: f64 = 1.04102e-5;
const FIT_B: f64 = 0.183260;
const FIT_C: f64 = 0.116053;
const FIT_D: f64 = 0.824982;
const FIT_G0: f64 = 2.03301e-3;

fn alpha() -> f64 {
    4.0 * (-2.0 * EULER_GAMMA).exp()
}

fn fit_m1(g: f64, s: f64, zt: f64) -> f64 {
    let a = alpha() / E.sqrt();
    s * (1.0 + a / (g * (1.0 + FIT_A * zt * zt * g))).ln() / (1.0 + a / FIT_G0).ln()
}

fn fit_m2(w: f64, g: f64, s: f64) -> f64 {
    (1.0 + (s * w).powi(3) / g).ln() / (1.0 + w.powi(3) / FIT_G0).ln() / (s * s)
}

fn fit_r(w: f64, g: f64, s: f64, zt: f64) -> f64 {
    let w2 = w * w;
    (fit_m1(g, s, zt) + FIT_B * fit_m2(w, g, s) * w2) * (1.0 + g).powf(2.0 / 3.0)
        / (w2 * (1.0 + FIT_B * w2))
}

fn fit_g(w: f64) -> f64 {
    erf(w / SQRT_2) - (2.0 / PI).sqrt() * w * (-w * w / 2.0).exp()
}

fn fit_h(w: f64) -> f64 {
    let w4 = w.powi(4);
    w4 * w.ln() / (12.0 + w4) - w.powi(3) * (-w * w / 2.0).exp() / (3.0 * (2.0 * PI).sqrt())
}

#[derive(Debug, Clone)]
pub struct Grabowski {
    mt: f64,
    zt: f64,
    field: Field,
    state: ModelState,
}

impl Grabowski {
    /// Projectile of mass `mt` (amu) and charge `zt` in `field`, electrons
    /// included.
    pub fn new(mt: f64, zt: f64, field: Field) -> Result<Self> {
        check_projectile(mt, zt)?;
        Ok(Self {
            mt,
            zt,
            field,
            state: ModelState::default(),
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Stopping power in MeV/um due to field species `index` alone.
    pub fn dedx_species(&self, e: f64, index: usize) -> Result<f64> {
        check_domain(e, self.emin(), self.emax())?;
        let s = self.field.species().get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("no field species with index {}", index))
        })?;
        Ok(self.species_term(velocity(e, self.mt), s))
    }

    /// MeV/um
    fn species_term(&self, v: f64, s: &Species) -> f64 {
        let kt = s.temperature * KEV_TO_ERG;
        // Wigner-Seitz radius and coupling parameter
        let a = (4.0 * PI * s.density / 3.0).powf(-1.0 / 3.0);
        let coupling = (s.charge * ESU).powi(2) / (a * kt);
        let g = 3f64.sqrt() * self.zt.abs() * coupling.powf(1.5);
        let scale = FIT_D * (1.0 + FIT_C * g).powf(1.0 / 3.0);
        let w = v / (thermal_velocity(s.temperature, s.mass, 1.0) * scale);

        let debye_sq = kt / (4.0 * PI * s.density * ESU * ESU);
        let norm = (self.zt * s.charge * ESU).powi(2) / debye_sq / (1.0 + g).powf(2.0 / 3.0);

        let bracket = fit_g(w) * (E.sqrt() + (alpha() + w * w) / FIT_G0).ln() + fit_h(w);
        fit_r(w, g, scale, self.zt) * bracket * norm * ERG_TO_MEV * PER_CM_TO_PER_UM
    }
}

impl StoppingPower for Grabowski {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        check_domain(e, self.emin(), self.emax())?;
        let v = velocity(e, self.mt);
        Ok(self
            .field
            .species()
            .iter()
            .map(|s| self.species_term(v, s))
            .sum())
    }

    fn emin(&self) -> f64 {
        EMIN_PER_AMU * self.mt
    }

    fn emax(&self) -> f64 {
        EMAX_PER_AMU * self.mt
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
        "Grabowski"
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

    fn deuterium(t: f64) -> Field {
        Field::with_electrons(vec![Species::new(2.0, 1.0, t, 1e24)], t).unwrap()
    }

    #[test]
    fn fit_functions_limits() {
        // G ~ w^3 for slow, -> 1 for fast projectiles
        assert!(fit_g(1e-2) < 1e-6);
        assert!(f64::abs(fit_g(10.0) - 1.0) < 1e-9);
        // H -> ln w for fast projectiles
        assert!(f64::abs(fit_h(100.0) - 100f64.ln()) < 1e-3);
    }

    #[test]
    fn domain_scales_with_mass() {
        let m = Grabowski::new(4.0015, 2.0, deuterium(1.0)).unwrap();
        assert!(f64::abs(m.emin() - 0.40015) < 1e-12);
        assert!(f64::abs(m.emax() - 120.045) < 1e-9);
        assert!(m.dedx(0.3).unwrap_err().is_domain());
    }

    #[test]
    fn positive_over_domain() {
        let m = Grabowski::new(1.007276, 1.0, deuterium(1.0)).unwrap();
        let mut e = m.emin();
        while e <= m.emax() {
            let s = m.dedx(e).unwrap();
            assert!(s > 0.0 && s.is_finite(), "dE/dx({}) = {}", e, s);
            e *= 1.1;
        }
    }

    #[test]
    fn weak_coupling_agrees_with_li_petrasso() {
        let gb = Grabowski::new(1.007276, 1.0, deuterium(1.0)).unwrap();
        let lp = LiPetrasso::new(1.007276, 1.0, deuterium(1.0)).unwrap();
        let ratio = gb.dedx(3.0).unwrap() / lp.dedx(3.0).unwrap();
        assert!(ratio > 0.4 && ratio < 2.5, "ratio = {}", ratio);
    }

    #[test]
    fn species_terms_add_up() {
        let m = Grabowski::new(1.007276, 1.0, deuterium(0.5)).unwrap();
        let total = m.dedx_mev_um(2.0).unwrap();
        let parts = m.dedx_species(2.0, 0).unwrap() + m.dedx_species(2.0, 1).unwrap();
        assert!(f64::abs(total - parts) <= 1e-12 * total);
    }
}
