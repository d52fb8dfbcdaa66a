//! Zimmerman stopping power for partially ionized plasmas: free electrons,
//! ions and bound electrons contribute separately.

use std::f64::consts::PI;

use crate::constants::{
    plasma_frequency_sq, thermal_velocity, velocity, AMU, ERG_TO_MEV, ESU, H, KEV_TO_ERG, ME,
    ME_AMU, PER_CM_TO_PER_UM,
};
use crate::error::{check_domain, Result};
use crate::model::{ModelState, StoppingPower};
use crate::plasma::{check_projectile, PartialField};
use crate::special::erf;

const EMIN: f64 = 0.1;
const EMAX: f64 = 30.0;

/// erg/cm -> MeV/um
const UNITS: f64 = ERG_TO_MEV * PER_CM_TO_PER_UM;

#[derive(Debug, Clone)]
pub struct Zimmerman {
    mt: f64,
    zt: f64,
    field: PartialField,
    debye: f64,
    state: ModelState,
}

impl Zimmerman {
    pub fn new(mt: f64, zt: f64, field: PartialField) -> Result<Self> {
        check_projectile(mt, zt)?;
        let debye = field.debye_length();
        Ok(Self {
            mt,
            zt,
            field,
            debye,
            state: ModelState::default(),
        })
    }

    pub fn field(&self) -> &PartialField {
        &self.field
    }

    /// Free electron part of the stopping power, MeV/um.
    pub fn dedx_free_electron(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let ne = self.field.electron_density();
        if ne <= 0.0 {
            return Ok(0.0);
        }
        let vt = velocity(e, self.mt);
        let vth = thermal_velocity(self.field.electron_temperature(), ME_AMU, 2.0);
        let y = vt / vth;
        let y2 = y * y;
        let omega_pe = plasma_frequency_sq(ne, 1.0, ME_AMU).sqrt();

        let fit = (0.321 + 0.259 * y2 + 0.0707 * y2.powi(2) + 0.05 * y2.powi(3))
            / (1.0 + 0.130 * y2 + 0.05 * y2.powi(2));
        let lambda = 4.0 * PI * ME * vth * vth / (H * omega_pe) * fit;
        let stopping_number = 0.5
            * (1.0 + lambda * lambda).ln()
            * (erf(y) - 2.0 / PI.sqrt() * y * (-y2).exp());

        let erg_cm = 4.0 * PI * ESU.powi(4) * (self.zt / vt).powi(2) * ne * stopping_number / ME;
        Ok(erg_cm * UNITS)
    }

    /// Ion part of the stopping power, MeV/um.
    pub fn dedx_ion(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let vt = velocity(e, self.mt);
        let prefac = 4.0 * PI * ESU.powi(4) * (self.zt / vt).powi(2) / AMU;
        let sum: f64 = self
            .field
            .species()
            .iter()
            .map(|s| {
                let mr = AMU * s.mass * self.mt / (s.mass + self.mt);
                let b = ((H / (4.0 * PI * mr * vt)).powi(2)
                    + (ESU * ESU * s.z * self.zt / (mr * vt * vt)).powi(2))
                .sqrt();
                let log = (self.debye / b).ln().max(0.0);
                s.density * s.z * s.z * log / s.mass
            })
            .sum();
        Ok(prefac * sum * UNITS)
    }

    /// Bound electron part of the stopping power, MeV/um.
    pub fn dedx_bound_electron(&self, e: f64) -> Result<f64> {
        check_domain(e, EMIN, EMAX)?;
        let vt = velocity(e, self.mt);
        let prefac = 4.0 * PI * ESU.powi(4) * self.zt.powi(2) / (ME * vt * vt);
        let sum: f64 = self
            .field
            .species()
            .iter()
            .filter(|s| s.bound() > 0.0)
            .map(|s| {
                let frac = s.bound() / s.z;
                let ibar = s.z * (0.024 - 0.013 * frac) / frac.sqrt() * KEV_TO_ERG;
                let log = (2.0 * ME * vt * vt / ibar).ln().max(0.0);
                s.density * s.bound() * log
            })
            .sum();
        Ok(prefac * sum * UNITS)
    }
}

impl StoppingPower for Zimmerman {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        Ok(self.dedx_free_electron(e)? + self.dedx_ion(e)? + self.dedx_bound_electron(e)?)
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
        "Zimmerman"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plasma::PartialSpecies;

    fn proton_in_carbon(zbar: f64) -> Zimmerman {
        // 1 g/cm3 of carbon at 10 eV
        let n = 1.0 / (12.011 * AMU);
        let c = PartialSpecies::new(12.011, 6.0, 0.01, n, zbar);
        let field = PartialField::new(vec![c], 0.01).unwrap();
        Zimmerman::new(1.007276, 1.0, field).unwrap()
    }

    #[test]
    fn neutral_target_has_no_free_electrons() {
        let m = proton_in_carbon(0.0);
        assert_eq!(m.dedx_free_electron(3.0).unwrap(), 0.0);
        assert!(m.dedx_bound_electron(3.0).unwrap() > 0.0);
        assert!(m.dedx(3.0).unwrap() > 0.0);
    }

    #[test]
    fn fully_ionized_target_has_no_bound_electrons() {
        let m = proton_in_carbon(6.0);
        assert_eq!(m.dedx_bound_electron(3.0).unwrap(), 0.0);
        assert!(m.dedx_free_electron(3.0).unwrap() > 0.0);
    }

    #[test]
    fn parts_add_up() {
        let m = proton_in_carbon(2.0);
        for &e in &[0.1, 1.0, 10.0, 30.0] {
            let total = m.dedx_mev_um(e).unwrap();
            let parts = m.dedx_free_electron(e).unwrap()
                + m.dedx_ion(e).unwrap()
                + m.dedx_bound_electron(e).unwrap();
            assert!(f64::abs(total - parts) <= 1e-12 * total);
            assert!(total > 0.0);
        }
    }

    #[test]
    fn cold_carbon_is_close_to_solid_stopping() {
        // bound electrons dominate; a 3 MeV proton loses ~0.01 MeV/um in
        // 1 g/cm3 of solid carbon
        let s = proton_in_carbon(0.0).dedx(3.0).unwrap();
        assert!(s > 0.005 && s < 0.03, "dE/dx = {}", s);
    }

    #[test]
    fn domain() {
        let m = proton_in_carbon(1.0);
        assert!(m.dedx(0.09).unwrap_err().is_domain());
        assert!(m.dedx(f64::NAN).unwrap_err().is_domain());
    }
}
