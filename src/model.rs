//! The contract shared by every stopping-power model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::interpolation::Cursor;
use crate::path::{self, Transit};

/// Unit system used for rates and thicknesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// thickness in um, dE/dx in MeV/um
    #[default]
    Length,
    /// thickness in mg/cm^2, dE/dx in MeV/(mg/cm^2)
    ArealDensity,
}

impl Mode {
    /// Unit of thickness in this mode.
    pub fn thickness_unit(&self) -> &'static str {
        match *self {
            Mode::Length => "um",
            Mode::ArealDensity => "mg/cm2",
        }
    }

    /// Unit of dE/dx in this mode.
    pub fn rate_unit(&self) -> &'static str {
        match *self {
            Mode::Length => "MeV/um",
            Mode::ArealDensity => "MeV/(mg/cm2)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Mode::Length => write!(f, "length"),
            Mode::ArealDensity => write!(f, "areal-density"),
        }
    }
}

/// Energy reported by `eout` when the particle stops inside the material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangedOutFloor {
    #[default]
    Zero,
    Emin,
}

/// The only mutable state a model carries.
///
/// Changing it requires `&mut` access to the model, so a model shared between
/// threads is read-only for the duration of the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelState {
    pub mode: Mode,
    pub floor: RangedOutFloor,
}

/// MeV/um -> MeV/(mg/cm^2) for a target of mass density `rho` in g/cm^3.
pub fn length_to_areal(rate_mev_um: f64, rho: f64) -> f64 {
    rate_mev_um * 1e4 / (rho * 1e3)
}

/// MeV/(mg/cm^2) -> MeV/um for a target of mass density `rho` in g/cm^3.
pub fn areal_to_length(rate_mev_mgcm2: f64, rho: f64) -> f64 {
    rate_mev_mgcm2 * rho * 1e-1
}

/// A stopping-power model.
///
/// Implementors supply the rate in MeV/um, the validity domain and the target
/// density. Everything else (unit modes, path integration) is provided.
/// All energies are kinetic energies in MeV regardless of mode.
pub trait StoppingPower {
    /// Energy loss rate in MeV/um, positive for a slowing particle.
    fn dedx_mev_um(&self, e: f64) -> Result<f64>;

    /// Minimum energy (inclusive) for rate evaluations, in MeV.
    fn emin(&self) -> f64;

    /// Maximum energy (inclusive) for rate evaluations, in MeV.
    fn emax(&self) -> f64;

    /// Target mass density in g/cm^3.
    fn density(&self) -> f64;

    fn state(&self) -> &ModelState;

    fn state_mut(&mut self) -> &mut ModelState;

    fn model_type(&self) -> &str;

    fn info(&self) -> String {
        String::new()
    }

    /// Same as `dedx_mev_um`, but allowed to reuse a lookup hint from an
    /// ordered sweep. Models without tables ignore the cursor.
    fn dedx_mev_um_hinted(&self, e: f64, _cursor: &mut Cursor) -> Result<f64> {
        self.dedx_mev_um(e)
    }

    /// Energy loss rate in MeV/(mg/cm^2).
    fn dedx_mev_mgcm2(&self, e: f64) -> Result<f64> {
        Ok(length_to_areal(self.dedx_mev_um(e)?, self.density()))
    }

    /// Energy loss rate in the unit selected by `mode`.
    fn dedx_in(&self, mode: Mode, e: f64, cursor: &mut Cursor) -> Result<f64> {
        let rate = self.dedx_mev_um_hinted(e, cursor)?;
        Ok(match mode {
            Mode::Length => rate,
            Mode::ArealDensity => length_to_areal(rate, self.density()),
        })
    }

    /// Energy loss rate in the unit of the current mode.
    fn dedx(&self, e: f64) -> Result<f64> {
        self.dedx_in(self.mode(), e, &mut Cursor::new())
    }

    fn mode(&self) -> Mode {
        self.state().mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.state_mut().mode = mode;
    }

    fn ranged_out_floor(&self) -> RangedOutFloor {
        self.state().floor
    }

    fn set_ranged_out_floor(&mut self, floor: RangedOutFloor) {
        self.state_mut().floor = floor;
    }

    /// Energy after traversing `thickness` (um or mg/cm^2 per mode).
    fn eout(&self, ein: f64, thickness: f64) -> Result<Transit> {
        path::eout(self, ein, thickness)
    }

    /// Entrance energy needed to leave `thickness` with energy `eout`.
    fn ein(&self, eout: f64, thickness: f64) -> Result<f64> {
        path::ein(self, eout, thickness)
    }

    /// Thickness that slows the particle from `ein` to `eout`.
    fn thickness(&self, ein: f64, eout: f64) -> Result<f64> {
        path::thickness(self, ein, eout)
    }

    /// Distance to stop a particle of energy `e`.
    fn range(&self, e: f64) -> Result<f64> {
        path::range(self, e)
    }
}

impl<M: StoppingPower + ?Sized> StoppingPower for Box<M> {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        (**self).dedx_mev_um(e)
    }

    fn emin(&self) -> f64 {
        (**self).emin()
    }

    fn emax(&self) -> f64 {
        (**self).emax()
    }

    fn density(&self) -> f64 {
        (**self).density()
    }

    fn state(&self) -> &ModelState {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut ModelState {
        (**self).state_mut()
    }

    fn model_type(&self) -> &str {
        (**self).model_type()
    }

    fn info(&self) -> String {
        (**self).info()
    }

    fn dedx_mev_um_hinted(&self, e: f64, cursor: &mut Cursor) -> Result<f64> {
        (**self).dedx_mev_um_hinted(e, cursor)
    }
}
