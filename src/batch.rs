//! Independent queries against one model, evaluated in parallel.
//!
//! The model is borrowed immutably for the whole batch, so its mode cannot
//! change while workers run. Results come back in input order.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::interpolation::Cursor;
use crate::model::StoppingPower;
use crate::path::{self, Tolerances, Transit};

/// dE/dx at each energy, in the model's current unit.
pub fn dedx_many<M>(model: &M, energies: &[f64]) -> Vec<Result<f64>>
where
    M: StoppingPower + Sync + ?Sized,
{
    let mode = model.mode();
    debug!(n = energies.len(), %mode, "batch dE/dx");
    // sorted inputs arrive in contiguous runs, so a per-worker cursor stays warm
    energies
        .par_iter()
        .map_init(Cursor::new, |cursor, &e| model.dedx_in(mode, e, cursor))
        .collect()
}

/// Exit energy for each entrance energy through the same `thickness`.
pub fn eout_many<M>(model: &M, energies: &[f64], thickness: f64) -> Vec<Result<Transit>>
where
    M: StoppingPower + Sync + ?Sized,
{
    eout_many_with(model, energies, thickness, &Tolerances::default())
}

pub fn eout_many_with<M>(
    model: &M,
    energies: &[f64],
    thickness: f64,
    tol: &Tolerances,
) -> Vec<Result<Transit>>
where
    M: StoppingPower + Sync + ?Sized,
{
    debug!(n = energies.len(), thickness, "batch Eout");
    energies
        .par_iter()
        .map(|&e| path::eout_with(model, e, thickness, tol))
        .collect()
}

/// Range of each energy.
pub fn range_many<M>(model: &M, energies: &[f64]) -> Vec<Result<f64>>
where
    M: StoppingPower + Sync + ?Sized,
{
    energies.par_iter().map(|&e| model.range(e)).collect()
}
