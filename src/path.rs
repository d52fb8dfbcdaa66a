//! Path-integrated quantities for any [`StoppingPower`] model.
//!
//! Energy loss along a path obeys `dE/ds = -dE/dx(E)`. Exit energies are
//! found by integrating that equation with an adaptive Dormand-Prince 5(4)
//! scheme; thicknesses by integrating `ds/dE = -1/(dE/dx)` over energy with
//! the same scheme; entrance energies by root finding on that thickness.
//!
//! Every call reads the model's mode once and uses it for the whole
//! integration.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::{check_domain, Error, Result};
use crate::interpolation::Cursor;
use crate::model::{Mode, RangedOutFloor, StoppingPower};

/// Default lower energy for range calculations, in MeV.
pub const RANGE_CUTOFF: f64 = 0.02;

/// Result of pushing a particle through material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transit {
    /// Exit energy in MeV. Equal to the model's ranged-out floor when `ranged_out`.
    pub energy: f64,
    /// The particle stopped before the end of the material.
    pub ranged_out: bool,
}

/// Numerical controls for the integrator and the root finder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Relative local error per integration step.
    pub rtol: f64,
    /// Absolute local error per integration step.
    pub atol: f64,
    /// Target accuracy of entrance-energy searches, in MeV.
    pub root_tol: f64,
    /// Maximum number of integration steps (accepted or rejected) per call.
    pub max_steps: usize,
    /// Maximum number of root-finding iterations per call.
    pub max_root_iterations: usize,
    /// Smallest step allowed, as a fraction of the integration span.
    pub min_step_fraction: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-12,
            root_tol: 1e-7,
            max_steps: 100_000,
            max_root_iterations: 200,
            min_step_fraction: 1e-14,
        }
    }
}

impl Tolerances {
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.rtol)
            || !positive(self.atol)
            || !positive(self.root_tol)
            || !positive(self.min_step_fraction)
            || self.max_steps == 0
            || self.max_root_iterations == 0
        {
            return Err(Error::InvalidArgument(format!(
                "tolerances must be positive: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// The model seen through one fixed mode, with a lookup cursor for the sweep.
struct Rate<'a, M: ?Sized> {
    model: &'a M,
    mode: Mode,
    cursor: Cursor,
    emin: f64,
    emax: f64,
}

impl<'a, M: StoppingPower + ?Sized> Rate<'a, M> {
    fn new(model: &'a M) -> Self {
        Self {
            model,
            mode: model.mode(),
            cursor: Cursor::new(),
            emin: model.emin(),
            emax: model.emax(),
        }
    }

    fn inside(&self, e: f64) -> bool {
        e >= self.emin && e <= self.emax
    }

    fn at(&mut self, e: f64) -> Result<f64> {
        self.model.dedx_in(self.mode, e, &mut self.cursor)
    }
}

enum Outcome {
    Done(f64),
    /// A stage kept leaving the region where the derivative is defined; `x`
    /// and `y` are the last accepted point.
    LeftDomain { x: f64, y: f64 },
}

// Dormand-Prince 5(4) tableau.
const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; 6] = [
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
// 5th order weights minus embedded 4th order weights.
const ERR: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Integrate `dy/dx = f(x, y)` from `(x0, y0)` to `x1`.
///
/// `f` returns `Ok(None)` when `(x, y)` lies outside the region where the
/// derivative exists; the step is then rejected and shrunk.
fn integrate<F>(
    mut f: F,
    x0: f64,
    y0: f64,
    x1: f64,
    tol: &Tolerances,
    what: &'static str,
) -> Result<Outcome>
where
    F: FnMut(f64, f64) -> Result<Option<f64>>,
{
    let span = x1 - x0;
    if span == 0.0 {
        return Ok(Outcome::Done(y0));
    }
    let min_step = tol.min_step_fraction * span.abs();

    let (mut x, mut y) = (x0, y0);
    let mut h = span / 8.0;
    let mut k1 = match f(x, y)? {
        Some(k) => k,
        None => return Ok(Outcome::LeftDomain { x, y }),
    };

    let mut steps = 0;
    while (x1 - x) * span.signum() > min_step {
        steps += 1;
        if steps > tol.max_steps {
            return Err(Error::Convergence {
                what,
                iterations: tol.max_steps,
            });
        }
        if (h.abs()) > (x1 - x).abs() {
            h = x1 - x;
        }

        let mut k = [k1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut outside = false;
        for stage in 0..6 {
            let dy: f64 = (0..=stage).map(|j| A[stage][j] * k[j]).sum();
            match f(x + C[stage] * h, y + h * dy)? {
                Some(v) => k[stage + 1] = v,
                None => {
                    outside = true;
                    break;
                }
            }
        }
        if outside {
            h *= 0.25;
            trace!(x, y, h, "stage left the domain, shrinking step");
            if h.abs() < min_step {
                return Ok(Outcome::LeftDomain { x, y });
            }
            continue;
        }

        // the last stage is evaluated at the 5th order solution
        let y_new = y + h * (0..6).map(|j| A[5][j] * k[j]).sum::<f64>();
        let err = h * (0..7).map(|j| ERR[j] * k[j]).sum::<f64>();
        let scale = tol.atol + tol.rtol * y.abs().max(y_new.abs());
        let ratio = err.abs() / scale;

        if ratio <= 1.0 {
            x += h;
            y = y_new;
            k1 = k[6];
            trace!(x, y, h, "step accepted");
        }
        let factor = if ratio.is_nan() {
            0.2
        } else if ratio == 0.0 {
            5.0
        } else {
            (0.9 * ratio.powf(-0.2)).clamp(0.2, 5.0)
        };
        h *= factor;
        if h.abs() < min_step && (x1 - x).abs() > min_step {
            return Err(Error::Convergence {
                what,
                iterations: steps,
            });
        }
    }
    Ok(Outcome::Done(y))
}

enum Reach {
    /// Thickness needed to get from the start to the end energy.
    Reached(f64),
    /// The stopping power is not positive at this energy, so lower energies are
    /// never reached.
    Blocked(f64),
}

fn thickness_between<M: StoppingPower + ?Sized>(
    rate: &mut Rate<M>,
    from: f64,
    to: f64,
    tol: &Tolerances,
    what: &'static str,
) -> Result<Reach> {
    let mut blocked = None;
    let outcome = integrate(
        |e, _| {
            if !rate.inside(e) {
                return Ok(None);
            }
            let r = rate.at(e)?;
            if !(r > 0.0) {
                blocked = Some(e);
                return Err(Error::Range(format!(
                    "stopping power is not positive at {} MeV",
                    e
                )));
            }
            Ok(Some(-1.0 / r))
        },
        from,
        0.0,
        to,
        tol,
        what,
    );
    match (outcome, blocked) {
        (_, Some(e)) => Ok(Reach::Blocked(e)),
        (Ok(Outcome::Done(s)), None) => Ok(Reach::Reached(s)),
        (Ok(Outcome::LeftDomain { x, .. }), None) => Err(Error::Range(format!(
            "energy {} MeV left the model domain during thickness integration",
            x
        ))),
        (Err(e), None) => Err(e),
    }
}

fn check_thickness(thickness: f64) -> Result<()> {
    if thickness.is_finite() && thickness >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "thickness must be finite and non-negative, got {}",
            thickness
        )))
    }
}

pub(crate) fn floor_energy<M: StoppingPower + ?Sized>(model: &M) -> f64 {
    match model.ranged_out_floor() {
        RangedOutFloor::Zero => 0.0,
        RangedOutFloor::Emin => model.emin(),
    }
}

/// Exit energy after `thickness`, see [`StoppingPower::eout`].
pub fn eout<M: StoppingPower + ?Sized>(model: &M, ein: f64, thickness: f64) -> Result<Transit> {
    eout_with(model, ein, thickness, &Tolerances::default())
}

#[instrument(level = "debug", skip(model, tol))]
pub fn eout_with<M: StoppingPower + ?Sized>(
    model: &M,
    ein: f64,
    thickness: f64,
    tol: &Tolerances,
) -> Result<Transit> {
    check_domain(ein, model.emin(), model.emax())?;
    check_thickness(thickness)?;
    if thickness == 0.0 {
        return Ok(Transit {
            energy: ein,
            ranged_out: false,
        });
    }

    let mut rate = Rate::new(model);
    let (emin, emax) = (rate.emin, rate.emax);
    let ranged_out = Transit {
        energy: floor_energy(model),
        ranged_out: true,
    };

    let mut above = false;
    let outcome = integrate(
        |_, e| {
            if !rate.inside(e) {
                above = e > emax;
                return Ok(None);
            }
            Ok(Some(-rate.at(e)?))
        },
        0.0,
        ein,
        thickness,
        tol,
        "exit energy integration",
    );
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) if err.is_convergence() => {
            // steps collapse where the rate diverges near Emin, which only
            // matters if the particle would stop inside the material
            let residual = thickness_between(&mut rate, ein, emin, tol, "exit energy integration");
            if let Ok(Reach::Reached(residual)) = residual {
                if thickness >= residual {
                    debug!(ein, thickness, residual, "particle ranged out");
                    return Ok(ranged_out);
                }
            }
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    match outcome {
        Outcome::Done(energy) => Ok(Transit {
            energy,
            ranged_out: false,
        }),
        Outcome::LeftDomain { .. } if above => Err(Error::Range(format!(
            "particle energy rose above the model maximum of {} MeV",
            emax
        ))),
        Outcome::LeftDomain { x, y } => {
            debug!(ein, thickness, x, y, "particle ranged out");
            Ok(ranged_out)
        }
    }
}

/// Entrance energy for a given exit energy, see [`StoppingPower::ein`].
pub fn ein<M: StoppingPower + ?Sized>(model: &M, eout: f64, thickness: f64) -> Result<f64> {
    ein_with(model, eout, thickness, &Tolerances::default())
}

#[instrument(level = "debug", skip(model, tol))]
pub fn ein_with<M: StoppingPower + ?Sized>(
    model: &M,
    eout: f64,
    thickness: f64,
    tol: &Tolerances,
) -> Result<f64> {
    check_domain(eout, model.emin(), model.emax())?;
    check_thickness(thickness)?;
    if thickness == 0.0 {
        return Ok(eout);
    }

    // thickness needed to slow from `e` down to `eout`, less the one given;
    // increasing in `e` and independent of the ranged-out floor
    let mut rate = Rate::new(model);
    let mut residual = |e: f64| -> Result<f64> {
        match thickness_between(&mut rate, e, eout, tol, "entrance energy integration")? {
            Reach::Reached(s) => Ok(s - thickness),
            Reach::Blocked(at) => Err(Error::Range(format!(
                "stopping power is not positive at {} MeV, {} MeV cannot be reached",
                at, eout
            ))),
        }
    };

    let (mut lo, mut hi) = (eout, model.emax());
    let mut f_lo = -thickness;
    let mut f_hi = residual(hi)?;
    if f_hi < 0.0 {
        debug!(eout, thickness, "entrance energy beyond model maximum");
        return Err(Error::Range(format!(
            "exit energy {} MeV after {} needs an entrance energy above the model maximum of {} MeV",
            eout,
            thickness,
            model.emax()
        )));
    }

    // Illinois variant of regula falsi, falling back to bisection when the
    // bracket stops shrinking
    let mut side = 0i8;
    let mut width = hi - lo;
    for _ in 0..tol.max_root_iterations {
        if hi - lo <= tol.root_tol {
            return Ok(0.5 * (lo + hi));
        }
        let mut x = (lo * f_hi - hi * f_lo) / (f_hi - f_lo);
        if !(x > lo && x < hi) {
            x = 0.5 * (lo + hi);
        }
        let fx = residual(x)?;
        if fx == 0.0 {
            return Ok(x);
        }
        if fx < 0.0 {
            lo = x;
            f_lo = fx;
            if side == -1 {
                f_hi *= 0.5;
            }
            side = -1;
        } else {
            hi = x;
            f_hi = fx;
            if side == 1 {
                f_lo *= 0.5;
            }
            side = 1;
        }
        if hi - lo > 0.5 * width {
            let mid = 0.5 * (lo + hi);
            let fm = residual(mid)?;
            if fm < 0.0 {
                lo = mid;
                f_lo = fm;
            } else {
                hi = mid;
                f_hi = fm;
            }
            side = 0;
        }
        width = hi - lo;
    }
    Err(Error::Convergence {
        what: "entrance energy search",
        iterations: tol.max_root_iterations,
    })
}

/// Thickness needed to slow from `ein` to `eout`, see [`StoppingPower::thickness`].
pub fn thickness<M: StoppingPower + ?Sized>(model: &M, ein: f64, eout: f64) -> Result<f64> {
    thickness_with(model, ein, eout, &Tolerances::default())
}

#[instrument(level = "debug", skip(model, tol))]
pub fn thickness_with<M: StoppingPower + ?Sized>(
    model: &M,
    ein: f64,
    eout: f64,
    tol: &Tolerances,
) -> Result<f64> {
    check_domain(ein, model.emin(), model.emax())?;
    if eout.is_nan() {
        return Err(Error::InvalidArgument("exit energy is NaN".to_string()));
    }
    if eout > ein {
        return Err(Error::Range(format!(
            "exit energy {} MeV exceeds entrance energy {} MeV",
            eout, ein
        )));
    }
    if eout < model.emin() {
        return Err(Error::Range(format!(
            "exit energy {} MeV is below the model minimum of {} MeV, the particle ranges out first",
            eout,
            model.emin()
        )));
    }
    if eout == ein {
        return Ok(0.0);
    }

    let mut rate = Rate::new(model);
    match thickness_between(&mut rate, ein, eout, tol, "thickness integration")? {
        Reach::Reached(s) => Ok(s),
        Reach::Blocked(e) => Err(Error::Range(format!(
            "stopping power is not positive at {} MeV, {} MeV cannot be reached",
            e, eout
        ))),
    }
}

/// Range of a particle with energy `e`, i.e. the thickness to slow it to
/// `max(Emin, RANGE_CUTOFF)`.
pub fn range<M: StoppingPower + ?Sized>(model: &M, e: f64) -> Result<f64> {
    range_with(model, e, &Tolerances::default())
}

pub fn range_with<M: StoppingPower + ?Sized>(model: &M, e: f64, tol: &Tolerances) -> Result<f64> {
    check_domain(e, model.emin(), model.emax())?;
    let cutoff = model.emin().max(RANGE_CUTOFF);
    if e <= cutoff {
        return Ok(0.0);
    }
    thickness_with(model, e, cutoff, tol)
}
