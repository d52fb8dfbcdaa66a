//! Stopping powers of charged particles in cold matter and in plasmas.
//!
//! Every model implements [`StoppingPower`]: the energy loss rate per unit
//! length (MeV/um) or per unit areal density (MeV/(mg/cm^2)), and through it
//! the exit energy, entrance energy, thickness and range of a path.
//!
//! ```no_run
//! use dedx::{StoppingPower, Tabulated};
//!
//! let foil = Tabulated::from_file("aluminum.txt", 2.70).unwrap();
//! let exit = foil.eout(14.7, 100.0).unwrap();
//! println!("{} MeV, ranged out: {}", exit.energy, exit.ranged_out);
//! ```

#[macro_use]
extern crate lazy_static;

pub mod atomic;
pub mod batch;
pub mod bethe_bloch;
pub mod bps;
pub mod config;
pub mod constants;
mod error;
pub mod grabowski;
pub mod interpolation;
pub mod li_petrasso;
pub mod mehlhorn;
pub mod model;
pub mod path;
pub mod plasma;
#[cfg(feature = "python")]
mod python;
pub mod quadrature;
pub mod special;
pub mod srim;
pub mod tabulated;
pub mod zimmerman;

pub use crate::atomic::{AtomicData, LightIons};
pub use crate::bethe_bloch::{BetheBloch, Element};
pub use crate::bps::Bps;
pub use crate::config::{BoxedModel, ModelConfig, SetupConfig};
pub use crate::error::{Error, Result};
pub use crate::grabowski::Grabowski;
pub use crate::interpolation::Cursor;
pub use crate::li_petrasso::LiPetrasso;
pub use crate::mehlhorn::Mehlhorn;
pub use crate::model::{Mode, ModelState, RangedOutFloor, StoppingPower};
pub use crate::path::{Tolerances, Transit};
pub use crate::plasma::{Field, PartialField, PartialSpecies, Species};
pub use crate::tabulated::Tabulated;
pub use crate::zimmerman::Zimmerman;
