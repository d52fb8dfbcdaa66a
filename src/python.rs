//! Python bindings, built with the `python` feature.

use std::path::PathBuf;

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::bethe_bloch::{BetheBloch, Element};
use crate::bps::Bps;
use crate::config::{BoxedModel, ModelConfig};
use crate::error::Error;
use crate::grabowski::Grabowski;
use crate::li_petrasso::LiPetrasso;
use crate::mehlhorn::Mehlhorn;
use crate::model::{Mode, StoppingPower};
use crate::plasma::{Field, PartialField, PartialSpecies, Species};
use crate::srim;
use crate::tabulated::Tabulated;
use crate::zimmerman::Zimmerman;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            Error::Convergence { .. } => PyRuntimeError::new_err(err.to_string()),
            Error::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn field(species: Vec<(f64, f64, f64, f64)>, te: Option<f64>) -> crate::Result<Field> {
    let species = species
        .into_iter()
        .map(|(m, z, t, n)| Species::new(m, z, t, n))
        .collect();
    match te {
        Some(te) => Field::with_electrons(species, te),
        None => Field::new(species),
    }
}

/// A stopping-power model.
#[pyclass(name = "Model")]
pub struct PyModel {
    inner: BoxedModel,
}

impl PyModel {
    fn wrap(inner: BoxedModel) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyModel {
    #[staticmethod]
    fn from_toml(text: &str) -> PyResult<Self> {
        Ok(Self::wrap(ModelConfig::from_toml(text)?.build()?))
    }

    #[staticmethod]
    fn from_file(path: PathBuf) -> PyResult<Self> {
        let cfg = ModelConfig::from_file(&path)?;
        let base = path.parent().map(PathBuf::from).unwrap_or_default();
        Ok(Self::wrap(cfg.build_in(&base)?))
    }

    /// Two-column table of (MeV, MeV/um) and the density in g/cm^3.
    #[staticmethod]
    fn tabulated(path: PathBuf, density: f64) -> PyResult<Self> {
        Ok(Self::wrap(Box::new(Tabulated::from_file(path, density)?)))
    }

    #[staticmethod]
    fn srim(path: PathBuf) -> PyResult<Self> {
        Ok(Self::wrap(Box::new(srim::load(path)?)))
    }

    /// `elements` are (mass amu, Z, atoms/cm^3).
    #[staticmethod]
    fn bethe_bloch(mt: f64, zt: f64, elements: Vec<(f64, f64, f64)>) -> PyResult<Self> {
        let elements = elements
            .into_iter()
            .map(|(m, z, n)| Element::new(m, z, n))
            .collect();
        Ok(Self::wrap(Box::new(BetheBloch::new(mt, zt, elements)?)))
    }

    /// `species` are (mass amu, charge, keV, 1/cm^3). With `te`, neutralizing
    /// electrons are added at that temperature.
    #[staticmethod]
    #[pyo3(signature = (mt, zt, species, te=None, collective=true))]
    fn li_petrasso(
        mt: f64,
        zt: f64,
        species: Vec<(f64, f64, f64, f64)>,
        te: Option<f64>,
        collective: bool,
    ) -> PyResult<Self> {
        let mut lp = LiPetrasso::new(mt, zt, field(species, te)?)?;
        lp.set_collective(collective);
        Ok(Self::wrap(Box::new(lp)))
    }

    #[staticmethod]
    #[pyo3(signature = (mt, zt, species, te=None))]
    fn grabowski(
        mt: f64,
        zt: f64,
        species: Vec<(f64, f64, f64, f64)>,
        te: Option<f64>,
    ) -> PyResult<Self> {
        Ok(Self::wrap(Box::new(Grabowski::new(mt, zt, field(species, te)?)?)))
    }

    #[staticmethod]
    #[pyo3(signature = (mt, zt, species, te=None))]
    fn bps(
        mt: f64,
        zt: f64,
        species: Vec<(f64, f64, f64, f64)>,
        te: Option<f64>,
    ) -> PyResult<Self> {
        Ok(Self::wrap(Box::new(Bps::new(mt, zt, field(species, te)?)?)))
    }

    /// `species` are (mass amu, Z, keV, 1/cm^3, Zbar).
    #[staticmethod]
    fn zimmerman(
        mt: f64,
        zt: f64,
        species: Vec<(f64, f64, f64, f64, f64)>,
        te: f64,
    ) -> PyResult<Self> {
        let species = species
            .into_iter()
            .map(|(m, z, t, n, zbar)| PartialSpecies::new(m, z, t, n, zbar))
            .collect();
        let field = PartialField::new(species, te)?;
        Ok(Self::wrap(Box::new(Zimmerman::new(mt, zt, field)?)))
    }

    /// `species` as for `zimmerman`; `ibar` optionally gives the bound
    /// electrons' mean excitation energy (eV) per species.
    #[staticmethod]
    #[pyo3(signature = (mt, zt, species, te, ibar=None))]
    fn mehlhorn(
        mt: f64,
        zt: f64,
        species: Vec<(f64, f64, f64, f64, f64)>,
        te: f64,
        ibar: Option<Vec<f64>>,
    ) -> PyResult<Self> {
        let species = species
            .into_iter()
            .map(|(m, z, t, n, zbar)| PartialSpecies::new(m, z, t, n, zbar))
            .collect();
        let mut model = Mehlhorn::new(mt, zt, PartialField::new(species, te)?)?;
        if let Some(ibar) = ibar {
            model.set_mean_excitation(ibar)?;
        }
        Ok(Self::wrap(Box::new(model)))
    }

    fn dedx(&self, e: f64) -> PyResult<f64> {
        Ok(self.inner.dedx(e)?)
    }

    /// Returns (energy, ranged_out).
    fn eout(&self, e: f64, thickness: f64) -> PyResult<(f64, bool)> {
        let t = self.inner.eout(e, thickness)?;
        Ok((t.energy, t.ranged_out))
    }

    fn ein(&self, e: f64, thickness: f64) -> PyResult<f64> {
        Ok(self.inner.ein(e, thickness)?)
    }

    fn thickness(&self, ein: f64, eout: f64) -> PyResult<f64> {
        Ok(self.inner.thickness(ein, eout)?)
    }

    fn range(&self, e: f64) -> PyResult<f64> {
        Ok(self.inner.range(e)?)
    }

    /// "length" or "areal".
    fn set_mode(&mut self, mode: &str) -> PyResult<()> {
        let mode = match mode {
            "length" => Mode::Length,
            "areal" | "areal-density" => Mode::ArealDensity,
            other => {
                return Err(PyValueError::new_err(format!("unknown mode '{}'", other)));
            }
        };
        self.inner.set_mode(mode);
        Ok(())
    }

    fn emin(&self) -> f64 {
        self.inner.emin()
    }

    fn emax(&self) -> f64 {
        self.inner.emax()
    }

    fn model_type(&self) -> String {
        self.inner.model_type().to_string()
    }

    fn info(&self) -> String {
        self.inner.info()
    }

    fn __repr__(&self) -> String {
        format!("Model({}, {})", self.inner.model_type(), self.inner.mode())
    }
}

#[pymodule]
fn dedx(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModel>()?;
    Ok(())
}
