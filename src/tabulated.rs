//! Stopping power interpolated from a table of measured or simulated values.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::interpolation::{interpolate, Cursor, InterpolationResult};
use crate::model::{ModelState, StoppingPower};

fn check_row(line: usize, e: f64, s: f64, prev: Option<f64>) -> Result<()> {
    if !(e.is_finite() && e >= 0.0) {
        return Err(Error::parse(line, format!("bad energy {}", e)));
    }
    if !(s.is_finite() && s > 0.0) {
        return Err(Error::parse(line, format!("bad stopping power {}", s)));
    }
    match prev {
        Some(p) if e <= p => Err(Error::parse(
            line,
            format!("energy {} is not above the previous row", e),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct Tabulated {
    /// MeV, strictly ascending
    energies: Vec<f64>,
    /// MeV/um
    rates: Vec<f64>,
    /// g/cm^3
    rho: f64,
    state: ModelState,
    model_type: String,
    info: String,
}

impl Tabulated {
    /// Build from (energy MeV, dE/dx MeV/um) pairs and the target mass density
    /// in g/cm^3.
    pub fn new(table: Vec<(f64, f64)>, rho: f64) -> Result<Self> {
        if !(rho.is_finite() && rho > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "mass density must be positive, got {}",
                rho
            )));
        }
        if table.len() < 2 {
            return Err(Error::parse(
                table.len(),
                "a stopping power table needs at least two rows",
            ));
        }
        for (i, &(e, s)) in table.iter().enumerate() {
            let prev = if i > 0 { Some(table[i - 1].0) } else { None };
            check_row(i + 1, e, s, prev)?;
        }
        let (energies, rates) = table.into_iter().unzip();
        Ok(Self {
            energies,
            rates,
            rho,
            state: ModelState::default(),
            model_type: "Tabulated".to_string(),
            info: String::new(),
        })
    }

    /// Parse rows of "energy rate [...]" separated by whitespace or commas.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_text(text: &str, rho: f64) -> Result<Self> {
        let mut table = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|c| !c.is_empty());
            let mut next = |what: &str| -> Result<f64> {
                let col = cols
                    .next()
                    .ok_or_else(|| Error::parse(i + 1, format!("missing {} column", what)))?;
                col.parse()
                    .map_err(|_| Error::parse(i + 1, format!("cannot parse {} '{}'", what, col)))
            };
            let e = next("energy")?;
            let s = next("stopping power")?;
            check_row(i + 1, e, s, table.last().map(|&(prev, _)| prev))?;
            table.push((e, s));
        }
        let mut model = Self::new(table, rho)?;
        model.info = format!("{} rows", model.energies.len());
        Ok(model)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, rho: f64) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model = Self::from_text(&text, rho)?;
        model.info = path.display().to_string();
        Ok(model)
    }

    pub(crate) fn with_description(mut self, model_type: &str, info: String) -> Self {
        self.model_type = model_type.to_string();
        self.info = info;
        self
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }
}

impl StoppingPower for Tabulated {
    fn dedx_mev_um(&self, e: f64) -> Result<f64> {
        self.dedx_mev_um_hinted(e, &mut Cursor::new())
    }

    fn dedx_mev_um_hinted(&self, e: f64, cursor: &mut Cursor) -> Result<f64> {
        match interpolate(e, &self.energies, &self.rates, cursor) {
            InterpolationResult::InterpolatedValue(v) => Ok(v),
            _ => Err(Error::domain(e, self.emin(), self.emax())),
        }
    }

    fn emin(&self) -> f64 {
        self.energies[0]
    }

    fn emax(&self) -> f64 {
        self.energies[self.energies.len() - 1]
    }

    fn density(&self) -> f64 {
        self.rho
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    fn model_type(&self) -> &str {
        &self.model_type
    }

    fn info(&self) -> String {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn two_row_table_interpolates_and_refuses_to_extrapolate() {
        let m = Tabulated::new(vec![(1.0, 10.0), (10.0, 5.0)], 1.0).unwrap();
        let s = m.dedx(5.0).unwrap();
        assert!(s > 5.0 && s < 10.0);
        assert!(m.dedx(20.0).unwrap_err().is_domain());
        assert!(m.dedx(0.5).unwrap_err().is_domain());
        assert_eq!(m.emin(), 1.0);
        assert_eq!(m.emax(), 10.0);
        assert_eq!(m.dedx(10.0).unwrap(), 5.0);
    }

    #[test]
    fn areal_mode_uses_density() {
        let mut m = Tabulated::new(vec![(1.0, 0.1), (2.0, 0.05)], 2.5).unwrap();
        let length = m.dedx(1.0).unwrap();
        m.set_mode(Mode::ArealDensity);
        let areal = m.dedx(1.0).unwrap();
        assert!(f64::abs(length - areal * 2.5 * 0.1) < 1e-15);
        m.set_mode(Mode::Length);
        assert_eq!(m.dedx(1.0).unwrap(), length);
    }

    #[test]
    fn text_loader() {
        let text = "# E (MeV)  dE/dx (MeV/um)\n1.0 0.2\n\n2.0, 0.15, ignored\n4.0\t0.1\n";
        let m = Tabulated::from_text(text, 2.7).unwrap();
        assert_eq!(m.energies(), &[1.0, 2.0, 4.0]);
        assert_eq!(m.rates(), &[0.2, 0.15, 0.1]);
        assert_eq!(m.info(), "3 rows");
    }

    #[test]
    fn text_loader_rejects_bad_tables() {
        let err = Tabulated::from_text("# header\n1.0 0.2\n0.5 0.3\n", 1.0).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));

        let err = Tabulated::from_text("1.0 0.2\n2.0\n", 1.0).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = Tabulated::from_text("1.0 abc\n2.0 0.1\n", 1.0).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        assert!(Tabulated::from_text("1.0 0.2\n", 1.0).is_err());
        assert!(Tabulated::from_text("1.0 0.2\n2.0 0.1\n", 0.0).is_err());
    }

    #[test]
    fn file_loader() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "0.5 0.08").unwrap();
        writeln!(f, "1.0 0.06").unwrap();
        writeln!(f, "3.0 0.03").unwrap();
        let m = Tabulated::from_file(f.path(), 1.0).unwrap();
        assert_eq!(m.emax(), 3.0);
        assert_eq!(m.info(), f.path().display().to_string());

        let missing = Tabulated::from_file("/nonexistent/table.txt", 1.0).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }

    #[test]
    fn hinted_lookup_matches_plain_lookup() {
        let table: Vec<(f64, f64)> = (1..50).map(|i| (i as f64, 1.0 / i as f64)).collect();
        let m = Tabulated::new(table, 1.0).unwrap();
        let mut cursor = Cursor::new();
        let mut e = 48.7;
        while e > 1.0 {
            assert_eq!(
                m.dedx_mev_um_hinted(e, &mut cursor).unwrap(),
                m.dedx_mev_um(e).unwrap()
            );
            e -= 0.37;
        }
    }
}
