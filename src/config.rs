//! TOML descriptions of models and of multi-layer setups.
//!
//! A model file names its `kind` and the parameters of that model:
//!
//! ```toml
//! kind = "li-petrasso"
//! projectile = "p"
//! electron-temperature = 1.0
//! mode = "areal-density"
//!
//! [[species]]
//! mass = 2.0
//! charge = 1.0
//! temperature = 1.0
//! density = 1e24
//! ```
//!
//! A setup file gives an entrance energy and an ordered list of layers, each
//! with its own model and thickness.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::atomic::{AtomicData, LightIons};
use crate::bethe_bloch::{BetheBloch, Element};
use crate::bps::Bps;
use crate::error::{Error, Result};
use crate::grabowski::Grabowski;
use crate::li_petrasso::LiPetrasso;
use crate::mehlhorn::Mehlhorn;
use crate::model::{Mode, RangedOutFloor, StoppingPower};
use crate::path::{self, Tolerances};
use crate::plasma::{Field, PartialField, PartialSpecies, Species};
use crate::srim;
use crate::tabulated::Tabulated;
use crate::zimmerman::Zimmerman;

/// A model built from configuration.
pub type BoxedModel = Box<dyn StoppingPower + Send + Sync>;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T> {
    toml::from_str(text).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// A projectile given by name (`"p"`, `"d"`, `"4He"`, ...) or explicitly.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ProjectileConfig {
    Named(String),
    Explicit { mass: f64, charge: f64 },
}

impl ProjectileConfig {
    /// (mass in amu, charge)
    pub fn resolve(&self) -> Result<(f64, f64)> {
        match self {
            ProjectileConfig::Named(name) => LightIons
                .lookup(name)
                .ok_or_else(|| Error::InvalidArgument(format!("unknown projectile '{}'", name))),
            ProjectileConfig::Explicit { mass, charge } => Ok((*mass, *charge)),
        }
    }
}

fn default_collective() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ModelKind {
    /// Either `path` to a two-column file or inline `rows`.
    Tabulated {
        path: Option<PathBuf>,
        rows: Option<Vec<(f64, f64)>>,
        /// g/cm^3
        density: f64,
    },
    Srim {
        path: PathBuf,
    },
    BetheBloch {
        projectile: ProjectileConfig,
        elements: Vec<Element>,
    },
    #[serde(rename_all = "kebab-case")]
    LiPetrasso {
        projectile: ProjectileConfig,
        species: Vec<Species>,
        /// Adds neutralizing electrons at this temperature (keV).
        electron_temperature: Option<f64>,
        #[serde(default = "default_collective")]
        collective: bool,
    },
    #[serde(rename_all = "kebab-case")]
    Grabowski {
        projectile: ProjectileConfig,
        species: Vec<Species>,
        electron_temperature: Option<f64>,
    },
    #[serde(rename_all = "kebab-case")]
    Bps {
        projectile: ProjectileConfig,
        species: Vec<Species>,
        electron_temperature: Option<f64>,
    },
    #[serde(rename_all = "kebab-case")]
    Zimmerman {
        projectile: ProjectileConfig,
        species: Vec<PartialSpecies>,
        electron_temperature: f64,
    },
    #[serde(rename_all = "kebab-case")]
    Mehlhorn {
        projectile: ProjectileConfig,
        species: Vec<PartialSpecies>,
        electron_temperature: f64,
        /// eV per species, replacing the built-in estimate.
        mean_excitation: Option<Vec<f64>>,
    },
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ModelConfig {
    #[serde(flatten)]
    pub kind: ModelKind,
    pub mode: Option<Mode>,
    #[serde(alias = "ranged_out_floor")]
    pub ranged_out_floor: Option<RangedOutFloor>,
}

fn plasma_field(species: &[Species], te: Option<f64>) -> Result<Field> {
    match te {
        Some(te) => Field::with_electrons(species.to_vec(), te),
        None => Field::new(species.to_vec()),
    }
}

impl ModelConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        decode(text, Path::new("<inline>"))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        decode(&read(path)?, path)
    }

    /// Build the model, resolving relative data paths against the current
    /// directory.
    pub fn build(&self) -> Result<BoxedModel> {
        self.build_in(Path::new("."))
    }

    /// Build the model, resolving relative data paths against `base`.
    pub fn build_in(&self, base: &Path) -> Result<BoxedModel> {
        let mut model: BoxedModel = match &self.kind {
            ModelKind::Tabulated {
                path,
                rows,
                density,
            } => match (path, rows) {
                (Some(path), None) => Box::new(Tabulated::from_file(base.join(path), *density)?),
                (None, Some(rows)) => Box::new(Tabulated::new(rows.clone(), *density)?),
                _ => {
                    return Err(Error::InvalidArgument(
                        "a tabulated model needs exactly one of 'path' or 'rows'".to_string(),
                    ))
                }
            },
            ModelKind::Srim { path } => Box::new(srim::load(base.join(path))?),
            ModelKind::BetheBloch {
                projectile,
                elements,
            } => {
                let (mt, zt) = projectile.resolve()?;
                Box::new(BetheBloch::new(mt, zt, elements.clone())?)
            }
            ModelKind::LiPetrasso {
                projectile,
                species,
                electron_temperature,
                collective,
            } => {
                let (mt, zt) = projectile.resolve()?;
                let mut lp = LiPetrasso::new(mt, zt, plasma_field(species, *electron_temperature)?)?;
                lp.set_collective(*collective);
                Box::new(lp)
            }
            ModelKind::Grabowski {
                projectile,
                species,
                electron_temperature,
            } => {
                let (mt, zt) = projectile.resolve()?;
                Box::new(Grabowski::new(
                    mt,
                    zt,
                    plasma_field(species, *electron_temperature)?,
                )?)
            }
            ModelKind::Zimmerman {
                projectile,
                species,
                electron_temperature,
            } => {
                let (mt, zt) = projectile.resolve()?;
                let field = PartialField::new(species.clone(), *electron_temperature)?;
                Box::new(Zimmerman::new(mt, zt, field)?)
            }
            ModelKind::Bps {
                projectile,
                species,
                electron_temperature,
            } => {
                let (mt, zt) = projectile.resolve()?;
                Box::new(Bps::new(mt, zt, plasma_field(species, *electron_temperature)?)?)
            }
            ModelKind::Mehlhorn {
                projectile,
                species,
                electron_temperature,
                mean_excitation,
            } => {
                let (mt, zt) = projectile.resolve()?;
                let field = PartialField::new(species.clone(), *electron_temperature)?;
                let mut m = Mehlhorn::new(mt, zt, field)?;
                if let Some(ibar) = mean_excitation {
                    m.set_mean_excitation(ibar.clone())?;
                }
                Box::new(m)
            }
        };
        if let Some(mode) = self.mode {
            model.set_mode(mode);
        }
        if let Some(floor) = self.ranged_out_floor {
            model.set_ranged_out_floor(floor);
        }
        debug!(model = model.model_type(), mode = %model.mode(), "built model");
        Ok(model)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct LayerConfig {
    pub name: Option<String>,
    /// In the unit of the layer model's mode.
    pub thickness: f64,
    pub model: ModelConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SetupConfig {
    /// Entrance energy, MeV.
    pub energy: f64,
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(rename = "layer")]
    pub layers: Vec<LayerConfig>,
    #[serde(skip)]
    base: PathBuf,
}

/// Energy of the particle after one layer of a setup.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerExit {
    pub name: String,
    pub model_type: String,
    pub energy: f64,
    pub ranged_out: bool,
}

impl SetupConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut setup: Self = decode(text, Path::new("<inline>"))?;
        setup.base = PathBuf::from(".");
        Ok(setup)
    }

    /// Load a setup; data paths in its layers are relative to the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut setup: Self = decode(&read(path)?, path)?;
        setup.base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(setup)
    }

    /// Push the particle through every layer in order. Stops after the layer
    /// in which it ranges out.
    pub fn run(&self) -> Result<Vec<LayerExit>> {
        self.tolerances.validate()?;
        let mut energy = self.energy;
        let mut exits = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            let model = layer.model.build_in(&self.base)?;
            let name = layer.name.clone().unwrap_or_else(|| format!("layer {}", i + 1));
            let transit = if energy < model.emin() {
                // too slow for this model to describe, treat as stopped
                debug!(layer = %name, energy, emin = model.emin(), "entered below model domain");
                path::Transit {
                    energy: path::floor_energy(&model),
                    ranged_out: true,
                }
            } else {
                path::eout_with(&model, energy, layer.thickness, &self.tolerances)?
            };
            info!(layer = %name, energy = transit.energy, ranged_out = transit.ranged_out, "layer done");
            exits.push(LayerExit {
                name,
                model_type: model.model_type().to_string(),
                energy: transit.energy,
                ranged_out: transit.ranged_out,
            });
            if transit.ranged_out {
                break;
            }
            energy = transit.energy;
        }
        Ok(exits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builds_every_kind() {
        let cases = [
            (
                r#"
                kind = "tabulated"
                density = 1.0
                rows = [[1.0, 0.1], [2.0, 0.08], [5.0, 0.05]]
                "#,
                "Tabulated",
            ),
            (
                r#"
                kind = "bethe-bloch"
                projectile = "p"
                [[elements]]
                mass = 12.011
                z = 6.0
                density = 1.0e23
                mean-excitation = 78.0
                "#,
                "Bethe-Bloch",
            ),
            (
                r#"
                kind = "li-petrasso"
                projectile = "d"
                electron-temperature = 1.0
                collective = false
                [[species]]
                mass = 2.0
                charge = 1.0
                temperature = 1.0
                density = 1e24
                "#,
                "Li-Petrasso",
            ),
            (
                r#"
                kind = "grabowski"
                projectile = { mass = 4.0015, charge = 2.0 }
                electron-temperature = 0.5
                [[species]]
                mass = 2.0
                charge = 1.0
                temperature = 0.5
                density = 1e23
                "#,
                "Grabowski",
            ),
            (
                r#"
                kind = "zimmerman"
                projectile = "alpha"
                electron-temperature = 0.02
                [[species]]
                mass = 12.0
                z = 6.0
                temperature = 0.02
                density = 5e22
                zbar = 3.0
                "#,
                "Zimmerman",
            ),
            (
                r#"
                kind = "bps"
                projectile = "p"
                electron-temperature = 1.0
                [[species]]
                mass = 2.0
                charge = 1.0
                temperature = 1.0
                density = 1e24
                "#,
                "BPS",
            ),
            (
                r#"
                kind = "mehlhorn"
                projectile = "p"
                electron-temperature = 0.05
                mean-excitation = [120.0]
                [[species]]
                mass = 12.011
                z = 6.0
                temperature = 0.05
                density = 5e22
                zbar = 2.0
                "#,
                "Mehlhorn",
            ),
        ];
        for (text, model_type) in cases {
            let cfg = ModelConfig::from_toml(text).unwrap();
            let model = cfg.build().unwrap();
            assert_eq!(model.model_type(), model_type);
            let e = model.emin().max(1.0);
            assert!(model.dedx(e).unwrap() > 0.0, "{}", model_type);
        }
    }

    #[test]
    fn mode_and_floor_are_applied() {
        let cfg = ModelConfig::from_toml(
            r#"
            kind = "tabulated"
            density = 2.0
            rows = [[1.0, 0.1], [2.0, 0.08]]
            mode = "areal-density"
            ranged-out-floor = "emin"
            "#,
        )
        .unwrap();
        let model = cfg.build().unwrap();
        assert_eq!(model.mode(), Mode::ArealDensity);
        assert_eq!(model.ranged_out_floor(), RangedOutFloor::Emin);
        assert!(f64::abs(model.dedx(1.0).unwrap() - 0.5) < 1e-12);
    }

    #[test]
    fn mehlhorn_excitation_count_is_checked() {
        let cfg = ModelConfig::from_toml(
            r#"
            kind = "mehlhorn"
            projectile = "p"
            electron-temperature = 0.05
            mean-excitation = [120.0, 80.0]
            species = [{ mass = 12.011, z = 6.0, temperature = 0.05, density = 5e22, zbar = 2.0 }]
            "#,
        )
        .unwrap();
        assert!(matches!(cfg.build().err().unwrap(), Error::InvalidArgument(_)));
    }

    #[test]
    fn tabulated_needs_one_source() {
        let cfg = ModelConfig::from_toml("kind = \"tabulated\"\ndensity = 1.0\n").unwrap();
        assert!(matches!(cfg.build().err().unwrap(), Error::InvalidArgument(_)));
    }

    #[test]
    fn bad_documents_are_config_errors() {
        let err = ModelConfig::from_toml("kind = \"warp-drive\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        let err = ModelConfig::from_toml("kind = \"srim\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn unknown_projectile() {
        let cfg = ModelConfig::from_toml(
            r#"
            kind = "bethe-bloch"
            projectile = "muon"
            [[elements]]
            mass = 1.0
            z = 1.0
            density = 1e22
            "#,
        )
        .unwrap();
        assert!(matches!(cfg.build().err().unwrap(), Error::InvalidArgument(_)));
    }

    #[test]
    fn setup_runs_layers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("foil.txt");
        fs::write(&table, "1.0 0.2\n5.0 0.1\n20.0 0.05\n").unwrap();

        let mut setup = NamedTempFile::new_in(dir.path()).unwrap();
        write!(
            setup,
            r#"
            energy = 15.0

            [tolerances]
            rtol = 1e-9

            [[layer]]
            name = "window"
            thickness = 10.0
            model = {{ kind = "tabulated", path = "foil.txt", density = 1.0 }}

            [[layer]]
            thickness = 1000.0
            model = {{ kind = "tabulated", rows = [[0.5, 0.3], [20.0, 0.05]], density = 1.0 }}

            [[layer]]
            name = "never reached"
            thickness = 1.0
            model = {{ kind = "tabulated", rows = [[0.5, 0.3], [20.0, 0.05]], density = 1.0 }}
            "#
        )
        .unwrap();

        let cfg = SetupConfig::from_file(setup.path()).unwrap();
        assert_eq!(cfg.tolerances.rtol, 1e-9);
        assert_eq!(cfg.tolerances.max_steps, Tolerances::default().max_steps);

        let exits = cfg.run().unwrap();
        assert_eq!(exits.len(), 2);
        assert_eq!(exits[0].name, "window");
        assert!(exits[0].energy < 15.0 && exits[0].energy > 14.0);
        assert!(!exits[0].ranged_out);
        assert_eq!(exits[1].name, "layer 2");
        assert!(exits[1].ranged_out);
        assert_eq!(exits[1].energy, 0.0);
    }

    #[test]
    fn missing_setup_file() {
        let err = SetupConfig::from_file("/nonexistent/setup.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
