//! Loader for SRIM stopping-range output files.
//!
//! A SRIM table has a header (with the target density), a body of rows
//! `<E> <unit> <dE/dx elec> <dE/dx nuc> <range> ...` and a footer listing the
//! factors that convert the body's stopping unit to other units. Electronic and
//! nuclear stopping are summed, and the `keV / micron` factor takes the table to
//! MeV/um.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tabulated::Tabulated;

const KEY_DENSITY: &str = "Target Density";
const KEY_ION: &str = "Ion =";
const KEY_FOOTER: &str = "Multiply";

fn energy_scale(unit: &str) -> Option<f64> {
    match unit {
        "eV" => Some(1e-6),
        "keV" => Some(1e-3),
        "MeV" => Some(1.0),
        "GeV" => Some(1e3),
        _ => None,
    }
}

fn parse_number(line: usize, s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| Error::parse(line, format!("cannot parse number '{}'", s)))
}

/// Parse "Target Density =  2.7020E+00 g/cm3 = 6.0305E+22 atoms/cm3" into the
/// mass density in g/cm^3.
fn parse_density(line: usize, text: &str) -> Result<f64> {
    let part = text
        .split('=')
        .nth(1)
        .ok_or_else(|| Error::parse(line, "target density has no value"))?;
    let mut tokens = part.split_whitespace();
    let value = parse_number(line, tokens.next().unwrap_or(""))?;
    match tokens.next() {
        Some("g/cm3") => Ok(value),
        Some("kg/m3") => Ok(value * 1e-3),
        other => Err(Error::parse(
            line,
            format!("unknown density unit {:?}", other.unwrap_or("")),
        )),
    }
}

/// Build a tabulated model from the contents of a SRIM output file.
pub fn parse(text: &str) -> Result<Tabulated> {
    let mut rho = None;
    let mut ion = String::new();
    let mut table = Vec::new();
    let mut in_footer = false;
    let mut scale_kev_um = None;
    let mut scale_mev_mgcm2 = None;

    for (i, line) in text.lines().enumerate() {
        let n = i + 1;
        if line.contains(KEY_DENSITY) {
            rho = Some(parse_density(n, line)?);
            continue;
        }
        if line.contains(KEY_ION) && ion.is_empty() {
            ion = line.trim().to_string();
            continue;
        }
        if line.contains(KEY_FOOTER) {
            in_footer = true;
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }
        let value = match tokens[0].parse::<f64>() {
            Ok(v) => v,
            Err(_) => continue,
        };

        if in_footer {
            match tokens[1..].join(" ").as_str() {
                "keV / micron" => scale_kev_um = Some(value),
                "MeV / (mg/cm2)" => scale_mev_mgcm2 = Some(value),
                _ => {}
            }
        } else if let Some(scale) = energy_scale(tokens[1]) {
            if tokens.len() < 4 {
                return Err(Error::parse(n, "row needs electronic and nuclear stopping"));
            }
            let elec = parse_number(n, tokens[2])?;
            let nuc = parse_number(n, tokens[3])?;
            table.push((value * scale, elec + nuc));
        }
    }

    // missing keys are reported against the end of the text
    let last = text.lines().count();
    let rho = rho.ok_or_else(|| Error::parse(last, "no target density in SRIM header"))?;
    let scale_kev_um = scale_kev_um
        .ok_or_else(|| Error::parse(last, "no 'keV / micron' factor in SRIM footer"))?;
    let scale_mev_mgcm2 = scale_mev_mgcm2
        .ok_or_else(|| Error::parse(last, "no 'MeV / (mg/cm2)' factor in SRIM footer"))?;

    // the two footer factors must agree with the header density
    let implied = scale_mev_mgcm2 / (scale_kev_um * 1e-3);
    let expected = 10.0 / rho;
    if (implied - expected).abs() > 1e-3 * expected {
        warn!(implied, expected, "SRIM unit factors disagree with target density");
    }

    table.sort_by(|a, b| a.0.total_cmp(&b.0));
    let table = table
        .into_iter()
        .map(|(e, s)| (e, s * scale_kev_um * 1e-3))
        .collect::<Vec<_>>();
    debug!(rows = table.len(), rho, "parsed SRIM table");

    Ok(Tabulated::new(table, rho)?.with_description("SRIM", ion))
}

/// Load a SRIM output file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Tabulated> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}
