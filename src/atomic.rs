//! Projectile lookup.

use std::collections::HashMap;

use crate::constants::ME_AMU;

/// Source of projectile masses and charges.
pub trait AtomicData {
    /// (mass in amu, charge in units of e) for a projectile name.
    fn lookup(&self, id: &str) -> Option<(f64, f64)>;
}

lazy_static! {
    static ref LIGHT_IONS: HashMap<&'static str, (f64, f64)> = {
        let mut map = HashMap::new();
        map.insert("p", (1.007276467, 1.0));
        map.insert("d", (2.013553213, 1.0));
        map.insert("t", (3.015500716, 1.0));
        map.insert("3He", (3.014932247, 2.0));
        map.insert("4He", (4.001506179, 2.0));
        map.insert("e", (ME_AMU, -1.0));
        map
    };
}

/// Fusion products and fuel ions: `p`, `d`, `t`, `3He`, `4He` and `e`.
///
/// Aliases `H`, `D`, `T`, `He3`, `He4` and `alpha` are accepted too.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightIons;

impl AtomicData for LightIons {
    fn lookup(&self, id: &str) -> Option<(f64, f64)> {
        let key = match id {
            "H" | "proton" => "p",
            "D" => "d",
            "T" => "t",
            "He3" => "3He",
            "He4" | "alpha" => "4He",
            "electron" => "e",
            other => other,
        };
        LIGHT_IONS.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ions() {
        let (m, z) = LightIons.lookup("4He").unwrap();
        assert!(f64::abs(m - 4.0015) < 1e-4);
        assert_eq!(z, 2.0);
        assert_eq!(LightIons.lookup("alpha"), LightIons.lookup("4He"));
        assert_eq!(LightIons.lookup("D").unwrap().1, 1.0);
        assert!(LightIons.lookup("e").unwrap().0 < 1e-3);
        assert!(LightIons.lookup("U").is_none());
    }
}
