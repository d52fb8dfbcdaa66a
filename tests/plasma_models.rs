use dedx::constants::AMU;
use dedx::{
    Bps, Field, Grabowski, LiPetrasso, Mehlhorn, PartialField, PartialSpecies, Species,
    StoppingPower, Zimmerman,
};

const PROTON: f64 = 1.007276;

fn deuterium_plasma(t: f64, n: f64) -> Field {
    Field::with_electrons(vec![Species::new(2.0, 1.0, t, n)], t).unwrap()
}

#[test]
fn li_petrasso_is_continuous_through_the_thermal_region() {
    // a proton matches the electron thermal speed near 1.8 MeV at 1 keV
    let m = LiPetrasso::new(PROTON, 1.0, deuterium_plasma(1.0, 1e24)).unwrap();
    let mut e: f64 = 0.2;
    let mut last = m.dedx(e).unwrap();
    while e < 10.0 {
        e *= 1.002;
        let s = m.dedx(e.min(10.0)).unwrap();
        assert!(s > 0.0);
        assert!(f64::abs(s / last - 1.0) < 0.01, "jump at {} MeV: {} -> {}", e, last, s);
        last = s;
    }
}

#[test]
fn grabowski_is_continuous() {
    let m = Grabowski::new(PROTON, 1.0, deuterium_plasma(0.5, 1e23)).unwrap();
    let mut e = m.emin();
    let mut last = m.dedx(e).unwrap();
    while e < 10.0 {
        e *= 1.002;
        let s = m.dedx(e).unwrap();
        assert!(f64::abs(s / last - 1.0) < 0.01, "jump at {} MeV", e);
        last = s;
    }
}

#[test]
fn bps_is_continuous() {
    for &(t, n) in &[(1.0, 1e24), (0.5, 1e23)] {
        let m = Bps::new(PROTON, 1.0, deuterium_plasma(t, n)).unwrap();
        let mut e: f64 = 0.02;
        let mut last = m.dedx(e).unwrap();
        while e < 20.0 {
            e *= 1.01;
            let s = m.dedx(e).unwrap();
            assert!(s > 0.0, "dE/dx({}) = {}", e, s);
            assert!(f64::abs(s / last - 1.0) < 0.02, "jump at {} MeV: {} -> {}", e, last, s);
            last = s;
        }
    }
}

#[test]
fn mehlhorn_is_continuous() {
    let solid = 2.0 / (12.011 * AMU);
    let cases = [(solid, 0.001, 0.0), (5e22, 0.05, 3.0), (5e22, 0.05, 5.5)];
    for &(n, t, zbar) in &cases {
        let c = PartialSpecies::new(12.011, 6.0, t, n, zbar);
        let m = Mehlhorn::new(PROTON, 1.0, PartialField::new(vec![c], t).unwrap()).unwrap();
        let mut e: f64 = 0.1;
        let mut last = m.dedx(e).unwrap();
        while e < 30.0 {
            e *= 1.002;
            let s = m.dedx(e.min(30.0)).unwrap();
            assert!(s > 0.0);
            assert!(f64::abs(s / last - 1.0) < 0.01, "jump at {} MeV: {} -> {}", e, last, s);
            last = s;
        }
    }
}

#[test]
fn plasma_models_slow_a_proton_through_a_path() {
    let lp = LiPetrasso::new(PROTON, 1.0, deuterium_plasma(1.0, 1e24)).unwrap();
    let exit = lp.eout(14.7, 100.0).unwrap();
    assert!(!exit.ranged_out);
    assert!(exit.energy < 14.7 && exit.energy > 10.0);
    let back = lp.ein(exit.energy, 100.0).unwrap();
    assert!(f64::abs(back - 14.7) < 1e-5);

    let c = PartialSpecies::new(12.011, 6.0, 0.05, 5e22, 3.0);
    let mehlhorn = Mehlhorn::new(PROTON, 1.0, PartialField::new(vec![c], 0.05).unwrap()).unwrap();
    let exit = mehlhorn.eout(10.0, 100.0).unwrap();
    assert!(!exit.ranged_out && exit.energy < 10.0);
    let back = mehlhorn.ein(exit.energy, 100.0).unwrap();
    assert!(f64::abs(back - 10.0) < 1e-5);
}

#[test]
fn zimmerman_ionization_moves_stopping_from_bound_to_free() {
    let n = 5e22;
    let model = |zbar: f64| {
        let c = PartialSpecies::new(12.011, 6.0, 0.05, n, zbar);
        Zimmerman::new(PROTON, 1.0, PartialField::new(vec![c], 0.05).unwrap()).unwrap()
    };
    let neutral = model(0.0);
    let ionized = model(6.0);
    assert_eq!(neutral.dedx_free_electron(3.0).unwrap(), 0.0);
    assert_eq!(ionized.dedx_bound_electron(3.0).unwrap(), 0.0);
    assert!(neutral.dedx(3.0).unwrap() > 0.0);
    assert!(ionized.dedx(3.0).unwrap() > 0.0);
}

#[test]
fn plasma_mass_density_drives_areal_mode() {
    let mut m = LiPetrasso::new(PROTON, 1.0, deuterium_plasma(1.0, 1e24)).unwrap();
    let rho = m.density();
    assert!(rho > 3e-3 && rho < 4e-3, "rho = {}", rho);
    let length = m.dedx(5.0).unwrap();
    m.set_mode(dedx::Mode::ArealDensity);
    let areal = m.dedx(5.0).unwrap();
    assert!(f64::abs(length - areal * rho * 0.1) < 1e-12 * length);
}
