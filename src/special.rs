//! Special functions used by the plasma models.

use num_complex::Complex64;

/// Error function.
pub fn erf(x: f64) -> f64 {
    libm::erf(x)
}

// Modified Bessel functions of the first kind, polynomial fits valid for |x| <= 3.75
// (Abramowitz & Stegun 9.8.1, 9.8.3).
fn bessel_i0_small(x: f64) -> f64 {
    let y = (x / 3.75).powi(2);
    1.0 + y
        * (3.5156229
            + y * (3.0899424 + y * (1.2067492 + y * (0.2659732 + y * (0.360768e-1 + y * 0.45813e-2)))))
}

fn bessel_i1_small(x: f64) -> f64 {
    let y = (x / 3.75).powi(2);
    x * (0.5
        + y * (0.87890594
            + y * (0.51498869
                + y * (0.15084934 + y * (0.2658733e-1 + y * (0.301532e-2 + y * 0.32411e-3))))))
}

/// Modified Bessel function of the second kind, order 0 (A&S 9.8.5, 9.8.6).
/// Only defined for `x > 0`.
pub fn bessel_k0(x: f64) -> f64 {
    if x <= 2.0 {
        let y = x * x / 4.0;
        -(x / 2.0).ln() * bessel_i0_small(x)
            + (-0.57721566
                + y * (0.42278420
                    + y * (0.23069756
                        + y * (0.3488590e-1 + y * (0.262698e-2 + y * (0.10750e-3 + y * 0.74e-5))))))
    } else {
        let y = 2.0 / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (-0.7832358e-1
                    + y * (0.2189568e-1
                        + y * (-0.1062446e-1
                            + y * (0.587872e-2 + y * (-0.251540e-2 + y * 0.53208e-3))))))
    }
}

/// Modified Bessel function of the second kind, order 1 (A&S 9.8.7, 9.8.8).
/// Only defined for `x > 0`.
pub fn bessel_k1(x: f64) -> f64 {
    if x <= 2.0 {
        let y = x * x / 4.0;
        (x / 2.0).ln() * bessel_i1_small(x)
            + (1.0 / x)
                * (1.0
                    + y * (0.15443144
                        + y * (-0.67278579
                            + y * (-0.18156897
                                + y * (-0.1919402e-1 + y * (-0.110404e-2 + y * (-0.4686e-4)))))))
    } else {
        let y = 2.0 / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (0.23498619
                    + y * (-0.3655620e-1
                        + y * (0.1504268e-1
                            + y * (-0.780353e-2 + y * (0.325614e-2 + y * (-0.68245e-3)))))))
    }
}

/// Dawson's integral `F(x) = exp(-x^2) int_0^x exp(t^2) dt`, by Rybicki's
/// method with a series for small `|x|`.
pub fn dawson(x: f64) -> f64 {
    const H: f64 = 0.4;
    const NMAX: usize = 6;
    /// 1 / sqrt(pi)
    const A1: f64 = 0.5641895835;

    if x.abs() < 0.2 {
        let x2 = x * x;
        return x * (1.0 - 2.0 / 3.0 * x2 * (1.0 - 0.4 * x2 * (1.0 - 2.0 / 7.0 * x2)));
    }
    let xx = x.abs();
    let n0 = 2.0 * (0.5 * xx / H).round();
    let xp = xx - n0 * H;
    let mut e1 = (2.0 * xp * H).exp();
    let e2 = e1 * e1;
    let mut d1 = n0 + 1.0;
    let mut d2 = d1 - 2.0;
    let mut sum = 0.0;
    for i in 0..NMAX {
        let c = (-((2 * i + 1) as f64 * H).powi(2)).exp();
        sum += c * (e1 / d1 + 1.0 / (d2 * e1));
        d1 += 2.0;
        d2 -= 2.0;
        e1 *= e2;
    }
    (A1 * (-xp * xp).exp() * sum).copysign(x)
}

/// Real part of the digamma function on the line `1 + iy`.
///
/// Shifts the argument up by ten with the recurrence, then uses the
/// asymptotic series.
pub fn digamma_1piy_re(y: f64) -> f64 {
    const SHIFT: usize = 10;
    let w = Complex64::new((SHIFT + 1) as f64, y);
    let w2 = w * w;
    let asymptotic =
        w.ln() - 0.5 / w - 1.0 / (12.0 * w2) + 1.0 / (120.0 * w2 * w2) - 1.0 / (252.0 * w2 * w2 * w2);
    let recurrence: f64 = (1..=SHIFT)
        .map(|k| {
            let k = k as f64;
            k / (k * k + y * y)
        })
        .sum();
    asymptotic.re - recurrence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, rel: f64) -> bool {
        f64::abs(a - b) <= rel * f64::abs(b)
    }

    #[test]
    fn erf_values() {
        assert!(close(erf(0.5), 0.5204998778, 1e-9));
        assert!(close(erf(2.0), 0.9953222650, 1e-9));
        assert_eq!(erf(0.0), 0.0);
    }

    #[test]
    fn bessel_k_values() {
        assert!(close(bessel_k0(0.1), 2.4270690247, 1e-6));
        assert!(close(bessel_k0(1.0), 0.4210244382, 1e-6));
        assert!(close(bessel_k0(3.0), 0.0347395044, 1e-5));
        assert!(close(bessel_k1(0.1), 9.8538448191, 1e-6));
        assert!(close(bessel_k1(1.0), 0.6019072302, 1e-6));
        assert!(close(bessel_k1(3.0), 0.0401564311, 1e-5));
    }

    #[test]
    fn dawson_values() {
        assert_eq!(dawson(0.0), 0.0);
        assert!(close(dawson(0.1), 0.0993359924, 1e-8));
        assert!(close(dawson(1.0), 0.5380795069, 1e-6));
        assert!(close(dawson(2.5), 0.2230837221, 1e-6));
        assert!(close(dawson(-1.0), -0.5380795069, 1e-6));
        // series and Rybicki sum meet at 0.2
        assert!(close(dawson(0.2 - 1e-12), dawson(0.2 + 1e-12), 1e-6));
    }

    #[test]
    fn digamma_on_the_unit_line() {
        // psi(1) = -gamma
        assert!(close(digamma_1piy_re(0.0), -0.5772156649, 1e-9));
        // Re psi(1 + iy) = -gamma + y^2 sum 1/(n (n^2 + y^2))
        let y: f64 = 0.7;
        let series: f64 = (1..200_000)
            .map(|n| {
                let n = n as f64;
                1.0 / (n * (n * n + y * y))
            })
            .sum();
        assert!(close(digamma_1piy_re(y), -0.5772156649 + y * y * series, 1e-6));
        // large |y| approaches ln|y|
        assert!(f64::abs(digamma_1piy_re(1e4) - 1e4f64.ln()) < 1e-6);
        assert_eq!(digamma_1piy_re(3.0), digamma_1piy_re(-3.0));
    }

    #[test]
    fn bessel_k_is_continuous_at_the_fit_boundary() {
        let below = bessel_k0(2.0 - 1e-9);
        let above = bessel_k0(2.0 + 1e-9);
        assert!(close(below, above, 1e-6));
        let below = bessel_k1(2.0 - 1e-9);
        let above = bessel_k1(2.0 + 1e-9);
        assert!(close(below, above, 1e-6));
    }
}
