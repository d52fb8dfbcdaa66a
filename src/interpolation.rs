use self::InterpolationResult::*;

#[derive(PartialEq, Debug)]
pub enum InterpolationResult {
    InterpolatedValue(f64),
    OutOfRange,
    NoValue,
}

impl InterpolationResult {
    pub fn is_interp(&self) -> bool {
        match *self {
            InterpolatedValue(_) => true,
            _ => false,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        match *self {
            OutOfRange => true,
            _ => false,
        }
    }

    pub fn to_interp(&self) -> Option<f64> {
        match *self {
            InterpolatedValue(v) => Some(v),
            _ => None,
        }
    }
}

/// Remembers the table segment used by the previous lookup.
///
/// The path integrator sweeps energy monotonically, so consecutive lookups
/// almost always land in the same or an adjacent segment. A cursor is cheap to
/// create and belongs to a single sweep; it is never stored inside a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    segment: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self) -> Option<usize> {
        self.segment
    }

    pub fn reset(&mut self) {
        self.segment = None;
    }
}

fn contains(xs: &[f64], i: usize, x: f64) -> bool {
    xs[i] <= x && x <= xs[i + 1]
}

fn locate(x: f64, xs: &[f64], cursor: &mut Cursor) -> usize {
    let last = xs.len() - 2;
    if let Some(i) = cursor.segment.filter(|&i| i <= last) {
        if contains(xs, i, x) {
            return i;
        }
        if i > 0 && contains(xs, i - 1, x) {
            cursor.segment = Some(i - 1);
            return i - 1;
        }
        if i < last && contains(xs, i + 1, x) {
            cursor.segment = Some(i + 1);
            return i + 1;
        }
    }
    let j = xs.partition_point(|&v| v <= x);
    let i = j.saturating_sub(1).min(last);
    cursor.segment = Some(i);
    i
}

/// Linear interpolation in a table with strictly ascending `xs`.
///
/// Never extrapolates: `x` outside `[xs[0], xs[n-1]]` gives `OutOfRange`.
pub(crate) fn interpolate(
    x: f64,
    xs: &[f64],
    ys: &[f64],
    cursor: &mut Cursor,
) -> InterpolationResult {
    if xs.is_empty() || xs.len() != ys.len() {
        return NoValue;
    }
    if !(x >= xs[0] && x <= xs[xs.len() - 1]) {
        return OutOfRange;
    }
    if xs.len() == 1 {
        return InterpolatedValue(ys[0]);
    }

    let i = locate(x, xs, cursor);
    let (x0, x1, y0, y1) = (xs[i], xs[i + 1], ys[i], ys[i + 1]);
    if x == x1 {
        return InterpolatedValue(y1);
    }
    InterpolatedValue((y1 - y0) / (x1 - x0) * (x - x0) + y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation() {
        use super::InterpolationResult::*;
        use std::f64::EPSILON;

        let mut c = Cursor::new();

        let x = interpolate(0.0, &[], &[], &mut c);
        assert!(!x.is_interp());
        assert!(!x.is_out_of_range());
        assert_eq!(x, NoValue);

        let x = interpolate(0.0, &[0.0], &[1.0], &mut c);
        assert!(x.is_interp());
        assert!(f64::abs(x.to_interp().unwrap() - 1.0) < EPSILON);

        let x = interpolate(10.0, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(!x.is_interp());
        assert!(x.is_out_of_range());
        assert!(x.to_interp().is_none());

        let x = interpolate(210.0, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(x.is_out_of_range());

        let x = interpolate(100.0, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(f64::abs(x.to_interp().unwrap() - 3.0) < EPSILON);

        let x = interpolate(200.0, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(f64::abs(x.to_interp().unwrap() - 4.0) < EPSILON);

        let x = interpolate(150.0, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(f64::abs(x.to_interp().unwrap() - 3.5) < EPSILON);

        let x = interpolate(f64::NAN, &[100.0, 200.0], &[3.0, 4.0], &mut c);
        assert!(x.is_out_of_range());
    }

    #[test]
    fn cursor_follows_a_descending_sweep() {
        let xs: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x).collect();
        let mut c = Cursor::new();

        let mut x = 98.5;
        while x > 0.0 {
            let v = interpolate(x, &xs, &ys, &mut c).to_interp().unwrap();
            assert!(f64::abs(v - 2.0 * x) < 1e-12);
            assert_eq!(c.segment(), Some(x.floor() as usize));
            x -= 0.25;
        }
    }

    #[test]
    fn stale_cursor_falls_back_to_search() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [1.0, 1.0, 1.0, 1.0, 2.0];
        let mut c = Cursor::new();
        interpolate(1.5, &xs, &ys, &mut c);
        assert_eq!(c.segment(), Some(0));
        let v = interpolate(4.5, &xs, &ys, &mut c).to_interp().unwrap();
        assert!(f64::abs(v - 1.5) < 1e-12);
        assert_eq!(c.segment(), Some(3));
        c.reset();
        assert_eq!(c.segment(), None);
    }
}
