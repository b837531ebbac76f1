//! Natural cubic spline
//!
//! A [`Spline`] collects control points with strictly increasing x while
//! open. Closing it solves for the natural cubic spline through the points
//! (second derivative zero at both ends) and makes it ready for
//! interpolation. Reopening keeps the points so more can be appended and
//! the spline closed again.
//!
//! Each segment `i` evaluates as
//! `y[i] + dx * (q[i] + dx * (r[i] + dx * s[i]))` with `dx = x - x[i]`.

/// Control point with its segment coefficients
#[derive(Debug, Clone, Copy, Default)]
struct Knot {
    x: f64,
    y: f64,
    q: f64,
    r: f64,
    s: f64,
}

/// Piecewise cubic interpolator
#[derive(Debug, Clone, Default)]
pub struct Spline {
    knots: Vec<Knot>,
    closed: bool,
}

impl Spline {
    /// Create an empty, open spline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control point.
    ///
    /// Returns `false` if the spline is closed, either value is not finite
    /// or `x` does not exceed the previous point's x.
    pub fn add_point(&mut self, x: f64, y: f64) -> bool {
        if self.closed || !x.is_finite() || !y.is_finite() {
            return false;
        }
        if self.knots.last().is_some_and(|k| x <= k.x) {
            return false;
        }
        self.knots.push(Knot {
            x,
            y,
            ..Knot::default()
        });
        true
    }

    /// Number of control points.
    pub fn num_points(&self) -> usize {
        self.knots.len()
    }

    /// Control point by zero-based index.
    pub fn point(&self, index: usize) -> Option<(f64, f64)> {
        self.knots.get(index).map(|k| (k.x, k.y))
    }

    pub fn first_point(&self) -> Option<(f64, f64)> {
        self.knots.first().map(|k| (k.x, k.y))
    }

    pub fn last_point(&self) -> Option<(f64, f64)> {
        self.knots.last().map(|k| (k.x, k.y))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Compute the segment coefficients and make the spline ready for
    /// interpolation.
    ///
    /// Needs at least two points. Two points give a straight line. Closing
    /// an already closed spline succeeds without recomputing.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return true;
        }
        let m = self.knots.len();
        if m < 2 {
            return false;
        }
        let v = &mut self.knots;
        if m == 2 {
            v[0].q = (v[1].y - v[0].y) / (v[1].x - v[0].x);
            v[0].r = 0.0;
            v[0].s = 0.0;
            v[1].q = 0.0;
            v[1].r = 0.0;
            v[1].s = 0.0;
            self.closed = true;
            return true;
        }

        let n = m - 1;
        let mut h = vec![0.0f64; m];
        let mut b = vec![0.0f64; m];
        let mut d = vec![0.0f64; m];
        let mut g = vec![0.0f64; m];
        let mut u = vec![0.0f64; m];

        // interval widths and the right-hand side of the tridiagonal system
        h[0] = v[1].x - v[0].x;
        for i in 1..n {
            h[i] = v[i + 1].x - v[i].x;
            b[i] = 2.0 * (h[i] + h[i - 1]);
            d[i] = 3.0 * ((v[i + 1].y - v[i].y) / h[i] - (v[i].y - v[i - 1].y) / h[i - 1]);
        }

        // forward elimination
        g[1] = h[1] / b[1];
        u[1] = d[1] / b[1];
        for i in 2..n - 1 {
            let l = b[i] - h[i - 1] * g[i - 1];
            g[i] = h[i] / l;
            u[i] = (d[i] - h[i - 1] * u[i - 1]) / l;
        }
        let i = n - 1;
        u[i] = (d[i] - h[i - 1] * u[i - 1]) / (b[i] - h[i - 1] * g[i - 1]);

        // back substitution
        v[n].r = 0.0;
        v[n - 1].r = u[n - 1];
        for i in (1..n - 1).rev() {
            v[i].r = u[i] - g[i] * v[i + 1].r;
        }
        v[0].r = 0.0;

        for i in 0..n {
            v[i].q = (v[i + 1].y - v[i].y) / h[i] - h[i] * (v[i + 1].r + 2.0 * v[i].r) / 3.0;
            v[i].s = (v[i + 1].r - v[i].r) / (3.0 * h[i]);
        }
        v[n].q = 0.0;
        v[n].s = 0.0;

        self.closed = true;
        true
    }

    /// Return to the open state, keeping the points.
    pub fn reopen(&mut self) {
        self.closed = false;
    }

    /// Evaluate the spline at `x`.
    ///
    /// Returns NaN while open. Outside the control points the first or last
    /// y is returned.
    pub fn interpolate(&self, x: f64) -> f64 {
        if !self.closed {
            return f64::NAN;
        }
        let (first, last) = match (self.knots.first(), self.knots.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return f64::NAN,
        };
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        // last knot with knot.x <= x; always before the final knot here
        let i = self.knots.partition_point(|k| k.x <= x) - 1;
        let k = &self.knots[i];
        let dx = x - k.x;
        k.y + dx * (k.q + dx * (k.r + dx * k.s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_point_rules() {
        let mut spl = Spline::new();
        assert!(spl.add_point(0.0, 0.0));
        assert!(!spl.add_point(0.0, 1.0));
        assert!(!spl.add_point(-1.0, 1.0));
        assert!(!spl.add_point(f64::NAN, 1.0));
        assert!(!spl.add_point(2.0, f64::INFINITY));
        assert!(spl.add_point(1.0, 1.0));
        assert_eq!(spl.num_points(), 2);
        assert_eq!(spl.point(1), Some((1.0, 1.0)));
        assert_eq!(spl.point(2), None);
    }

    #[test]
    fn test_close_needs_two_points() {
        let mut spl = Spline::new();
        assert!(!spl.close());
        spl.add_point(0.5, 0.5);
        assert!(!spl.close());
        assert!(spl.interpolate(0.5).is_nan());
    }

    #[test]
    fn test_linear_two_points() {
        let mut spl = Spline::new();
        spl.add_point(0.0, 1.0);
        spl.add_point(2.0, 0.0);
        assert!(spl.close());
        assert!(spl.is_closed());
        assert!(!spl.add_point(3.0, 0.0));
        assert_eq!(spl.interpolate(1.0), 0.5);
        assert_eq!(spl.interpolate(0.5), 0.75);
        assert_eq!(spl.interpolate(-3.0), 1.0);
        assert_eq!(spl.interpolate(5.0), 0.0);
    }

    #[test]
    fn test_cubic_passes_through_points() {
        let pts = [(0.0, 0.0), (0.25, 0.4), (0.5, 0.5), (0.8, 0.9), (1.0, 1.0)];
        let mut spl = Spline::new();
        for (x, y) in pts {
            assert!(spl.add_point(x, y));
        }
        assert!(spl.close());
        for (x, y) in pts {
            assert!((spl.interpolate(x) - y).abs() < 1e-12, "at {x}");
        }
        let mid = spl.interpolate(0.1);
        assert!(mid > 0.0 && mid < 0.4);
    }

    #[test]
    fn test_collinear_points_stay_linear() {
        let mut spl = Spline::new();
        for i in 0..=4 {
            spl.add_point(i as f64, 2.0 * i as f64);
        }
        assert!(spl.close());
        assert!((spl.interpolate(1.5) - 3.0).abs() < 1e-12);
        assert!((spl.interpolate(3.25) - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_reopen_keeps_points() {
        let mut spl = Spline::new();
        spl.add_point(0.0, 0.0);
        spl.add_point(1.0, 1.0);
        assert!(spl.close());
        spl.reopen();
        assert!(!spl.is_closed());
        assert!(spl.interpolate(0.5).is_nan());
        assert!(spl.add_point(2.0, 0.0));
        assert!(spl.close());
        assert_eq!(spl.interpolate(0.0), 0.0);
        assert_eq!(spl.interpolate(2.0), 0.0);
        assert_eq!(spl.last_point(), Some((2.0, 0.0)));
    }
}
