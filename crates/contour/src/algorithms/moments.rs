//! Polygon moments and Hu invariants.
//!
//! Spatial moments are integrated over the polygon enclosed by the contour
//! (Green's theorem over each edge), so they measure the filled shape and
//! not the point set.

use crate::types::Point;

/// Magnitude below which a Hu invariant is ignored during matching.
pub const HU_EPSILON: f64 = 1.0e-5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CentralMoments {
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,
}

impl Moments {
    /// Moments of the closed polygon through `points`.
    ///
    /// Orientation does not matter. Degenerate polygons (fewer than three
    /// points, or zero area) give all-zero moments.
    pub fn of_polygon(points: &[Point]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut a = [0.0f64; 10];
        let mut prev = points[points.len() - 1];
        for &cur in points {
            let (x0, y0) = (prev.x as f64, prev.y as f64);
            let (x1, y1) = (cur.x as f64, cur.y as f64);
            let dxy = x0 * y1 - x1 * y0;
            let xs = x0 + x1;
            let ys = y0 + y1;

            a[0] += dxy;
            a[1] += dxy * xs;
            a[2] += dxy * ys;
            a[3] += dxy * (x0 * xs + x1 * x1);
            a[4] += dxy * (x0 * (ys + y0) + x1 * (ys + y1));
            a[5] += dxy * (y0 * ys + y1 * y1);
            a[6] += dxy * xs * (x0 * x0 + x1 * x1);
            a[7] += dxy * (x0 * x0 * (3.0 * y0 + y1) + 2.0 * x1 * x0 * ys + x1 * x1 * (y0 + 3.0 * y1));
            a[8] += dxy * (y0 * y0 * (3.0 * x0 + x1) + 2.0 * y1 * y0 * xs + y1 * y1 * (x0 + 3.0 * x1));
            a[9] += dxy * ys * (y0 * y0 + y1 * y1);
            prev = cur;
        }

        if a[0].abs() <= f64::EPSILON {
            return Self::default();
        }

        let sign = a[0].signum();
        Self {
            m00: sign * a[0] / 2.0,
            m10: sign * a[1] / 6.0,
            m01: sign * a[2] / 6.0,
            m20: sign * a[3] / 12.0,
            m11: sign * a[4] / 24.0,
            m02: sign * a[5] / 12.0,
            m30: sign * a[6] / 20.0,
            m21: sign * a[7] / 60.0,
            m12: sign * a[8] / 60.0,
            m03: sign * a[9] / 20.0,
        }
    }

    pub fn centroid(&self) -> Option<(f64, f64)> {
        (self.m00 != 0.0).then(|| (self.m10 / self.m00, self.m01 / self.m00))
    }

    pub fn central(&self) -> CentralMoments {
        let Some((cx, cy)) = self.centroid() else {
            return CentralMoments::default();
        };

        let mu20 = self.m20 - self.m10 * cx;
        let mu11 = self.m11 - self.m10 * cy;
        let mu02 = self.m02 - self.m01 * cy;

        CentralMoments {
            mu20,
            mu11,
            mu02,
            mu30: self.m30 - cx * (3.0 * mu20 + cx * self.m10),
            mu21: self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20,
            mu12: self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02,
            mu03: self.m03 - cy * (3.0 * mu02 + cy * self.m01),
        }
    }

    /// Scale-normalized central moments, in the same field layout.
    pub fn normalized(&self) -> CentralMoments {
        if self.m00 == 0.0 {
            return CentralMoments::default();
        }
        let mu = self.central();
        let inv = 1.0 / self.m00.abs();
        let s2 = inv * inv;
        let s3 = s2 * inv.sqrt();

        CentralMoments {
            mu20: mu.mu20 * s2,
            mu11: mu.mu11 * s2,
            mu02: mu.mu02 * s2,
            mu30: mu.mu30 * s3,
            mu21: mu.mu21 * s3,
            mu12: mu.mu12 * s3,
            mu03: mu.mu03 * s3,
        }
    }

    /// The seven Hu invariants.
    pub fn hu(&self) -> [f64; 7] {
        let nu = self.normalized();

        let mut t0 = nu.mu30 + nu.mu12;
        let mut t1 = nu.mu21 + nu.mu03;
        let mut q0 = t0 * t0;
        let mut q1 = t1 * t1;
        let n4 = 4.0 * nu.mu11;
        let s = nu.mu20 + nu.mu02;
        let d = nu.mu20 - nu.mu02;

        let h0 = s;
        let h1 = d * d + n4 * nu.mu11;
        let h3 = q0 + q1;
        let h5 = d * (q0 - q1) + n4 * t0 * t1;

        t0 *= q0 - 3.0 * q1;
        t1 *= 3.0 * q0 - q1;

        q0 = nu.mu30 - 3.0 * nu.mu12;
        q1 = 3.0 * nu.mu21 - nu.mu03;

        let h2 = q0 * q0 + q1 * q1;
        let h4 = q0 * t0 + q1 * t1;
        let h6 = q1 * t0 - q0 * t1;

        [h0, h1, h2, h3, h4, h5, h6]
    }
}

/// `sign(h) * log10|h|`, or `None` when `|h|` is too small to compare.
pub fn log_hu(h: f64) -> Option<f64> {
    (h.abs() > HU_EPSILON).then(|| h.signum() * h.abs().log10())
}
