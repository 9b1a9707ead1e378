//! Length-normalised response curves used to distribute per-particle parameters.

use serde::{Deserialize, Serialize};

/// A curve key with Hermite tangents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl Keyframe {
    /// A flat key (both tangents zero).
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

/// Piecewise cubic Hermite curve. Evaluation clamps to the first/last key outside the key range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseCurve {
    keys: Vec<Keyframe>,
}

impl ResponseCurve {
    /// Builds a curve from keys in any order.
    pub fn from_keys(mut keys: Vec<Keyframe>) -> Self {
        keys.retain(|key| key.time.is_finite() && key.value.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Builds a polyline-like curve whose tangents follow the neighbouring segment slopes.
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        let mut keys: Vec<Keyframe> = points.iter().map(|&(t, v)| Keyframe::new(t, v)).collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));

        for i in 0..keys.len() {
            let slope_in = (i > 0).then(|| segment_slope(&keys[i - 1], &keys[i]));
            let slope_out = (i + 1 < keys.len()).then(|| segment_slope(&keys[i], &keys[i + 1]));
            keys[i].in_tangent = slope_in.or(slope_out).unwrap_or(0.0);
            keys[i].out_tangent = slope_out.or(slope_in).unwrap_or(0.0);
        }

        Self::from_keys(keys)
    }

    /// Straight line from `start` at 0 to `end` at 1.
    pub fn linear(start: f32, end: f32) -> Self {
        Self::from_points(&[(0.0, start), (1.0, end)])
    }

    pub fn constant(value: f32) -> Self {
        Self::from_keys(vec![Keyframe::new(0.0, value)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Samples the curve. An empty curve evaluates to 1.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 1.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        let upper = self.keys.partition_point(|key| key.time <= t);
        let k0 = &self.keys[upper - 1];
        let k1 = &self.keys[upper];
        hermite(k0, k1, t)
    }
}

fn segment_slope(a: &Keyframe, b: &Keyframe) -> f32 {
    let dt = b.time - a.time;
    if dt.abs() < f32::EPSILON {
        0.0
    } else {
        (b.value - a.value) / dt
    }
}

fn hermite(k0: &Keyframe, k1: &Keyframe, t: f32) -> f32 {
    let dt = k1.time - k0.time;
    if dt <= f32::EPSILON {
        return k1.value;
    }
    let s = (t - k0.time) / dt;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_curve_interpolates_exactly() {
        let curve = ResponseCurve::linear(1.0, 0.0);
        assert_abs_diff_eq!(curve.evaluate(0.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.evaluate(0.25), 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(curve.evaluate(1.0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn evaluation_clamps_outside_key_range() {
        let curve = ResponseCurve::from_points(&[(0.2, 2.0), (0.8, 4.0)]);
        assert_eq!(curve.evaluate(-1.0), 2.0);
        assert_eq!(curve.evaluate(5.0), 4.0);
    }

    #[test]
    fn flat_keys_ease_between_values() {
        let curve = ResponseCurve::from_keys(vec![Keyframe::new(1.0, 1.0), Keyframe::new(0.0, 0.0)]);
        assert_abs_diff_eq!(curve.evaluate(0.5), 0.5, epsilon = 1e-6);
        assert!(curve.evaluate(0.1) < 0.1);
    }

    #[test]
    fn empty_curve_is_neutral() {
        let curve = ResponseCurve::default();
        assert!(curve.is_empty());
        assert_eq!(curve.evaluate(0.3), 1.0);
    }
}
