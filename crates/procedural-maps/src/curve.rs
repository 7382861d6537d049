//! Keyframed response curves with cubic Hermite segments.

use serde::Deserialize;

/// One curve keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub x: f64,
    pub value: f64,
    pub in_tangent: f64,
    pub out_tangent: f64,
}

impl Keyframe {
    pub fn new(x: f64, value: f64, in_tangent: f64, out_tangent: f64) -> Self {
        Self {
            x,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// A keyframe with flat tangents.
    pub fn flat(x: f64, value: f64) -> Self {
        Self::new(x, value, 0.0, 0.0)
    }
}

/// A piecewise cubic Hermite curve. Outside the keyed range the curve holds
/// the first/last value.
///
/// Deserializes from a list of `[x, value]` or
/// `[x, value, in_tangent, out_tangent]` entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>")]
pub struct HermiteCurve {
    keys: Vec<Keyframe>,
}

impl HermiteCurve {
    /// Build a curve; keys are sorted by `x`.
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { keys }
    }

    /// A curve that is `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![Keyframe::flat(0.0, value), Keyframe::flat(1.0, value)])
    }

    /// Smooth fall from 1 at `start` to 0 at `end`.
    pub fn ease_out(start: f64, end: f64) -> Self {
        Self::new(vec![Keyframe::flat(start, 1.0), Keyframe::flat(end, 0.0)])
    }

    /// Smooth rise from 0 at `rise_start` to 1 at `rise_end`, held until
    /// `fall_start`, then back to 0 at `fall_end`.
    pub fn plateau(rise_start: f64, rise_end: f64, fall_start: f64, fall_end: f64) -> Self {
        Self::new(vec![
            Keyframe::flat(rise_start, 0.0),
            Keyframe::flat(rise_end, 1.0),
            Keyframe::flat(fall_start, 1.0),
            Keyframe::flat(fall_end, 0.0),
        ])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= first.x {
            return first.value;
        }
        if x >= last.x {
            return last.value;
        }

        // first key with x > query; guaranteed in 1..len here
        let i = self.keys.partition_point(|k| k.x <= x);
        let k0 = &self.keys[i - 1];
        let k1 = &self.keys[i];

        let dt = k1.x - k0.x;
        let t = (x - k0.x) / dt;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

impl TryFrom<Vec<Vec<f64>>> for HermiteCurve {
    type Error = String;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        if rows.is_empty() {
            return Err("curve needs at least one keyframe".to_string());
        }
        let keys = rows
            .into_iter()
            .map(|row| match row.as_slice() {
                [x, v] => Ok(Keyframe::flat(*x, *v)),
                [x, v, i, o] => Ok(Keyframe::new(*x, *v, *i, *o)),
                other => Err(format!(
                    "keyframe must have 2 or 4 numbers, got {}",
                    other.len()
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if keys.iter().any(|k| !k.x.is_finite() || !k.value.is_finite()) {
            return Err("keyframe values must be finite".to_string());
        }
        Ok(Self::new(keys))
    }
}
