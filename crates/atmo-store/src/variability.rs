//! Smooth random gusting applied on top of sampled wind.

use atmo_common::Vector3;
use atmo_interp::lerp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jumps larger than this many intervals restart the sequence instead of
/// stepping through every skipped sample.
const MAX_CATCH_UP_STEPS: f64 = 1024.0;

/// Per-axis wind factors that drift between random targets.
///
/// Every `interval` seconds a new random target in `[-1, 1]` is drawn per
/// axis; in between, the factor moves linearly from the previous target to
/// the next. The factor returned is `1 + amplitude · u`. The sequence is
/// fully determined by the seed and the times queried; querying a time
/// earlier than the last one restarts it from the seed.
#[derive(Debug, Clone)]
pub struct WindVariability {
    seed: u64,
    amplitude: Vector3,
    interval: f64,
    rng: StdRng,
    previous: Vector3,
    next: Vector3,
    window_start: f64,
    last_time: Option<f64>,
}

impl WindVariability {
    /// `interval` is clamped to at least one second.
    pub fn new(seed: u64, amplitude: Vector3, interval: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let previous = draw(&mut rng);
        let next = draw(&mut rng);
        Self {
            seed,
            amplitude,
            interval: if interval.is_finite() { interval.max(1.0) } else { 1.0 },
            rng,
            previous,
            next,
            window_start: 0.0,
            last_time: None,
        }
    }

    /// Restart the sequence with its first window at `time`.
    pub fn reset(&mut self, time: f64) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.previous = draw(&mut self.rng);
        self.next = draw(&mut self.rng);
        self.window_start = time;
        self.last_time = Some(time);
    }

    /// Multiplicative factors for each wind axis at `time`.
    pub fn factors(&mut self, time: f64) -> Vector3 {
        if !time.is_finite() {
            return Vector3::repeat(1.0);
        }
        match self.last_time {
            Some(last) if time >= last => {}
            _ => self.reset(time),
        }
        if (time - self.window_start) / self.interval > MAX_CATCH_UP_STEPS {
            self.reset(time);
        }
        while time >= self.window_start + self.interval {
            self.previous = self.next;
            self.next = draw(&mut self.rng);
            self.window_start += self.interval;
        }
        self.last_time = Some(time);

        let t = ((time - self.window_start) / self.interval).clamp(0.0, 1.0);
        Vector3::from_fn(|i, _| 1.0 + self.amplitude[i] * lerp(self.previous[i], self.next[i], t))
    }

    /// `wind` scaled component-wise by [`factors`](Self::factors).
    pub fn apply(&mut self, wind: Vector3, time: f64) -> Vector3 {
        wind.component_mul(&self.factors(time))
    }
}

fn draw(rng: &mut StdRng) -> Vector3 {
    Vector3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    )
}
