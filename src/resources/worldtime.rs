//! Simulation clock.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds simulated so far.
    pub elapsed: f32,
    /// Scaled length of the last pass.
    pub delta: f32,
    pub time_scale: f32,
    /// Passes run so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(time_scale: f32) -> Self {
        WorldTime {
            time_scale,
            ..Default::default()
        }
    }

    /// `dt` as the systems see it, without recording anything.
    pub fn scaled(&self, dt: f32) -> f32 {
        dt * self.time_scale
    }

    /// Apply `time_scale` to the unscaled `dt`, record it and return it.
    pub fn tick(&mut self, dt: f32) -> f32 {
        let scaled_dt = self.scaled(dt);
        self.elapsed += scaled_dt;
        self.delta = scaled_dt;
        self.frame_count += 1;
        scaled_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scales_and_counts() {
        let mut time = WorldTime::with_time_scale(0.5);
        let dt = time.tick(0.2);
        assert!((dt - 0.1).abs() < 1e-6);
        time.tick(0.2);
        assert!((time.elapsed - 0.2).abs() < 1e-6);
        assert!((time.delta - 0.1).abs() < 1e-6);
        assert_eq!(time.frame_count, 2);
    }

    #[test]
    fn scaled_does_not_count() {
        let time = WorldTime::with_time_scale(2.0);
        assert!((time.scaled(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(time, WorldTime::with_time_scale(2.0));
    }
}
