use std::time::{Duration, Instant};

/// Stage timings and storage counts of one simulated frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameProfile {
    pub anchor_time: Duration,
    pub pose_time: Duration,
    pub integrate_time: Duration,
    pub solve_time: Duration,
    pub orientation_time: Duration,
    pub write_back_time: Duration,
    pub total_frame_time: Duration,

    pub chain_count: usize,
    pub particle_count: usize,
    pub collider_count: usize,
    pub dormant_count: usize,
}

impl FrameProfile {
    /// Logs the frame summary and the share of each stage at debug level.
    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }
        let stage = |label: &str, time: Duration| {
            log::debug!(
                "  {label:<12} {:.3} ms ({:.1}%)",
                time.as_secs_f32() * 1000.0,
                time.as_micros() as f32 / total_us * 100.0
            );
        };

        log::debug!(
            "jiggle frame: {} chains ({} dormant), {} particles, {} colliders, {:.3} ms",
            self.chain_count,
            self.dormant_count,
            self.particle_count,
            self.collider_count,
            self.total_frame_time.as_secs_f32() * 1000.0
        );
        stage("anchor", self.anchor_time);
        stage("pose", self.pose_time);
        stage("integrate", self.integrate_time);
        stage("solve", self.solve_time);
        stage("orientation", self.orientation_time);
        stage("write-back", self.write_back_time);
    }
}

/// Runs `stage` and adds its wall time to `total`.
pub fn time_stage<R>(total: &mut Duration, stage: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let result = stage();
    *total += start.elapsed();
    result
}
