//! Cosmetic progress for the analysis wait.
//!
//! The backend reports nothing while it computes, so the waiting screen
//! shows a simulated value: a random nudge every tick, clamped below 100.

use std::time::Duration;

use rand::Rng;

use crate::core::timing;

/// Highest value the simulation ever shows.
pub const PROGRESS_CEILING: f64 = 95.0;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound (exclusive) of a single tick's increment.
pub const MAX_STEP: f64 = 3.0;

/// Progress values past which each backend step is shown as done:
/// cleaning, clustering, heatmap, funnel.
pub const STEP_THRESHOLDS: [f64; 4] = [10.0, 40.0, 70.0, 90.0];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CosmeticProgress {
    value: f64,
}

impl CosmeticProgress {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let step = rng.gen_range(0.0..MAX_STEP);
        self.value = (self.value + step).min(PROGRESS_CEILING);
        self.value
    }
}

pub fn steps_completed(progress: f64) -> usize {
    STEP_THRESHOLDS
        .iter()
        .filter(|threshold| progress > **threshold)
        .count()
}

/// Emits a new value every `interval` until the future is dropped.
pub async fn run_ticker<R: Rng>(interval: Duration, mut rng: R, mut emit: impl FnMut(f64)) {
    let mut progress = CosmeticProgress::default();
    loop {
        timing::sleep(interval).await;
        emit(progress.advance(&mut rng));
    }
}
