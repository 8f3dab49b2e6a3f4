//! Timer helpers for the cooperative event loop.

use std::time::Duration;

/// Suspends the calling task for `duration` without blocking the loop.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

/// Suspends the calling task for `duration` without blocking the loop.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_follows_the_runtime_clock() {
        let before = tokio::time::Instant::now();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(before.elapsed(), Duration::from_millis(500));
    }
}
