//! Timer helpers for racing waits against a deadline.

// self
use crate::_prelude::*;

/// Sleeps for `duration`.
pub async fn delay(duration: StdDuration) {
	tokio::time::sleep(duration).await;
}

/// Races `future` against a timer, failing with [`Error::TimedOut`] when the timer wins.
///
/// The raced future is dropped on timeout. Dropping an [`AsyncResult`](super::AsyncResult) wait
/// only abandons that waiter; the cell keeps serving every other waiter.
pub async fn timeout<F>(after: StdDuration, future: F) -> Result<F::Output>
where
	F: Future,
{
	tokio::time::timeout(after, future).await.map_err(|_| Error::TimedOut { after })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::sync::AsyncResult;

	#[tokio::test]
	async fn timeout_passes_through_ready_values() {
		let value = timeout(StdDuration::from_secs(1), async { 7 })
			.await
			.expect("Ready future should beat the timer.");

		assert_eq!(value, 7);
	}

	#[tokio::test]
	async fn timeout_fails_for_undelivered_cells_without_breaking_them() {
		let cell = AsyncResult::<String>::new();
		let err = timeout(StdDuration::from_millis(10), cell.wait())
			.await
			.expect_err("Undelivered cell should time out.");

		assert!(matches!(err, Error::TimedOut { after } if after == StdDuration::from_millis(10)));

		cell.deliver(Some("late".into()));

		let value = timeout(StdDuration::from_millis(10), cell.wait())
			.await
			.expect("Delivered cell should resolve immediately.");

		assert_eq!(value.as_deref(), Some("late"));
	}

	#[tokio::test]
	async fn delay_waits_at_least_the_duration() {
		let started = std::time::Instant::now();

		delay(StdDuration::from_millis(5)).await;

		assert!(started.elapsed() >= StdDuration::from_millis(5));
	}
}
