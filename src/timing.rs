//! Lightweight step timing for ad-hoc performance logging.
//!
//! [`StepTimer`] reports the time since its previous step and since it was created, tagged with a
//! traffic-light marker picked from three thresholds. Lines are emitted through the `tracing`
//! feature and also returned so callers can route them elsewhere.

// std
use std::time::Instant;
// self
use crate::{_prelude::*, obs};

/// Millisecond clock used by [`StepTimer`].
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Marker thresholds used by [`timing_message`].
pub const MESSAGE_THRESHOLDS: [u64; 3] = [50, 125, 250];
/// Marker thresholds used by [`StepTimer::new`].
pub const STEP_THRESHOLDS: [u64; 3] = [10, 30, 60];
/// Prefix used by [`timing_message`].
pub const DEFAULT_PREFIX: &str = "⏱";

/// Clock counting milliseconds since the call, from a monotonic source.
pub fn monotonic_clock() -> Clock {
	let origin = Instant::now();

	Arc::new(move || u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// `prefix` followed by 🟢, 🟡, 🔴, or 💩 depending on which threshold `ms` stays under.
pub fn timing_marker(ms: u64, prefix: &str, thresholds: [u64; 3]) -> String {
	let marker = if ms < thresholds[0] {
		"🟢"
	} else if ms < thresholds[1] {
		"🟡"
	} else if ms < thresholds[2] {
		"🔴"
	} else {
		"💩"
	};

	format!("{prefix}{marker}")
}

/// One-line timing summary, e.g. `⏱🟡 [80ms] startup cache warm`.
pub fn timing_message(subsystem: &str, ms: u64, extra: Option<&str>) -> String {
	let marker = timing_marker(ms, DEFAULT_PREFIX, MESSAGE_THRESHOLDS);

	match extra {
		Some(extra) => format!("{marker} [{ms}ms] {subsystem} {extra}"),
		None => format!("{marker} [{ms}ms] {subsystem}"),
	}
}

/// Current local wall-clock time as `HH:MM:SS.mmm`, falling back to UTC when the local offset
/// is unavailable.
pub fn timing_string() -> String {
	let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());

	format!("{:02}:{:02}:{:02}.{:03}", now.hour(), now.minute(), now.second(), now.millisecond())
}

/// Reports elapsed time per step.
///
/// ```
/// let mut timer = apiclient::timing::StepTimer::new(Some("boot"));
/// let line = timer.step(Some("config"));
///
/// assert!(line.contains("[boot]"));
/// assert!(line.contains("Step (#1) config"));
/// ```
pub struct StepTimer {
	scope: Option<String>,
	thresholds: [u64; 3],
	clock: Clock,
	start: u64,
	last: u64,
	count: u64,
}
impl StepTimer {
	/// Starts a timer on the monotonic clock with [`STEP_THRESHOLDS`].
	pub fn new(scope: Option<&str>) -> Self {
		Self::with_clock(scope, STEP_THRESHOLDS, monotonic_clock())
	}

	/// Starts a timer on `clock`; the first reading becomes the start time.
	pub fn with_clock(scope: Option<&str>, thresholds: [u64; 3], clock: Clock) -> Self {
		let start = clock();

		Self { scope: scope.map(ToOwned::to_owned), thresholds, clock, start, last: start, count: 1 }
	}

	/// Records a step and returns its log line.
	pub fn step(&mut self, name: Option<&str>) -> String {
		let now = (self.clock)();
		let current = now.saturating_sub(self.last);
		let total = now.saturating_sub(self.start);
		let prefix = self.scope.as_ref().map(|scope| format!("[{scope}] ")).unwrap_or_default();
		let name = name.map(|name| format!(" {name}")).unwrap_or_default();
		let line = format!(
			"{} {} Step (#{}){name}  current: {current}ms  total: {total}ms",
			timing_string(),
			timing_marker(current, &prefix, self.thresholds),
			self.count,
		);

		obs::trace_step(self.scope.as_deref(), self.count, current, total, &line);

		self.last = now;
		self.count += 1;

		line
	}

	/// Number of the next step.
	pub fn next_step(&self) -> u64 {
		self.count
	}
}
impl Debug for StepTimer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StepTimer")
			.field("scope", &self.scope)
			.field("thresholds", &self.thresholds)
			.field("count", &self.count)
			.finish_non_exhaustive()
	}
}
