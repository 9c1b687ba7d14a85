//! In-process sliding-window limiter keyed by client identifier.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	limit::{RateLimitDecision, RateLimitPolicy, RateLimiterConfig, RetryDirective},
	obs::{self, GuardOp, GuardOutcome, GuardSpan},
};

/// Thread-safe sliding-window limiter shared by every handler in the process.
///
/// Each key keeps the instants of its admitted calls inside the trailing window; stale
/// instants are purged lazily the next time the key is checked. Once more than
/// `max_unique_keys` keys are tracked, the key inserted first is evicted (insertion order,
/// not recency of use) and its quota starts over.
///
/// Clones share the same state, so construct one limiter per process and hand out clones.
#[derive(Clone)]
pub struct RateLimiter {
	interval: Duration,
	max_unique_keys: usize,
	clock: Arc<dyn Clock>,
	state: Arc<Mutex<WindowState>>,
}
impl RateLimiter {
	/// Creates a limiter that reads the system clock.
	pub fn new(config: RateLimiterConfig) -> Result<Self> {
		Self::with_clock(config, clock::system())
	}

	/// Creates a limiter that reads time from `clock`.
	pub fn with_clock(config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
		config.validate()?;

		Ok(Self {
			interval: config.interval(),
			max_unique_keys: config.max_unique_keys,
			clock,
			state: Default::default(),
		})
	}

	/// Decides whether `key` may perform another call under `limit` calls per window.
	///
	/// Admitted calls are recorded; rejected calls are not. A `limit` of zero rejects every
	/// call.
	pub fn check(&self, limit: u32, key: &str) -> RateLimitDecision {
		let _span = GuardSpan::new(GuardOp::RateLimit, "check").entered();
		let now = self.clock.now();
		let (decision, evicted) =
			self.state.lock().check(limit, key, now, self.interval, self.max_unique_keys);

		if let Some(evicted) = evicted {
			obs::guard_debug!(evicted = %evicted, "Key ceiling reached; evicted oldest key.");

			#[cfg(not(feature = "tracing"))]
			let _ = evicted;
		}

		match &decision {
			RateLimitDecision::Allow { .. } => {
				obs::record_guard_outcome(GuardOp::RateLimit, GuardOutcome::Success);
			},
			RateLimitDecision::Reject(directive) => {
				obs::guard_debug!(
					key,
					limit,
					retry_after_seconds = directive.retry_after_seconds,
					"Quota exhausted."
				);

				#[cfg(not(feature = "tracing"))]
				let _ = directive;

				obs::record_guard_outcome(GuardOp::RateLimit, GuardOutcome::Rejected);
			},
		}

		decision
	}

	/// Reports how many calls `key` could still make right now, without recording one.
	pub fn peek(&self, limit: u32, key: &str) -> u32 {
		let cutoff = window_start(self.clock.now(), self.interval);
		let guard = self.state.lock();
		let used = guard
			.records
			.get(key)
			.map_or(0, |window| window.iter().filter(|at| in_window(**at, cutoff)).count());

		limit.saturating_sub(u32::try_from(used).unwrap_or(u32::MAX))
	}

	/// Number of distinct keys currently tracked.
	pub fn tracked_keys(&self) -> usize {
		self.state.lock().records.len()
	}

	/// Trailing window length.
	pub fn interval(&self) -> Duration {
		self.interval
	}
}
impl RateLimitPolicy for RateLimiter {
	fn evaluate(&self, limit: u32, key: &str) -> RateLimitDecision {
		self.check(limit, key)
	}
}
impl Debug for RateLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter")
			.field("interval", &self.interval)
			.field("max_unique_keys", &self.max_unique_keys)
			.field("tracked_keys", &self.tracked_keys())
			.finish()
	}
}

const LATEST_INSTANT: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();

/// Lookup table paired with the order in which keys were first stored.
#[derive(Debug, Default)]
struct WindowState {
	records: HashMap<String, VecDeque<OffsetDateTime>>,
	insertion_order: VecDeque<String>,
}
impl WindowState {
	fn check(
		&mut self,
		limit: u32,
		key: &str,
		now: OffsetDateTime,
		interval: Duration,
		max_unique_keys: usize,
	) -> (RateLimitDecision, Option<String>) {
		let cutoff = window_start(now, interval);
		let used = match self.records.get_mut(key) {
			Some(window) => {
				window.retain(|at| in_window(*at, cutoff));

				window.len()
			},
			None => 0,
		};

		if used >= limit as usize {
			let oldest = self
				.records
				.get(key)
				.and_then(|window| window.iter().min().copied())
				.unwrap_or(now);
			let earliest_retry_at = oldest.checked_add(interval).unwrap_or(LATEST_INSTANT);

			return (RateLimitDecision::Reject(RetryDirective::new(earliest_retry_at, now)), None);
		}

		match self.records.get_mut(key) {
			Some(window) => window.push_back(now),
			None => {
				self.records.insert(key.to_owned(), VecDeque::from([now]));
				self.insertion_order.push_back(key.to_owned());
			},
		}

		let evicted =
			if self.records.len() > max_unique_keys { self.evict_first_inserted() } else { None };
		let remaining = limit - u32::try_from(used + 1).unwrap_or(limit);

		(RateLimitDecision::Allow { remaining }, evicted)
	}

	fn evict_first_inserted(&mut self) -> Option<String> {
		let key = self.insertion_order.pop_front()?;

		self.records.remove(&key);

		Some(key)
	}
}

// A call at `t` still counts while `now - t < interval`. `None` means the window reaches past the
// earliest representable instant, so nothing is stale yet.
fn window_start(now: OffsetDateTime, interval: Duration) -> Option<OffsetDateTime> {
	now.checked_sub(interval)
}

fn in_window(at: OffsetDateTime, cutoff: Option<OffsetDateTime>) -> bool {
	cutoff.is_none_or(|cutoff| at > cutoff)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const T0: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

	fn run(
		state: &mut WindowState,
		limit: u32,
		key: &str,
		now: OffsetDateTime,
	) -> (RateLimitDecision, Option<String>) {
		state.check(limit, key, now, Duration::minutes(1), 2)
	}

	#[test]
	fn stale_entries_are_purged_on_access() {
		let mut state = WindowState::default();

		run(&mut state, 5, "ip", T0);
		run(&mut state, 5, "ip", T0 + Duration::seconds(20));
		run(&mut state, 5, "ip", T0 + Duration::seconds(70));

		assert_eq!(
			state.records["ip"],
			VecDeque::from([T0 + Duration::seconds(20), T0 + Duration::seconds(70)])
		);
	}

	#[test]
	fn window_reaching_past_the_calendar_keeps_every_call() {
		let mut state = WindowState::default();
		let forever = Duration::seconds(i64::MAX);

		assert!(state.check(1, "ip", T0, forever, 2).0.is_allowed());

		let (decision, _) = state.check(1, "ip", T0 + Duration::days(365), forever, 2);
		let directive = decision.retry_directive().expect("Call inside the window is rejected.");

		assert_eq!(directive.earliest_retry_at, LATEST_INSTANT);
		assert!(directive.retry_after_seconds > 0);
		assert_eq!(state.records["ip"].len(), 1);
	}

	#[test]
	fn boundary_instant_leaves_the_window() {
		let mut state = WindowState::default();

		run(&mut state, 1, "ip", T0);

		let (decision, _) = run(&mut state, 1, "ip", T0 + Duration::seconds(59));

		assert_eq!(decision.retry_directive().map(|d| d.retry_after_seconds), Some(1));

		let (decision, _) = run(&mut state, 1, "ip", T0 + Duration::minutes(1));

		assert!(decision.is_allowed());
	}

	#[test]
	fn restoring_a_tracked_key_keeps_its_insertion_slot() {
		let mut state = WindowState::default();

		run(&mut state, 5, "a", T0);
		run(&mut state, 5, "b", T0);
		run(&mut state, 5, "a", T0 + Duration::seconds(1));

		let (_, evicted) = run(&mut state, 5, "c", T0 + Duration::seconds(2));

		assert_eq!(evicted.as_deref(), Some("a"));
		assert_eq!(state.insertion_order, VecDeque::from(["b".to_owned(), "c".to_owned()]));
		assert!(!state.records.contains_key("a"));
	}

	#[test]
	fn zero_limit_rejects_without_tracking() {
		let mut state = WindowState::default();
		let (decision, _) = run(&mut state, 0, "ip", T0);

		assert_eq!(decision.retry_directive().map(|d| d.retry_after_seconds), Some(60));
		assert!(state.records.is_empty());
	}

	#[test]
	fn debug_output_omits_key_material() {
		let limiter = crate::_preludet::build_test_limiter(
			Duration::minutes(1),
			10,
			crate::_preludet::fixture_clock(),
		);

		limiter.check(1, "203.0.113.9");

		let rendered = format!("{limiter:?}");

		assert!(rendered.contains("tracked_keys: 1"), "{rendered}");
		assert!(!rendered.contains("203.0.113.9"), "{rendered}");
	}
}
