// self
use storefront_guard::{
	_preludet::*,
	clock::ManualClock,
	limit::{RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimiter, RateLimiterConfig},
};

fn build_limiter(interval: Duration, max_unique_keys: usize) -> (RateLimiter, Arc<ManualClock>) {
	let clock = fixture_clock();

	(build_test_limiter(interval, max_unique_keys, clock.clone()), clock)
}

fn retry_after(decision: &RateLimitDecision) -> u64 {
	decision
		.retry_directive()
		.map(|directive| directive.retry_after_seconds)
		.expect("Decision should be a rejection.")
}

#[test]
fn limit_calls_pass_and_the_next_one_is_rejected() {
	let (limiter, clock) = build_limiter(Duration::hours(1), 500);

	for expected_remaining in (0..5).rev() {
		assert_eq!(
			limiter.check(5, "203.0.113.9"),
			RateLimitDecision::Allow { remaining: expected_remaining }
		);

		clock.advance(Duration::seconds(1));
	}

	let rejected = limiter.check(5, "203.0.113.9");

	assert!(!rejected.is_allowed());
	// The oldest call leaves the window one hour after the epoch; five seconds have passed.
	assert_eq!(retry_after(&rejected), 3_595);
	assert_eq!(rejected.retry_directive().map(|d| d.status_hint), Some(429));
	assert_eq!(
		rejected.retry_directive().map(|d| d.earliest_retry_at),
		Some(FIXTURE_EPOCH + Duration::hours(1))
	);
}

#[test]
fn rejected_calls_are_not_recorded() {
	let (limiter, clock) = build_limiter(Duration::minutes(1), 500);

	assert!(limiter.check(1, "ip").is_allowed());

	for _ in 0..10 {
		clock.advance(Duration::seconds(5));

		assert!(!limiter.check(1, "ip").is_allowed());
	}

	clock.set(FIXTURE_EPOCH + Duration::minutes(1));

	assert!(limiter.check(1, "ip").is_allowed());
}

#[test]
fn quota_resets_after_the_interval() {
	let (limiter, clock) = build_limiter(Duration::minutes(10), 500);

	for _ in 0..3 {
		assert!(limiter.check(3, "ip").is_allowed());
	}

	assert!(!limiter.check(3, "ip").is_allowed());

	clock.advance(Duration::minutes(10) + Duration::seconds(1));

	assert_eq!(limiter.check(3, "ip"), RateLimitDecision::Allow { remaining: 2 });
}

#[test]
fn window_slides_instead_of_resetting_in_buckets() {
	let (limiter, clock) = build_limiter(Duration::seconds(60), 500);

	// Two calls every 30s never exceed 4 calls in any 60s span.
	for step in 0..20 {
		assert!(limiter.check(4, "ip").is_allowed(), "step {step} first call");
		assert!(limiter.check(4, "ip").is_allowed(), "step {step} second call");

		clock.advance(Duration::seconds(30));
	}

	// A fixed bucket would reset here; the sliding window still counts the last 30s.
	assert!(limiter.check(4, "ip").is_allowed());
	assert!(limiter.check(4, "ip").is_allowed());
	assert!(!limiter.check(4, "ip").is_allowed());
}

#[test]
fn distinct_keys_do_not_share_quota() {
	let (limiter, _clock) = build_limiter(Duration::hours(1), 500);
	let login = RateLimitKey::composite("login", "203.0.113.9");
	let signup = RateLimitKey::composite("signup", "203.0.113.9");

	assert!(limiter.check(1, login.as_str()).is_allowed());
	assert!(!limiter.check(1, login.as_str()).is_allowed());
	assert!(limiter.check(1, signup.as_str()).is_allowed());
	assert!(limiter.check(1, "198.51.100.4").is_allowed());
	assert_eq!(limiter.tracked_keys(), 3);
}

#[test]
fn first_inserted_key_is_evicted_past_the_ceiling() {
	let (limiter, clock) = build_limiter(Duration::hours(1), 2);

	assert!(limiter.check(1, "first").is_allowed());
	assert!(limiter.check(1, "second").is_allowed());

	clock.advance(Duration::seconds(1));

	// Recent use does not protect "first"; eviction follows insertion order.
	assert!(!limiter.check(1, "first").is_allowed());
	assert!(limiter.check(1, "third").is_allowed());
	assert_eq!(limiter.tracked_keys(), 2);
	assert!(limiter.check(1, "first").is_allowed(), "Evicted key should start over.");
	assert!(!limiter.check(1, "third").is_allowed());
}

#[test]
fn peek_reports_remaining_quota_without_recording() {
	let (limiter, clock) = build_limiter(Duration::minutes(1), 500);

	assert_eq!(limiter.peek(3, "ip"), 3);

	limiter.check(3, "ip");
	limiter.check(3, "ip");

	assert_eq!(limiter.peek(3, "ip"), 1);
	assert_eq!(limiter.peek(3, "ip"), 1);

	clock.advance(Duration::minutes(1));

	assert_eq!(limiter.peek(3, "ip"), 3);
}

#[test]
fn enforce_surfaces_quota_exceeded() {
	let (limiter, _clock) = build_limiter(Duration::minutes(15), 500);
	let policy: &dyn RateLimitPolicy = &limiter;

	assert_eq!(policy.enforce(2, "ip").expect("First call should pass."), 1);
	assert_eq!(policy.enforce(2, "ip").expect("Second call should pass."), 0);

	let err = policy.enforce(2, "ip").expect_err("Third call should be throttled.");

	assert_eq!(err.status_hint(), 429);

	match err {
		Error::QuotaExceeded(directive) => assert_eq!(directive.retry_after_seconds, 900),
		other => panic!("Expected QuotaExceeded, got {other:?}."),
	}
}

#[test]
fn clones_share_state() {
	let (limiter, _clock) = build_limiter(Duration::hours(1), 500);
	let handle = limiter.clone();

	assert!(limiter.check(1, "ip").is_allowed());
	assert!(!handle.check(1, "ip").is_allowed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_admit_exactly_the_limit() {
	let (limiter, _clock) = build_limiter(Duration::hours(1), 500);
	let mut tasks = Vec::new();

	for _ in 0..64 {
		let limiter = limiter.clone();

		tasks.push(tokio::spawn(async move { limiter.check(10, "shared").is_allowed() }));
	}

	let mut admitted = 0;

	for task in tasks {
		if task.await.expect("Limiter task should not panic.") {
			admitted += 1;
		}
	}

	assert_eq!(admitted, 10);
}

#[test]
fn oversized_interval_from_config_does_not_overflow() {
	let clock = fixture_clock();

	for raw in [r#"{"interval_secs": 1000000000000}"#, r#"{"interval_secs": 18446744073709551615}"#] {
		let config: RateLimiterConfig =
			serde_json::from_str(raw).expect("Large interval should deserialize.");

		assert_eq!(config.validate(), Ok(()));

		let limiter = RateLimiter::with_clock(config, clock.clone())
			.expect("Large interval should pass validation.");

		assert!(limiter.check(1, "ip").is_allowed());

		let rejected = limiter.check(1, "ip");

		assert!(!rejected.is_allowed());
		assert!(retry_after(&rejected) > 0);
		assert_eq!(limiter.peek(1, "ip"), 0);

		clock.advance(Duration::days(365 * 100));

		assert!(!limiter.check(1, "ip").is_allowed(), "A century is still inside the window.");

		clock.set(FIXTURE_EPOCH);
	}
}
