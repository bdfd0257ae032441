use std::time::Duration;
use std::time::Instant;

use super::*;

/// `now()` moves one second forward on every call
fn ticking_clock() -> MockClock {
    let base = Instant::now();
    let mut ticks = 0;
    let mut clock = MockClock::new();
    clock.expect_now().returning(move || {
        ticks += 1;
        base + Duration::from_secs(ticks)
    });
    clock
}

#[tokio::test]
async fn poll_until_should_return_first_value_without_sleeping() {
    let mut clock = ticking_clock();
    clock.expect_sleep().times(0);

    let result: Result<u32, String> = poll_until(&clock, Duration::from_secs(1), Duration::from_secs(5), || async {
        Ok(7)
    })
    .await;

    assert_eq!(result, Ok(7));
}

#[tokio::test]
async fn poll_until_should_return_last_error_on_timeout() {
    let mut clock = ticking_clock();
    clock.expect_sleep().times(2).returning(|_| ());

    let mut attempts = 0;
    let result: Result<(), String> = poll_until(&clock, Duration::from_millis(100), Duration::from_secs(2), || {
        attempts += 1;
        let attempt = attempts;
        async move { Err(format!("attempt {attempt}")) }
    })
    .await;

    assert_eq!(result, Err("attempt 2".to_string()));
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn poll_until_should_sleep_the_interval_between_attempts() {
    let mut clock = ticking_clock();
    clock
        .expect_sleep()
        .withf(|duration| *duration == Duration::from_millis(250))
        .times(1)
        .returning(|_| ());

    let mut answers = vec![Ok("ready"), Err("not yet")];
    let result = poll_until(&clock, Duration::from_millis(250), Duration::from_secs(30), || {
        let answer = answers.pop().unwrap();
        async move { answer }
    })
    .await;

    assert_eq!(result, Ok("ready"));
}

#[tokio::test(start_paused = true)]
async fn tokio_clock_should_follow_paused_time() {
    let clock = TokioClock;
    let before = clock.now();

    clock.sleep(Duration::from_secs(90)).await;

    assert_eq!(clock.now().duration_since(before), Duration::from_secs(90));
}
