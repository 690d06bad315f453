use crate::{Error, Limits, Range, RangeEvaluator, WorkerPool, classify};
use core::time::Duration;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const AMPLE: Duration = Duration::from_secs(30);

fn evaluator(capacity: usize, max_range: usize, timeout: Duration) -> RangeEvaluator {
    let pool = Arc::new(WorkerPool::with_current_runtime(capacity));
    RangeEvaluator::new(pool, Limits::new(max_range, timeout))
}

fn expected(from: i64, to: i64) -> Vec<String> {
    (from..=to).map(classify).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn evaluates_one_to_fifteen() {
    let evaluator = evaluator(1000, 100, AMPLE);
    let evaluation = evaluator
        .evaluate(Some("1"), Some("15"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(evaluation.is_complete());
    assert_eq!(evaluation.range(), Range::new(1, 15, 100).unwrap());
    assert_eq!(
        evaluation.render(),
        "1 2 Fizz 4 Buzz Fizz 7 8 Fizz Buzz 11 Fizz 13 14 FizzBuzz"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_slot_matches_its_number() {
    let evaluator = evaluator(8, 100, AMPLE);

    for (from, to) in [(1, 100), (-50, 49), (0, 0), (i64::MAX - 9, i64::MAX)] {
        let range = Range::new(from, to, 100).unwrap();
        let evaluation = evaluator
            .evaluate_range(range, &CancellationToken::new())
            .await;

        assert_eq!(evaluation.slots().len(), range.len());
        assert_eq!(evaluation.skipped(), 0);
        assert_eq!(evaluation.slots(), expected(from, to));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_evaluations_are_identical() {
    let evaluator = evaluator(16, 100, AMPLE);
    let token = CancellationToken::new();

    let first = evaluator
        .evaluate(Some("-20"), Some("79"), &token)
        .await
        .unwrap();
    for _ in 0..10 {
        let again = evaluator
            .evaluate(Some("-20"), Some("79"), &token)
            .await
            .unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_permit_still_yields_ordered_output() {
    let evaluator = evaluator(1, 100, AMPLE);
    let evaluation = evaluator
        .evaluate(Some("1"), Some("100"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(evaluation.into_slots(), expected(1, 100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn permits_are_released_after_evaluation() {
    let evaluator = evaluator(3, 100, AMPLE);
    let pool = Arc::clone(evaluator.pool());
    assert_eq!(pool.capacity(), 3);
    assert_eq!(evaluator.limits(), Limits::new(100, AMPLE));

    evaluator
        .evaluate(Some("1"), Some("100"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(pool.available_permits(), 3);
    assert_eq!(pool.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn permits_are_released_by_skipped_tasks() {
    let evaluator = evaluator(3, 100, Duration::ZERO);
    let pool = Arc::clone(evaluator.pool());

    evaluator
        .evaluate(Some("1"), Some("100"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(pool.available_permits(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn range_at_cap_succeeds_and_cap_plus_one_fails() {
    let evaluator = evaluator(1000, 100, AMPLE);
    let token = CancellationToken::new();

    let at_cap = evaluator
        .evaluate(Some("1"), Some("100"), &token)
        .await
        .unwrap();
    assert_eq!(at_cap.slots().len(), 100);

    let over_cap = evaluator.evaluate(Some("1"), Some("101"), &token).await;
    assert_eq!(
        over_cap,
        Err(Error::RangeTooLarge {
            size: 101,
            max: 100
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_element_range() {
    let evaluator = evaluator(1000, 100, AMPLE);
    let evaluation = evaluator
        .evaluate(Some("30"), Some("30"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(evaluation.slots(), ["FizzBuzz"]);
    assert_eq!(evaluation.render(), "FizzBuzz");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_input_is_rejected_before_any_work() {
    let evaluator = evaluator(1000, 100, AMPLE);
    let token = CancellationToken::new();

    for (from, to) in [
        (Some("5"), Some("3")),
        (Some("a"), Some("3")),
        (Some("1"), Some("b")),
        (None, Some("3")),
        (Some("1"), None),
    ] {
        let result = evaluator.evaluate(from, to, &token).await;
        assert!(
            matches!(result, Err(Error::InvalidInput { .. })),
            "expected InvalidInput for {from:?}..={to:?}, got {result:?}"
        );
    }

    assert_eq!(evaluator.pool().in_flight(), 0);
    assert_eq!(evaluator.pool().available_permits(), 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn zero_timeout_keeps_length_and_never_corrupts() {
    let evaluator = evaluator(4, 100, Duration::ZERO);
    let evaluation = evaluator
        .evaluate(Some("1"), Some("100"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(evaluation.slots().len(), 100);
    assert!(evaluation.skipped() >= 1);
    for (i, slot) in evaluation.slots().iter().enumerate() {
        if !slot.is_empty() {
            assert_eq!(*slot, classify(1 + i as i64));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn skipped_slots_render_as_empty_tokens() {
    let evaluator = evaluator(4, 100, Duration::ZERO);
    let evaluation = evaluator
        .evaluate(Some("1"), Some("3"), &CancellationToken::new())
        .await
        .unwrap();

    // Every task starts after a zero timeout, so all three slots are empty.
    assert_eq!(evaluation.skipped(), 3);
    assert_eq!(evaluation.render(), "  ");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_request_skips_every_slot() {
    let evaluator = evaluator(4, 100, AMPLE);
    let token = evaluator.pool().request_token();
    token.cancel();

    let evaluation = evaluator.evaluate(Some("1"), Some("50"), &token).await.unwrap();

    assert_eq!(evaluation.slots().len(), 50);
    assert_eq!(evaluation.skipped(), 50);
    assert!(!evaluator.pool().is_shutdown());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_pool_returns_empty_slots_without_hanging() {
    let evaluator = evaluator(4, 100, AMPLE);
    let token = evaluator.pool().request_token();
    evaluator.pool().shutdown();

    let evaluation = tokio::time::timeout(
        Duration::from_secs(5),
        evaluator.evaluate(Some("1"), Some("20"), &token),
    )
    .await
    .expect("evaluation must not block on a closed pool")
    .unwrap();

    assert_eq!(evaluation.slots().len(), 20);
    assert_eq!(evaluation.skipped(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_while_saturated_stops_spawning() {
    let evaluator = evaluator(1, 100, AMPLE);
    let pool = Arc::clone(evaluator.pool());

    // Hold the only permit so the evaluation blocks on its first acquire.
    let held = pool.acquire().await.unwrap();
    let token = pool.request_token();
    let running = {
        let evaluator = evaluator.clone();
        tokio::spawn(async move { evaluator.evaluate(Some("1"), Some("10"), &token).await })
    };

    while pool.in_flight() == 0 {
        tokio::task::yield_now().await;
    }
    pool.shutdown();
    drop(held);

    let evaluation = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("evaluation must observe the closed pool")
        .unwrap()
        .unwrap();

    assert_eq!(evaluation.slots().len(), 10);
    assert_eq!(evaluation.skipped(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_the_pool() {
    let evaluator = evaluator(8, 100, AMPLE);

    let requests = (0..16).map(|i| {
        let evaluator = evaluator.clone();
        tokio::spawn(async move {
            let from = i * 100;
            let to = from + 99;
            let range = Range::new(from, to, 100).unwrap();
            let evaluation = evaluator
                .evaluate_range(range, &CancellationToken::new())
                .await;
            (from, to, evaluation)
        })
    });

    for handle in futures::future::join_all(requests).await {
        let (from, to, evaluation) = handle.unwrap();
        assert_eq!(evaluation.into_slots(), expected(from, to));
    }
    assert_eq!(evaluator.pool().available_permits(), 8);
}
