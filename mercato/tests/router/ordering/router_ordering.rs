use std::time::Duration;

use mercato::{DataType, Params, RouteOptions};
use mercato_mock::MockBehavior;

use crate::helpers::{doc, mock, router, tried};

fn slow_and_fast() -> (
    std::sync::Arc<dyn mercato::DataConnector>,
    std::sync::Arc<dyn mercato::DataConnector>,
) {
    let (slow, _) = mock(
        "A",
        DataType::News,
        MockBehavior::Delay(Duration::from_secs(2), "slow headline".into()),
    );
    let (fast, _) = mock(
        "B",
        DataType::News,
        MockBehavior::Delay(Duration::from_millis(100), "fast headline".into()),
    );
    (slow, fast)
}

#[tokio::test]
async fn best_platform_without_history_follows_priority() {
    let (a, _) = mock("A", DataType::News, MockBehavior::Return("x".into()));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("y".into()));
    let mercato = router(doc(DataType::News, &[("B", 2), ("A", 1)]), &[a, b]);

    assert_eq!(mercato.best_platform(DataType::News).as_deref(), Some("A"));
    assert_eq!(mercato.rankings(DataType::News), vec!["A", "B"]);
    assert_eq!(mercato.best_platform(DataType::Backtest), None);
}

#[tokio::test(start_paused = true)]
async fn performance_breaks_ties_within_a_priority_tier() {
    let (slow, fast) = slow_and_fast();
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 1)]), &[slow, fast]);
    assert_eq!(mercato.best_platform(DataType::News).as_deref(), Some("A"));

    let _ = mercato.multi_platform(DataType::News, &Params::new(), None).await;

    assert!(mercato.performance_score("B") > mercato.performance_score("A"));
    assert_eq!(mercato.best_platform(DataType::News).as_deref(), Some("B"));
    let r = mercato.route(DataType::News, &Params::new()).await;
    assert_eq!(tried(&r), vec!["B"]);
}

#[tokio::test(start_paused = true)]
async fn static_priority_outranks_performance() {
    let (slow, fast) = slow_and_fast();
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[slow, fast]);

    let _ = mercato.multi_platform(DataType::News, &Params::new(), None).await;

    assert!(mercato.performance_score("B") > mercato.performance_score("A"));
    assert_eq!(mercato.best_platform(DataType::News).as_deref(), Some("A"));
}

#[tokio::test]
async fn explicit_candidates_are_ordered_too() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "down"));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("ok".into()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);

    let opts = RouteOptions::default().platforms(["B", "A"]);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;
    assert_eq!(tried(&r), vec!["A", "B"]);
}

#[tokio::test]
async fn every_attempt_counts_once_against_its_platform() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "down"));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("ok".into()));
    let (c, _) = mock("C", DataType::News, MockBehavior::Return("never".into()));
    let mercato = router(
        doc(DataType::News, &[("A", 1), ("B", 2), ("C", 3)]),
        &[a, b, c],
    );

    for round in 1..=3u64 {
        let r = mercato.route(DataType::News, &Params::new()).await;
        assert!(r.success);
        assert_eq!(mercato.performance_stat("A").unwrap().total_requests, round);
        assert_eq!(mercato.performance_stat("B").unwrap().total_requests, round);
        assert!(mercato.performance_stat("C").is_none());
    }
    assert!(mercato.performance_score("A").abs() < f64::EPSILON);
}
