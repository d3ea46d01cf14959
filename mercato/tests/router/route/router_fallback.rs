use mercato::{DataType, MercatoError, Params, RouteOptions};
use mercato_mock::{MockBehavior, fixtures};

use crate::helpers::{PINGAN, doc, mock, params, router, stock_rule, tried};

#[tokio::test]
async fn falls_back_to_next_platform_after_failure() {
    let (a, a_ctl) = mock("A", DataType::News, MockBehavior::fail("A", "upstream 503"));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return(fixtures::news(PINGAN, 3)));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);

    let r = mercato.route(DataType::News, &Params::new()).await;

    assert!(r.success);
    assert_eq!(tried(&r), vec!["A", "B"]);
    assert_eq!(r.metadata.platform_used.as_deref(), Some("B"));
    assert_eq!(r.metadata.errors, vec![MercatoError::provider("A", "upstream 503")]);
    assert!(r.error.is_none());
    assert!(r.metadata.quality_passed);
    assert_eq!(a_ctl.calls(DataType::News), 1);
}

#[tokio::test]
async fn without_fallback_first_failure_is_final() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "boom"));
    let (b, b_ctl) = mock("B", DataType::News, MockBehavior::Return("ok".into()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);

    let opts = RouteOptions::default().enable_fallback(false);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;

    assert!(!r.success);
    assert_eq!(tried(&r), vec!["A"]);
    assert_eq!(r.error, Some(MercatoError::provider("A", "boom")));
    assert!(r.metadata.platform_used.is_none());
    assert!(r.data.is_none());
    assert_eq!(b_ctl.calls(DataType::News), 0);
}

#[tokio::test]
async fn failure_indicator_payload_falls_back_to_well_formed_report() {
    crate::helpers::init_tracing();
    let (a, _) = mock(
        "A",
        DataType::StockData,
        MockBehavior::Return(fixtures::not_obtained(PINGAN)),
    );
    let (b, _) = mock(
        "B",
        DataType::StockData,
        MockBehavior::Return(fixtures::stock_report(PINGAN, 15)),
    );
    let mut d = doc(DataType::StockData, &[("A", 1), ("B", 2)]);
    d.data_quality_rules.insert(DataType::StockData, stock_rule());
    let mercato = router(d, &[a, b]);

    let r = mercato
        .route(DataType::StockData, &params(serde_json::json!({"symbol": PINGAN})))
        .await;

    assert!(r.success);
    assert_eq!(r.metadata.platform_used.as_deref(), Some("B"));
    assert_eq!(tried(&r), vec!["A", "B"]);
    assert!(r.metadata.errors[0].is_quality());
    // the call itself succeeded, so it still counts as a successful attempt
    assert_eq!(mercato.performance_stat("A").unwrap().successful_requests, 1);
}

#[tokio::test]
async fn rejected_payload_is_returned_when_fallback_is_off() {
    let (a, _) = mock("A", DataType::News, MockBehavior::Return("   \n".into()));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("fine".into()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);

    let opts = RouteOptions::default().enable_fallback(false);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;

    assert!(!r.success);
    assert_eq!(r.data.as_deref(), Some("   \n"));
    assert!(r.payload().is_none());
    assert!(matches!(r.error, Some(MercatoError::DataQuality { ref platform, .. }) if platform == "A"));
    assert!(r.metadata.platform_used.is_none());
    assert_eq!(tried(&r), vec!["A"]);
}

#[tokio::test]
async fn quality_gate_can_be_disabled_per_call() {
    let (a, _) = mock("A", DataType::News, MockBehavior::Return("Error 42".into()));
    let mercato = router(doc(DataType::News, &[("A", 1)]), &[a]);

    let opts = RouteOptions::default().quality_check(false);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;

    assert!(r.success);
    assert_eq!(r.payload(), Some("Error 42"));
    assert!(!r.metadata.quality_passed);
}

#[tokio::test]
async fn exhausted_candidates_aggregate_every_error() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "one"));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return(String::new()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);

    let r = mercato.route(DataType::News, &Params::new()).await;

    assert!(!r.success);
    assert_eq!(tried(&r), vec!["A", "B"]);
    let Some(MercatoError::AllPlatformsFailed { data_type, errors }) = r.error else {
        panic!("expected aggregate error");
    };
    assert_eq!(data_type, DataType::News);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors, r.metadata.errors);
}

#[tokio::test]
async fn no_configured_platform_fails_immediately() {
    let (a, a_ctl) = mock("A", DataType::News, MockBehavior::Return("x".into()));
    let mercato = router(doc(DataType::News, &[("A", 1)]), &[a]);

    let r = mercato.route(DataType::Backtest, &Params::new()).await;

    assert!(!r.success);
    assert!(r.metadata.platforms_tried.is_empty());
    assert_eq!(
        r.error,
        Some(MercatoError::NoPlatform {
            data_type: DataType::Backtest
        })
    );
    assert_eq!(a_ctl.total_calls(), 0);
    assert_eq!(mercato.history_len(), 1);
}

#[tokio::test]
async fn disabled_platforms_are_skipped_and_not_reported() {
    let (a, a_ctl) = mock("A", DataType::News, MockBehavior::Return("from a".into()));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("from b".into()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);
    mercato.config().disable_platform("A").unwrap();

    let explicit = RouteOptions::default().platforms(["A", "B"]);
    let r = mercato.route_with(DataType::News, &Params::new(), &explicit).await;

    assert!(r.success);
    assert_eq!(tried(&r), vec!["B"]);
    assert_eq!(a_ctl.calls(DataType::News), 0);

    let only_disabled = RouteOptions::default().platforms(["A"]);
    let r = mercato
        .route_with(DataType::News, &Params::new(), &only_disabled)
        .await;
    assert!(!r.success);
    assert!(r.metadata.platforms_tried.is_empty());
    assert!(matches!(r.error, Some(MercatoError::NoPlatform { .. })));
}

#[tokio::test]
async fn unregistered_platform_is_an_ordinary_attempt_failure() {
    let (a, _) = mock("A", DataType::News, MockBehavior::Return("headline".into()));
    let mercato = router(doc(DataType::News, &[("A", 1)]), &[a]);

    let opts = RouteOptions::default().platforms(["ghost", "A"]);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;

    // A outranks the unconfigured platform, which sorts at the default priority
    assert!(r.success);
    assert_eq!(tried(&r), vec!["A"]);

    let opts = RouteOptions::default().platforms(["ghost"]);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;
    assert!(!r.success);
    assert_eq!(tried(&r), vec!["ghost"]);
    assert_eq!(r.metadata.errors, vec![MercatoError::unknown_platform("ghost")]);
    assert_eq!(mercato.performance_stat("ghost").unwrap().total_requests, 1);
}
