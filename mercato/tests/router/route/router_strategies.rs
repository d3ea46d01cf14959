use mercato::{DataType, FallbackStrategy, MercatoError, Params, RouteOptions};
use mercato_mock::MockBehavior;

use crate::helpers::{doc, mock, router, tried};

#[tokio::test]
async fn fail_strategy_overrides_per_call_fallback() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "down"));
    let (b, b_ctl) = mock("B", DataType::News, MockBehavior::Return("ok".into()));
    let mercato = router(doc(DataType::News, &[("A", 1), ("B", 2)]), &[a, b]);
    mercato.config().set_fallback_strategy("fail").unwrap();

    let r = mercato
        .route_with(
            DataType::News,
            &Params::new(),
            &RouteOptions::default().enable_fallback(true),
        )
        .await;

    assert!(!r.success);
    assert_eq!(tried(&r), vec!["A"]);
    assert_eq!(r.error, Some(MercatoError::provider("A", "down")));
    assert_eq!(b_ctl.calls(DataType::News), 0);
}

#[tokio::test]
async fn all_platforms_extends_configured_candidates() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "down"));
    let (b, _) = mock("B", DataType::News, MockBehavior::Return("from b".into()));
    let (c, c_ctl) = mock("C", DataType::News, MockBehavior::Return("from c".into()));
    let (d, d_ctl) = mock("D", DataType::StockData, MockBehavior::Return("bars".into()));
    let mut cfg = doc(DataType::News, &[("A", 1)]);
    cfg.platform_settings
        .insert("C".into(), mercato::PlatformSettings::new(5, Params::new()));
    let mercato = router(cfg, &[a, b, c, d]);
    mercato.config().disable_platform("C").unwrap();

    // next_available stays within the configured list
    let r = mercato.route(DataType::News, &Params::new()).await;
    assert!(!r.success);
    assert_eq!(tried(&r), vec!["A"]);

    mercato.config().set_fallback(FallbackStrategy::AllPlatforms).unwrap();
    assert_eq!(mercato.rankings(DataType::News), vec!["A", "B"]);

    let r = mercato.route(DataType::News, &Params::new()).await;
    assert!(r.success);
    assert_eq!(tried(&r), vec!["A", "B"]);
    assert_eq!(r.payload(), Some("from b"));
    assert_eq!(c_ctl.total_calls(), 0);
    assert_eq!(d_ctl.total_calls(), 0);
}

#[tokio::test]
async fn explicit_candidates_are_never_extended() {
    let (a, _) = mock("A", DataType::News, MockBehavior::fail("A", "down"));
    let (b, b_ctl) = mock("B", DataType::News, MockBehavior::Return("from b".into()));
    let mercato = router(doc(DataType::News, &[("A", 1)]), &[a, b]);
    mercato.config().set_fallback(FallbackStrategy::AllPlatforms).unwrap();

    let opts = RouteOptions::default().platforms(["A"]);
    let r = mercato.route_with(DataType::News, &Params::new(), &opts).await;

    assert!(!r.success);
    assert_eq!(tried(&r), vec!["A"]);
    assert_eq!(b_ctl.total_calls(), 0);
}
