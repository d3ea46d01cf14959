use std::sync::Arc;

use mercato::{ConfigStore, DataType, FallbackStrategy, Mercato};
use mercato_mock::{MockBehavior, MockConnector};
use serde_json::json;

use crate::helpers::{PINGAN, params};

#[tokio::test]
async fn routing_and_optimization_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("data_config.json");
    let store = Arc::new(ConfigStore::open(&path).unwrap());
    assert!(path.exists());

    let akshare = MockConnector::with_fixtures("akshare", PINGAN);
    let ak_ctl = akshare.controller();
    ak_ctl.set_behavior(
        DataType::StockData,
        MockBehavior::fail("akshare", "rate limited"),
    );
    let tushare = MockConnector::with_fixtures("tushare", PINGAN);
    let mercato = Mercato::builder()
        .with_connector(Arc::new(akshare))
        .with_connector(Arc::new(tushare))
        .config_store(Arc::clone(&store))
        .build()
        .unwrap();

    let r = mercato
        .route(DataType::StockData, &params(json!({"symbol": PINGAN})))
        .await;
    assert!(r.success);
    assert_eq!(r.metadata.platform_used.as_deref(), Some("tushare"));
    assert_eq!(
        ak_ctl.last_params(DataType::StockData).unwrap(),
        params(json!({"symbol": PINGAN, "period": "daily", "adjust": "qfq"}))
    );

    store.set_platform_priority("tushare", 1).unwrap();
    store.disable_platform("simfin").unwrap();
    let changed = mercato.optimize_preferences().unwrap();
    assert!(changed.contains(&DataType::StockData));

    let reopened = ConfigStore::open(&path).unwrap();
    assert_eq!(
        reopened.platform_preferences(DataType::StockData),
        vec!["tushare", "akshare"]
    );
    assert_eq!(reopened.platform_priority("tushare"), 1);
    assert!(!reopened.is_platform_enabled("simfin"));
    assert_eq!(
        reopened.platform_preferences(DataType::FinancialData),
        store.platform_preferences(DataType::FinancialData)
    );
    assert_eq!(reopened.fallback_strategy(), FallbackStrategy::NextAvailable);
}

#[tokio::test]
async fn fail_strategy_from_store_disables_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ConfigStore::open(dir.path().join("data_config.json")).unwrap());
    store.set_fallback_strategy("fail").unwrap();

    let akshare = MockConnector::with_fixtures("akshare", PINGAN).serve(
        DataType::StockData,
        MockBehavior::fail("akshare", "rate limited"),
    );
    let tushare = MockConnector::with_fixtures("tushare", PINGAN);
    let tushare_ctl = tushare.controller();
    let mercato = Mercato::builder()
        .with_connector(Arc::new(akshare))
        .with_connector(Arc::new(tushare))
        .config_store(store)
        .build()
        .unwrap();

    let r = mercato
        .route(DataType::StockData, &params(json!({"symbol": PINGAN})))
        .await;

    assert!(!r.success);
    assert_eq!(r.metadata.platforms_tried, vec!["akshare"]);
    assert_eq!(tushare_ctl.total_calls(), 0);
}
