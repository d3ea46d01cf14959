#![allow(dead_code)]

use std::sync::Arc;

use mercato::{
    ConfigStore, DataConfig, DataConnector, DataType, Mercato, MercatoBuilder, Params,
    PlatformSettings, QualityRule,
};
use mercato_mock::{MockBehavior, MockConnector, MockController};

/// Common symbol constants used across tests.
pub const PINGAN: &str = "000001";
pub const AAPL: &str = "AAPL";

/// Surface router logs when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a parameter map from a JSON object literal.
pub fn params(v: serde_json::Value) -> Params {
    match v {
        serde_json::Value::Object(m) => m,
        other => panic!("params must be an object, got {other}"),
    }
}

/// Document preferring `platforms` (in order) for `data_type`, each enabled with
/// the given priority and no default parameters.
pub fn doc(data_type: DataType, platforms: &[(&str, i64)]) -> DataConfig {
    let mut d = DataConfig::default();
    d.platform_preferences.insert(
        data_type,
        platforms.iter().map(|(p, _)| (*p).to_string()).collect(),
    );
    for (p, prio) in platforms {
        d.platform_settings
            .insert((*p).to_string(), PlatformSettings::new(*prio, Params::new()));
    }
    d
}

/// The stock data rule shipped with the built-in configuration.
pub fn stock_rule() -> QualityRule {
    DataConfig::builtin().data_quality_rules[&DataType::StockData].clone()
}

/// Mock serving one data type with a fixed behavior.
pub fn mock(
    name: &'static str,
    data_type: DataType,
    behavior: MockBehavior,
) -> (Arc<dyn DataConnector>, MockController) {
    let m = MockConnector::new(name).serve(data_type, behavior);
    let ctl = m.controller();
    (Arc::new(m), ctl)
}

/// Builder seeded with an in-memory store for `doc` and the given connectors.
pub fn builder(doc: DataConfig, connectors: &[Arc<dyn DataConnector>]) -> MercatoBuilder {
    connectors.iter().fold(
        Mercato::builder().config_store(Arc::new(ConfigStore::in_memory(doc))),
        |b, c| b.with_connector(Arc::clone(c)),
    )
}

/// Router over an in-memory store for `doc` and the given connectors.
pub fn router(doc: DataConfig, connectors: &[Arc<dyn DataConnector>]) -> Mercato {
    builder(doc, connectors).build().unwrap()
}

/// Names in a `platforms_tried` trail, for terse assertions.
pub fn tried(r: &mercato::RoutingResult) -> Vec<&str> {
    r.metadata.platforms_tried.iter().map(String::as_str).collect()
}
