//! Scriptable connector for tests and demos.
//!
//! A [`MockConnector`] serves a fixed set of data types. How each one behaves
//! is scripted with [`MockBehavior`] and can be changed at runtime through the
//! paired [`MockController`], which also exposes call counters.
#![warn(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use mercato_core::{DataConnector, DataType, MercatoError, Params};

pub mod fixtures;

/// How a scripted data type responds.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the payload immediately.
    Return(String),
    /// Fail immediately with the provided error.
    Fail(MercatoError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
    /// Sleep, then return the payload.
    Delay(Duration, String),
}

impl MockBehavior {
    /// Fail with a `Provider` error attributed to `platform`.
    #[must_use]
    pub fn fail(platform: &str, msg: &str) -> Self {
        Self::Fail(MercatoError::provider(platform, msg))
    }
}

#[derive(Default)]
struct State {
    behaviors: HashMap<DataType, MockBehavior>,
    calls: HashMap<DataType, usize>,
    last_params: HashMap<DataType, Params>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct InFlight<'a>(&'a Shared);

impl<'a> InFlight<'a> {
    fn enter(shared: &'a Shared) -> Self {
        let now = shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        shared.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(shared)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock provider adapter.
pub struct MockConnector {
    name: &'static str,
    label: &'static str,
    serves: BTreeMap<DataType, &'static str>,
    shared: Arc<Shared>,
}

/// Handle used by tests to drive a [`MockConnector`] from the outside.
#[derive(Clone)]
pub struct MockController {
    shared: Arc<Shared>,
}

impl MockConnector {
    /// Connector serving nothing yet.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            label: name,
            serves: BTreeMap::new(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Connector plus its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Self, MockController) {
        let c = Self::new(name);
        let ctl = c.controller();
        (c, ctl)
    }

    /// Connector serving stock data, financial data and news from fixtures.
    #[must_use]
    pub fn with_fixtures(name: &'static str, symbol: &str) -> Self {
        Self::new(name)
            .serve(
                DataType::StockData,
                MockBehavior::Return(fixtures::stock_report(symbol, 15)),
            )
            .serve(
                DataType::FinancialData,
                MockBehavior::Return(fixtures::financial_report(symbol)),
            )
            .serve(DataType::News, MockBehavior::Return(fixtures::news(symbol, 5)))
    }

    /// Set the human label.
    #[must_use]
    pub const fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Serve `data_type` with the given initial behavior.
    #[must_use]
    pub fn serve(mut self, data_type: DataType, behavior: MockBehavior) -> Self {
        self.serves.insert(data_type, data_type.description());
        self.shared.lock().behaviors.insert(data_type, behavior);
        self
    }

    /// A new handle to this connector's script and counters.
    #[must_use]
    pub fn controller(&self) -> MockController {
        MockController {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl MockController {
    /// Replace the behavior of `data_type`. Has no effect on which data types
    /// the connector advertises.
    pub fn set_behavior(&self, data_type: DataType, behavior: MockBehavior) {
        self.shared.lock().behaviors.insert(data_type, behavior);
    }

    /// Number of `fetch` calls for `data_type`.
    #[must_use]
    pub fn calls(&self, data_type: DataType) -> usize {
        self.shared.lock().calls.get(&data_type).copied().unwrap_or(0)
    }

    /// Number of `fetch` calls across every data type.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.shared.lock().calls.values().sum()
    }

    /// Parameters received by the last `fetch` for `data_type`.
    #[must_use]
    pub fn last_params(&self, data_type: DataType) -> Option<Params> {
        self.shared.lock().last_params.get(&data_type).cloned()
    }

    /// Highest number of `fetch` calls observed running at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn describe(&self, data_type: DataType) -> Option<&'static str> {
        self.serves.get(&data_type).copied()
    }

    async fn fetch(&self, data_type: DataType, params: &Params) -> Result<String, MercatoError> {
        let behavior = {
            let mut st = self.shared.lock();
            *st.calls.entry(data_type).or_default() += 1;
            st.last_params.insert(data_type, params.clone());
            st.behaviors.get(&data_type).cloned()
        };
        let _guard = InFlight::enter(&self.shared);
        match behavior {
            Some(MockBehavior::Return(payload)) => Ok(payload),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(MockBehavior::Delay(d, payload)) => {
                tokio::time::sleep(d).await;
                Ok(payload)
            }
            None => Err(MercatoError::unknown_capability(self.name, data_type)),
        }
    }
}
