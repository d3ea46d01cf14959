use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use mercato_types::{DataType, MercatoError, Params};

/// Contract every provider adapter implements.
///
/// A connector is one external data vendor. It declares which [`DataType`]s it
/// serves through [`describe`](DataConnector::describe) and produces
/// human-readable text for them in [`fetch`](DataConnector::fetch). The router
/// treats the text as opaque; only the quality gate inspects it.
#[async_trait]
pub trait DataConnector: Send + Sync {
    /// Stable platform identifier (e.g. `"akshare"`), used as the configuration key.
    fn name(&self) -> &'static str;

    /// Human-readable label for listings.
    fn label(&self) -> &'static str {
        self.name()
    }

    /// Short description of what this connector returns for `data_type`, or
    /// `None` if it does not serve it.
    fn describe(&self, data_type: DataType) -> Option<&'static str>;

    /// Whether this connector serves `data_type`.
    fn supports(&self, data_type: DataType) -> bool {
        self.describe(data_type).is_some()
    }

    /// Fetch `data_type` with the merged parameter set.
    ///
    /// # Errors
    /// Any transport or upstream failure. Callers reach this through the
    /// registry, which has already checked `supports`.
    async fn fetch(&self, data_type: DataType, params: &Params) -> Result<String, MercatoError>;
}

type Handler = Arc<dyn Fn(Params) -> BoxFuture<'static, Result<String, MercatoError>> + Send + Sync>;

struct HandlerEntry {
    description: &'static str,
    handler: Handler,
}

/// Connector assembled from one async handler per data type.
///
/// ```rust,ignore
/// let akshare = FnConnector::new("akshare", "AkShare")
///     .handler(DataType::StockData, "A-share daily bars", |params| async move {
///         fetch_daily_bars(params).await
///     });
/// ```
pub struct FnConnector {
    name: &'static str,
    label: &'static str,
    handlers: BTreeMap<DataType, HandlerEntry>,
}

impl FnConnector {
    /// Connector with no handlers yet.
    #[must_use]
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            handlers: BTreeMap::new(),
        }
    }

    /// Register the handler for `data_type`, replacing any previous one.
    #[must_use]
    pub fn handler<F, Fut>(mut self, data_type: DataType, description: &'static str, f: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MercatoError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |params| Box::pin(f(params)));
        self.handlers.insert(
            data_type,
            HandlerEntry {
                description,
                handler,
            },
        );
        self
    }
}

#[async_trait]
impl DataConnector for FnConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn describe(&self, data_type: DataType) -> Option<&'static str> {
        self.handlers.get(&data_type).map(|h| h.description)
    }

    async fn fetch(&self, data_type: DataType, params: &Params) -> Result<String, MercatoError> {
        let entry = self
            .handlers
            .get(&data_type)
            .ok_or_else(|| MercatoError::unknown_capability(self.name, data_type))?;
        (entry.handler)(params.clone()).await
    }
}
