use std::collections::BTreeMap;
use std::sync::Arc;

use mercato_types::{DataType, MercatoError, Params};

use crate::DataConnector;

/// Immutable `(platform, data type) -> connector` table built at startup.
///
/// Which data types a platform serves is fixed by its connector's
/// [`describe`](DataConnector::describe); nothing can be registered afterwards.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    connectors: BTreeMap<&'static str, Arc<dyn DataConnector>>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("platforms", &self.connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Build the table from a set of connectors.
    ///
    /// # Errors
    /// Returns `InvalidArg` if two connectors share a name.
    pub fn new<I>(connectors: I) -> Result<Self, MercatoError>
    where
        I: IntoIterator<Item = Arc<dyn DataConnector>>,
    {
        let mut table: BTreeMap<&'static str, Arc<dyn DataConnector>> = BTreeMap::new();
        for c in connectors {
            let name = c.name();
            if table.insert(name, c).is_some() {
                return Err(MercatoError::InvalidArg(format!(
                    "duplicate connector '{name}' registered"
                )));
            }
        }
        Ok(Self { connectors: table })
    }

    /// Platform identifier -> human label.
    #[must_use]
    pub fn list_platforms(&self) -> BTreeMap<&'static str, &'static str> {
        self.connectors
            .iter()
            .map(|(name, c)| (*name, c.label()))
            .collect()
    }

    /// Data type -> short description for every data type `platform` serves.
    ///
    /// # Errors
    /// Returns `UnknownPlatform` if no connector is registered under `platform`.
    pub fn list_capabilities(
        &self,
        platform: &str,
    ) -> Result<BTreeMap<DataType, &'static str>, MercatoError> {
        let c = self
            .connectors
            .get(platform)
            .ok_or_else(|| MercatoError::unknown_platform(platform))?;
        Ok(DataType::ALL
            .iter()
            .filter_map(|dt| c.describe(*dt).map(|d| (*dt, d)))
            .collect())
    }

    /// Whether `platform` is registered and serves `data_type`.
    #[must_use]
    pub fn supports(&self, platform: &str, data_type: DataType) -> bool {
        self.connectors
            .get(platform)
            .is_some_and(|c| c.supports(data_type))
    }

    /// Registered platforms serving `data_type`, in name order.
    #[must_use]
    pub fn platforms_for(&self, data_type: DataType) -> Vec<&'static str> {
        self.connectors
            .iter()
            .filter(|(_, c)| c.supports(data_type))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Number of registered connectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// True when no connector is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Invoke the connector registered for `(platform, data_type)`.
    ///
    /// Connector errors are returned untouched; classifying them is the caller's job.
    ///
    /// # Errors
    /// `UnknownPlatform` / `UnknownCapability` when the pair is not in the table,
    /// otherwise whatever the connector returns.
    pub async fn dispatch(
        &self,
        platform: &str,
        data_type: DataType,
        params: &Params,
    ) -> Result<String, MercatoError> {
        let c = self
            .connectors
            .get(platform)
            .ok_or_else(|| MercatoError::unknown_platform(platform))?;
        if !c.supports(data_type) {
            return Err(MercatoError::unknown_capability(platform, data_type));
        }
        c.fetch(data_type, params).await
    }
}
