//! # Service Catalog
//!
//! Menu administration: create, reprice, lock and list sellable items.
//! Order items carry their own price snapshot, so nothing here ever
//! touches an existing order.

use std::sync::Arc;

use tracing::info;

use netcafe_core::validation::{validate_item_name, validate_price};
use netcafe_core::{new_id, CoreError, Money, ServiceCategory, ServiceItem};
use netcafe_store::Stores;

use crate::clock::Clock;
use crate::error::EngineResult;

/// Selects catalog items. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<ServiceCategory>,
    pub locked: Option<bool>,
}

impl CatalogFilter {
    /// Items that can be ordered right now.
    pub fn available() -> Self {
        CatalogFilter {
            category: None,
            locked: Some(false),
        }
    }

    pub fn category(mut self, category: ServiceCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, item: &ServiceItem) -> bool {
        self.category.map_or(true, |c| item.category == c)
            && self.locked.map_or(true, |l| item.is_locked == l)
    }
}

#[derive(Debug)]
pub struct ServiceCatalog {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl ServiceCatalog {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        ServiceCatalog { stores, clock }
    }

    pub async fn create_item(
        &self,
        name: &str,
        unit_price: Money,
        category: ServiceCategory,
    ) -> EngineResult<ServiceItem> {
        validate_item_name(name)?;
        validate_price(unit_price)?;

        let now = self.clock.now();
        let item = ServiceItem {
            id: new_id(),
            name: name.trim().to_string(),
            unit_price,
            category,
            is_locked: false,
            created_at: now,
            updated_at: now,
        };
        self.stores.services.save(&item).await?;

        info!(item = %item.name, price = %unit_price, "Service item created");
        Ok(item)
    }

    pub async fn find(&self, id: &str) -> EngineResult<ServiceItem> {
        self.stores
            .services
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ServiceItemNotFound(id.to_string()).into())
    }

    /// Changes the price of future orders.
    pub async fn update_price(&self, id: &str, unit_price: Money) -> EngineResult<ServiceItem> {
        validate_price(unit_price)?;

        let mut item = self.find(id).await?;
        item.unit_price = unit_price;
        item.updated_at = self.clock.now();
        self.stores.services.save(&item).await?;

        info!(item = %item.name, price = %unit_price, "Service price updated");
        Ok(item)
    }

    pub async fn lock(&self, id: &str) -> EngineResult<ServiceItem> {
        self.set_locked(id, true).await
    }

    pub async fn unlock(&self, id: &str) -> EngineResult<ServiceItem> {
        self.set_locked(id, false).await
    }

    async fn set_locked(&self, id: &str, locked: bool) -> EngineResult<ServiceItem> {
        let mut item = self.find(id).await?;
        if item.is_locked != locked {
            item.is_locked = locked;
            item.updated_at = self.clock.now();
            self.stores.services.save(&item).await?;
            info!(item = %item.name, locked, "Service lock changed");
        }
        Ok(item)
    }

    pub async fn list(&self, filter: CatalogFilter) -> EngineResult<Vec<ServiceItem>> {
        Ok(self
            .stores
            .services
            .find_all()
            .await?
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect())
    }
}
