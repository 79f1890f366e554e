//! Read-only revenue queries over persisted invoices and top-ups.

use netcafe_core::report::{self, DateRange, RevenueSummary};
use netcafe_core::{Invoice, OrderItem, TopUpHistory};
use netcafe_store::Stores;

use crate::error::EngineResult;

#[derive(Debug)]
pub struct Reporting {
    stores: Stores,
}

impl Reporting {
    pub fn new(stores: Stores) -> Self {
        Reporting { stores }
    }

    pub async fn revenue_summary(&self, range: DateRange) -> EngineResult<RevenueSummary> {
        let invoices = self.stores.invoices.find_all().await?;
        let top_ups = self.stores.top_ups.find_all().await?;
        Ok(RevenueSummary::compute(&invoices, &top_ups, range))
    }

    /// Invoices created in `range`, oldest first.
    pub async fn invoices(&self, range: DateRange) -> EngineResult<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .stores
            .invoices
            .find_all()
            .await?
            .into_iter()
            .filter(|i| range.contains(i.created_at))
            .collect();
        invoices.sort_by_key(|i| i.created_at);
        Ok(invoices)
    }

    /// Top-ups recorded in `range`, oldest first.
    pub async fn top_ups(&self, range: DateRange) -> EngineResult<Vec<TopUpHistory>> {
        let mut entries: Vec<TopUpHistory> = self
            .stores
            .top_ups
            .find_all()
            .await?
            .into_iter()
            .filter(|t| range.contains(t.created_at))
            .collect();
        entries.sort_by_key(|t| t.created_at);
        Ok(entries)
    }

    /// Every order item billed on an invoice in `range`.
    pub async fn order_history(&self, range: DateRange) -> EngineResult<Vec<OrderItem>> {
        let invoices = self.stores.invoices.find_all().await?;
        Ok(report::order_history(&invoices, range))
    }
}
