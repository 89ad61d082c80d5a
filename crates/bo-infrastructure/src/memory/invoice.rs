//! In-memory invoices

use async_trait::async_trait;
use bo_shared::Pagination;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use bo_core::domain::{Invoice, InvoiceStatus};
use bo_core::error::DomainError;
use bo_core::repositories::{InvoiceRepository, SequenceStore};

use super::{latest_identifier, page};

#[derive(Default)]
pub struct MemoryInvoiceRepository {
    invoices: RwLock<HashMap<Uuid, Invoice>>,
}

impl MemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceRepository for MemoryInvoiceRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Invoice>, DomainError> {
        Ok(self.invoices.read().get(id).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, DomainError> {
        Ok(self.invoices.read().values().find(|i| i.number == number).cloned())
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Invoice>, DomainError> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .read()
            .values()
            .filter(|i| i.branch_id == *branch_id && i.removed_at.is_none())
            .cloned()
            .collect();
        invoices.sort_by(|a, b| (b.issue_date, &b.number).cmp(&(a.issue_date, &a.number)));
        Ok(page(invoices, pagination))
    }

    async fn create(&self, invoice: &Invoice) -> Result<Invoice, DomainError> {
        let mut invoices = self.invoices.write();
        if invoices.values().any(|i| i.number == invoice.number) {
            return Err(DomainError::IdentifierAlreadyExists(invoice.number.clone()));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(invoice.clone())
    }

    async fn transition(&self, invoice: &Invoice, from: InvoiceStatus) -> Result<Invoice, DomainError> {
        let mut invoices = self.invoices.write();
        let stored = invoices
            .get_mut(&invoice.id)
            .ok_or(DomainError::InvoiceNotFound(invoice.id))?;
        if stored.status != from {
            return Err(DomainError::InvalidStatusTransition {
                entity: "invoice",
                from: stored.status.as_str(),
                to: invoice.status.as_str(),
            });
        }
        stored.status = invoice.status;
        stored.modified_at = invoice.modified_at;
        stored.modified_by = invoice.modified_by;
        stored.removed_at = invoice.removed_at;
        stored.removed_by = invoice.removed_by;
        Ok(stored.clone())
    }
}

#[async_trait]
impl SequenceStore for MemoryInvoiceRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        let invoices = self.invoices.read();
        Ok(latest_identifier(invoices.values().map(|i| i.number.as_str()), prefix))
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        Ok(self.invoices.read().values().any(|i| i.number == identifier))
    }
}
