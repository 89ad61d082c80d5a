// ============================================================================
// Back-office Core - Invoice Service
// File: crates/bo-core/src/services/invoice_service.rs
// ============================================================================
//! Invoicing: numbering per branch and issue date, totals, status workflow

use std::sync::Arc;

use bo_security::{AccessPolicy, Action, Actor, Resource};
use bo_shared::config::SequenceSettings;
use bo_shared::Pagination;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Invoice, InvoiceStatus, NewInvoice};
use crate::error::DomainError;
use crate::repositories::{BranchRepository, ClientRepository, InvoiceRepository, SequenceStore};
use crate::sequence::{SequenceAllocator, SequenceScope};
use crate::services::find_active_branch;

pub struct InvoiceService<B, C, I, S>
where
    B: BranchRepository,
    C: ClientRepository,
    I: InvoiceRepository,
    S: SequenceStore,
{
    branch_repo: Arc<B>,
    client_repo: Arc<C>,
    invoice_repo: Arc<I>,
    allocator: SequenceAllocator<S>,
}

impl<B, C, I, S> InvoiceService<B, C, I, S>
where
    B: BranchRepository,
    C: ClientRepository,
    I: InvoiceRepository,
    S: SequenceStore,
{
    pub fn new(
        branch_repo: Arc<B>,
        client_repo: Arc<C>,
        invoice_repo: Arc<I>,
        sequence_store: Arc<S>,
        settings: SequenceSettings,
    ) -> Self {
        Self {
            branch_repo,
            client_repo,
            invoice_repo,
            allocator: SequenceAllocator::new(sequence_store, settings),
        }
    }

    /// Create a draft invoice numbered `INV-<branch>-<issue date>-###`
    pub async fn create_invoice(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        input: NewInvoice,
    ) -> Result<Invoice, DomainError> {
        // 1. Authorize and validate
        AccessPolicy::authorize(actor, Resource::Invoice, Action::Add, Some(branch_id))?;
        input.validate()?;

        // 2. Branch before anything that reads invoice numbers
        let branch = find_active_branch(self.branch_repo.as_ref(), branch_id).await?;
        let client = self
            .client_repo
            .find_by_id(&input.client_id)
            .await?
            .ok_or(DomainError::ClientNotFound(input.client_id))?;
        if client.branch_id != branch.id {
            return Err(DomainError::ValidationError(
                "Client belongs to another branch".to_string(),
            ));
        }

        // 3. Dates and totals
        let (issue_date, totals) = input.prepare(Utc::now().date_naive())?;

        // 4. Number and insert
        let invoice_repo = &self.invoice_repo;
        let created_by = Some(actor.user_id);
        let scope = SequenceScope::invoice(&branch.code, issue_date);
        let invoice = self
            .allocator
            .insert_with_identifier(&scope, |number| {
                let invoice = Invoice::new(number, branch.id, issue_date, totals, input.clone(), created_by);
                async move { invoice_repo.create(&invoice).await }
            })
            .await?;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            total = invoice.total,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn issue_invoice(&self, actor: &Actor, id: &Uuid) -> Result<Invoice, DomainError> {
        let mut invoice = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Invoice, Action::Edit, Some(&invoice.branch_id))?;
        let from = invoice.status;
        invoice.issue(actor.user_id)?;
        self.save(invoice, from).await
    }

    pub async fn mark_invoice_paid(&self, actor: &Actor, id: &Uuid) -> Result<Invoice, DomainError> {
        let mut invoice = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Invoice, Action::Approve, Some(&invoice.branch_id))?;
        let from = invoice.status;
        invoice.mark_paid(actor.user_id)?;
        self.save(invoice, from).await
    }

    pub async fn cancel_invoice(&self, actor: &Actor, id: &Uuid) -> Result<Invoice, DomainError> {
        let mut invoice = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Invoice, Action::Approve, Some(&invoice.branch_id))?;
        let from = invoice.status;
        invoice.cancel(actor.user_id)?;
        self.save(invoice, from).await
    }

    pub async fn get_invoice(&self, actor: &Actor, id: &Uuid) -> Result<Invoice, DomainError> {
        let invoice = self.find(id).await?;
        AccessPolicy::authorize(actor, Resource::Invoice, Action::View, Some(&invoice.branch_id))?;
        Ok(invoice)
    }

    pub async fn get_invoice_by_number(&self, actor: &Actor, number: &str) -> Result<Invoice, DomainError> {
        let invoice = self
            .invoice_repo
            .find_by_number(number)
            .await?
            .ok_or_else(|| DomainError::InvoiceNumberNotFound(number.to_string()))?;
        AccessPolicy::authorize(actor, Resource::Invoice, Action::View, Some(&invoice.branch_id))?;
        Ok(invoice)
    }

    pub async fn list_invoices(
        &self,
        actor: &Actor,
        branch_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<Vec<Invoice>, DomainError> {
        AccessPolicy::authorize(actor, Resource::Invoice, Action::View, Some(branch_id))?;
        self.invoice_repo.list_by_branch(branch_id, pagination).await
    }

    async fn find(&self, id: &Uuid) -> Result<Invoice, DomainError> {
        self.invoice_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::InvoiceNotFound(*id))
    }

    async fn save(&self, invoice: Invoice, from: InvoiceStatus) -> Result<Invoice, DomainError> {
        let invoice = self.invoice_repo.transition(&invoice, from).await?;
        info!(number = %invoice.number, status = invoice.status.as_str(), "Invoice status changed");
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Client, InvoiceItem, NewClient};
    use crate::repositories::{MockBranchRepository, MockClientRepository, MockInvoiceRepository, MockSequenceStore};
    use crate::services::fixtures;
    use chrono::NaiveDate;

    type Service = InvoiceService<MockBranchRepository, MockClientRepository, MockInvoiceRepository, MockSequenceStore>;

    fn service(
        branches: MockBranchRepository,
        clients: MockClientRepository,
        invoices: MockInvoiceRepository,
        store: MockSequenceStore,
    ) -> Service {
        InvoiceService::new(
            Arc::new(branches),
            Arc::new(clients),
            Arc::new(invoices),
            Arc::new(store),
            SequenceSettings::default(),
        )
    }

    fn client(branch_id: Uuid) -> Client {
        Client::new(
            branch_id,
            NewClient {
                name: "CV Sinar Jaya".to_string(),
                email: None,
                phone: None,
                address: None,
            },
            None,
        )
    }

    fn new_invoice(client_id: Uuid) -> NewInvoice {
        NewInvoice {
            client_id,
            issue_date: NaiveDate::from_ymd_opt(2025, 6, 15),
            due_date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            items: vec![InvoiceItem {
                description: "Network audit".to_string(),
                quantity: 2,
                unit_price: 1_500_000,
            }],
            tax_rate_bps: 1_100,
        }
    }

    #[tokio::test]
    async fn test_create_invoice_numbers_by_branch_and_date() {
        let branch = fixtures::branch("BR-004");
        let branch_id = branch.id;
        let client = client(branch_id);
        let client_id = client.id;

        let mut branches = MockBranchRepository::new();
        branches
            .expect_find_by_id()
            .returning(move |_| Ok(Some(branch.clone())));
        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(client.clone())));
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_create().times(1).returning(|i| Ok(i.clone()));
        let mut store = MockSequenceStore::new();
        store
            .expect_latest_identifier()
            .withf(|prefix| prefix == "INV-BR-004-20250615-")
            .returning(|_| Ok(Some("INV-BR-004-20250615-002".to_string())));
        store.expect_identifier_exists().returning(|_| Ok(false));

        let invoice = service(branches, clients, invoices, store)
            .create_invoice(&fixtures::admin(), &branch_id, new_invoice(client_id))
            .await
            .unwrap();

        assert_eq!(invoice.number, "INV-BR-004-20250615-003");
        assert_eq!(invoice.subtotal, 3_000_000);
        assert_eq!(invoice.tax_amount, 330_000);
        assert_eq!(invoice.total, 3_330_000);
        assert_eq!(invoice.status, InvoiceStatus::Draft);
    }

    #[tokio::test]
    async fn test_missing_branch_checked_before_numbering() {
        let mut branches = MockBranchRepository::new();
        branches.expect_find_by_id().returning(|_| Ok(None));
        let mut clients = MockClientRepository::new();
        clients.expect_find_by_id().never();
        let mut store = MockSequenceStore::new();
        store.expect_latest_identifier().never();
        store.expect_identifier_exists().never();

        let result = service(branches, clients, MockInvoiceRepository::new(), store)
            .create_invoice(&fixtures::admin(), &Uuid::new_v4(), new_invoice(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(DomainError::BranchNotFound(_))));
    }

    #[tokio::test]
    async fn test_client_from_other_branch_rejected() {
        let branch = fixtures::branch("BR-004");
        let branch_id = branch.id;
        let foreign = client(Uuid::new_v4());
        let foreign_id = foreign.id;

        let mut branches = MockBranchRepository::new();
        branches
            .expect_find_by_id()
            .returning(move |_| Ok(Some(branch.clone())));
        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(foreign.clone())));
        let mut store = MockSequenceStore::new();
        store.expect_latest_identifier().never();

        let result = service(branches, clients, MockInvoiceRepository::new(), store)
            .create_invoice(&fixtures::admin(), &branch_id, new_invoice(foreign_id))
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_payment_is_saved_against_the_status_it_was_read_in() {
        let branch_id = Uuid::new_v4();
        let input = new_invoice(Uuid::new_v4());
        let (issue_date, totals) = input.prepare(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).unwrap();
        let mut issued = Invoice::new("INV-BR-004-20250615-001".to_string(), branch_id, issue_date, totals, input, None);
        issued.status = InvoiceStatus::Issued;
        let invoice_id = issued.id;

        let mut invoices = MockInvoiceRepository::new();
        invoices
            .expect_find_by_id()
            .returning(move |_| Ok(Some(issued.clone())));
        invoices
            .expect_transition()
            .times(1)
            .withf(|i, from| i.status == InvoiceStatus::Paid && *from == InvoiceStatus::Issued)
            .returning(|i, _| Ok(i.clone()));

        let paid = service(
            MockBranchRepository::new(),
            MockClientRepository::new(),
            invoices,
            MockSequenceStore::new(),
        )
        .mark_invoice_paid(&fixtures::admin(), &invoice_id)
        .await
        .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_lost_status_race_is_reported() {
        let branch_id = Uuid::new_v4();
        let input = new_invoice(Uuid::new_v4());
        let (issue_date, totals) = input.prepare(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).unwrap();
        let mut issued = Invoice::new("INV-BR-004-20250615-001".to_string(), branch_id, issue_date, totals, input, None);
        issued.status = InvoiceStatus::Issued;
        let invoice_id = issued.id;

        let mut invoices = MockInvoiceRepository::new();
        invoices
            .expect_find_by_id()
            .returning(move |_| Ok(Some(issued.clone())));
        invoices.expect_transition().times(1).returning(|_, _| {
            Err(DomainError::InvalidStatusTransition {
                entity: "invoice",
                from: InvoiceStatus::Paid.as_str(),
                to: InvoiceStatus::Cancelled.as_str(),
            })
        });

        let result = service(
            MockBranchRepository::new(),
            MockClientRepository::new(),
            invoices,
            MockSequenceStore::new(),
        )
        .cancel_invoice(&fixtures::admin(), &invoice_id)
        .await;
        assert!(matches!(
            result,
            Err(DomainError::InvalidStatusTransition { entity: "invoice", from: "paid", .. })
        ));
    }
}
