// ============================================================================
// Back-office Core - Invoice Entity
// File: crates/bo-core/src/domain/invoice.rs
// Description: Client invoices numbered `INV-<branch>-<YYYYMMDD>-###`
// ============================================================================

use bo_shared::constants::BASIS_POINTS_SCALE;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Invoice status enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "issued" => Some(InvoiceStatus::Issued),
            "paid" => Some(InvoiceStatus::Paid),
            "cancelled" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

/// Invoice line; prices are in minor currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InvoiceItem {
    #[validate(length(min = 1, max = 500, message = "Item description is required"))]
    pub description: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    #[validate(range(min = 0, message = "Unit price cannot be negative"))]
    pub unit_price: i64,
}

/// Monetary totals of an invoice, in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
}

impl InvoiceTotals {
    /// Sums the lines and applies `tax_rate_bps`, rounding the tax half-up.
    pub fn compute(items: &[InvoiceItem], tax_rate_bps: i32) -> Result<Self, DomainError> {
        let overflow = || DomainError::ValidationError("Invoice amount out of range".to_string());

        let mut subtotal: i64 = 0;
        for item in items {
            let line = item.unit_price.checked_mul(i64::from(item.quantity)).ok_or_else(overflow)?;
            subtotal = subtotal.checked_add(line).ok_or_else(overflow)?;
        }

        let tax_amount = subtotal
            .checked_mul(i64::from(tax_rate_bps))
            .and_then(|scaled| scaled.checked_add(BASIS_POINTS_SCALE / 2))
            .map(|scaled| scaled / BASIS_POINTS_SCALE)
            .ok_or_else(overflow)?;
        let total = subtotal.checked_add(tax_amount).ok_or_else(overflow)?;

        Ok(Self { subtotal, tax_amount, total })
    }
}

/// Invoice entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub number: String,
    pub branch_id: Uuid,
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<InvoiceItem>,
    pub subtotal: i64,
    pub tax_rate_bps: i32,
    pub tax_amount: i64,
    pub total: i64,
    pub status: InvoiceStatus,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

/// Invoice creation input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewInvoice {
    pub client_id: Uuid,

    /// Defaults to today (UTC) when omitted.
    pub issue_date: Option<NaiveDate>,

    pub due_date: NaiveDate,

    #[validate(length(min = 1, message = "Invoice needs at least one item"), nested)]
    pub items: Vec<InvoiceItem>,

    #[validate(range(min = 0, max = 10000, message = "Tax rate must be between 0 and 10000 basis points"))]
    #[serde(default)]
    pub tax_rate_bps: i32,
}

impl NewInvoice {
    /// Resolves the issue date and totals, checking the due date against it.
    pub fn prepare(&self, today: NaiveDate) -> Result<(NaiveDate, InvoiceTotals), DomainError> {
        let issue_date = self.issue_date.unwrap_or(today);
        if self.due_date < issue_date {
            return Err(DomainError::ValidationError(
                "Due date cannot be before the issue date".to_string(),
            ));
        }
        let totals = InvoiceTotals::compute(&self.items, self.tax_rate_bps)?;
        Ok((issue_date, totals))
    }
}

impl Invoice {
    pub fn new(
        number: String,
        branch_id: Uuid,
        issue_date: NaiveDate,
        totals: InvoiceTotals,
        input: NewInvoice,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            branch_id,
            client_id: input.client_id,
            issue_date,
            due_date: input.due_date,
            items: input.items,
            subtotal: totals.subtotal,
            tax_rate_bps: input.tax_rate_bps,
            tax_amount: totals.tax_amount,
            total: totals.total,
            status: InvoiceStatus::default(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    pub fn issue(&mut self, by: Uuid) -> Result<(), DomainError> {
        self.move_to(&[InvoiceStatus::Draft], InvoiceStatus::Issued, by)
    }

    pub fn mark_paid(&mut self, by: Uuid) -> Result<(), DomainError> {
        self.move_to(&[InvoiceStatus::Issued], InvoiceStatus::Paid, by)
    }

    pub fn cancel(&mut self, by: Uuid) -> Result<(), DomainError> {
        self.move_to(&[InvoiceStatus::Draft, InvoiceStatus::Issued], InvoiceStatus::Cancelled, by)
    }

    fn move_to(&mut self, from: &[InvoiceStatus], to: InvoiceStatus, by: Uuid) -> Result<(), DomainError> {
        if !from.contains(&self.status) {
            return Err(DomainError::InvalidStatusTransition {
                entity: "invoice",
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(by);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: i64) -> InvoiceItem {
        InvoiceItem {
            description: "Monthly maintenance".to_string(),
            quantity,
            unit_price,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_totals_round_half_up() {
        // 1_005 * 11% = 110.55 -> 111
        let totals = InvoiceTotals::compute(&[item(1, 1_005)], 1_100).unwrap();
        assert_eq!(totals.subtotal, 1_005);
        assert_eq!(totals.tax_amount, 111);
        assert_eq!(totals.total, 1_116);

        // 150 * 1% = 1.5 -> 2
        let totals = InvoiceTotals::compute(&[item(3, 50)], 100).unwrap();
        assert_eq!(totals.tax_amount, 2);
    }

    #[test]
    fn test_totals_overflow_is_validation_error() {
        let result = InvoiceTotals::compute(&[item(i32::MAX, i64::MAX / 2)], 0);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_input_validation() {
        let input = NewInvoice {
            client_id: Uuid::new_v4(),
            issue_date: None,
            due_date: date(2025, 6, 30),
            items: vec![],
            tax_rate_bps: 20_000,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("items"));
        assert!(fields.contains_key("tax_rate_bps"));

        let nested = NewInvoice {
            items: vec![item(0, 100)],
            tax_rate_bps: 0,
            ..input
        };
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_prepare_defaults_issue_date_and_checks_due_date() {
        let input = NewInvoice {
            client_id: Uuid::new_v4(),
            issue_date: None,
            due_date: date(2025, 6, 30),
            items: vec![item(2, 500)],
            tax_rate_bps: 1_000,
        };
        let (issue_date, totals) = input.prepare(date(2025, 6, 15)).unwrap();
        assert_eq!(issue_date, date(2025, 6, 15));
        assert_eq!(totals.total, 1_100);

        assert!(input.prepare(date(2025, 7, 1)).is_err());
    }

    #[test]
    fn test_status_workflow() {
        let input = NewInvoice {
            client_id: Uuid::new_v4(),
            issue_date: Some(date(2025, 6, 15)),
            due_date: date(2025, 6, 30),
            items: vec![item(1, 100)],
            tax_rate_bps: 0,
        };
        let (issue_date, totals) = input.prepare(date(2025, 6, 15)).unwrap();
        let mut invoice = Invoice::new(
            "INV-BR-001-20250615-001".to_string(),
            Uuid::new_v4(),
            issue_date,
            totals,
            input,
            None,
        );
        let by = Uuid::new_v4();

        assert_eq!(invoice.status, InvoiceStatus::default());
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
        assert!(invoice.mark_paid(by).is_err());
        invoice.issue(by).unwrap();
        invoice.mark_paid(by).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(matches!(
            invoice.cancel(by),
            Err(DomainError::InvalidStatusTransition { from: "paid", .. })
        ));
    }
}
