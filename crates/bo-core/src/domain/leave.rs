// ============================================================================
// Back-office Core - Leave Entities
// File: crates/bo-core/src/domain/leave.rs
// Description: Leave requests, yearly balances and working-day counting
// ============================================================================

use bo_shared::config::LeaveSettings;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Leave type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Unpaid => "unpaid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "annual" => Some(LeaveType::Annual),
            "sick" => Some(LeaveType::Sick),
            "unpaid" => Some(LeaveType::Unpaid),
            _ => None,
        }
    }

    /// Paid types draw down an entitlement; unpaid leave is only tracked.
    pub fn is_paid(&self) -> bool {
        !matches!(self, LeaveType::Unpaid)
    }

    pub fn entitlement(&self, settings: &LeaveSettings) -> i32 {
        match self {
            LeaveType::Annual => settings.annual_days,
            LeaveType::Sick => settings.sick_days,
            LeaveType::Unpaid => 0,
        }
    }
}

/// Leave request status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            "cancelled" => Some(LeaveStatus::Cancelled),
            _ => None,
        }
    }

    /// Pending and approved requests block overlapping ones.
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

impl Default for LeaveStatus {
    fn default() -> Self {
        LeaveStatus::Pending
    }
}

/// Increments applied to a balance alongside a request transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub pending: i32,
    pub used: i32,
}

/// Per-employee, per-year, per-type leave ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub employee_id: Uuid,
    pub year: i32,
    pub leave_type: LeaveType,
    pub entitled_days: i32,
    pub used_days: i32,
    pub pending_days: i32,
}

impl LeaveBalance {
    pub fn new(employee_id: Uuid, year: i32, leave_type: LeaveType, entitled_days: i32) -> Self {
        Self {
            employee_id,
            year,
            leave_type,
            entitled_days,
            used_days: 0,
            pending_days: 0,
        }
    }

    pub fn available(&self) -> i32 {
        self.entitled_days - self.used_days - self.pending_days
    }

    pub fn apply(&mut self, delta: BalanceDelta) {
        self.pending_days += delta.pending;
        self.used_days += delta.used;
    }
}

/// Leave request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLeaveRequest {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(max = 1000, message = "Reason too long"))]
    pub reason: Option<String>,
}

impl NewLeaveRequest {
    /// Working days requested; the range must sit inside one calendar year.
    pub fn working_days(&self) -> Result<i32, DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::ValidationError(
                "End date cannot be before the start date".to_string(),
            ));
        }
        if self.start_date.year() != self.end_date.year() {
            return Err(DomainError::ValidationError(
                "Leave cannot span calendar years".to_string(),
            ));
        }
        let days = working_days(self.start_date, self.end_date);
        if days < 1 {
            return Err(DomainError::ValidationError(
                "Leave must cover at least one working day".to_string(),
            ));
        }
        Ok(days)
    }
}

impl LeaveRequest {
    pub fn new(employee_id: Uuid, input: NewLeaveRequest, days: i32, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            days,
            reason: input.reason.map(|r| r.trim().to_string()),
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.start_date.year()
    }

    /// Balance change recorded when the request is submitted.
    pub fn submission_delta(&self) -> BalanceDelta {
        BalanceDelta { pending: self.days, used: 0 }
    }

    pub fn approve(&mut self, by: Uuid) -> Result<BalanceDelta, DomainError> {
        self.decide(LeaveStatus::Approved, by)?;
        Ok(BalanceDelta { pending: -self.days, used: self.days })
    }

    pub fn reject(&mut self, by: Uuid) -> Result<BalanceDelta, DomainError> {
        self.decide(LeaveStatus::Rejected, by)?;
        Ok(BalanceDelta { pending: -self.days, used: 0 })
    }

    /// Pending requests release their hold; approved ones are refunded only
    /// before the leave starts.
    pub fn cancel(&mut self, by: Uuid, today: NaiveDate) -> Result<BalanceDelta, DomainError> {
        let delta = match self.status {
            LeaveStatus::Pending => BalanceDelta { pending: -self.days, used: 0 },
            LeaveStatus::Approved if today < self.start_date => BalanceDelta { pending: 0, used: -self.days },
            _ => return Err(self.invalid(LeaveStatus::Cancelled)),
        };
        self.status = LeaveStatus::Cancelled;
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(by);
        Ok(delta)
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    fn decide(&mut self, to: LeaveStatus, by: Uuid) -> Result<(), DomainError> {
        if self.status != LeaveStatus::Pending {
            return Err(self.invalid(to));
        }
        let now = Utc::now();
        self.status = to;
        self.decided_by = Some(by);
        self.decided_at = Some(now);
        self.modified_at = Some(now);
        self.modified_by = Some(by);
        Ok(())
    }

    fn invalid(&self, to: LeaveStatus) -> DomainError {
        DomainError::InvalidStatusTransition {
            entity: "leave request",
            from: self.status.as_str(),
            to: to.as_str(),
        }
    }
}

/// Monday-to-Friday days in the inclusive range.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> i32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        let input = NewLeaveRequest {
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: end,
            reason: Some("Family trip".to_string()),
        };
        let days = input.working_days().unwrap();
        LeaveRequest::new(Uuid::new_v4(), input, days, None)
    }

    #[test]
    fn test_working_days_skip_weekends() {
        // Fri 2025-06-13 .. Tue 2025-06-17
        assert_eq!(working_days(date(2025, 6, 13), date(2025, 6, 17)), 3);
        assert_eq!(working_days(date(2025, 6, 14), date(2025, 6, 15)), 0);
        assert_eq!(working_days(date(2025, 6, 16), date(2025, 6, 16)), 1);
    }

    #[test]
    fn test_request_range_rules() {
        let weekend = NewLeaveRequest {
            leave_type: LeaveType::Sick,
            start_date: date(2025, 6, 14),
            end_date: date(2025, 6, 15),
            reason: None,
        };
        assert!(weekend.working_days().is_err());

        let across_years = NewLeaveRequest {
            start_date: date(2025, 12, 30),
            end_date: date(2026, 1, 2),
            ..weekend.clone()
        };
        assert!(across_years.working_days().is_err());

        let backwards = NewLeaveRequest {
            start_date: date(2025, 6, 20),
            end_date: date(2025, 6, 16),
            ..weekend
        };
        assert!(backwards.working_days().is_err());
    }

    #[test]
    fn test_balance_deltas() {
        let mut balance = LeaveBalance::new(Uuid::new_v4(), 2025, LeaveType::Annual, 12);
        let mut leave = request(date(2025, 6, 16), date(2025, 6, 18));

        balance.apply(leave.submission_delta());
        assert_eq!(balance.pending_days, 3);
        assert_eq!(balance.available(), 9);

        balance.apply(leave.approve(Uuid::new_v4()).unwrap());
        assert_eq!(balance.pending_days, 0);
        assert_eq!(balance.used_days, 3);
        assert_eq!(balance.available(), 9);

        let refund = leave.cancel(Uuid::new_v4(), date(2025, 6, 1)).unwrap();
        balance.apply(refund);
        assert_eq!(balance.used_days, 0);
        assert_eq!(balance.available(), 12);
    }

    #[test]
    fn test_started_leave_cannot_be_cancelled() {
        let mut leave = request(date(2025, 6, 16), date(2025, 6, 18));
        leave.approve(Uuid::new_v4()).unwrap();
        assert!(matches!(
            leave.cancel(Uuid::new_v4(), date(2025, 6, 17)),
            Err(DomainError::InvalidStatusTransition { from: "approved", .. })
        ));
    }

    #[test]
    fn test_decided_request_is_final() {
        let mut leave = request(date(2025, 6, 16), date(2025, 6, 16));
        leave.reject(Uuid::new_v4()).unwrap();
        assert!(leave.approve(Uuid::new_v4()).is_err());
        assert!(leave.cancel(Uuid::new_v4(), date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_overlaps() {
        let leave = request(date(2025, 6, 16), date(2025, 6, 18));
        assert!(leave.overlaps(date(2025, 6, 18), date(2025, 6, 20)));
        assert!(!leave.overlaps(date(2025, 6, 19), date(2025, 6, 20)));
    }
}
