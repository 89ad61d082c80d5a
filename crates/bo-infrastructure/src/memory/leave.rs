//! In-memory leave ledger
//!
//! Balances and requests share one lock so a transition and its balance delta
//! land together, like the transactional adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use bo_core::domain::{BalanceDelta, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
use bo_core::error::DomainError;
use bo_core::repositories::LeaveRepository;

type BalanceKey = (Uuid, i32, LeaveType);

#[derive(Default)]
struct Ledger {
    balances: HashMap<BalanceKey, LeaveBalance>,
    requests: HashMap<Uuid, LeaveRequest>,
}

impl Ledger {
    fn balance_for(&mut self, request: &LeaveRequest) -> Result<&mut LeaveBalance, DomainError> {
        self.balances
            .get_mut(&(request.employee_id, request.year(), request.leave_type))
            .ok_or_else(|| {
                DomainError::InternalError(format!(
                    "No {} balance for employee {} in {}",
                    request.leave_type.as_str(),
                    request.employee_id,
                    request.year()
                ))
            })
    }
}

#[derive(Default)]
pub struct MemoryLeaveRepository {
    ledger: Mutex<Ledger>,
}

impl MemoryLeaveRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveRepository for MemoryLeaveRepository {
    async fn find_balance(
        &self,
        employee_id: &Uuid,
        year: i32,
        leave_type: LeaveType,
    ) -> Result<Option<LeaveBalance>, DomainError> {
        Ok(self.ledger.lock().balances.get(&(*employee_id, year, leave_type)).cloned())
    }

    async fn create_balance(&self, balance: &LeaveBalance) -> Result<LeaveBalance, DomainError> {
        let mut ledger = self.ledger.lock();
        let stored = ledger
            .balances
            .entry((balance.employee_id, balance.year, balance.leave_type))
            .or_insert_with(|| balance.clone());
        Ok(stored.clone())
    }

    async fn list_balances(&self, employee_id: &Uuid, year: i32) -> Result<Vec<LeaveBalance>, DomainError> {
        let mut balances: Vec<LeaveBalance> = self
            .ledger
            .lock()
            .balances
            .values()
            .filter(|b| b.employee_id == *employee_id && b.year == year)
            .cloned()
            .collect();
        balances.sort_by_key(|b| b.leave_type.as_str());
        Ok(balances)
    }

    async fn find_request(&self, id: &Uuid) -> Result<Option<LeaveRequest>, DomainError> {
        Ok(self.ledger.lock().requests.get(id).cloned())
    }

    async fn list_requests(&self, employee_id: &Uuid) -> Result<Vec<LeaveRequest>, DomainError> {
        let mut requests: Vec<LeaveRequest> = self
            .ledger
            .lock()
            .requests
            .values()
            .filter(|r| r.employee_id == *employee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(requests)
    }

    async fn find_overlapping(
        &self,
        employee_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<LeaveRequest>, DomainError> {
        let ledger = self.ledger.lock();
        Ok(ledger
            .requests
            .values()
            .filter(|r| r.employee_id == *employee_id && r.status.is_active() && r.overlaps(start, end))
            .min_by_key(|r| r.start_date)
            .cloned())
    }

    async fn submit_request(&self, request: &LeaveRequest) -> Result<LeaveRequest, DomainError> {
        let mut ledger = self.ledger.lock();
        if let Some(existing) = ledger.requests.values().find(|r| {
            r.employee_id == request.employee_id
                && r.status.is_active()
                && r.overlaps(request.start_date, request.end_date)
        }) {
            return Err(DomainError::OverlappingLeave(existing.id));
        }

        let balance = ledger.balance_for(request)?;
        if request.leave_type.is_paid() && balance.available() < request.days {
            return Err(DomainError::InsufficientLeaveBalance {
                requested: request.days,
                available: balance.available(),
            });
        }
        balance.apply(request.submission_delta());
        ledger.requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn transition_request(
        &self,
        request: &LeaveRequest,
        from: LeaveStatus,
        delta: BalanceDelta,
    ) -> Result<LeaveRequest, DomainError> {
        let mut ledger = self.ledger.lock();
        let current = ledger
            .requests
            .get(&request.id)
            .map(|r| r.status)
            .ok_or(DomainError::LeaveRequestNotFound(request.id))?;
        if current != from {
            return Err(DomainError::InvalidStatusTransition {
                entity: "leave request",
                from: current.as_str(),
                to: request.status.as_str(),
            });
        }

        if delta != BalanceDelta::default() {
            ledger.balance_for(request)?.apply(delta);
        }
        ledger.requests.insert(request.id, request.clone());
        Ok(request.clone())
    }
}
