//! End-to-end flows over the in-memory adapters

use std::collections::HashSet;
use std::sync::Arc;

use bo_core::{
    DomainError, InvoiceItem, InvoiceStatus, LeaveStatus, LeaveType, NewBranch, NewClient, NewEmployee,
    NewInvoice, NewLeaveRequest,
};
use bo_infrastructure::MemoryBackoffice;
use bo_security::{AccessError, Actor, Role};
use bo_shared::config::AppConfig;
use bo_shared::types::Pagination;
use chrono::{NaiveDate, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

fn backoffice() -> MemoryBackoffice {
    let config = AppConfig::from_toml("").expect("default configuration");
    MemoryBackoffice::in_memory(&config)
}

fn new_branch() -> NewBranch {
    NewBranch {
        name: CompanyName().fake(),
        address: None,
        phone: None,
        email: None,
    }
}

fn new_employee(role: Role) -> NewEmployee {
    NewEmployee {
        full_name: Name().fake(),
        email: SafeEmail().fake(),
        phone: None,
        position: None,
        role,
        hired_on: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_branch_codes_follow_sequence() {
    let bo = backoffice();
    let admin = Actor::global(Role::SuperAdmin);

    let first = bo.branches.create_branch(&admin, new_branch()).await.unwrap();
    let second = bo.branches.create_branch(&admin, new_branch()).await.unwrap();
    assert_eq!(first.code, "BR-001");
    assert_eq!(second.code, "BR-002");

    let found = bo.branches.get_branch_by_code(&admin, "BR-002").await.unwrap();
    assert_eq!(found.id, second.id);

    // Deactivated branches keep their code
    bo.branches.deactivate_branch(&admin, &second.id).await.unwrap();
    let third = bo.branches.create_branch(&admin, new_branch()).await.unwrap();
    assert_eq!(third.code, "BR-003");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_branch_creation_yields_distinct_codes() {
    let config = AppConfig::from_toml(
        r#"
        [sequence]
        insert_attempts = 32
        "#,
    )
    .unwrap();
    let bo = Arc::new(MemoryBackoffice::in_memory(&config));
    let admin = Actor::global(Role::SuperAdmin);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let bo = bo.clone();
        let admin = admin.clone();
        handles.push(tokio::spawn(async move {
            bo.branches.create_branch(&admin, new_branch()).await
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let branch = handle.await.unwrap().unwrap();
        assert!(branch.code.starts_with("BR-"));
        assert!(codes.insert(branch.code));
    }
    assert_eq!(codes.len(), 16);

    let listed = bo.branches.list_branches(&admin, &Pagination::new(1, 50)).await.unwrap();
    assert_eq!(listed.len(), 16);
}

#[tokio::test]
async fn test_employee_codes_are_scoped_per_branch() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let super_admin = Actor::global(Role::SuperAdmin);

    let north = bo.branches.create_branch(&super_admin, new_branch()).await.unwrap();
    let south = bo.branches.create_branch(&super_admin, new_branch()).await.unwrap();

    let a = bo.employees.create_employee(&admin, &north.id, new_employee(Role::Staff)).await.unwrap();
    let b = bo.employees.create_employee(&admin, &north.id, new_employee(Role::Staff)).await.unwrap();
    let c = bo.employees.create_employee(&admin, &south.id, new_employee(Role::Staff)).await.unwrap();

    assert_eq!(a.code, "EMP-BR-001-001");
    assert_eq!(b.code, "EMP-BR-001-002");
    assert_eq!(c.code, "EMP-BR-002-001");
}

#[tokio::test]
async fn test_employee_for_missing_branch_is_not_found() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let missing = Uuid::new_v4();

    let result = bo.employees.create_employee(&admin, &missing, new_employee(Role::Staff)).await;
    assert!(matches!(result, Err(DomainError::BranchNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_duplicate_employee_email_is_rejected() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let branch = bo.branches.create_branch(&Actor::global(Role::SuperAdmin), new_branch()).await.unwrap();

    let input = new_employee(Role::Staff);
    bo.employees.create_employee(&admin, &branch.id, input.clone()).await.unwrap();

    let result = bo.employees.create_employee(&admin, &branch.id, input).await;
    assert!(matches!(result, Err(DomainError::EmailAlreadyExists(_))));
}

#[tokio::test]
async fn test_invoice_numbers_are_dated_and_persisted() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let branch = bo.branches.create_branch(&Actor::global(Role::SuperAdmin), new_branch()).await.unwrap();
    let client = bo
        .clients
        .create_client(
            &admin,
            &branch.id,
            NewClient {
                name: CompanyName().fake(),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();

    let input = NewInvoice {
        client_id: client.id,
        issue_date: Some(date(2025, 6, 15)),
        due_date: date(2025, 7, 15),
        items: vec![InvoiceItem {
            description: "Monthly bookkeeping".to_string(),
            quantity: 2,
            unit_price: 1_500_000,
        }],
        tax_rate_bps: 1100,
    };

    let first = bo.invoices.create_invoice(&admin, &branch.id, input.clone()).await.unwrap();
    let second = bo.invoices.create_invoice(&admin, &branch.id, input.clone()).await.unwrap();
    let next_day = bo
        .invoices
        .create_invoice(
            &admin,
            &branch.id,
            NewInvoice {
                issue_date: Some(date(2025, 6, 16)),
                ..input
            },
        )
        .await
        .unwrap();

    assert_eq!(first.number, "INV-BR-001-20250615-001");
    assert_eq!(second.number, "INV-BR-001-20250615-002");
    assert_eq!(next_day.number, "INV-BR-001-20250616-001");
    assert_eq!(first.total, 3_330_000);

    let fetched = bo.invoices.get_invoice_by_number(&admin, &second.number).await.unwrap();
    assert_eq!(fetched.id, second.id);

    let issued = bo.invoices.issue_invoice(&admin, &first.id).await.unwrap();
    assert_eq!(issued.status, InvoiceStatus::Issued);
    let paid = bo.invoices.mark_invoice_paid(&admin, &first.id).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_attendance_one_record_per_day() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let branch = bo.branches.create_branch(&Actor::global(Role::SuperAdmin), new_branch()).await.unwrap();
    let staff = bo.employees.create_employee(&admin, &branch.id, new_employee(Role::Staff)).await.unwrap();
    let me = Actor::new(Uuid::new_v4(), Role::Staff, Some(branch.id), Some(staff.id));

    let now = Utc::now();
    let record = bo.attendance.check_in(&me, &staff.id, now).await.unwrap();
    assert!(record.is_open());

    let again = bo.attendance.check_in(&me, &staff.id, now).await;
    assert!(matches!(again, Err(DomainError::AlreadyCheckedIn { .. })));

    let closed = bo.attendance.check_out(&me, &staff.id, now).await.unwrap();
    assert!(!closed.is_open());

    let colleague = Uuid::new_v4();
    let other = bo.attendance.check_in(&me, &colleague, now).await;
    assert!(matches!(other, Err(DomainError::EmployeeNotFound(_))));
}

#[tokio::test]
async fn test_leave_bookkeeping() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let branch = bo.branches.create_branch(&Actor::global(Role::SuperAdmin), new_branch()).await.unwrap();
    let staff = bo.employees.create_employee(&admin, &branch.id, new_employee(Role::Staff)).await.unwrap();
    let hr = bo.employees.create_employee(&admin, &branch.id, new_employee(Role::HrOfficer)).await.unwrap();

    let me = Actor::new(Uuid::new_v4(), Role::Staff, Some(branch.id), Some(staff.id));
    let approver = Actor::new(Uuid::new_v4(), Role::HrOfficer, Some(branch.id), Some(hr.id));

    // Monday 4 to Friday 8 March 2030
    let request = bo
        .leave
        .apply_leave(
            &me,
            &staff.id,
            NewLeaveRequest {
                leave_type: LeaveType::Annual,
                start_date: date(2030, 3, 4),
                end_date: date(2030, 3, 8),
                reason: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(request.days, 5);
    assert_eq!(request.status, LeaveStatus::Pending);

    let overlapping = bo
        .leave
        .apply_leave(
            &me,
            &staff.id,
            NewLeaveRequest {
                leave_type: LeaveType::Sick,
                start_date: date(2030, 3, 8),
                end_date: date(2030, 3, 8),
                reason: None,
            },
        )
        .await;
    assert!(matches!(overlapping, Err(DomainError::OverlappingLeave(id)) if id == request.id));

    let balances = bo.leave.leave_balances(&me, &staff.id, 2030).await.unwrap();
    let annual = balances.iter().find(|b| b.leave_type == LeaveType::Annual).unwrap();
    assert_eq!(annual.pending_days, 5);
    assert_eq!(annual.available(), 7);

    let own = bo.leave.approve_leave(&me, &request.id).await;
    assert!(matches!(own, Err(DomainError::Forbidden(AccessError::Denied { .. }))));

    let approved = bo.leave.approve_leave(&approver, &request.id).await.unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.decided_by, Some(approver.user_id));

    let balances = bo.leave.leave_balances(&me, &staff.id, 2030).await.unwrap();
    let annual = balances.iter().find(|b| b.leave_type == LeaveType::Annual).unwrap();
    assert_eq!((annual.used_days, annual.pending_days), (5, 0));

    let cancelled = bo.leave.cancel_leave(&me, &request.id).await.unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);

    let balances = bo.leave.leave_balances(&me, &staff.id, 2030).await.unwrap();
    let annual = balances.iter().find(|b| b.leave_type == LeaveType::Annual).unwrap();
    assert_eq!((annual.used_days, annual.pending_days), (0, 0));
    assert_eq!(annual.available(), 12);
}

#[tokio::test]
async fn test_leave_beyond_entitlement_is_refused() {
    let bo = backoffice();
    let admin = Actor::global(Role::Admin);
    let branch = bo.branches.create_branch(&Actor::global(Role::SuperAdmin), new_branch()).await.unwrap();
    let staff = bo.employees.create_employee(&admin, &branch.id, new_employee(Role::Staff)).await.unwrap();
    let me = Actor::new(Uuid::new_v4(), Role::Staff, Some(branch.id), Some(staff.id));

    // 4 March to 29 March 2030 is 20 working days
    let result = bo
        .leave
        .apply_leave(
            &me,
            &staff.id,
            NewLeaveRequest {
                leave_type: LeaveType::Annual,
                start_date: date(2030, 3, 4),
                end_date: date(2030, 3, 29),
                reason: None,
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(DomainError::InsufficientLeaveBalance { requested: 20, available: 12 })
    ));

    let requests = bo.leave.list_leave_requests(&me, &staff.id).await.unwrap();
    assert!(requests.is_empty());
}
