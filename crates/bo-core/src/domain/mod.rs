//! # Back-office Core - Domain Module
//!
//! Domain entities for the back-office application.

pub mod attendance;
pub mod branch;
pub mod client;
pub mod employee;
pub mod invoice;
pub mod leave;
pub mod task;

// Re-export all entities and enums
pub use attendance::AttendanceRecord;
pub use branch::{Branch, NewBranch, UpdateBranch};
pub use client::{Client, NewClient, UpdateClient};
pub use employee::{Employee, EmploymentStatus, NewEmployee, UpdateEmployee};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus, InvoiceTotals, NewInvoice};
pub use leave::{
    working_days, BalanceDelta, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
pub use task::{NewTask, Task, TaskStatus};
