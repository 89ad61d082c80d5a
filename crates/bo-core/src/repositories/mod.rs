//! Repository traits (ports)

pub mod attendance_repository;
pub mod branch_repository;
pub mod client_repository;
pub mod employee_repository;
pub mod invoice_repository;
pub mod leave_repository;
pub mod sequence_store;
pub mod task_repository;

pub use attendance_repository::AttendanceRepository;
pub use branch_repository::BranchRepository;
pub use client_repository::ClientRepository;
pub use employee_repository::EmployeeRepository;
pub use invoice_repository::InvoiceRepository;
pub use leave_repository::LeaveRepository;
pub use sequence_store::SequenceStore;
pub use task_repository::TaskRepository;

#[cfg(test)]
pub use attendance_repository::MockAttendanceRepository;
#[cfg(test)]
pub use branch_repository::MockBranchRepository;
#[cfg(test)]
pub use client_repository::MockClientRepository;
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
#[cfg(test)]
pub use invoice_repository::MockInvoiceRepository;
#[cfg(test)]
pub use leave_repository::MockLeaveRepository;
#[cfg(test)]
pub use sequence_store::MockSequenceStore;
#[cfg(test)]
pub use task_repository::MockTaskRepository;
