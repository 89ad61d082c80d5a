// ============================================================================
// Back-office Infrastructure - Composition Root
// File: crates/bo-infrastructure/src/backoffice.rs
// Description: Wires adapters into every service
// ============================================================================

use std::sync::Arc;

use anyhow::Context;
use bo_core::repositories::{
    AttendanceRepository, BranchRepository, ClientRepository, EmployeeRepository, InvoiceRepository,
    LeaveRepository, SequenceStore, TaskRepository,
};
use bo_core::services::{
    AttendanceService, BranchService, ClientService, EmployeeService, InvoiceService, LeaveService,
    TaskService,
};
use bo_shared::config::AppConfig;
use bo_shared::telemetry::{init_telemetry, WorkerGuard};
use tracing::info;

use crate::database::{
    create_pool, PgAttendanceRepository, PgBranchRepository, PgClientRepository, PgEmployeeRepository,
    PgInvoiceRepository, PgLeaveRepository, PgTaskRepository,
};
use crate::memory::{
    MemoryAttendanceRepository, MemoryBranchRepository, MemoryClientRepository, MemoryEmployeeRepository,
    MemoryInvoiceRepository, MemoryLeaveRepository, MemoryTaskRepository,
};

/// One adapter per port. Branch, employee and invoice adapters also serve
/// their identifier sequences.
pub struct Adapters<B, E, C, T, I, A, L> {
    pub branches: Arc<B>,
    pub employees: Arc<E>,
    pub clients: Arc<C>,
    pub tasks: Arc<T>,
    pub invoices: Arc<I>,
    pub attendance: Arc<A>,
    pub leave: Arc<L>,
}

pub struct Backoffice<B, E, C, T, I, A, L>
where
    B: BranchRepository + SequenceStore,
    E: EmployeeRepository + SequenceStore,
    C: ClientRepository,
    T: TaskRepository,
    I: InvoiceRepository + SequenceStore,
    A: AttendanceRepository,
    L: LeaveRepository,
{
    pub branches: BranchService<B, B>,
    pub employees: EmployeeService<B, E, E>,
    pub clients: ClientService<B, C>,
    pub tasks: TaskService<B, C, E, T>,
    pub invoices: InvoiceService<B, C, I, I>,
    pub attendance: AttendanceService<E, A>,
    pub leave: LeaveService<E, L>,
}

pub type PgBackoffice = Backoffice<
    PgBranchRepository,
    PgEmployeeRepository,
    PgClientRepository,
    PgTaskRepository,
    PgInvoiceRepository,
    PgAttendanceRepository,
    PgLeaveRepository,
>;

pub type MemoryBackoffice = Backoffice<
    MemoryBranchRepository,
    MemoryEmployeeRepository,
    MemoryClientRepository,
    MemoryTaskRepository,
    MemoryInvoiceRepository,
    MemoryAttendanceRepository,
    MemoryLeaveRepository,
>;

impl<B, E, C, T, I, A, L> Backoffice<B, E, C, T, I, A, L>
where
    B: BranchRepository + SequenceStore,
    E: EmployeeRepository + SequenceStore,
    C: ClientRepository,
    T: TaskRepository,
    I: InvoiceRepository + SequenceStore,
    A: AttendanceRepository,
    L: LeaveRepository,
{
    pub fn from_adapters(adapters: Adapters<B, E, C, T, I, A, L>, config: &AppConfig) -> Self {
        let sequence = config.sequence.clone();
        Self {
            branches: BranchService::new(adapters.branches.clone(), adapters.branches.clone(), sequence.clone()),
            employees: EmployeeService::new(
                adapters.branches.clone(),
                adapters.employees.clone(),
                adapters.employees.clone(),
                sequence.clone(),
            ),
            clients: ClientService::new(adapters.branches.clone(), adapters.clients.clone()),
            tasks: TaskService::new(
                adapters.branches.clone(),
                adapters.clients.clone(),
                adapters.employees.clone(),
                adapters.tasks,
            ),
            invoices: InvoiceService::new(
                adapters.branches,
                adapters.clients,
                adapters.invoices.clone(),
                adapters.invoices,
                sequence,
            ),
            attendance: AttendanceService::new(adapters.employees.clone(), adapters.attendance),
            leave: LeaveService::new(adapters.employees, adapters.leave, config.leave.clone()),
        }
    }
}

impl PgBackoffice {
    /// Opens the pool and wires the PostgreSQL adapters.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database)
            .await
            .context("Failed to connect to database")?;

        let adapters = Adapters {
            branches: Arc::new(PgBranchRepository::new(pool.clone())),
            employees: Arc::new(PgEmployeeRepository::new(pool.clone())),
            clients: Arc::new(PgClientRepository::new(pool.clone())),
            tasks: Arc::new(PgTaskRepository::new(pool.clone())),
            invoices: Arc::new(PgInvoiceRepository::new(pool.clone())),
            attendance: Arc::new(PgAttendanceRepository::new(pool.clone())),
            leave: Arc::new(PgLeaveRepository::new(pool)),
        };

        info!(app = %config.app.name, env = %config.app.env, "Back-office services ready");
        Ok(Self::from_adapters(adapters, config))
    }
}

impl MemoryBackoffice {
    pub fn in_memory(config: &AppConfig) -> Self {
        let adapters = Adapters {
            branches: Arc::new(MemoryBranchRepository::new()),
            employees: Arc::new(MemoryEmployeeRepository::new()),
            clients: Arc::new(MemoryClientRepository::new()),
            tasks: Arc::new(MemoryTaskRepository::new()),
            invoices: Arc::new(MemoryInvoiceRepository::new()),
            attendance: Arc::new(MemoryAttendanceRepository::new()),
            leave: Arc::new(MemoryLeaveRepository::new()),
        };
        Self::from_adapters(adapters, config)
    }
}

/// Loads configuration and installs telemetry.
///
/// Keep the returned guard alive while the process logs to file.
pub fn bootstrap() -> anyhow::Result<(AppConfig, Option<WorkerGuard>)> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    let guard = init_telemetry(&config.logging).context("Failed to initialise telemetry")?;
    info!(app = %config.app.name, env = %config.app.env, "Configuration loaded");
    Ok((config, guard))
}
