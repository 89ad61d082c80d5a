//! Branches, employees, clients and tasks

use async_trait::async_trait;
use bo_shared::Pagination;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use bo_core::domain::{Branch, Client, Employee, Task, TaskStatus};
use bo_core::error::DomainError;
use bo_core::repositories::{
    BranchRepository, ClientRepository, EmployeeRepository, SequenceStore, TaskRepository,
};

use super::{latest_identifier, page};

#[derive(Default)]
pub struct MemoryBranchRepository {
    branches: RwLock<HashMap<Uuid, Branch>>,
}

impl MemoryBranchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BranchRepository for MemoryBranchRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Branch>, DomainError> {
        Ok(self.branches.read().get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Branch>, DomainError> {
        Ok(self.branches.read().values().find(|b| b.code == code).cloned())
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<Branch>, DomainError> {
        let mut branches: Vec<Branch> = self
            .branches
            .read()
            .values()
            .filter(|b| !b.is_deleted())
            .cloned()
            .collect();
        branches.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(page(branches, pagination))
    }

    async fn create(&self, branch: &Branch) -> Result<Branch, DomainError> {
        let mut branches = self.branches.write();
        if branches.values().any(|b| b.code == branch.code) {
            return Err(DomainError::IdentifierAlreadyExists(branch.code.clone()));
        }
        branches.insert(branch.id, branch.clone());
        Ok(branch.clone())
    }

    async fn update(&self, branch: &Branch) -> Result<Branch, DomainError> {
        let mut branches = self.branches.write();
        let stored = branches
            .get_mut(&branch.id)
            .ok_or(DomainError::BranchNotFound(branch.id))?;
        // The code is fixed at creation.
        *stored = Branch {
            code: stored.code.clone(),
            created_at: stored.created_at,
            created_by: stored.created_by,
            ..branch.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl SequenceStore for MemoryBranchRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        let branches = self.branches.read();
        Ok(latest_identifier(branches.values().map(|b| b.code.as_str()), prefix))
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        Ok(self.branches.read().values().any(|b| b.code == identifier))
    }
}

#[derive(Default)]
pub struct MemoryEmployeeRepository {
    employees: RwLock<HashMap<Uuid, Employee>>,
}

impl MemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeRepository for MemoryEmployeeRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Employee>, DomainError> {
        Ok(self.employees.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, DomainError> {
        Ok(self
            .employees
            .read()
            .values()
            .find(|e| e.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Employee>, DomainError> {
        let mut employees: Vec<Employee> = self
            .employees
            .read()
            .values()
            .filter(|e| e.branch_id == *branch_id && e.removed_at.is_none())
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(page(employees, pagination))
    }

    async fn create(&self, employee: &Employee) -> Result<Employee, DomainError> {
        let mut employees = self.employees.write();
        if employees.values().any(|e| e.email.eq_ignore_ascii_case(&employee.email)) {
            return Err(DomainError::EmailAlreadyExists(employee.email.clone()));
        }
        if employees.values().any(|e| e.code == employee.code) {
            return Err(DomainError::IdentifierAlreadyExists(employee.code.clone()));
        }
        employees.insert(employee.id, employee.clone());
        Ok(employee.clone())
    }

    async fn update(&self, employee: &Employee) -> Result<Employee, DomainError> {
        let mut employees = self.employees.write();
        let stored = employees
            .get_mut(&employee.id)
            .ok_or(DomainError::EmployeeNotFound(employee.id))?;
        *stored = Employee {
            code: stored.code.clone(),
            email: stored.email.clone(),
            branch_id: stored.branch_id,
            ..employee.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl SequenceStore for MemoryEmployeeRepository {
    async fn latest_identifier(&self, prefix: &str) -> Result<Option<String>, DomainError> {
        let employees = self.employees.read();
        Ok(latest_identifier(employees.values().map(|e| e.code.as_str()), prefix))
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, DomainError> {
        Ok(self.employees.read().values().any(|e| e.code == identifier))
    }
}

#[derive(Default)]
pub struct MemoryClientRepository {
    clients: RwLock<HashMap<Uuid, Client>>,
}

impl MemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for MemoryClientRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError> {
        Ok(self.clients.read().get(id).cloned())
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Client>, DomainError> {
        let mut clients: Vec<Client> = self
            .clients
            .read()
            .values()
            .filter(|c| c.branch_id == *branch_id && c.removed_at.is_none())
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(clients, pagination))
    }

    async fn create(&self, client: &Client) -> Result<Client, DomainError> {
        self.clients.write().insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn update(&self, client: &Client) -> Result<Client, DomainError> {
        let mut clients = self.clients.write();
        let stored = clients
            .get_mut(&client.id)
            .ok_or(DomainError::ClientNotFound(client.id))?;
        *stored = client.clone();
        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Task>, DomainError> {
        Ok(self
            .tasks
            .read()
            .get(id)
            .filter(|t| t.removed_at.is_none())
            .cloned())
    }

    async fn list_by_branch(&self, branch_id: &Uuid, pagination: &Pagination) -> Result<Vec<Task>, DomainError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| t.branch_id == *branch_id && t.removed_at.is_none())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            (a.due_date.is_none(), a.due_date, a.created_at).cmp(&(b.due_date.is_none(), b.due_date, b.created_at))
        });
        Ok(page(tasks, pagination))
    }

    async fn create(&self, task: &Task) -> Result<Task, DomainError> {
        self.tasks.write().insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<Task, DomainError> {
        let mut tasks = self.tasks.write();
        let stored = tasks.get_mut(&task.id).ok_or(DomainError::TaskNotFound(task.id))?;
        if stored.status != expected {
            return Err(DomainError::InvalidStatusTransition {
                entity: "task",
                from: stored.status.as_str(),
                to: task.status.as_str(),
            });
        }
        *stored = task.clone();
        Ok(stored.clone())
    }
}
