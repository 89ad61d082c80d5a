//! In-memory adapters
//!
//! Every port backed by `parking_lot` locks, enforcing the same unique keys as
//! the PostgreSQL schema. Used by tests and local tooling.

mod attendance;
mod invoice;
mod leave;
mod organisation;

pub use attendance::MemoryAttendanceRepository;
pub use invoice::MemoryInvoiceRepository;
pub use leave::MemoryLeaveRepository;
pub use organisation::{
    MemoryBranchRepository, MemoryClientRepository, MemoryEmployeeRepository, MemoryTaskRepository,
};

use bo_shared::Pagination;

/// Identifier under `prefix` with the largest all-digit suffix.
pub(crate) fn latest_identifier<'a>(identifiers: impl Iterator<Item = &'a str>, prefix: &str) -> Option<String> {
    identifiers
        .filter_map(|id| {
            let suffix = id.strip_prefix(prefix)?;
            if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // Numeric order without overflow: longer (trimmed) suffix wins, then text.
            let digits = suffix.trim_start_matches('0');
            Some((digits.len(), digits.to_string(), id))
        })
        .max_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)))
        .map(|(_, _, id)| id.to_string())
}

pub(crate) fn page<T>(items: Vec<T>, pagination: &Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect()
}
