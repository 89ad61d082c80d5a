//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const BRANCH_CODE_PREFIX: &str = "BR";
pub const EMPLOYEE_CODE_PREFIX: &str = "EMP";
pub const INVOICE_NUMBER_PREFIX: &str = "INV";
pub const INVOICE_DATE_FORMAT: &str = "%Y%m%d";

pub const DEFAULT_SEQUENCE_WIDTH: usize = 3;
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: u32 = 10;
pub const DEFAULT_FALLBACK_DIGITS: usize = 6;
/// Widest fallback suffix a millisecond timestamp can fill.
pub const MAX_FALLBACK_DIGITS: usize = 18;
pub const DEFAULT_INSERT_ATTEMPTS: u32 = 3;

pub const DEFAULT_ANNUAL_LEAVE_DAYS: i32 = 12;
pub const DEFAULT_SICK_LEAVE_DAYS: i32 = 12;

pub const BASIS_POINTS_SCALE: i64 = 10_000;
