//! # Back-office Security
//!
//! Role-based access control: roles, the role → permission matrix, and the
//! access policy every service consults before touching data.

pub mod actor;
pub mod permission;
pub mod policy;
pub mod role;

pub use actor::Actor;
pub use permission::{permissions_for, Action, Permissions, Resource};
pub use policy::{AccessError, AccessPolicy};
pub use role::Role;
