//! Human-readable identifier allocation
//!
//! Codes such as `BR-004`, `EMP-BR-004-012` and `INV-BR-004-20250615-003` are
//! derived from the current maximum in their scope, verified as unused, and
//! re-derived when a concurrent writer wins the race. The unique constraint of
//! the owning table stays the final arbiter.

pub mod allocator;
pub mod scope;

pub use allocator::SequenceAllocator;
pub use scope::SequenceScope;
