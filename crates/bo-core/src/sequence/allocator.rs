// ============================================================================
// Back-office Core - Sequence Allocator
// File: crates/bo-core/src/sequence/allocator.rs
// Description: Read-max, verify, retry, then timestamp fallback
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use bo_shared::config::SequenceSettings;
use bo_shared::constants::MAX_FALLBACK_DIGITS;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::DomainError;
use crate::repositories::SequenceStore;
use crate::sequence::SequenceScope;

/// Mints the next identifier of a scope.
///
/// Nothing is reserved: a returned identifier was unused when checked, and the
/// insert that follows may still lose to a concurrent writer. Use
/// [`SequenceAllocator::insert_with_identifier`] to retry such inserts.
pub struct SequenceAllocator<S: SequenceStore> {
    store: Arc<S>,
    settings: SequenceSettings,
}

impl<S: SequenceStore> SequenceAllocator<S> {
    /// Settings built outside the config loader are clamped: at least one
    /// allocation and insert attempt, and a non-empty fallback suffix.
    pub fn new(store: Arc<S>, mut settings: SequenceSettings) -> Self {
        settings.max_attempts = settings.max_attempts.max(1);
        settings.insert_attempts = settings.insert_attempts.max(1);
        settings.fallback_digits = settings.fallback_digits.clamp(1, MAX_FALLBACK_DIGITS);
        Self { store, settings }
    }

    /// Next free identifier in `scope`.
    ///
    /// Lost races are retried up to `max_attempts` times, after which a
    /// timestamp identifier is returned instead of an error. Only store
    /// failures are propagated.
    pub async fn allocate(&self, scope: &SequenceScope) -> Result<String, DomainError> {
        let mut previous: Option<u64> = None;

        for attempt in 1..=self.settings.max_attempts {
            let latest = self.store.latest_identifier(scope.prefix()).await?;
            let current = match latest.as_deref() {
                Some(identifier) => scope.sequence_of(identifier).unwrap_or_else(|| {
                    warn!(%scope, identifier, "Latest identifier has no numeric suffix, restarting sequence");
                    0
                }),
                None => 0,
            };

            // A stale read must not hand out a candidate already seen taken.
            let next = current
                .saturating_add(1)
                .max(previous.map_or(1, |p| p.saturating_add(1)));
            let candidate = scope.format(next, self.settings.pad_width);

            if !self.store.identifier_exists(&candidate).await? {
                debug!(%scope, attempt, identifier = %candidate, "Identifier allocated");
                return Ok(candidate);
            }

            debug!(%scope, attempt, identifier = %candidate, "Identifier taken, retrying");
            previous = Some(next);
        }

        let fallback = scope.fallback(Utc::now(), self.settings.fallback_digits);
        warn!(
            %scope,
            attempts = self.settings.max_attempts,
            identifier = %fallback,
            "Sequence contention, using timestamp identifier"
        );
        Ok(fallback)
    }

    /// Allocates an identifier and hands it to `insert`, allocating again when
    /// the insert reports `IdentifierAlreadyExists`, up to `insert_attempts`.
    pub async fn insert_with_identifier<T, F, Fut>(
        &self,
        scope: &SequenceScope,
        mut insert: F,
    ) -> Result<T, DomainError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let attempts = self.settings.insert_attempts;
        let mut attempt = 1;

        loop {
            let identifier = self.allocate(scope).await?;
            match insert(identifier).await {
                Err(DomainError::IdentifierAlreadyExists(taken)) if attempt < attempts => {
                    info!(%scope, attempt, identifier = %taken, "Identifier claimed concurrently, reallocating");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
