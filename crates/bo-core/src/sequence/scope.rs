// ============================================================================
// Back-office Core - Sequence Scope
// File: crates/bo-core/src/sequence/scope.rs
// Description: Identifier namespaces and their textual format
// ============================================================================

use bo_shared::constants::{
    BRANCH_CODE_PREFIX, EMPLOYEE_CODE_PREFIX, INVOICE_DATE_FORMAT, INVOICE_NUMBER_PREFIX,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Namespace within which one identifier sequence runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceScope {
    prefix: String,
}

impl SequenceScope {
    /// `BR-`
    pub fn branch() -> Self {
        Self {
            prefix: format!("{}-", BRANCH_CODE_PREFIX),
        }
    }

    /// `EMP-<branch code>-`
    pub fn employee(branch_code: &str) -> Self {
        Self {
            prefix: format!("{}-{}-", EMPLOYEE_CODE_PREFIX, branch_code),
        }
    }

    /// `INV-<branch code>-<YYYYMMDD>-`
    pub fn invoice(branch_code: &str, issue_date: NaiveDate) -> Self {
        Self {
            prefix: format!(
                "{}-{}-{}-",
                INVOICE_NUMBER_PREFIX,
                branch_code,
                issue_date.format(INVOICE_DATE_FORMAT)
            ),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Zero-pads to `width`; longer numbers keep all their digits.
    pub fn format(&self, sequence: u64, width: usize) -> String {
        format!("{}{:0width$}", self.prefix, sequence, width = width)
    }

    /// Numeric suffix of an identifier in this scope.
    pub fn sequence_of(&self, identifier: &str) -> Option<u64> {
        let suffix = identifier.strip_prefix(self.prefix.as_str())?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }

    /// Last `digits` digits of the millisecond timestamp, zero-padded.
    pub fn fallback(&self, now: DateTime<Utc>, digits: usize) -> String {
        let modulus = 10_i64.checked_pow(digits as u32).unwrap_or(i64::MAX);
        let stamp = now.timestamp_millis().rem_euclid(modulus);
        format!("{}{:0width$}", self.prefix, stamp, width = digits)
    }
}

impl std::fmt::Display for SequenceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_prefixes() {
        assert_eq!(SequenceScope::branch().prefix(), "BR-");
        assert_eq!(SequenceScope::employee("BR-004").prefix(), "EMP-BR-004-");
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(SequenceScope::invoice("BR-004", date).prefix(), "INV-BR-004-20250615-");
    }

    #[test]
    fn test_format_pads_and_widens() {
        let scope = SequenceScope::branch();
        assert_eq!(scope.format(1, 3), "BR-001");
        assert_eq!(scope.format(999, 3), "BR-999");
        assert_eq!(scope.format(1000, 3), "BR-1000");
    }

    #[test]
    fn test_sequence_of() {
        let scope = SequenceScope::employee("BR-004");
        assert_eq!(scope.sequence_of("EMP-BR-004-012"), Some(12));
        assert_eq!(scope.sequence_of("EMP-BR-004-1000"), Some(1000));
        assert_eq!(scope.sequence_of("EMP-BR-005-012"), None);
        assert_eq!(scope.sequence_of("EMP-BR-004-"), None);
        assert_eq!(scope.sequence_of("EMP-BR-004-01a"), None);
    }

    #[test]
    fn test_fallback_uses_last_timestamp_digits() {
        let now = Utc.timestamp_millis_opt(1_718_000_000_042).unwrap();
        assert_eq!(SequenceScope::branch().fallback(now, 6), "BR-000042");

        let now = Utc.timestamp_millis_opt(1_718_000_123_456).unwrap();
        assert_eq!(SequenceScope::branch().fallback(now, 6), "BR-123456");
    }
}
