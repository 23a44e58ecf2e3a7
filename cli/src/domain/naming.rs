//! Pod name synthesis.
//!
//! Names must satisfy both RFC 1123 and RFC 1035 label rules: at most 63
//! characters drawn from `[a-z0-9-]`.

use chrono::NaiveDateTime;

/// Prefix shared by every pod this tool creates.
pub const POD_NAME_PREFIX: &str = "testpod-";

/// Maximum length of a Kubernetes resource name that doubles as a DNS label.
pub const MAX_POD_NAME_LEN: usize = 63;

/// `chrono` format of the timestamp suffix, e.g. `20241216-103611`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Lowercase `hostname` and delete every character outside `[a-z0-9-]`.
#[must_use]
pub fn sanitize_hostname(hostname: &str) -> String {
    hostname
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Build a pod name of the form `testpod-<hostname>-<YYYYMMDD-HHMMSS>`.
///
/// When the result would exceed 63 characters only the hostname part is
/// shortened; the prefix and the timestamp suffix are always kept whole.
#[must_use]
pub fn synthesize_pod_name(hostname: &str, timestamp: NaiveDateTime) -> String {
    let mut host = sanitize_hostname(hostname);
    let suffix = format!("-{}", timestamp.format(TIMESTAMP_FORMAT));

    let budget = MAX_POD_NAME_LEN.saturating_sub(POD_NAME_PREFIX.len() + suffix.len());
    // sanitized text is pure ASCII, so byte truncation is char-safe
    host.truncate(budget);

    format!("{POD_NAME_PREFIX}{host}{suffix}")
}
