//! Identity labels and label selectors.
//!
//! Every pod this tool creates carries the same three identity labels. They
//! are how `list`, `enter` and cleanup find "our" pods, so operators may add
//! labels but never redefine these keys.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;

use crate::domain::error::ValidationError;

/// Value of `app.kubernetes.io/name` on every pod we create.
pub const PRODUCT_NAME: &str = "testpod";

pub const LABEL_NAME: &str = "app.kubernetes.io/name";
pub const LABEL_INSTANCE: &str = "app.kubernetes.io/instance";
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Keys that operators cannot set.
pub const IDENTITY_KEYS: &[&str] = &[LABEL_NAME, LABEL_INSTANCE, LABEL_MANAGED_BY];

/// Ordered label map. Ordering keeps rendered manifests stable.
pub type Labels = BTreeMap<String, String>;

/// The identity label triple for one pod.
#[must_use]
pub fn identity_labels(instance: &str, managed_by: &str) -> Labels {
    Labels::from([
        (LABEL_NAME.to_string(), PRODUCT_NAME.to_string()),
        (LABEL_INSTANCE.to_string(), instance.to_string()),
        (LABEL_MANAGED_BY.to_string(), managed_by.to_string()),
    ])
}

/// Reject `key` if it is one of the identity keys.
///
/// # Errors
///
/// Returns [`ValidationError::ReservedLabel`] for identity keys.
pub fn ensure_not_reserved(key: &str) -> Result<()> {
    if IDENTITY_KEYS.contains(&key) {
        return Err(ValidationError::ReservedLabel(key.to_string()).into());
    }
    Ok(())
}

/// Parse one `key=value` label argument.
///
/// The value may be empty (Kubernetes allows it); the key may not.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedLabel`] when there is no `=` or the key
/// is empty, and [`ValidationError::ReservedLabel`] for identity keys.
pub fn parse_label(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(ValidationError::MalformedLabel(raw.to_string()).into());
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ValidationError::MalformedLabel(raw.to_string()).into());
    }
    ensure_not_reserved(key)?;
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse repeated `--label key=value` arguments; later duplicates win.
///
/// # Errors
///
/// Fails on the first malformed or reserved label.
pub fn parse_labels(raw: &[String]) -> Result<Labels> {
    raw.iter().map(|r| parse_label(r)).collect()
}

/// Equality-based pod selector, ANDed across all entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSelector(Labels);

impl PodSelector {
    /// Select all testpods, optionally only those created from `managed_by`.
    #[must_use]
    pub fn testpods(managed_by: Option<&str>) -> Self {
        let mut labels = Labels::from([(LABEL_NAME.to_string(), PRODUCT_NAME.to_string())]);
        if let Some(owner) = managed_by {
            labels.insert(LABEL_MANAGED_BY.to_string(), owner.to_string());
        }
        Self(labels)
    }

    /// Render as a single `-l k1=v1,k2=v2` kubectl argument pair.
    ///
    /// kubectl keeps only the last `-l` flag, so all terms go into one.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec!["-l".to_string(), self.to_string()]
    }

    #[must_use]
    pub fn labels(&self) -> &Labels {
        &self.0
    }
}

impl fmt::Display for PodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        f.write_str(&rendered.join(","))
    }
}
