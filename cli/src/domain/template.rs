//! Pod template schema and caller overrides.
//!
//! Pure types only: loading and persisting live in `crate::infra::config`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::labels::{Labels, ensure_not_reserved};

/// Defaults for every pod created in a run, stored in
/// `<config dir>/testpod/default.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Container image, e.g. `alpine`.
    pub default_image: String,
    /// Shell started by `kubectl exec`, e.g. `/bin/sh`.
    pub default_shell: String,
    pub pod: PodTemplate,
    pub network_policy: NetworkPolicyTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodTemplate {
    /// Extra labels put on the pod next to the identity labels.
    pub additional_labels: Labels,
    /// Container entrypoint. Must keep the container alive until deleted.
    pub command: Vec<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicyTemplate {
    /// Create an allow-all-egress `NetworkPolicy` next to the pod.
    pub create_allow_all: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            default_image: "alpine".to_string(),
            default_shell: "/bin/sh".to_string(),
            pod: PodTemplate::default(),
            network_policy: NetworkPolicyTemplate::default(),
        }
    }
}

impl Default for PodTemplate {
    fn default() -> Self {
        Self {
            additional_labels: Labels::new(),
            command: vec!["sleep".to_string()],
            args: vec!["infinity".to_string()],
        }
    }
}

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct TemplateOverrides {
    pub image: Option<String>,
    pub shell: Option<String>,
    pub labels: Labels,
}

impl Template {
    /// Check that no additional label redefines an identity key.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError::ReservedLabel` naming the first offender.
    pub fn validate(&self) -> Result<()> {
        for key in self.pod.additional_labels.keys() {
            ensure_not_reserved(key)?;
        }
        Ok(())
    }

    /// Apply caller overrides.
    ///
    /// Image and shell are replaced whole when given. Labels are merged on top
    /// of the template's, so a caller label wins on key collision.
    ///
    /// # Errors
    ///
    /// Fails if either the template or the overrides define an identity label.
    pub fn with_overrides(mut self, overrides: TemplateOverrides) -> Result<Self> {
        self.validate()?;
        if let Some(image) = overrides.image.filter(|s| !s.is_empty()) {
            self.default_image = image;
        }
        if let Some(shell) = overrides.shell.filter(|s| !s.is_empty()) {
            self.default_shell = shell;
        }
        for (key, value) in overrides.labels {
            ensure_not_reserved(&key)?;
            self.pod.additional_labels.insert(key, value);
        }
        Ok(self)
    }
}
