//! Infrastructure implementation of the `TemplateStore` port.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::TemplateStore;
use crate::domain::template::Template;

/// Overrides the template location.
pub const CONFIG_ENV: &str = "TESTPOD_CONFIG";

/// Production implementation of `TemplateStore` that uses a YAML file on disk.
pub struct YamlTemplateStore {
    path: PathBuf,
}

impl YamlTemplateStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `$TESTPOD_CONFIG`, or `<config dir>/testpod/default.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is available.
    pub fn from_env() -> Result<Self> {
        resolve_path(std::env::var_os(CONFIG_ENV), dirs::config_dir()).map(Self::new)
    }

    /// Write `template` to disk, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, template: &Template) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(template).context("cannot serialize template")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("cannot write {}", self.path.display()))
    }
}

fn resolve_path(env_value: Option<OsString>, config_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(val) = env_value.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(val));
    }
    let dir = config_dir
        .ok_or_else(|| anyhow::anyhow!("cannot determine config directory; set {CONFIG_ENV}"))?;
    Ok(dir.join("testpod").join("default.yaml"))
}

impl TemplateStore for YamlTemplateStore {
    fn load_or_init(&self) -> Result<Template> {
        if !self.path.exists() {
            let template = Template::default();
            self.save(&template)?;
            tracing::debug!(path = %self.path.display(), "wrote default template");
            return Ok(template);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        let template: Template = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))?;
        template
            .validate()
            .with_context(|| format!("invalid template {}", self.path.display()))?;
        Ok(template)
    }
}
