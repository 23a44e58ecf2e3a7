//! Local host identity.

use anyhow::{Context, Result};

/// The local hostname, used as the `managed-by` identity of created pods.
///
/// # Errors
///
/// Returns an error if the OS does not report a hostname.
pub fn local_hostname() -> Result<String> {
    let name = hostname::get().context("cannot determine local hostname")?;
    Ok(name.to_string_lossy().into_owned())
}
