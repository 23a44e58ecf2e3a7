//! Exactly-one pod selection for `testpod enter`.

use anyhow::Result;
use serde::Deserialize;

use crate::domain::error::SelectionError;
use crate::domain::labels::PodSelector;

/// The part of `kubectl get pods -o json` that selection needs.
#[derive(Debug, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<PodObject>,
}

#[derive(Debug, Deserialize)]
pub struct PodObject {
    pub metadata: PodMetadata,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
}

impl PodList {
    #[must_use]
    pub fn names(self) -> Vec<String> {
        self.items.into_iter().map(|p| p.metadata.name).collect()
    }
}

/// Return the single pod name in `names`.
///
/// # Errors
///
/// [`SelectionError::NotFound`] for zero names, [`SelectionError::Ambiguous`]
/// for more than one.
pub fn select_single(mut names: Vec<String>, selector: &PodSelector) -> Result<String> {
    match names.len() {
        0 => Err(SelectionError::NotFound {
            selector: selector.to_string(),
        }
        .into()),
        1 => Ok(names.remove(0)),
        _ => {
            names.sort();
            Err(SelectionError::Ambiguous {
                selector: selector.to_string(),
                candidates: names,
            }
            .into())
        }
    }
}
