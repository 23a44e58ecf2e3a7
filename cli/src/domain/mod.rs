//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod error;
pub mod labels;
pub mod manifest;
pub mod naming;
pub mod node;
pub mod selection;
pub mod template;

pub use error::{CredentialError, LifecycleError, SelectionError, ToolError, ValidationError};
pub use labels::{Labels, PodSelector};
pub use manifest::build_manifest;
pub use naming::synthesize_pod_name;
pub use node::ClusterNode;
pub use template::{Template, TemplateOverrides};
