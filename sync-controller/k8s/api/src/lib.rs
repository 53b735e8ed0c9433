//! Custom resource types for the `apisix.apache.org` API group.
//!
//! Each served schema version gets its own module; the versions are
//! structurally different and must never be mixed. The multi-version
//! envelope that unifies them lives in the index crate.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod v2;
pub mod v2beta2;
pub mod v2beta3;

pub use kube::api::{ObjectMeta, ResourceExt};

pub const GROUP: &str = "apisix.apache.org";
