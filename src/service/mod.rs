//! Credential issuance pipeline.
//!
//! `generator` → `sql_split` → `template` → `executor` → `lease`, driven by
//! `issuer` over injected role, lease and connection sources.

pub mod executor;
pub mod generator;
pub mod issuer;
pub mod lease;
pub mod sql_split;
pub mod template;
