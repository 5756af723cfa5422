//! Course catalog: remote source, local snapshot cache and semester codes.

mod cache;
mod client;
mod error;
mod semester;
mod types;

pub use cache::{format_bytes, resolve_groups_in, CatalogCache, DEFAULT_CHECK_INTERVAL};
pub use client::{CatalogSource, HttpCatalogSource};
pub use error::CatalogError;
pub use semester::{InvalidSemesterCode, SemesterCode, Term};
pub use types::*;
