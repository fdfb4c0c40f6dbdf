// Adapter module to surface the scope pipeline crate under `scope-rs/`.
#[path = "scope-rs/src/lib.rs"]
mod scope_rs;

pub use scope_rs::*;
