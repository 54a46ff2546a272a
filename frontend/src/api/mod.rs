pub mod client;
pub mod query;
pub mod store;
pub mod types;

pub use client::*;
pub use query::*;
pub use store::*;
pub use types::*;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
