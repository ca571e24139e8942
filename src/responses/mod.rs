//! Stored API responses: the record format and the directory that holds them.

mod record;
mod store;

pub use record::{CallOutcome, ResponseRecord};
pub use store::{ResponseStore, StoreError, StoredResponse};
