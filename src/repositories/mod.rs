//! Poll record persistence.

pub mod record_store;

pub use record_store::{FsRecordStore, PollRecord, RecordStore};
