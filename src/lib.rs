#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod publisher;
pub mod storage;

pub use config::PublisherConfig;
pub use error::{LedgerError, LedgerResult};
pub use model::{PublishSummary, RunDocument, SuiteResult, TestOutcome, TestRecord, TestStatus};
pub use publisher::ResultPublisher;
pub use storage::{MemoryStore, ResultStore, SqliteStore};
