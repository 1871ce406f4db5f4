//! Background synchronization to the external reporting sink.

pub mod scheduler;
pub mod sink;

pub use scheduler::SyncScheduler;
pub use sink::{ReportRow, ReportSink, SheetSink};
