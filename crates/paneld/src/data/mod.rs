pub mod calendar;
pub mod snapshot;
pub mod weather;

pub use snapshot::SnapshotCell;
