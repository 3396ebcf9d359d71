//! Replays the port merge over the history of the tracking repository.

pub mod checkout;
pub mod engine;
pub mod exec;
pub mod output;
pub mod reader;
pub mod series;

pub use checkout::{CheckoutReader, CheckoutSession};
pub use engine::{collect_points, finalize_series, live_point, Step};
pub use exec::exec;
pub use reader::{ShowReader, Snapshot, SnapshotReader};
