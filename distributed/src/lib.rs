use std::time::Duration;
use uuid::Uuid;
use vocab::CountEntry;

pub mod service {
    tonic::include_proto!("service");
}

mod coordinator;
mod queue;
mod tasks;

pub use coordinator::{Config, Coordinator, Stage};
pub use queue::Queue;
pub use tasks::{run_map, run_reduce};

pub const ADDR: &str = "[::1]:56789";
pub const OUT_DIR: &str = "out";
pub const TASK_TIMEOUT: Duration = Duration::from_secs(5);

pub fn task_id() -> String {
    Uuid::new_v4().to_string()
}

impl From<CountEntry> for service::RankedEntry {
    fn from(entry: CountEntry) -> Self {
        Self {
            key: entry.key,
            count: entry.count,
        }
    }
}

impl From<service::RankedEntry> for CountEntry {
    fn from(entry: service::RankedEntry) -> Self {
        CountEntry::new(entry.key, entry.count)
    }
}
