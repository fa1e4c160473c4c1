pub mod planner;
pub mod queue;

pub use planner::{plan_fetch, plan_libraries, FetchPlan};
pub use queue::{DownloadQueue, DownloadTask};
