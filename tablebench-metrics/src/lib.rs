pub mod counter;
pub mod merge;
pub mod metric;
pub mod per_thread;
pub mod read;
pub mod timer;
pub mod timing;

pub use counter::Counter;
pub use merge::Merge;
pub use metric::{Metric, MetricSet};
pub use per_thread::PerThread;
pub use read::ReadStat;
pub use timer::RunTimer;
pub use timing::{Outcome, RequestStat, TimingStat};
