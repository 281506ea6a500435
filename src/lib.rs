pub mod blkid;
pub mod checker;
pub mod config;
pub mod error;
pub mod monitor;
pub mod output;
pub mod output_graphite;
pub mod output_print;
pub mod provider;
pub mod threshold;
pub mod usage;

pub use blkid::blkid;
pub use checker::{Check, CheckResult};
pub use provider::{DataProvider, Metrics, StaticProvider, SystemProvider};
pub use threshold::Threshold;
pub use usage::status;
