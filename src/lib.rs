pub mod config;
pub mod diff;
pub mod util;
pub mod template;
pub mod group;
pub mod grouping;
pub mod record;
pub mod report;

pub use config::{ConfigError, GroupingConfig};
pub use group::{Group, Groupable};
pub use grouping::{group, Grouper};
pub use template::{Template, Token};
