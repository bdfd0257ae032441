mod builder;
#[allow(clippy::module_inception)]
mod cluster;
mod log_level;
pub use builder::*;
pub use cluster::*;
pub use log_level::*;
