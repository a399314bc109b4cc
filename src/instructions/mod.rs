pub mod contribute;
pub mod create;
pub mod distribute;
pub mod update_config;

pub use contribute::*;
pub use create::*;
pub use distribute::*;
pub use update_config::*;
