pub mod ops;
pub mod query;
pub mod types;

pub use ops::*;
pub use query::*;
pub use types::*;
