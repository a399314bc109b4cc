pub mod contributor;
pub mod platform;
pub mod settings;

pub use contributor::*;
pub use platform::*;
pub use settings::*;
