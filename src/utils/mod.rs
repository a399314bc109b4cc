pub mod fee;
pub mod lock;
pub mod rng;
pub mod sampler;

pub use fee::*;
pub use lock::*;
pub use rng::*;
pub use sampler::*;
