pub mod chain;
pub mod moments;
pub mod preprocessing;

pub use moments::Moments;
pub use preprocessing::*;
