mod lineup;
mod primitives;

pub use lineup::*;
pub use primitives::*;
