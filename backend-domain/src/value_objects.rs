// Domain value objects
pub mod identifiers;
pub mod quality;

pub use identifiers::*;
pub use quality::*;
