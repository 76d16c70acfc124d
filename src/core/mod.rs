pub mod adaptive;
pub mod dominance;
pub mod error;
pub mod point;

pub use adaptive::*;
pub use dominance::*;
pub use error::*;
pub use point::*;
