pub mod model;
pub mod streaming;

pub use model::*;
pub use streaming::*;
