pub mod reference;
pub mod timeseries;

pub use reference::*;
pub use timeseries::*;
