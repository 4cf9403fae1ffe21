mod params;
mod types;

pub use params::*;
pub use types::*;
