//! Gateway between clients that name graph vertices with strings and a coloring solver that
//! only understands dense integer ids.

pub mod common;
pub mod config;
mod error;
pub mod pipeline;
pub mod relabel;
pub mod server;
pub mod solver;
#[cfg(test)]
mod test_utils;

pub use error::{ErrorKind, GatewayError, GatewayResult};
