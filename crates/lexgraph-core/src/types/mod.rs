//! Core data types for lexgraph.

mod decision;
mod extraction;
mod graph;
mod kinds;
mod message;

pub use decision::*;
pub use extraction::*;
pub use graph::*;
pub use kinds::*;
pub use message::*;
