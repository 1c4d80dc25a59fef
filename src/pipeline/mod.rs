//! Pipeline module - load, clean, split, train, evaluate

pub mod dataset;
pub mod evaluate;
pub mod loader;
pub mod orchestrator;
pub mod preprocess;
pub mod search;
pub mod train;

pub use dataset::*;
pub use evaluate::*;
pub use loader::*;
pub use orchestrator::*;
pub use preprocess::*;
pub use search::*;
pub use train::*;
