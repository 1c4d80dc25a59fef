//! Utilities - logging, progress indicators and terminal styling

mod logger;
mod progress;
mod styling;

pub use logger::*;
pub use progress::*;
pub use styling::*;
