mod catalog;
mod data;
pub mod draft;
pub mod shortcuts;
mod steps;
pub mod storage;
mod validation;
mod workflow;

pub use catalog::*;
pub use data::*;
pub use steps::*;
pub use validation::*;
pub use workflow::*;
