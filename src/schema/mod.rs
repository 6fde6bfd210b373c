pub mod alignment;
pub mod ending;
pub mod task;
