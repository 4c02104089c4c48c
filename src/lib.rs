pub mod terrain;
pub mod logging;
pub mod profiling;
