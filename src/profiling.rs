//! Performance profiling utilities
//!
//! The `profile` attribute only emits timing code when the `perf_stats`
//! feature is enabled. Zero overhead when disabled.

pub use terrain_nav_macros::profile;
