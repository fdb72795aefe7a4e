//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`hash`]: Streaming SHA-1 digests of files
//! - [`paths`]: Path manipulation and manifest byte conversion
//! - [`thread_pool`]: Fixed-size worker pool used by scan phases

/// Streaming content hashing
pub mod hash;
/// Path manipulation and resolution utilities
pub mod paths;
/// Worker pool for parallel hashing
pub mod thread_pool;
