//! Filesystem utilities for grove.
//!
//! This module provides safe filesystem operations, particularly atomic writes
//! that keep the queue and history files consistent across crashes.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
