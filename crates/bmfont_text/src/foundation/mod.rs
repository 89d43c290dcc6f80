//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and the mesh transform
//! - Color parsing
//! - Logging utilities

pub mod math;
pub mod color;
pub mod logging;
