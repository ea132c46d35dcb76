//! Utilities shared by the roomtap packages.

pub mod logger;
pub mod time;
