//! Utility types and functions

pub mod assoc;
pub mod binning;
pub mod colours;
pub mod geometry;
pub mod logger;
pub mod opener;
pub mod progress;
pub mod session;
