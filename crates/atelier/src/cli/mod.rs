//! Command implementations.

pub mod catalog;
pub mod config;
pub mod lp;
pub mod photos;
pub mod state;
