//! API handlers

pub mod analyze;
pub mod elements;
pub mod health;
