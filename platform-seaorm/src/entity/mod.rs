//! Directory tables.

pub mod business;
pub mod region;
