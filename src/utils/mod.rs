//! Utilities.

pub mod conf;
pub mod logger;
#[cfg(test)]
pub mod testing;
