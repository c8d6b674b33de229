//! Utilities shared by the service and its tests

pub mod owned_handle;
#[cfg(test)]
pub mod task;
