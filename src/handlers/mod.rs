//! Request handlers module

pub mod catalog;
pub mod role;
