//! C ABI surface for the native host bridge

pub mod bridge;
pub mod exports;
