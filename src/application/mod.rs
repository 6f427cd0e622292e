//! Application layer
//!
//! Use cases that turn loosely-typed input into domain values and drive the
//! domain services.

pub mod invoice;
