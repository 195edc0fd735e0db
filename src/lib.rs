//! Remote serial protocol debug stub.
//!
//! [`stub`] is the allocation-free core that runs in the trap path of a target, [`sim`]
//! provides an in-memory target for hosting the stub in a regular process.

pub mod arch;
pub mod config;
pub mod log;
pub mod sim;
pub mod stub;
