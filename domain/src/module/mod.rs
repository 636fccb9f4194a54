//! Backend module parameters.

pub mod params;

pub use params::{ModuleParams, ParamError};
