//! Generates Verilog modules from an in-memory model.
//!
//! A [`Module`] collects ports, parameters, signals, instances and
//! assignments. Instances may expose wishbone slave interfaces, which
//! [`Module::allocate`] places on the bus address map. The module is then
//! either written as a new file or spliced into its hand-written target file
//! at a handful of marker lines.

pub mod core;
pub mod error;
pub mod util;

pub use crate::core::bus::{AddressMap, Slave};
pub use crate::core::config::GeneratorConfig;
pub use crate::core::generate::{allocate_bus, write_module};
pub use crate::core::verilog::instance::{BusInterface, Instance};
pub use crate::core::verilog::interface::{Direction, ParamValue, Port};
pub use crate::core::verilog::module::Module;
pub use crate::error::Error;
