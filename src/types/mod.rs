//! Common data types

pub mod scan;
pub mod telemetry;

pub use scan::*;
pub use telemetry::*;
