pub mod calibrate;
pub mod cluster;
pub mod diagnostic;
pub mod dimensions;
pub mod snapshot;
pub mod struggle;
