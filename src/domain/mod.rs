// Domain layer: run data model and the ports the core drives.

pub mod model;
pub mod ports;
