// Domain layer: appointment models and the agent ports. No I/O here.

pub mod model;
pub mod ports;
