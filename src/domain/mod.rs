// Domain layer: trip/event models and the ports the pipelines are written against.

pub mod model;
pub mod ports;
