// Domain layer: the document model and the ports the compiler is wired through.

pub mod model;
pub mod ports;
