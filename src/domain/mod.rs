// Domain layer: models and ports. Adapters and the UI depend on this, never the reverse.

pub mod language;
pub mod model;
pub mod ports;
