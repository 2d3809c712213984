// Adapters layer: concrete implementations of the domain ports (DeepL HTTP, TCP probe, file picking).

pub mod deepl;
pub mod picker;
pub mod probe;
