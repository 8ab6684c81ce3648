// snowai-core/src/ports/mod.rs

pub mod secrets;

pub use secrets::SecretSource;
