// snowai-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the core needs from the outside world (secret lookup).
pub mod ports;

// 2. Domain
// Descriptors, typed references, resolution errors.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// TOML documents, directory discovery, environment, atomic writes.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Reference resolution, environment checks.
// Depends on the Domain, the Infra and the Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{LoadedConfig, load_resolved, resolve, resolve_str};
pub use domain::ResolvedConfig;
pub use infrastructure::config::LoadOptions;
pub use error::SnowaiError;
