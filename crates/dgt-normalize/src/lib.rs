//! Normalizer and derived-metrics calculator.
//!
//! [`normalize`] turns one raw attribute bag into a canonical
//! [`dgt_model::HealthRecord`] by consulting per-protocol field maps;
//! [`derive::apply`] then adds the metrics no device reports directly
//! (annualized workload, human-readable power-on time).

pub mod derive;
pub mod error;
pub mod fieldmap;
mod normalizer;
pub mod selftest;

pub use error::NormalizeError;
pub use normalizer::normalize;
