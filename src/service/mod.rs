//! Service layer for business logic orchestration
//!
//! Keeps the resolution pass and manifest inspection out of the CLI layer in
//! main.rs.

pub mod digest;
pub mod inspect;

pub use digest::DigestService;
pub use inspect::{inspect, InspectReport};
