//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types the kernel talks to.
//! - `adapters`: OS/runtime specific implementations (IO/async).

#[cfg(feature = "adapters")]
pub mod adapters;
pub mod ports;
