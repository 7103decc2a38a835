//! cmdpal - headless command palette core
//!
//! Module layout:
//! - core: value types (Command, Category, chords, errors)
//! - kernel: registry, ranking, query parsing, resolution, navigation state
//!   and the `Palette` execution boundary
//! - kernel::services: ports (contracts) and adapters (files, paths)

pub mod core;
pub mod kernel;
