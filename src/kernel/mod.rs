//! Headless palette core (state/action/effect), plus the registry, ranking,
//! query parsing and resolution it drives.

pub mod action;
pub mod calc;
pub mod custom;
pub mod effect;
pub mod palette;
pub mod pins;
pub mod query;
pub mod rank;
pub mod recents;
pub mod registry;
pub mod resolvers;
pub mod routing;
pub mod services;
pub mod state;
pub mod store;
pub mod when;

pub use action::Action;
pub use effect::Effect;
pub use palette::{Outcome, Palette, PaletteRow, PaletteServices};
pub use query::{parse_query, ParsedQuery, QueryIntent};
pub use registry::CommandRegistry;
pub use state::{NavigationLevel, PageState, PaletteState, PromptState, StagedFlow};
pub use store::{DispatchResult, Store};
