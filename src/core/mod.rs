//! Core value types shared by the kernel:
//! - chord: keyboard chord normalization
//! - command: commands, categories, actions
//! - error: error taxonomy

pub mod chord;
pub mod command;
pub mod error;

pub use chord::{chord_tokens, chords_equal, normalize_chord};
pub use command::{
    handler_fn, label_case, ActionContext, ActionDefinition, ActionIntent, ActionsProvider,
    BoxFuture, Category, Command, CommandHandler, CommandInput, CommandInvocation, HandlerResult,
    PageField, PageSpec, ROOT_CATEGORY_ID,
};
pub use error::{ExecutionError, StorageError, ValidationError};
