use crate::core::CommandInvocation;
use crate::kernel::services::ports::Notice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunCommand(CommandInvocation),
    Notify(Notice),
    Closed,
}
