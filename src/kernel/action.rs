use crate::core::PageSpec;
use crate::kernel::state::StagedFlow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open,
    Close,
    SetQuery(String),
    Append(char),
    Backspace,
    MoveSelection(isize),
    Drilldown { category_id: String },
    Back,
    GoRoot,
    OpenPrompt { command_id: String, placeholder: String },
    SubmitPrompt,
    OpenPage { command_id: String, page: PageSpec },
    PageSetField { field_id: String, value: String },
    SubmitPage,
    Stage(StagedFlow),
    ClearStaged,
}
