use crate::{indexation, search, upload, AppState, ConfirmedAction, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Upload(msg) => upload::update(&mut state, msg),
        Msg::Indexation(msg) => indexation::update(&mut state, msg),
        Msg::Search(msg) => search::update(&mut state, msg),
        Msg::Confirmed(action) => vec![match action {
            ConfirmedAction::DeleteDocument { filename } => Effect::DeleteDocument { filename },
            ConfirmedAction::DeleteAllDocuments => Effect::DeleteAllDocuments,
            ConfirmedAction::DeleteIndex => Effect::DeleteIndex,
        }],
        Msg::Declined(_) => Vec::new(),
    };

    (state, effects)
}
