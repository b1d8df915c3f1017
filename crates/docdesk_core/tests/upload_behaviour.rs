use std::sync::Once;

use docdesk_core::wire::{DeleteAllResponse, DeleteResponse, FileListing, ListedFile, UploadedFile};
use docdesk_core::{
    update, AppState, ConfirmedAction, DocumentKind, Effect, FileCandidate, Msg, RequestError,
    Tone, UploadMsg, UploadStatus, MAX_UPLOAD_BYTES,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docdesk_logging::initialize_for_tests);
}

fn send(state: AppState, msg: UploadMsg) -> (AppState, Vec<Effect>) {
    update(state, Msg::Upload(msg))
}

fn file(name: &str, size: u64) -> FileCandidate {
    FileCandidate::new(name, size, format!("/tmp/{name}"))
}

fn listed(names: &[&str]) -> AppState {
    let listing = FileListing {
        files: names
            .iter()
            .map(|name| ListedFile {
                name: name.to_string(),
                size: 2048,
                date: "2024-05-01 10:00:00".to_string(),
            })
            .collect(),
    };
    send(AppState::new(), UploadMsg::DocumentsListed(listing)).0
}

#[test]
fn opening_the_page_refreshes_the_list() {
    init_logging();
    let (_state, effects) = send(AppState::new(), UploadMsg::Opened);
    assert_eq!(effects, vec![Effect::RefreshDocuments]);
}

#[test]
fn chosen_files_become_one_batch_in_input_order() {
    init_logging();
    let files = vec![file("b.pdf", 10), file("a.txt", 20), file("c.md", 30)];
    let (state, effects) = send(AppState::new(), UploadMsg::FilesChosen(files.clone()));
    assert_eq!(effects, vec![Effect::UploadBatch { files }]);
    assert!(!state.upload().batch_errored());

    let (_state, effects) = send(state, UploadMsg::FilesChosen(Vec::new()));
    assert!(effects.is_empty());
}

#[test]
fn valid_file_is_sent_with_zero_progress() {
    init_logging();
    let candidate = file("report.pdf", 10_000);
    let (state, effects) = send(AppState::new(), UploadMsg::FileQueued(candidate.clone()));
    assert_eq!(effects, vec![Effect::SendUpload { file: candidate }]);
    let progress = state.upload().progress().expect("progress shown");
    assert_eq!(progress.percent, 0);
    assert_eq!(progress.status, UploadStatus::Uploading);
}

#[test]
fn duplicate_name_is_rejected_without_network() {
    init_logging();
    let state = listed(&["report.pdf"]);
    let (state, effects) = send(state, UploadMsg::FileQueued(file("report.pdf", 10)));

    assert!(effects.is_empty());
    assert!(state.upload().batch_errored());
    let view = state.view().upload;
    let progress = view.progress.expect("error shown");
    assert_eq!(progress.tone, Tone::Error);
    assert!(progress.status_text.contains("\"report.pdf\" already exists"));
}

#[test]
fn oversized_file_is_rejected_without_network() {
    init_logging();
    let (state, effects) = send(
        AppState::new(),
        UploadMsg::FileQueued(file("big.pdf", MAX_UPLOAD_BYTES + 1)),
    );
    assert!(effects.is_empty());
    let view = state.view().upload;
    assert!(view.progress.unwrap().status_text.contains("big.pdf is too large"));
}

#[test]
fn disallowed_extension_is_rejected_with_filename_in_error() {
    init_logging();
    let (state, effects) = send(AppState::new(), UploadMsg::FileQueued(file("malware.exe", 10)));
    assert!(effects.is_empty());
    let progress = state.view().upload.progress.unwrap();
    assert_eq!(progress.percent_label, "Error");
    assert!(progress.status_text.contains("malware.exe"));
}

#[test]
fn uploaded_file_goes_to_the_head_of_the_list() {
    init_logging();
    let state = listed(&["old.txt"]);
    let (state, _) = send(state, UploadMsg::FileQueued(file("report.pdf", 10_000)));
    let (state, effects) = send(
        state,
        UploadMsg::FileUploaded(UploadedFile {
            filename: "report.pdf".to_string(),
            size: 10_000,
            date: "2024-05-02 09:30:00".to_string(),
        }),
    );
    assert!(effects.is_empty());

    let view = state.view().upload;
    assert_eq!(view.file_count, 2);
    assert_eq!(view.documents[0].name, "report.pdf");
    assert_eq!(view.documents[0].size_label, "9.77 KB");
    assert_eq!(view.documents[0].kind, DocumentKind::Pdf);
    assert_eq!(view.documents[1].name, "old.txt");
    assert_eq!(view.progress.unwrap().percent_label, "100%");
    assert_eq!(
        view.next_step_message,
        "You have 2 document(s). Move on to indexing!"
    );
}

#[test]
fn second_file_with_same_name_in_one_batch_is_a_duplicate() {
    init_logging();
    let (state, _) = send(AppState::new(), UploadMsg::FileQueued(file("a.md", 5)));
    let (state, _) = send(
        state,
        UploadMsg::FileUploaded(UploadedFile {
            filename: "a.md".to_string(),
            size: 5,
            date: "2024-05-02 09:30:00".to_string(),
        }),
    );
    let (state, effects) = send(state, UploadMsg::FileQueued(file("a.md", 5)));
    assert!(effects.is_empty());
    assert!(state.upload().batch_errored());
}

#[test]
fn progress_only_dirties_on_percent_change() {
    init_logging();
    let (mut state, _) = send(AppState::new(), UploadMsg::FileQueued(file("a.pdf", 1000)));
    assert!(state.consume_dirty());

    let (mut state, _) = send(state, UploadMsg::Progress { loaded: 500, total: 1000 });
    assert!(state.consume_dirty());
    assert_eq!(state.upload().progress().unwrap().percent, 50);

    let (mut state, _) = send(state, UploadMsg::Progress { loaded: 501, total: 1000 });
    assert!(!state.consume_dirty());
    assert_eq!(state.view().upload.progress.unwrap().percent_label, "50%");
}

#[test]
fn server_error_is_shown_verbatim() {
    init_logging();
    let (state, _) = send(AppState::new(), UploadMsg::FileQueued(file("a.pdf", 1)));
    let (state, _) = send(
        state,
        UploadMsg::UploadFailed {
            filename: "a.pdf".to_string(),
            error: RequestError::server(Some(409), Some("File exists on server".to_string())),
        },
    );
    let progress = state.view().upload.progress.unwrap();
    assert_eq!(progress.status_text, "✗ File exists on server");
    assert!(state.upload().batch_errored());
}

#[test]
fn network_error_uses_generic_text() {
    init_logging();
    let (state, _) = send(
        AppState::new(),
        UploadMsg::UploadFailed {
            filename: "a.pdf".to_string(),
            error: RequestError::network("connection refused"),
        },
    );
    let progress = state.view().upload.progress.unwrap();
    assert_eq!(progress.status_text, "✗ Network error during upload");
}

#[test]
fn clean_batch_hides_progress_later_then_refreshes() {
    init_logging();
    let (state, _) = send(AppState::new(), UploadMsg::FilesChosen(vec![file("a.pdf", 1)]));
    let (state, effects) = send(state, UploadMsg::BatchFinished);
    assert_eq!(effects, vec![Effect::HideUploadProgressLater]);

    let (state, effects) = send(state, UploadMsg::ProgressHidden);
    assert_eq!(effects, vec![Effect::RefreshDocuments]);
    assert!(state.view().upload.progress.is_none());
}

#[test]
fn errored_batch_keeps_error_and_only_refreshes() {
    init_logging();
    let files = vec![file("a.pdf", 1), file("x.exe", 1)];
    let (state, _) = send(AppState::new(), UploadMsg::FilesChosen(files));
    let (state, _) = send(state, UploadMsg::FileQueued(file("a.pdf", 1)));
    let (state, _) = send(state, UploadMsg::FileQueued(file("x.exe", 1)));
    let (state, effects) = send(state, UploadMsg::BatchFinished);
    assert_eq!(effects, vec![Effect::RefreshDocuments]);
    assert!(state.view().upload.progress.is_some());
}

#[test]
fn batch_rejected_entirely_makes_no_request() {
    init_logging();
    let (state, _) = send(AppState::new(), UploadMsg::FilesChosen(vec![file("x.exe", 1)]));
    let (state, effects) = send(state, UploadMsg::FileQueued(file("x.exe", 1)));
    assert!(effects.is_empty());
    let (state, effects) = send(state, UploadMsg::BatchFinished);
    assert!(effects.is_empty());
    assert!(state.view().upload.progress.is_some());
}

#[test]
fn new_batch_clears_previous_error_flag() {
    init_logging();
    let (state, _) = send(AppState::new(), UploadMsg::FileQueued(file("x.exe", 1)));
    assert!(state.upload().batch_errored());
    let (state, _) = send(state, UploadMsg::FilesChosen(vec![file("a.pdf", 1)]));
    assert!(!state.upload().batch_errored());
}

#[test]
fn delete_asks_for_confirmation_first() {
    init_logging();
    let state = listed(&["a.pdf"]);
    let (state, effects) = send(state, UploadMsg::DeleteRequested("a.pdf".to_string()));
    let action = ConfirmedAction::DeleteDocument {
        filename: "a.pdf".to_string(),
    };
    assert_eq!(
        effects,
        vec![Effect::Confirm {
            prompt: "Are you sure you want to delete \"a.pdf\"?".to_string(),
            action: action.clone(),
        }]
    );
    // Nothing is removed optimistically.
    assert_eq!(state.view().upload.file_count, 1);

    let (state, effects) = update(state, Msg::Confirmed(action));
    assert_eq!(
        effects,
        vec![Effect::DeleteDocument {
            filename: "a.pdf".to_string()
        }]
    );
    assert_eq!(state.view().upload.file_count, 1);
}

#[test]
fn declined_confirmation_does_nothing() {
    init_logging();
    let state = listed(&["a.pdf"]);
    let (state, effects) = update(state, Msg::Declined(ConfirmedAction::DeleteAllDocuments));
    assert!(effects.is_empty());
    assert_eq!(state.view().upload.file_count, 1);
}

#[test]
fn deleted_document_is_removed_after_server_success() {
    init_logging();
    let state = listed(&["a.pdf", "b.txt"]);
    let (state, _) = send(
        state,
        UploadMsg::DocumentDeleted {
            filename: "a.pdf".to_string(),
            response: DeleteResponse {
                success: true,
                message: Some("File a.pdf deleted".to_string()),
                ..DeleteResponse::default()
            },
        },
    );
    let view = state.view().upload;
    assert_eq!(view.file_count, 1);
    assert_eq!(view.documents[0].name, "b.txt");
    assert_eq!(view.notice.unwrap().text, "File a.pdf deleted");
}

#[test]
fn deleted_document_without_server_message_still_reports_success() {
    init_logging();
    let (state, _) = send(
        listed(&["a.pdf"]),
        UploadMsg::DocumentDeleted {
            filename: "a.pdf".to_string(),
            response: DeleteResponse {
                success: true,
                ..DeleteResponse::default()
            },
        },
    );
    let view = state.view().upload;
    assert_eq!(view.file_count, 0);
    let notice = view.notice.unwrap();
    assert_eq!(notice.tone, Tone::Success);
    assert_eq!(notice.text, "Deleted a.pdf");
}

#[test]
fn delete_all_is_skipped_for_empty_list() {
    init_logging();
    let (_state, effects) = send(AppState::new(), UploadMsg::DeleteAllRequested);
    assert!(effects.is_empty());
}

#[test]
fn delete_all_clears_list_and_reports_count() {
    init_logging();
    let state = listed(&["a.pdf", "b.txt"]);
    let (state, effects) = send(state, UploadMsg::DeleteAllRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::Confirm { prompt, action: ConfirmedAction::DeleteAllDocuments }]
            if prompt.contains("all 2 document(s)")
    ));

    let (state, _) = send(
        state,
        UploadMsg::AllDocumentsDeleted(DeleteAllResponse {
            success: true,
            count: 2,
            ..DeleteAllResponse::default()
        }),
    );
    let view = state.view().upload;
    assert!(view.empty);
    assert!(!view.delete_all_enabled);
    assert!(!view.next_step_enabled);
    assert_eq!(view.notice.unwrap().text, "2 file(s) deleted successfully");
}

#[test]
fn failed_delete_keeps_the_list() {
    init_logging();
    let state = listed(&["a.pdf"]);
    let (state, _) = send(
        state,
        UploadMsg::DeleteFailed(RequestError::server(
            Some(404),
            Some("File not found".to_string()),
        )),
    );
    let view = state.view().upload;
    assert_eq!(view.file_count, 1);
    let notice = view.notice.unwrap();
    assert_eq!(notice.tone, Tone::Error);
    assert_eq!(notice.text, "Deletion failed: File not found");
}
