use docdesk_core::wire::IndexStats;
use docdesk_core::{
    AppViewModel, IndexationView, MessageKind, MessageView, Notice, Page, SearchView, Tone,
    UploadView,
};

const BAR_CELLS: usize = 20;

/// Lines that change while a command runs; the terminal view prints the
/// ones it has not printed yet.
pub fn live_lines(view: &AppViewModel, focus: Page) -> Vec<String> {
    match focus {
        Page::Upload => upload_live(&view.upload),
        Page::Indexation => indexation_live(&view.indexation),
        Page::Search => search_live(&view.search),
    }
}

fn upload_live(view: &UploadView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(progress) = &view.progress {
        // Coarse steps keep a large file from printing a hundred lines.
        let shown = progress.percent / 5 * 5;
        let label = match progress.tone {
            Tone::Info => format!("{shown}%"),
            _ => progress.percent_label.clone(),
        };
        lines.push(format!(
            "{} {} {} {}",
            progress.filename,
            bar(shown),
            label,
            progress.status_text
        ));
    }
    lines.extend(view.notice.as_ref().map(notice_line));
    lines
}

fn indexation_live(view: &IndexationView) -> Vec<String> {
    let mut lines: Vec<String> = view
        .steps
        .iter()
        .map(|step| format!("Step {}/4 {}: {}", step.number, step.label, step.status_text))
        .collect();
    if view.progress_visible {
        lines.push(format!(
            "{} {}",
            bar(view.progress_percent),
            view.progress_text
        ));
    }
    lines.extend(view.log.iter().map(|line| line.text.clone()));
    lines.extend(view.warning.iter().map(|text| format!("! {text}")));
    lines.extend(view.notice.as_ref().map(notice_line));
    lines
}

fn search_live(view: &SearchView) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, message) in view.messages.iter().enumerate() {
        lines.extend(message_lines(index + 1, message));
    }
    if view.loading {
        lines.push("... waiting for the answer".to_string());
    }
    lines.extend(view.warning.iter().map(|text| format!("! {text}")));
    lines
}

/// One chat bubble; `number` keeps repeated texts distinct.
pub fn message_lines(number: usize, message: &MessageView) -> Vec<String> {
    let who = match message.kind {
        MessageKind::System => "docdesk",
        MessageKind::User => "you",
        MessageKind::Assistant => "assistant",
        MessageKind::Error => "error",
    };
    let mut lines = vec![format!("[{number}] {who}: {}", message.text)];
    if let Some(header) = &message.sources_header {
        lines.push(format!("[{number}]   {header}"));
        for source in &message.sources {
            lines.push(format!(
                "[{number}]     {} ({})",
                source.heading, source.score_label
            ));
            lines.push(format!("[{number}]       {}", source.excerpt));
        }
    }
    if let Some(meta) = &message.meta {
        lines.push(format!("[{number}]   {meta}"));
    }
    lines
}

pub fn document_lines(view: &UploadView) -> Vec<String> {
    let mut lines: Vec<String> = view
        .documents
        .iter()
        .map(|card| format!("{:<40} {:>12}  {}", card.name, card.size_label, card.date))
        .collect();
    if view.empty {
        lines.push("No documents uploaded.".to_string());
    }
    lines.push(view.next_step_message.clone());
    lines
}

pub fn results_lines(view: &IndexationView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(results) = &view.results {
        lines.push("Results:".to_string());
        lines.extend(
            results
                .iter()
                .map(|card| format!("  {:<22} {}", card.label, card.value)),
        );
    }
    lines
}

pub fn stats_lines(view: &IndexationView) -> Vec<String> {
    let mut lines = vec![format!("Indexed: {}", view.index_status_label)];
    lines.extend(
        view.stats
            .iter()
            .map(|row| format!("  {:<22} {}", row.label, row.value)),
    );
    lines
}

/// Fields of the stats reply the indexation page leaves out.
pub fn stats_detail_lines(stats: &IndexStats) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(vectors) = stats.total_vectors {
        lines.push(format!("  {:<22} {vectors}", "Vectors"));
    }
    if let Some(dimension) = stats.dimension {
        lines.push(format!("  {:<22} {dimension}", "Dimension"));
    }
    if let Some(mode) = &stats.embedding_mode {
        lines.push(format!("  {:<22} {mode}", "Embedding mode"));
    }
    if !stats.sources.is_empty() {
        lines.push(format!("  Sources ({}):", stats.sources.len()));
        lines.extend(stats.sources.iter().map(|source| format!("    {source}")));
    }
    lines
}

pub fn notice_line(notice: &Notice) -> String {
    let mark = match notice.tone {
        Tone::Info => "i",
        Tone::Success => "✓",
        Tone::Warning => "!",
        Tone::Error => "✗",
    };
    format!("{mark} {}", notice.text)
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_CELLS / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_CELLS - filled))
}
