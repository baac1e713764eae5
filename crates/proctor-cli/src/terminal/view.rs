use crate::commands::helpers::{option_label, percent, progress_bar};
use proctor_core::notice::{Notice, NoticeLevel, ResultsPresenter, SessionObserver};
use proctor_core::scoring::SessionResult;
use proctor_core::session::{SessionSnapshot, SessionStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tabled::{Table, Tabled};

const QUALIFIED: &str = "Congratulations! You have qualified for the next round.";
const NOT_QUALIFIED: &str = "You did not qualify for the next round. Keep practicing!";

#[derive(Debug, Default)]
struct ViewState {
    question: Option<usize>,
    selected: Option<usize>,
    remaining_secs: Option<u32>,
    tab_switch_count: u32,
    alert_shown: bool,
}

/// Prints questions, countdown warnings and notices to stdout
pub struct TerminalObserver {
    current: Arc<AtomicUsize>,
    state: Mutex<ViewState>,
}

impl TerminalObserver {
    pub fn new(current: Arc<AtomicUsize>) -> Self {
        Self {
            current,
            state: Mutex::new(ViewState::default()),
        }
    }

    /// Lines to print for `snapshot`, given what is already on screen
    fn updates(&self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lines = Vec::new();
        if snapshot.status != SessionStatus::Active {
            return lines;
        }

        if state.question != Some(snapshot.question_index) {
            *state = ViewState {
                question: Some(snapshot.question_index),
                selected: snapshot.selected,
                remaining_secs: Some(snapshot.remaining_secs),
                tab_switch_count: snapshot.tab_switch_count,
                alert_shown: state.alert_shown,
            };
            lines.push(format_question(snapshot));
        }

        if snapshot.selected != state.selected {
            state.selected = snapshot.selected;
            if let Some(option) = snapshot.selected {
                lines.push(format!(
                    "Selected {}. Type n to {}.",
                    option_label(option),
                    snapshot.advance_label().to_lowercase()
                ));
            }
        }

        if state.remaining_secs != Some(snapshot.remaining_secs) {
            state.remaining_secs = Some(snapshot.remaining_secs);
            if snapshot.low_time && snapshot.remaining_secs > 0 {
                lines.push(format!("  {}s remaining", snapshot.remaining_secs));
            }
        }

        if snapshot.tab_switch_count > state.tab_switch_count {
            state.tab_switch_count = snapshot.tab_switch_count;
            lines.push(format!(
                "Tab switches recorded: {}",
                snapshot.tab_switch_count
            ));
        }

        if snapshot.cheating_alert && !state.alert_shown {
            lines.push(format!(
                "ALERT: high cheating probability detected ({})",
                percent(snapshot.latest_cheating_score)
            ));
        }
        state.alert_shown = snapshot.cheating_alert;
        lines
    }
}

impl SessionObserver for TerminalObserver {
    fn notice(&self, notice: &Notice) {
        println!("{}", format_notice(notice));
    }

    fn render(&self, snapshot: &SessionSnapshot) {
        self.current.store(snapshot.question_index, Ordering::SeqCst);
        for line in self.updates(snapshot) {
            println!("{line}");
        }
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let level = match notice.level() {
        NoticeLevel::Info => "INFO",
        NoticeLevel::Warning => "WARN",
        NoticeLevel::Alert => "ALERT",
    };
    format!("[{level}] {}: {}", notice.title(), notice.message())
}

pub fn format_question(snapshot: &SessionSnapshot) -> String {
    let mut out = format!(
        "\nQuestion {} of {} {} {}\nTime remaining: {}s    Current Score: {}/{}\n\n{}\n",
        snapshot.question_number,
        snapshot.total_questions,
        progress_bar(snapshot.progress, 20),
        percent(snapshot.progress),
        snapshot.remaining_secs,
        snapshot.correct_so_far,
        snapshot.scored_so_far,
        snapshot.prompt,
    );
    for (index, option) in snapshot.options.iter().enumerate() {
        out.push_str(&format!("  {}) {option}\n", index + 1));
    }
    out.push_str(&format!(
        "\nType 1-{} to select, n for {}, q to quit.",
        snapshot.options.len(),
        snapshot.advance_label()
    ));
    out
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "")]
    bar: String,
}

pub fn results_table(result: &SessionResult) -> String {
    let rows = [
        ("MCQ Score", result.mcq_score),
        ("Integrity Score", result.integrity_score()),
        ("Final Score", result.final_score),
    ]
    .into_iter()
    .map(|(metric, value)| ScoreRow {
        metric,
        score: percent(value),
        bar: progress_bar(value, 20),
    });
    Table::new(rows).to_string()
}

pub const fn qualification_message(result: &SessionResult) -> &'static str {
    if result.qualified {
        QUALIFIED
    } else {
        NOT_QUALIFIED
    }
}

/// Shows the final verdict as a table, or nothing when JSON output was asked for
pub struct TerminalPresenter {
    json: bool,
}

impl TerminalPresenter {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }
}

impl ResultsPresenter for TerminalPresenter {
    fn present(&self, result: &SessionResult) {
        if self.json {
            return;
        }
        println!("\nInterview Results\n");
        println!("{}", results_table(result));
        println!("\n{}", qualification_message(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(question_index: usize) -> SessionSnapshot {
        SessionSnapshot {
            status: SessionStatus::Active,
            question_index,
            question_number: question_index + 1,
            total_questions: 5,
            progress: (question_index + 1) as f64 / 5.0,
            prompt: String::from("What is 2 + 2?"),
            options: vec![
                String::from("3"),
                String::from("4"),
                String::from("5"),
                String::from("22"),
            ],
            remaining_secs: 60,
            low_time: false,
            selected: None,
            correct_so_far: question_index,
            scored_so_far: question_index,
            is_last_question: question_index == 4,
            tab_switch_count: 0,
            clipboard_event_count: 0,
            latest_cheating_score: 0.0,
            cheating_alert: false,
        }
    }

    #[test]
    fn test_question_block_lists_options_and_score() {
        let text = format_question(&snapshot(4));
        assert!(text.contains("Question 5 of 5"));
        assert!(text.contains("Current Score: 4/4"));
        assert!(text.contains("  2) 4"));
        assert!(text.contains("n for Finish"));
    }

    #[test]
    fn test_observer_prints_question_once_and_countdown_when_low() {
        let current = Arc::new(AtomicUsize::new(0));
        let observer = TerminalObserver::new(current.clone());

        assert_eq!(observer.updates(&snapshot(1)).len(), 1);
        assert!(observer.updates(&snapshot(1)).is_empty());

        let mut ticking = snapshot(1);
        ticking.remaining_secs = 30;
        assert!(observer.updates(&ticking).is_empty());

        ticking.remaining_secs = 9;
        ticking.low_time = true;
        assert_eq!(observer.updates(&ticking), vec![String::from("  9s remaining")]);

        observer.render(&snapshot(2));
        assert_eq!(current.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_alert_banner_shown_once_per_crossing() {
        let observer = TerminalObserver::new(Arc::new(AtomicUsize::new(0)));
        observer.updates(&snapshot(0));

        let mut alert = snapshot(0);
        alert.cheating_alert = true;
        alert.latest_cheating_score = 0.9;
        assert_eq!(observer.updates(&alert).len(), 1);
        assert!(observer.updates(&alert).is_empty());
    }

    #[test]
    fn test_results_table_and_message() {
        let result = SessionResult {
            mcq_score: 0.8,
            cheating_score: 0.2,
            final_score: 0.8,
            qualified: true,
        };
        let table = results_table(&result);
        assert!(table.contains("MCQ Score"));
        assert!(table.contains("80.0%"));
        assert!(table.contains("Integrity Score"));
        assert_eq!(qualification_message(&result), QUALIFIED);
    }

    #[test]
    fn test_notice_format_includes_level() {
        let text = format_notice(&Notice::MultipleFaces);
        assert_eq!(text, "[ALERT] Warning: Multiple faces detected!");
    }
}
