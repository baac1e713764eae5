//! Candidate input from the terminal.
//!
//! Focus reporting (`ESC [ I` / `ESC [ O`) stands in for page visibility and
//! bracketed paste (`ESC [200~ ... ESC [201~`) for clipboard use. Pasted text
//! is always discarded.

use proctor_core::integrity::{ClipboardKind, VisibilityState};
use proctor_core::question::OPTION_COUNT;
use proctor_core::SessionInput;
use std::io::{BufRead, IsTerminal, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

const FOCUS_IN: &str = "\x1b[I";
const FOCUS_OUT: &str = "\x1b[O";
const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// One thing the candidate did on a line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Select(usize),
    Next,
    Focus(VisibilityState),
    Paste,
    Quit,
    Unknown(String),
}

impl LineCommand {
    /// Stamp the command with the question it was issued for
    pub fn into_input(self, question_index: usize) -> Option<SessionInput> {
        match self {
            Self::Select(option_index) => Some(SessionInput::Select {
                question_index,
                option_index,
            }),
            Self::Next => Some(SessionInput::Next { question_index }),
            Self::Focus(state) => Some(SessionInput::Visibility(state)),
            Self::Paste => Some(SessionInput::Clipboard(ClipboardKind::Paste)),
            Self::Quit => Some(SessionInput::Close),
            Self::Unknown(_) => None,
        }
    }
}

/// Split one input line into commands, control sequences first
pub fn parse_line(line: &str) -> Vec<LineCommand> {
    let mut commands = Vec::new();
    let mut text = String::new();
    let mut rest = line;

    while let Some(start) = rest.find('\x1b') {
        text.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(PASTE_START) {
            commands.push(LineCommand::Paste);
            rest = after
                .find(PASTE_END)
                .map_or("", |end| &after[end + PASTE_END.len()..]);
        } else if let Some(after) = tail.strip_prefix(FOCUS_OUT) {
            commands.push(LineCommand::Focus(VisibilityState::Hidden));
            rest = after;
        } else if let Some(after) = tail.strip_prefix(FOCUS_IN) {
            commands.push(LineCommand::Focus(VisibilityState::Visible));
            rest = after;
        } else {
            // Unrecognised escape: drop the ESC byte and keep going
            rest = &tail[1..];
        }
    }
    text.push_str(rest);

    let word = text.trim().to_ascii_lowercase();
    if let Some(command) = parse_word(&word) {
        commands.push(command);
    }
    commands
}

fn parse_word(word: &str) -> Option<LineCommand> {
    match word {
        "" => None,
        "n" | "next" | "f" | "finish" => Some(LineCommand::Next),
        "q" | "quit" | "exit" => Some(LineCommand::Quit),
        _ => {
            if let Ok(number) = word.parse::<usize>() {
                if (1..=OPTION_COUNT).contains(&number) {
                    return Some(LineCommand::Select(number - 1));
                }
            }
            let mut chars = word.chars();
            match (chars.next(), chars.next()) {
                (Some(letter @ 'a'..='d'), None) => {
                    Some(LineCommand::Select(letter as usize - 'a' as usize))
                }
                _ => Some(LineCommand::Unknown(word.to_string())),
            }
        }
    }
}

/// Read stdin on a dedicated thread and forward commands to the session.
///
/// `current` holds the question index on screen; every answer action is
/// stamped with it when the line is read. The thread ends on EOF or once
/// the session stops listening.
pub fn spawn_reader(
    tx: UnboundedSender<SessionInput>,
    current: Arc<AtomicUsize>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name(String::from("proctor-input"))
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                for command in parse_line(&line) {
                    if let LineCommand::Unknown(word) = &command {
                        println!("Unknown command {word:?}: type 1-4 to answer, n to continue, q to quit");
                        continue;
                    }
                    if let Some(input) = command.into_input(current.load(Ordering::SeqCst)) {
                        if tx.send(input).is_err() {
                            return;
                        }
                    }
                }
            }
            log::debug!("Input closed");
        })
}

/// Enables focus reporting and bracketed paste for its lifetime
pub struct TerminalModes {
    enabled: bool,
}

impl TerminalModes {
    pub fn enable() -> Self {
        let enabled = std::io::stdout().is_terminal() && write_sequence("\x1b[?1004h\x1b[?2004h");
        if !enabled {
            log::debug!("Not a terminal; focus and paste detection disabled");
        }
        Self { enabled }
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        if self.enabled {
            write_sequence("\x1b[?1004l\x1b[?2004l");
        }
    }
}

fn write_sequence(sequence: &str) -> bool {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(sequence.as_bytes())
        .and_then(|()| stdout.flush())
        .is_ok()
}
