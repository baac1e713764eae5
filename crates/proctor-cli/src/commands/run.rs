/// Proctored session command
use crate::terminal::{spawn_reader, TerminalModes, TerminalObserver, TerminalPresenter};
use anyhow::{Context, Result};
use proctor_core::camera::{Camera, NoCamera, SnapshotCamera};
use proctor_core::config::EngineConfig;
use proctor_core::fullscreen::terminal::create_terminal_fullscreen;
use proctor_core::session::{SessionOutcome, SessionRunner, SessionServices, SessionStatus};
use proctor_core::supply::{load_question_set, RoleDescriptor};
use proctor_integrations::{FileQuestionSupply, HttpFrameClassifier};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct RunOptions {
    pub questions: PathBuf,
    pub role: String,
    pub category: Option<String>,
    pub camera: Option<PathBuf>,
    pub json: bool,
}

pub async fn run_command(config_path: Option<&Path>, options: RunOptions) -> Result<()> {
    let config = EngineConfig::load_or_default(config_path)?;

    let supply = FileQuestionSupply::new(&options.questions)?;
    let mut descriptor = RoleDescriptor::new(&options.role);
    if let Some(category) = &options.category {
        descriptor = descriptor.with_category(category);
    }
    let questions = load_question_set(&supply, &descriptor, &config.questions).await?;

    let camera: Arc<dyn Camera> = match &options.camera {
        Some(path) => Arc::new(SnapshotCamera::new(path)),
        None => Arc::new(NoCamera),
    };
    let classifier = Arc::new(HttpFrameClassifier::new(
        config.classifier.clone(),
        config.integrity.classifier_timeout(),
    )?);
    let current = Arc::new(AtomicUsize::new(0));

    let services = SessionServices {
        camera,
        classifier,
        fullscreen: create_terminal_fullscreen(),
        observer: Arc::new(TerminalObserver::new(current.clone())),
        presenter: Arc::new(TerminalPresenter::new(options.json)),
    };
    let mut runner = SessionRunner::new(questions, &config, services)?;

    let modes = TerminalModes::enable();
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_reader(tx, current).context("Failed to start the input reader")?;

    let outcome = runner.run(rx).await?;
    drop(modes);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("\n{}", outcome_summary(&outcome));
    }
    Ok(())
}

fn outcome_summary(outcome: &SessionOutcome) -> String {
    let elapsed = (outcome.ended_at - outcome.started_at).num_seconds();
    let headline = match outcome.status {
        SessionStatus::Completed => "Session completed",
        SessionStatus::Aborted => "Session aborted; no result was recorded",
        _ => "Session ended",
    };
    format!(
        "{headline} ({}s, {} of {} questions answered)\nTab switches: {}  Clipboard events: {}\nSession id: {}",
        elapsed,
        outcome.answered,
        outcome.total_questions,
        outcome.integrity.tab_switch_count,
        outcome.integrity.clipboard_event_count,
        outcome.session_id
    )
}
