use super::{Fullscreen, FullscreenAdapter};
use anyhow::Result;
use async_trait::async_trait;
use std::io::{IsTerminal, Write};

fn write_control(sequence: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    if !stdout.is_terminal() {
        anyhow::bail!("stdout is not a terminal");
    }
    stdout.write_all(sequence.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// xterm window operation: switch the terminal window to full-screen
pub struct XtermFullscreen;

#[async_trait]
impl FullscreenAdapter for XtermFullscreen {
    fn name(&self) -> &'static str {
        "xterm"
    }

    async fn request(&self) -> Result<()> {
        let term = std::env::var("TERM").unwrap_or_default();
        if !term.starts_with("xterm") {
            anyhow::bail!("TERM={term} does not support xterm window operations");
        }
        write_control("\x1b[10;1t")
    }

    fn exit(&self) -> Result<()> {
        write_control("\x1b[10;0t")
    }
}

/// Alternate screen buffer: takes over the whole terminal viewport
pub struct AlternateScreen;

#[async_trait]
impl FullscreenAdapter for AlternateScreen {
    fn name(&self) -> &'static str {
        "alternate-screen"
    }

    async fn request(&self) -> Result<()> {
        write_control("\x1b[?1049h\x1b[H")
    }

    fn exit(&self) -> Result<()> {
        write_control("\x1b[?1049l")
    }
}

/// Fullscreen chain for terminal sessions, most specific adapter first
#[must_use]
pub fn create_terminal_fullscreen() -> Fullscreen {
    Fullscreen::new(vec![Box::new(XtermFullscreen), Box::new(AlternateScreen)])
}
