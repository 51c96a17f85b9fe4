//! Interactive questionnaire driver
//!
//! Draws the current screen, blocks on one line of input, hands it to the
//! session and repeats until the session exits or input runs out.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::reporters::bar::BarStyle;
use crate::reporters::text;
use crate::session::Session;
use crate::store::UserStore;
use crate::terminal::{Terminal, TerminalCommand};

/// Run a session on stdin/stdout
pub fn run(catalog: Catalog, store: Arc<dyn UserStore>, bar_style: BarStyle) -> Result<()> {
    debug!("Starting session with the {} store", store.name());
    let mut session = Session::new(catalog, store).with_bar_style(bar_style);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&mut session, stdin.lock(), stdout.lock())
}

/// Drive `session` with lines from `input`, painting to `output`.
///
/// The terminal is restored before returning, also on error.
pub fn run_session<R: BufRead, W: Write>(session: &mut Session, input: R, output: W) -> Result<()> {
    let mut terminal = Terminal::new(output);
    let mut lines = input.lines();

    let outcome = drive(session, &mut lines, &mut terminal);

    terminal.apply_all(&[TerminalCommand::Reset, TerminalCommand::ShowCursor])?;
    terminal.print("\n")?;
    terminal.flush()?;
    outcome
}

fn drive<R: BufRead, W: Write>(
    session: &mut Session,
    lines: &mut io::Lines<R>,
    terminal: &mut Terminal<W>,
) -> Result<()> {
    loop {
        let screen = session.screen()?;
        text::draw(&screen, terminal).context("Failed to write to the terminal")?;

        if session.is_finished() {
            return Ok(());
        }

        let Some(line) = lines.next() else {
            debug!("Input closed in state {}", session.state());
            return Ok(());
        };
        let line = line.context("Failed to read input")?;
        session.handle(&line)?;
    }
}
