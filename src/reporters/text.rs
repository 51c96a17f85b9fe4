//! Text (terminal) reporter
//!
//! `draw` paints a session `Screen` through the terminal sink, one row at a
//! time. `render_catalog` produces the ANSI summary printed by `check`.

use std::io::{self, Write};

use crate::catalog::Catalog;
use crate::reporters::bar::{BarChart, Cell, RiskClass};
use crate::session::{BarPanel, Block, Screen};
use crate::terminal::{ColorRole, Terminal, TerminalCommand};

const FILLED: char = '\u{2588}';
const EMPTY: char = '\u{2591}';

/// Column of regular text
const TEXT_COL: u16 = 1;
/// Column of the "Min 0" label
const LABEL_COL: u16 = 3;
/// Column of the first bar cell
const BAR_COL: u16 = 12;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Runs of equally coloured bar cells, left to right
pub fn bar_segments(chart: &BarChart) -> Vec<(ColorRole, String)> {
    let filled_role = match chart.class {
        RiskClass::Safe => ColorRole::Safe,
        RiskClass::Warning => ColorRole::Warning,
    };

    let mut segments: Vec<(ColorRole, String)> = Vec::new();
    for cell in &chart.cells {
        let (role, glyph) = match cell {
            Cell::Filled => (filled_role, FILLED),
            Cell::Boundary => (ColorRole::Boundary, FILLED),
            Cell::Empty => (ColorRole::Empty, EMPTY),
        };
        match segments.last_mut() {
            Some((last, run)) if *last == role => run.push(glyph),
            _ => segments.push((role, glyph.to_string())),
        }
    }
    segments
}

/// Tracks the next free row while painting
struct Painter<'a, W: Write> {
    term: &'a mut Terminal<W>,
    row: u16,
}

impl<W: Write> Painter<'_, W> {
    fn line(&mut self, text: &str) -> io::Result<()> {
        self.term.apply(TerminalCommand::MoveTo {
            col: TEXT_COL,
            row: self.row,
        })?;
        self.term.print(text)?;
        self.row = self.row.saturating_add(1);
        Ok(())
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        for line in text.lines() {
            self.line(line)?;
        }
        Ok(())
    }

    fn skip(&mut self) {
        self.row = self.row.saturating_add(1);
    }

    fn menu(&mut self, items: &[String]) -> io::Result<()> {
        for (i, item) in items.iter().enumerate() {
            let marker = format!("{}. ", i + 1);
            let pad = " ".repeat(marker.len());
            for (n, line) in item.lines().enumerate() {
                let prefix = if n == 0 { marker.as_str() } else { pad.as_str() };
                self.line(&format!("{prefix}{line}"))?;
            }
        }
        Ok(())
    }

    fn bar(&mut self, panel: &BarPanel) -> io::Result<()> {
        self.line(&panel.caption)?;

        let row = self.row;
        self.term.apply(TerminalCommand::MoveTo { col: LABEL_COL, row })?;
        self.term.print("Min 0")?;
        self.term.apply(TerminalCommand::MoveTo { col: BAR_COL, row })?;
        for (role, run) in bar_segments(&panel.chart) {
            self.term.apply(TerminalCommand::SetColor(role))?;
            self.term.print(&run)?;
        }
        self.term.apply(TerminalCommand::SetColor(ColorRole::Frame))?;

        let width = u16::try_from(panel.chart.width()).unwrap_or(u16::MAX);
        self.term.apply(TerminalCommand::MoveTo {
            col: BAR_COL.saturating_add(width).saturating_add(2),
            row,
        })?;
        self.term.print(&format!("Max {}", panel.max_label))?;
        self.skip();
        Ok(())
    }

    fn notice(&mut self, notice: &str) -> io::Result<()> {
        self.term
            .apply(TerminalCommand::SetColor(ColorRole::Alert))?;
        self.text(notice)?;
        self.term
            .apply(TerminalCommand::SetColor(ColorRole::Frame))
    }
}

/// Paint `screen`, leaving the cursor after the prompt
pub fn draw<W: Write>(screen: &Screen, term: &mut Terminal<W>) -> io::Result<()> {
    term.apply_all(&[
        TerminalCommand::SetColor(ColorRole::Frame),
        TerminalCommand::Clear,
        TerminalCommand::Home,
        TerminalCommand::HideCursor,
    ])?;

    let mut painter = Painter { term, row: 1 };
    if let Some(status) = &screen.status {
        painter.line(status)?;
        painter.skip();
    }
    painter.line(&screen.title)?;
    painter.skip();

    for block in &screen.blocks {
        match block {
            Block::Text(text) => painter.text(text)?,
            Block::Menu(items) => painter.menu(items)?,
            Block::Bar(panel) => painter.bar(panel)?,
            Block::Blank => painter.skip(),
        }
    }

    painter.skip();
    if let Some(notice) = &screen.notice {
        painter.notice(notice)?;
    }
    if !screen.prompt.is_empty() {
        painter.line(&screen.prompt)?;
        painter.term.apply(TerminalCommand::ShowCursor)?;
    }
    painter.term.flush()
}

/// Render the catalog outline printed by `co2score check`
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Questionnaire{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Questions: {BOLD}{}{RESET}  Max possible score: {BOLD}{}{RESET}\n\n",
        catalog.len(),
        catalog.max_possible()
    ));

    out.push_str(&format!(
        "{DIM}  #   MAX  OPTIONS  PROMPT{RESET}\n"
    ));
    for (i, question) in catalog.questions().iter().enumerate() {
        // First line only; prompts are wrapped at load time
        let prompt = question.prompt.lines().next().unwrap_or_default();
        out.push_str(&format!(
            "  {DIM}{:>2}{RESET}  {:>4}  {:>7}  {}\n",
            i + 1,
            question.max_score,
            question.option_count(),
            prompt
        ));
    }
    out.push('\n');
    out
}
