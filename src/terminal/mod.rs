//! Terminal presentation sink
//!
//! The session and reporters speak in logical commands; this module is the
//! only place that turns them into escape sequences (via crossterm).

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

/// The 8 pure RGB primaries the screen is painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Primary {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Primary::Black => (0, 0, 0),
            Primary::Red => (255, 0, 0),
            Primary::Green => (0, 255, 0),
            Primary::Yellow => (255, 255, 0),
            Primary::Blue => (0, 0, 255),
            Primary::Magenta => (255, 0, 255),
            Primary::Cyan => (0, 255, 255),
            Primary::White => (255, 255, 255),
        }
    }

    /// Basic ANSI palette entry (0-7)
    fn ansi_index(self) -> u8 {
        match self {
            Primary::Black => 0,
            Primary::Red => 1,
            Primary::Green => 2,
            Primary::Yellow => 3,
            Primary::Blue => 4,
            Primary::Magenta => 5,
            Primary::Cyan => 6,
            Primary::White => 7,
        }
    }

    fn color(self) -> style::Color {
        style::Color::AnsiValue(self.ansi_index())
    }
}

/// What a piece of output is, rather than how it looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    /// Screen background and regular text
    Frame,
    /// Filled bar cells at or under the risk threshold
    Safe,
    /// Filled bar cells above the risk threshold
    Warning,
    /// The boundary cell of a bar
    Boundary,
    /// Unfilled bar cells
    Empty,
    /// Validation messages
    Alert,
}

impl ColorRole {
    /// (background, foreground)
    pub fn palette(self) -> (Primary, Primary) {
        match self {
            ColorRole::Frame => (Primary::Blue, Primary::White),
            ColorRole::Safe => (Primary::Green, Primary::Green),
            ColorRole::Warning => (Primary::Red, Primary::Red),
            ColorRole::Boundary => (Primary::Green, Primary::Black),
            ColorRole::Empty => (Primary::White, Primary::Black),
            ColorRole::Alert => (Primary::Blue, Primary::Yellow),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCommand {
    Clear,
    Home,
    HideCursor,
    ShowCursor,
    MoveTo { col: u16, row: u16 },
    SetColor(ColorRole),
    Reset,
}

/// Writes commands and text to any output
pub struct Terminal<W: Write> {
    out: W,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn apply(&mut self, command: TerminalCommand) -> io::Result<()> {
        match command {
            TerminalCommand::Clear => queue!(self.out, terminal::Clear(terminal::ClearType::All)),
            TerminalCommand::Home => queue!(self.out, cursor::MoveTo(0, 0)),
            TerminalCommand::HideCursor => queue!(self.out, cursor::Hide),
            TerminalCommand::ShowCursor => queue!(self.out, cursor::Show),
            TerminalCommand::MoveTo { col, row } => queue!(self.out, cursor::MoveTo(col, row)),
            TerminalCommand::SetColor(role) => {
                let (background, foreground) = role.palette();
                queue!(
                    self.out,
                    style::SetColors(style::Colors::new(foreground.color(), background.color()))
                )
            }
            TerminalCommand::Reset => queue!(self.out, style::ResetColor),
        }
    }

    pub fn apply_all(&mut self, commands: &[TerminalCommand]) -> io::Result<()> {
        for command in commands {
            self.apply(*command)?;
        }
        Ok(())
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, style::Print(text))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
