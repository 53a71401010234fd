//! Text frame: composes a [`GameSnapshot`] into styled lines and writes them
//! to a real terminal.
//!
//! Each board cell is two characters wide. Locked and falling cells use the
//! piece color, rows waiting to be cleared are drawn highlighted.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::core::GameSnapshot;
use crate::types::{self, Cell, PieceKind, BOARD_WIDTH};

const BORDER: types::Color = types::Color::rgb(120, 120, 120);
const TEXT: types::Color = types::Color::rgb(220, 220, 220);
const FLASH: types::Color = types::Color::rgb(255, 255, 255);

/// A run of characters in one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: types::Color,
    pub bold: bool,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: TEXT,
            bold: false,
        }
    }

    fn colored(text: impl Into<String>, color: types::Color) -> Self {
        Self {
            text: text.into(),
            color,
            bold: false,
        }
    }
}

pub type Line = Vec<Span>;

/// Plain text of a line, without styling.
pub fn line_text(line: &[Span]) -> String {
    line.iter().map(|span| span.text.as_str()).collect()
}

fn cell_span(cell: Cell, clearing: bool) -> Span {
    match cell.kind {
        Some(_) if clearing => Span {
            text: "==".to_string(),
            color: FLASH,
            bold: true,
        },
        Some(_) => Span::colored("[]", cell.color),
        None => Span::colored(" .", BORDER),
    }
}

fn piece_label(kind: Option<PieceKind>) -> Span {
    match kind {
        Some(kind) => Span {
            text: kind.as_str().to_ascii_uppercase(),
            color: kind.color(),
            bold: true,
        },
        None => Span::plain("-"),
    }
}

/// Side panel text for board row `y`.
fn panel(snapshot: &GameSnapshot, y: usize) -> Line {
    match y {
        1 => vec![Span::plain("  NEXT  "), piece_label(Some(snapshot.next))],
        3 => {
            let mut line = vec![Span::plain("  HOLD  "), piece_label(snapshot.hold)];
            if !snapshot.can_hold && snapshot.hold.is_some() {
                line.push(Span::colored(" (used)", BORDER));
            }
            line
        }
        5 => vec![Span::plain(format!("  LINES {}", snapshot.lines_cleared))],
        6 => vec![Span::plain(format!("  LEVEL {}", snapshot.level))],
        9 if snapshot.game_over => vec![Span {
            text: "  GAME OVER".to_string(),
            color: types::Color::rgb(0xef, 0x44, 0x44),
            bold: true,
        }],
        9 if snapshot.paused => vec![Span {
            text: "  PAUSED".to_string(),
            color: TEXT,
            bold: true,
        }],
        10 if snapshot.game_over => vec![Span::plain("  r: restart  q: quit")],
        12 => vec![Span::colored("  arrows/hjkl move", BORDER)],
        13 => vec![Span::colored("  z rotate ccw  c hold", BORDER)],
        14 => vec![Span::colored("  p pause  r reset  q quit", BORDER)],
        _ => Vec::new(),
    }
}

/// Compose the whole frame, one line per terminal row.
pub fn compose(snapshot: &GameSnapshot) -> Vec<Line> {
    let edge = format!("+{}+", "-".repeat(BOARD_WIDTH as usize * 2));
    let mut lines = Vec::with_capacity(snapshot.board.len() + 2);

    lines.push(vec![Span::colored(edge.clone(), BORDER)]);
    for (y, row) in snapshot.board.iter().enumerate() {
        let clearing = snapshot.is_clearing(y);
        let mut line = Vec::with_capacity(row.len() + 4);
        line.push(Span::colored("|", BORDER));
        line.extend(row.iter().map(|&cell| cell_span(cell, clearing)));
        line.push(Span::colored("|", BORDER));
        line.extend(panel(snapshot, y));
        lines.push(line);
    }
    let bottom = if snapshot.just_locked { FLASH } else { BORDER };
    lines.push(vec![Span::colored(edge, bottom)]);

    lines
}

/// Writes composed frames to stdout in raw mode on the alternate screen.
pub struct Terminal {
    stdout: io::Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Full redraw of `lines`.
    pub fn draw(&mut self, lines: &[Line]) -> Result<()> {
        self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        for (y, line) in lines.iter().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, y as u16))?;
            for span in line {
                self.stdout.queue(SetAttribute(Attribute::Reset))?;
                self.stdout.queue(SetForegroundColor(to_color(span.color)))?;
                if span.bold {
                    self.stdout.queue(SetAttribute(Attribute::Bold))?;
                }
                self.stdout.queue(Print(&span.text))?;
            }
        }
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color(color: types::Color) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}
