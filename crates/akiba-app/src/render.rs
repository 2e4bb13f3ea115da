//! Crossterm renderer for the boot log.
//!
//! Lines resolve strictly in script order, so only the newest line ever
//! mutates: finalized rows are printed once with a trailing newline, and
//! the live row (current line plus blinking cursor) is rewritten in place
//! on every draw.

use std::io::{self, Write};

use crossterm::style::{PrintStyledContent, Stylize};
use crossterm::{cursor, execute, queue, style::Print, terminal};

use akiba_core::script::{ASCII_BANNER, COPYRIGHT_NOTICE};
use akiba_core::{Frame, LineStatus};

pub struct BootRenderer<W: Write> {
    out: W,
    finalized: usize,
}

impl<W: Write> BootRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, finalized: 0 }
    }

    /// Hide the hardware cursor and print the banner and copyright notice.
    pub fn init(&mut self) -> io::Result<()> {
        execute!(self.out, cursor::Hide)?;
        for text in [ASCII_BANNER, COPYRIGHT_NOTICE] {
            for line in text.lines() {
                queue!(self.out, Print(line), Print("\r\n"))?;
            }
        }
        self.out.flush()
    }

    /// Repaint the live row and flush any rows that finalized since the
    /// previous draw.
    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;

        let mut live_row = false;
        let mut index = self.finalized;
        while index < frame.lines.len() {
            let line = &frame.lines[index];
            let label = match line.status {
                LineStatus::Ok => line.label.as_str().green(),
                LineStatus::Fail => line.label.as_str().red(),
                LineStatus::Retrying | LineStatus::Testing => line.label.as_str().yellow(),
            };
            queue!(
                self.out,
                PrintStyledContent(label),
                Print(" "),
                Print(line.text.as_str())
            )?;
            if line.status == LineStatus::Ok {
                queue!(self.out, Print("\r\n"))?;
                self.finalized += 1;
                index += 1;
            } else {
                live_row = true;
                break;
            }
        }

        if frame.cursor_visible {
            if live_row {
                queue!(self.out, Print(" "))?;
            }
            queue!(self.out, Print("\u{2588}"))?;
        }
        self.out.flush()
    }

    /// Restore the hardware cursor and close out the log.
    pub fn finish(&mut self) -> io::Result<()> {
        execute!(self.out, cursor::MoveToColumn(0), cursor::Show)?;
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()
    }
}
