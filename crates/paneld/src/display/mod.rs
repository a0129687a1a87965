//! Boundary towards the physical display driver.
//!
//! The daemon never touches panel hardware directly; screens produce a
//! finished [`Frame`] and hand it to a [`Display`] implementation. The real
//! e-paper driver lives outside this crate, [`ConsoleDisplay`] stands in for
//! it during development and on machines without a panel.

use std::io::Write;

/// A finished visual buffer: a title bar plus content lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub title: String,
    pub lines: Vec<String>,
}

impl Frame {
    pub fn new(title: impl Into<String>) -> Self {
        Frame {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Drop all content, keeping the title.
    pub fn blank(&mut self) {
        self.lines.clear();
    }
}

pub trait Display {
    /// Push a finished frame to the device.
    fn show(&self, frame: &Frame);
    /// Blank the device.
    fn clear(&self);
}

/// Writes frames to stdout. Stand-in for the panel driver.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn show(&self, frame: &Frame) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "== {} ==", frame.title);
        for line in &frame.lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out);
    }

    fn clear(&self) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "== (cleared) ==");
    }
}
