use std::io::{self, Stderr, Stdout, Write};

use crossterm::style::Stylize;

/// Writes `SUCCESS` / `ERROR` labelled lines.
pub struct Logger<W: Write> {
    writer: W,
}

impl Logger<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Logger<Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Logger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn success(&mut self, message: &str) {
        let head = " SUCCESS ".white().on_green().bold();
        let text = format!(" {message}").green();
        let _ = writeln!(self.writer, "{head}{text}");
        let _ = self.writer.flush();
    }

    pub fn error(&mut self, message: &str) {
        let head = "  ERROR  ".white().on_red().bold();
        let text = format!(" {message}").red();
        let _ = writeln!(self.writer, "{head}{text}");
        let _ = self.writer.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
