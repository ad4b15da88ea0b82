use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use super::logger::Logger;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Receives step text while a long operation runs.
pub trait Progress {
    fn step(&self, text: &str);
}

/// Animated progress line on stderr. Falls back to plain lines when stderr is
/// not a terminal.
pub struct Spinner {
    text: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(text: &str) -> Self {
        let text = Arc::new(Mutex::new(text.to_string()));
        let running = Arc::new(AtomicBool::new(true));

        let handle = if io::stderr().is_terminal() {
            let text = Arc::clone(&text);
            let running = Arc::clone(&running);
            Some(thread::spawn(move || animate(&text, &running)))
        } else {
            eprintln!(" {}", text.lock().map(|t| t.clone()).unwrap_or_default());
            None
        };

        Self {
            text,
            running,
            handle,
        }
    }

    pub fn success(mut self, message: &str) {
        self.stop();
        Logger::stdout().success(message);
    }

    pub fn fail(mut self, message: &str) {
        self.stop();
        Logger::stderr().error(message);
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Progress for Spinner {
    fn step(&self, text: &str) {
        tracing::info!("{text}");
        if self.handle.is_none() {
            eprintln!(" {text}");
        }
        if let Ok(mut current) = self.text.lock() {
            *current = text.to_string();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn animate(text: &Mutex<String>, running: &AtomicBool) {
    let mut stderr = io::stderr();
    let _ = execute!(stderr, Hide);

    for frame in FRAMES.iter().cycle() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = text.lock().map(|t| format!(" {frame} {t}")).unwrap_or_default();
        let _ = execute!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line));
        thread::sleep(FRAME_INTERVAL);
    }

    let _ = execute!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine), Show);
    let _ = stderr.flush();
}
