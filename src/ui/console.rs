use std::io::{self, Stdout, stdout};

use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions, Viewport};

use super::{Renderer, status_line};
use crate::system::snapshot::{DiskSnapshot, PerformanceSnapshot};

/// Single-line colored status display, redrawn in place every tick.
pub struct ConsoleRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ConsoleRenderer {
    pub fn new() -> io::Result<Self> {
        // Not every terminal supports titles.
        let _ = execute!(stdout(), SetTitle("perflogger"));
        let terminal = Terminal::with_options(
            CrosstermBackend::new(stdout()),
            TerminalOptions {
                viewport: Viewport::Inline(1),
            },
        )?;
        Ok(ConsoleRenderer { terminal })
    }
}

impl Renderer for ConsoleRenderer {
    fn show(&mut self, performance: &PerformanceSnapshot, disks: &DiskSnapshot) {
        let _ = self.terminal.draw(|frame| {
            let area = frame.area();
            status_line::render(frame, area, performance, disks);
        });
    }
}
