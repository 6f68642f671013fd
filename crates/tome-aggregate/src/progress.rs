//! Fetch progress display.
//!
//! Each remote clone or fetch gets its own line, redrawn in place as byte
//! counts arrive from the git transport. The display is active only when
//! stderr is a terminal and the runtime isn't quiet; it is cleared whenever
//! the aggregation ends, so a failed build leaves the terminal clean.

use std::sync::{Arc, Mutex};

use console::Term;
use tome_playbook::RuntimeSettings;

/// Receiver of transfer progress events.
///
/// Events may arrive concurrently from several repository tasks.
pub trait ProgressListener: Send + Sync {
    /// A clone or fetch started for `url`.
    fn on_fetch_start(&self, url: &str) {
        let _ = url;
    }

    /// Transfer progress for `url`.
    fn on_fetch_progress(&self, url: &str, received_objects: usize, total_objects: usize, received_bytes: usize) {
        let _ = (url, received_objects, total_objects, received_bytes);
    }

    /// The clone or fetch for `url` finished.
    fn on_fetch_done(&self, url: &str) {
        let _ = url;
    }
}

/// Listener that discards all events.
pub struct NullProgress;

impl ProgressListener for NullProgress {}

#[derive(Debug)]
struct FetchLine {
    url: String,
    received_objects: usize,
    total_objects: usize,
    received_bytes: usize,
    done: bool,
}

#[derive(Debug, Default)]
struct DisplayState {
    lines: Vec<FetchLine>,
    drawn: usize,
}

/// Terminal progress display writing one line per repository to stderr.
pub struct TermProgress {
    term: Term,
    state: Mutex<DisplayState>,
}

impl TermProgress {
    /// Create a terminal progress display.
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            state: Mutex::new(DisplayState::default()),
        }
    }

    /// Pick a listener for the given runtime settings.
    ///
    /// Returns the null listener when progress is suppressed or stderr is
    /// not attached to a terminal.
    #[must_use]
    pub fn for_runtime(runtime: &RuntimeSettings) -> Arc<dyn ProgressListener> {
        if runtime.suppress_progress() || !Term::stderr().is_term() {
            Arc::new(NullProgress)
        } else {
            Arc::new(Self::new())
        }
    }

    /// Clear all progress lines from the terminal.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        let _ = self.term.clear_last_lines(state.drawn);
        state.drawn = 0;
    }

    fn redraw(&self, state: &mut DisplayState) {
        let _ = self.term.clear_last_lines(state.drawn);
        for line in &state.lines {
            let _ = self.term.write_line(&render_line(line));
        }
        state.drawn = state.lines.len();
    }
}

impl Default for TermProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressListener for TermProgress {
    fn on_fetch_start(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.lines.push(FetchLine {
            url: url.to_owned(),
            received_objects: 0,
            total_objects: 0,
            received_bytes: 0,
            done: false,
        });
        self.redraw(&mut state);
    }

    fn on_fetch_progress(&self, url: &str, received_objects: usize, total_objects: usize, received_bytes: usize) {
        let mut state = self.state.lock().unwrap();
        if let Some(line) = state.lines.iter_mut().find(|l| l.url == url) {
            line.received_objects = received_objects;
            line.total_objects = total_objects;
            line.received_bytes = received_bytes;
        }
        self.redraw(&mut state);
    }

    fn on_fetch_done(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(line) = state.lines.iter_mut().find(|l| l.url == url) {
            line.done = true;
        }
        self.redraw(&mut state);
    }
}

impl Drop for TermProgress {
    fn drop(&mut self) {
        self.clear();
    }
}

fn render_line(line: &FetchLine) -> String {
    if line.done {
        return format!("[fetch] {} done", line.url);
    }
    let percent = if line.total_objects == 0 {
        0
    } else {
        line.received_objects * 100 / line.total_objects
    };
    format!(
        "[fetch] {} {percent:>3}% ({})",
        line.url,
        human_bytes(line.received_bytes)
    )
}

/// Format a byte count for display.
fn human_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= MIB {
        format!("{:.1} MiB", bytes_f / MIB)
    } else if bytes_f >= KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_render_line_percent() {
        let line = FetchLine {
            url: "https://git.example.org/docs.git".to_owned(),
            received_objects: 50,
            total_objects: 200,
            received_bytes: 4096,
            done: false,
        };
        let rendered = render_line(&line);
        assert!(rendered.contains("25%"));
        assert!(rendered.contains("4.0 KiB"));
    }

    #[test]
    fn test_render_line_done() {
        let line = FetchLine {
            url: "u".to_owned(),
            received_objects: 1,
            total_objects: 1,
            received_bytes: 1,
            done: true,
        };
        assert!(render_line(&line).ends_with("done"));
    }
}
