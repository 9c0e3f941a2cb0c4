//! Routing interpreter `stdout`/`stderr` into the host log

use pyhost_logger as logger;
use pyo3::prelude::*;
use pyo3::types::{PyModule, PyString};

/// Longest line forwarded in one log record; longer lines are split.
pub const MAX_LINE_LEN: usize = 4060;

const STREAMS: [&str; 2] = ["stdout", "stderr"];

/// File-like object installed as `sys.stdout` / `sys.stderr`.
#[pyclass(frozen, module = "pyhost", name = "LogStream")]
pub(crate) struct LogStream {
    stream: &'static str,
}

#[pymethods]
impl LogStream {
    /// Forwarded immediately, unbuffered. `print()` writes its trailing newline
    /// in a separate call, which shows up as a blank record.
    ///
    /// Lone surrogates are logged as U+FFFD rather than failing the write.
    fn write(&self, text: &Bound<'_, PyString>) -> PyResult<usize> {
        for line in split_for_log(&text.to_string_lossy()) {
            logger::python_line(self.stream, &line);
        }
        text.len()
    }

    fn flush(&self) {}

    fn writable(&self) -> bool {
        true
    }

    fn isatty(&self) -> bool {
        false
    }

    #[getter]
    fn encoding(&self) -> &'static str {
        "utf-8"
    }
}

/// Replace `sys.stdout` and `sys.stderr` with [`LogStream`]s.
pub(crate) fn install(py: Python<'_>) -> PyResult<()> {
    let sys = PyModule::import(py, "sys")?;
    for stream in STREAMS {
        sys.setattr(stream, Bound::new(py, LogStream { stream })?)?;
    }
    logger::debug("Redirected Python stdout/stderr to the host log");
    Ok(())
}

/// Split written text into log records.
///
/// Lines break where Python's `str.splitlines` breaks them. Empty lines become
/// a single space so they are not dropped by log viewers.
pub(crate) fn split_for_log(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    for line in split_lines(text) {
        let line = if line.is_empty() { " " } else { line };
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(MAX_LINE_LEN) {
            records.push(chunk.iter().collect());
        }
    }
    records
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lines of `text` without their terminators. `\r\n` is one boundary and a
/// trailing boundary does not start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
