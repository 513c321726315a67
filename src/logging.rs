//! Browser console logging for `tracing`.
//!
//! [`init`] installs a global fmt subscriber whose writer forwards each
//! formatted event to the matching `console.*` method. Native builds write to
//! stderr instead, so the crate can be exercised outside the browser.

use std::io;
use std::sync::Once;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

static INIT: Once = Once::new();

/// Install the console subscriber. Later calls are ignored, as is an
/// already installed global subscriber.
pub fn init(max_level: Level) {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(MakeConsoleWriter)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(max_level)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}

/// Produces one [`ConsoleWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    /// The buffered line without its trailing newline.
    fn take_line(&mut self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buf).trim_end().to_string();
        self.buf.clear();
        (!text.is_empty()).then_some(text)
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(line) = self.take_line() {
            emit(self.level, &line);
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = self.take_line() {
            emit(self.level, &line);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        Level::DEBUG => console::log_1(&value),
        _ => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_writer_buffers_until_taken() {
        let mut writer = ConsoleWriter::new(Level::WARN);
        write!(writer, " WARN no lineage to show").unwrap();
        writer.write_all(b" error=\"entity 'Z' not found\"\n").unwrap();
        assert_eq!(
            writer.take_line().as_deref(),
            Some(" WARN no lineage to show error=\"entity 'Z' not found\"")
        );
        assert_eq!(writer.take_line(), None);
    }

    #[test]
    fn test_default_writer_level() {
        let writer = MakeConsoleWriter.make_writer();
        assert_eq!(writer.level, Level::INFO);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(Level::DEBUG);
        init(Level::INFO);
        tracing::info!("logging initialised twice");
    }
}
