use alloc::string::String;
use core::fmt::{self, Write};

use log::Level;

/// Lines emitted during one wake cycle.
///
/// Every line goes to the `log` facade and is appended to the buffer, so the
/// same text reaches the serial console and the log collector.
#[derive(Default, Debug)]
pub struct LogBuffer {
    text: String,
    lines: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: Level, args: fmt::Arguments<'_>) {
        log::log!(level, "{}", args);
        // Writing into a String cannot fail
        let _ = self.text.write_fmt(args);
        self.text.push('\n');
        self.lines += 1;
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.record(Level::Info, args);
    }

    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.record(Level::Warn, args);
    }

    pub fn error(&mut self, args: fmt::Arguments<'_>) {
        self.record(Level::Error, args);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Size of the buffer in bytes, as sent on the wire.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Hand the accumulated text over and start again empty.
    pub fn take(&mut self) -> String {
        self.lines = 0;
        core::mem::take(&mut self.text)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_newline_terminated() {
        let mut log = LogBuffer::new();
        log.info(format_args!("Connecting to WiFi..."));
        log.warn(format_args!("Could not find {}!", "BMP280"));

        assert_eq!(log.as_str(), "Connecting to WiFi...\nCould not find BMP280!\n");
        assert_eq!(log.line_count(), 2);
    }

    #[test]
    fn test_each_line_appended_once_in_order() {
        let mut log = LogBuffer::new();
        for i in 0..5 {
            log.info(format_args!("line {}", i));
        }
        let lines: alloc::vec::Vec<&str> = log.lines().collect();
        assert_eq!(lines, ["line 0", "line 1", "line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_len_counts_bytes() {
        let mut log = LogBuffer::new();
        log.info(format_args!("Temperature: 21.00 °C"));
        // '°' is two bytes in UTF-8
        assert_eq!(log.len(), "Temperature: 21.00 °C\n".len());
        assert_eq!(log.len(), 23);
    }

    #[test]
    fn test_console_mirrors_buffer() {
        let mut log = LogBuffer::new();
        let console = testing::capture(|| {
            log.info(format_args!("WiFi connected!"));
            log.error(format_args!("Could not find {}!", "AHT20"));
        });

        assert_eq!(console, ["WiFi connected!", "Could not find AHT20!"]);
        assert_eq!(log.lines().collect::<alloc::vec::Vec<_>>(), console);
    }

    #[test]
    fn test_take_clears() {
        let mut log = LogBuffer::new();
        log.error(format_args!("boom"));
        let text = log.take();
        assert_eq!(text, "boom\n");
        assert!(log.is_empty());
        assert_eq!(log.line_count(), 0);
    }
}
