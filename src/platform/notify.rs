use colored::Colorize;

use crate::core::telemetry::NotificationSink;

/// Prints notifications to stderr so they do not mix with JSON on stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log only, print nothing.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl NotificationSink for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        log::info!("notification: {}", message);
        if !self.quiet {
            eprintln!("{} {}", "[sensorboard]".yellow().bold(), message);
        }
    }
}
