//! Terminal rendering of auth notifications.

use crate::output::OutputFormat;
use learnflow_auth::{Notification, NotificationVariant, Notifier};

/// Prints notifications as they arrive; destructive ones go to stderr.
pub struct TerminalNotifier {
    format: OutputFormat,
}

impl TerminalNotifier {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

pub fn render(notification: &Notification, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let marker = match notification.variant {
                NotificationVariant::Default => "*",
                NotificationVariant::Success => "✓",
                NotificationVariant::Destructive => "✗",
            };
            format!(
                "{} {}\n  {}",
                marker, notification.title, notification.description
            )
        }
        OutputFormat::Json => serde_json::json!({
            "event": "notification",
            "notification": notification,
        })
        .to_string(),
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(title = %notification.title, variant = ?notification.variant, "Notification shown");
        let rendered = render(&notification, &self.format);
        match notification.variant {
            NotificationVariant::Destructive => eprintln!("{}", rendered),
            _ => println!("{}", rendered),
        }
    }
}
