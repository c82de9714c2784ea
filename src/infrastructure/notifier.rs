use crate::domain::ports::{Notifier, NotifyError};

/// Writes notifications to the application log. Stands in for an SMS or
/// email gateway.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError {
                recipient: recipient.to_string(),
                reason: "empty recipient".to_string(),
            });
        }
        log::info!("notify {}: {}", recipient, message);
        Ok(())
    }
}
