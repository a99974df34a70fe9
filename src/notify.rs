//! User-facing notifications
//!
//! Search outcomes surface to the user through this seam so the
//! controller stays independent of the shell it runs under.

/// Sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that prints to stdout, used by the interactive session.
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn info(&self, message: &str) {
        println!("[info] {}", message);
    }

    fn error(&self, message: &str) {
        println!("[error] {}", message);
    }
}

#[cfg(test)]
pub struct RecordingNotifier {
    infos: std::sync::Mutex<Vec<String>>,
    errors: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            infos: std::sync::Mutex::new(Vec::new()),
            errors: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
