use bevy::prelude::*;

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    /// Elapsed-time second at which the message disappears; `None` stays until replaced
    pub expires_at: Option<f64>,
}

/// The single line of user-visible feedback shown in the status bar
#[derive(Resource, Debug, Default)]
pub struct StatusLine {
    message: Option<StatusMessage>,
}

impl StatusLine {
    pub fn set(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            level,
            expires_at: None,
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(StatusLevel::Info, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.set(StatusLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(StatusLevel::Error, text);
    }

    /// Show a transient notice for `duration` seconds
    pub fn notify(&mut self, text: impl Into<String>, now: f64, duration: f64) {
        self.message = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Warning,
            expires_at: Some(now + duration),
        });
    }

    /// Current message, ignoring expired notices
    pub fn current(&self, now: f64) -> Option<&StatusMessage> {
        self.message
            .as_ref()
            .filter(|message| message.expires_at.is_none_or(|at| now < at))
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}
