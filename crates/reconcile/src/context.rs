//! Message sinks
//!
//! Reconciliation never prints. Every decision is reported through a
//! [`MessageSink`], so callers pick where messages go: the `log` facade,
//! an in-memory record, nowhere, or several of those at once.

use crate::types::LogLevel;

/// Receiver for reconciliation messages
pub trait MessageSink {
    /// Record one message. Must not abort the caller.
    fn emit(&mut self, level: LogLevel, message: &str);
}

/// Forwards messages to the `log` facade under the `deferred` target
pub struct LogSink;

impl MessageSink for LogSink {
    fn emit(&mut self, level: LogLevel, message: &str) {
        log::log!(target: "deferred", level.as_log_level(), "{message}");
    }
}

/// Discards every message
pub struct NoMessages;

impl MessageSink for NoMessages {
    fn emit(&mut self, _level: LogLevel, _message: &str) {}
}

/// A recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: LogLevel,
    pub text: String,
}

/// Records messages in emission order
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages at or above `level`
    pub fn at_least(&self, level: LogLevel) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.level >= level)
    }

    /// Texts of every message, for assertions and reports
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for MessageLog {
    fn emit(&mut self, level: LogLevel, message: &str) {
        self.messages.push(Message {
            level,
            text: message.to_string(),
        });
    }
}

impl<A: MessageSink, B: MessageSink> MessageSink for (A, B) {
    fn emit(&mut self, level: LogLevel, message: &str) {
        self.0.emit(level, message);
        self.1.emit(level, message);
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn emit(&mut self, level: LogLevel, message: &str) {
        (**self).emit(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_log_keeps_order() {
        let mut log = MessageLog::new();
        log.emit(LogLevel::Debug, "first");
        log.emit(LogLevel::Warning, "second");
        assert_eq!(log.texts(), vec!["first", "second"]);
        assert_eq!(log.at_least(LogLevel::Notice).count(), 1);
    }

    #[test]
    fn test_pair_fans_out() {
        let mut a = MessageLog::new();
        let mut b = MessageLog::new();
        {
            let mut both = (&mut a, &mut b);
            both.emit(LogLevel::Info, "hello");
        }
        assert_eq!(a.texts(), vec!["hello"]);
        assert_eq!(b.texts(), vec!["hello"]);
    }
}
