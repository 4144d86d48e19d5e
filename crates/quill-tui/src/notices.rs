//! Transient status notices shown in the footer.

use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    created: Instant,
}

#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    fn push(&mut self, kind: NoticeKind, message: String) {
        self.items.push(Notice {
            kind,
            message,
            created: Instant::now(),
        });
    }

    /// Drops notices past their display window. Called on Tick.
    pub fn expire(&mut self) {
        self.items.retain(|n| n.created.elapsed() < NOTICE_TTL);
    }

    /// The newest notice, which is the one rendered.
    pub fn current(&self) -> Option<&Notice> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_notice_wins() {
        let mut notices = Notices::default();
        notices.info("first");
        notices.error("second");
        let current = notices.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, NoticeKind::Error);
    }
}
