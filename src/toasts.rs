use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{error, info};

/// Oldest notifications are dropped past this many undrained entries.
const MAX_PENDING: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

/// Transient user-facing notifications, drained by the page.
#[derive(Debug, Default)]
pub struct Toasts {
    queue: Mutex<VecDeque<Toast>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, title: &str, description: &str) {
        info!(title, description, "notification");
        self.push(Toast {
            title: title.to_string(),
            description: description.to_string(),
            variant: ToastVariant::Default,
        });
    }

    /// Destructive notification; the underlying error is logged alongside.
    pub fn error(&self, title: &str, description: &str, cause: &dyn std::fmt::Display) {
        error!(title, description, %cause, "error notification");
        self.push(Toast {
            title: title.to_string(),
            description: description.to_string(),
            variant: ToastVariant::Destructive,
        });
    }

    fn push(&self, toast: Toast) {
        let mut queue = self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if queue.len() == MAX_PENDING {
            queue.pop_front();
        }
        queue.push_back(toast);
    }

    pub fn drain(&self) -> Vec<Toast> {
        let mut queue = self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue_in_order() {
        let toasts = Toasts::new();
        toasts.info("Salvando...", "Seu humor está sendo registrado.");
        toasts.error("Erro", "Falha", &"boom");
        let drained = toasts.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "Salvando...");
        assert_eq!(drained[1].variant, ToastVariant::Destructive);
        assert!(toasts.drain().is_empty());
    }

    #[test]
    fn keeps_only_most_recent_entries() {
        let toasts = Toasts::new();
        for i in 0..(MAX_PENDING + 3) {
            toasts.info(&format!("t{i}"), "");
        }
        let drained = toasts.drain();
        assert_eq!(drained.len(), MAX_PENDING);
        assert_eq!(drained[0].title, "t3");
    }
}
