use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// Follow-up request sent back to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// Fetch a page of the current LogBlock result set
    Page(u32),

    /// Describe a WorldGuard region
    RegionInfo(String),
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "/lb page {page}"),
            Self::RegionInfo(region) => write!(f, "/region info {region}"),
        }
    }
}

/// Receiver of outbound commands. Sending is fire-and-forget: nothing in
/// this crate waits for or correlates a response.
pub trait CommandSink: Send + Sync {
    fn send(&self, command: ServerCommand);
}

/// FIFO of outbound commands for the host to drain at its own pace.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Mutex<VecDeque<ServerCommand>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_pending<T>(&self, f: impl FnOnce(&mut VecDeque<ServerCommand>) -> T) -> T {
        let mut guard = self.pending.lock().unwrap_or_else(|poisoned| {
            log::warn!("command queue lock poisoned");
            poisoned.into_inner()
        });
        f(&mut guard)
    }

    pub fn pop(&self) -> Option<ServerCommand> {
        self.with_pending(VecDeque::pop_front)
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&self) -> Vec<ServerCommand> {
        self.with_pending(|pending| pending.drain(..).collect())
    }

    pub fn len(&self) -> usize {
        self.with_pending(|pending| pending.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CommandSink for CommandQueue {
    fn send(&self, command: ServerCommand) {
        log::debug!("queued {command}");
        self.with_pending(|pending| pending.push_back(command));
    }
}
