//! # lbtrace Chat
//!
//! Turns LogBlock and WorldGuard chat output into stored edits and
//! follow-up server commands.
//!
//! ## Architecture
//!
//! ```text
//! chat line
//!     │
//!     ▼
//! ChatDispatcher ──> PatternTable (first match wins)
//!     │
//!     ├──> query results ──> EditDb + colour cycle ──> Echo
//!     │        └──> PageController ──> "/lb page N"
//!     │
//!     ├──> page line / headers ──> PageController
//!     │
//!     └──> region list ──> RegionInfoIssuer ──> "/region info R"
//!                                   │
//!                                   ▼
//!                              CommandSink
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lbtrace_chat::{ChatConfig, ChatDispatcher, CommandQueue, ServerCommand};
//! use lbtrace_edit_store::{BlockTypeRegistry, EditDb};
//!
//! let queue = Arc::new(CommandQueue::new());
//! let mut chat = ChatDispatcher::new(
//!     ChatConfig::default(),
//!     BlockTypeRegistry::builtin(),
//!     Arc::new(EditDb::new()),
//!     queue.clone(),
//! )
//! .unwrap();
//!
//! chat.dispatch("Page 1/2");
//! chat.dispatch("(1) 21-05-14 20:13:02 Miner destroyed diamond ore at 120:11:-340");
//!
//! assert_eq!(chat.edits().len(), 1);
//! assert_eq!(queue.drain(), vec![ServerCommand::Page(2)]);
//! ```

mod clock;
mod colour;
mod command;
mod config;
mod dispatch;
mod echo;
mod error;
mod pagination;
mod patterns;
pub mod query_results;
mod region_info;

pub use clock::{Clock, ManualClock, SystemClock};
pub use colour::{Colour, ColourCycle, COLOUR_CYCLE, COLOUR_PROXIMITY_LIMIT};
pub use command::{CommandQueue, CommandSink, ServerCommand};
pub use config::ChatConfig;
pub use dispatch::{ChatDispatcher, ChatOutcome, DispatchStats};
pub use echo::{Echo, LocalChat};
pub use error::{ChatError, Result};
pub use pagination::PageController;
pub use patterns::{strip_formatting, HeaderKind, LineKind, PatternTable};
pub use region_info::{region_names, RegionInfoIssuer};
