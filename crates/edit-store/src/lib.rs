//! # lbtrace Edit Store
//!
//! Time-ordered record of who changed which block, where and when, as
//! reported by LogBlock query results.
//!
//! ## Architecture
//!
//! ```text
//! EditDb
//!     │
//!     ├──> PlayerEditSet (one per player, own lock)
//!     │      ├─ BTreeSet<BlockEdit>, oldest first
//!     │      ├─ find_edit / edit_before / edit_after
//!     │      └─ visibility flag
//!     │
//!     ├──> BlockTypeRegistry (name/id → BlockType, with sentinels)
//!     │
//!     └──> save / load (one record line per edit)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lbtrace_edit_store::{timestamp, BlockEdit, BlockTypeRegistry, EditDb};
//!
//! let registry = BlockTypeRegistry::builtin();
//! let db = EditDb::new();
//!
//! let time = timestamp::to_millis(2020, 1, 2, 3, 4, 5).unwrap();
//! let ore = registry.block_type_by_name("diamond ore");
//! db.insert(BlockEdit::new(time, "alice", false, 1, 2, 3, ore));
//!
//! let mut out = Vec::new();
//! db.save(&mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "2020-01-02|03:04:05|alice|d|56|0|1|2|3\n");
//! ```

mod block_type;
mod edit;
mod edit_db;
mod edit_set;
mod error;
mod record;
pub mod timestamp;

pub use block_type::{BlockType, BlockTypeRegistry, PLAYER_KILL_ID, UNKNOWN_BLOCK_ID};
pub use edit::{BlockEdit, EditSetKey};
pub use edit_db::EditDb;
pub use edit_set::PlayerEditSet;
pub use error::{EditStoreError, Result};
pub use record::{format_record, parse_record};
