use crate::edit::{BlockEdit, EditSetKey};
use crate::record::format_record;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Time-ordered set of the edits attributed to one player, oldest first.
///
/// Every read and write takes the set's lock, so the set can be filled from
/// the chat thread while a renderer walks it from another.
#[derive(Debug)]
pub struct PlayerEditSet {
    key: EditSetKey,
    player: String,
    edits: Mutex<BTreeSet<BlockEdit>>,
    visible: AtomicBool,
}

impl PlayerEditSet {
    pub fn new(player: impl Into<String>) -> Self {
        let player = player.into();
        Self {
            key: EditSetKey::for_player(&player),
            player,
            edits: Mutex::new(BTreeSet::new()),
            visible: AtomicBool::new(true),
        }
    }

    /// Name of the player who made these edits, as first seen.
    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn key(&self) -> &EditSetKey {
        &self.key
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<BlockEdit>> {
        self.edits.lock().unwrap_or_else(|poisoned| {
            log::warn!("edit set lock poisoned for {}", self.player);
            poisoned.into_inner()
        })
    }

    /// Insert an edit and tag it with this set's key. Returns false if an
    /// identical edit was already present.
    pub fn insert(&self, mut edit: BlockEdit) -> bool {
        edit.attach(self.key.clone());
        self.lock().insert(edit)
    }

    /// Oldest edit at the given position.
    ///
    /// Linear in the number of edits; per-player volumes stay small enough
    /// that a spatial index has not been needed.
    pub fn find_edit(&self, x: i32, y: i32, z: i32) -> Option<BlockEdit> {
        self.lock()
            .iter()
            .find(|edit| edit.position() == (x, y, z))
            .cloned()
    }

    /// The edit immediately before `edit` in time order.
    pub fn edit_before(&self, edit: &BlockEdit) -> Option<BlockEdit> {
        self.lock()
            .range::<BlockEdit, _>((Unbounded, Excluded(edit)))
            .next_back()
            .cloned()
    }

    /// The edit immediately after `edit` in time order.
    pub fn edit_after(&self, edit: &BlockEdit) -> Option<BlockEdit> {
        self.lock()
            .range::<BlockEdit, _>((Excluded(edit), Unbounded))
            .next()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Copy of all edits, oldest first.
    pub fn snapshot(&self) -> Vec<BlockEdit> {
        self.lock().iter().cloned().collect()
    }

    /// Write every edit in saved record format, oldest first. Returns the
    /// number of lines written.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let edits = self.lock();
        let mut count = 0;
        for edit in edits.iter() {
            let line = format_record(edit)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
            writeln!(writer, "{line}")?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_type::BlockType;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn ore() -> Arc<BlockType> {
        Arc::new(BlockType::new(56, 0, "diamond ore"))
    }

    fn edit(time: i64, x: i32) -> BlockEdit {
        BlockEdit::new(time, "Miner", false, x, 12, 0, ore())
    }

    #[test]
    fn iterates_oldest_first() {
        let set = PlayerEditSet::new("Miner");
        for (time, x) in [(30, 1), (10, 2), (20, 3), (10, 4)] {
            assert!(set.insert(edit(time, x)));
        }
        let times: Vec<i64> = set.snapshot().iter().map(BlockEdit::time).collect();
        assert_eq!(times, vec![10, 10, 20, 30]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let set = PlayerEditSet::new("Miner");
        assert!(set.insert(edit(10, 1)));
        assert!(!set.insert(edit(10, 1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_attaches_key() {
        let set = PlayerEditSet::new("Miner");
        set.insert(edit(10, 1));
        let stored = set.snapshot().remove(0);
        assert_eq!(stored.edit_set(), Some(&EditSetKey::for_player("miner")));
    }

    #[test]
    fn find_edit_returns_oldest_match() {
        let set = PlayerEditSet::new("Miner");
        set.insert(BlockEdit::new(50, "Miner", true, 5, 5, 5, ore()));
        set.insert(BlockEdit::new(20, "Miner", false, 5, 5, 5, ore()));
        set.insert(edit(10, 1));
        let found = set.find_edit(5, 5, 5).unwrap();
        assert_eq!(found.time(), 20);
        assert!(set.find_edit(6, 6, 6).is_none());
    }

    #[test]
    fn neighbours_follow_time_order() {
        let set = PlayerEditSet::new("Miner");
        for (time, x) in [(10, 1), (20, 2), (30, 3)] {
            set.insert(edit(time, x));
        }
        let middle = edit(20, 2);
        assert_eq!(set.edit_before(&middle).map(|e| e.time()), Some(10));
        assert_eq!(set.edit_after(&middle).map(|e| e.time()), Some(30));
        assert!(set.edit_before(&edit(10, 1)).is_none());
        assert!(set.edit_after(&edit(30, 3)).is_none());
    }

    #[test]
    fn visibility_toggles() {
        let set = PlayerEditSet::new("Miner");
        assert!(set.is_visible());
        set.set_visible(false);
        assert!(!set.is_visible());
    }

    #[test]
    fn concurrent_insert_and_read() {
        let set = Arc::new(PlayerEditSet::new("Miner"));
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let set = set.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        set.insert(edit(i64::from(i), t * 1000 + i));
                    }
                })
            })
            .collect();
        let reader = {
            let set = set.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = set.snapshot();
                    assert!(snapshot.windows(2).all(|w| w[0].time() <= w[1].time()));
                }
            })
        };
        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(set.len(), 1000);
    }
}
