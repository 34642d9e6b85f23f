use crate::block_type::BlockTypeRegistry;
use crate::edit::{BlockEdit, EditSetKey};
use crate::edit_set::PlayerEditSet;
use crate::record::parse_record;
use crate::Result;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// All edit sets, keyed by lowercased player name.
///
/// Operations spanning several players take a snapshot of the set handles
/// first and lock one [`PlayerEditSet`] at a time.
#[derive(Debug, Default)]
pub struct EditDb {
    sets: RwLock<HashMap<EditSetKey, Arc<PlayerEditSet>>>,
}

impl EditDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<EditSetKey, Arc<PlayerEditSet>>> {
        self.sets.read().unwrap_or_else(|poisoned| {
            log::warn!("edit db lock poisoned");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EditSetKey, Arc<PlayerEditSet>>> {
        self.sets.write().unwrap_or_else(|poisoned| {
            log::warn!("edit db lock poisoned");
            poisoned.into_inner()
        })
    }

    /// Edit set for `player`, created on first use.
    pub fn get_or_create(&self, player: &str) -> Arc<PlayerEditSet> {
        let key = EditSetKey::for_player(player);
        if let Some(set) = self.read().get(&key) {
            return set.clone();
        }
        self.write()
            .entry(key)
            .or_insert_with(|| {
                log::debug!("new edit set for {player}");
                Arc::new(PlayerEditSet::new(player))
            })
            .clone()
    }

    /// Insert into the acting player's set. Returns false for a duplicate.
    pub fn insert(&self, edit: BlockEdit) -> bool {
        self.get_or_create(edit.player()).insert(edit)
    }

    pub fn edit_set(&self, player: &str) -> Option<Arc<PlayerEditSet>> {
        self.read().get(&EditSetKey::for_player(player)).cloned()
    }

    /// Handles to every set, ordered by key.
    pub fn edit_sets(&self) -> Vec<Arc<PlayerEditSet>> {
        let mut sets: Vec<_> = self.read().values().cloned().collect();
        sets.sort_by(|a, b| a.key().cmp(b.key()));
        sets
    }

    /// Whether the set that owns `edit` is visible. Edits never inserted, or
    /// whose set has since been cleared, are not visible.
    pub fn is_visible(&self, edit: &BlockEdit) -> bool {
        edit.edit_set()
            .and_then(|key| self.read().get(key).map(|set| set.is_visible()))
            .unwrap_or(false)
    }

    pub fn player_count(&self) -> usize {
        self.read().len()
    }

    /// Total number of edits across all players.
    pub fn len(&self) -> usize {
        self.edit_sets().iter().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Write every player's edits in saved record format. Returns the number
    /// of lines written.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let mut count = 0;
        for set in self.edit_sets() {
            count += set.save(writer)?;
        }
        Ok(count)
    }

    /// Read records written by [`EditDb::save`]. Blank lines and lines
    /// starting with `#` are skipped. Returns the number of edits added.
    pub fn load<R: BufRead>(&self, reader: R, registry: &BlockTypeRegistry) -> Result<usize> {
        let mut added = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let edit = parse_record(trimmed, idx + 1, registry)?;
            if self.insert(edit) {
                added += 1;
            }
        }
        log::info!("loaded {added} edits");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_type::BlockType;

    fn edit(player: &str, time: i64) -> BlockEdit {
        BlockEdit::new(time, player, true, 0, 64, 0, Arc::new(BlockType::new(1, 0, "stone")))
    }

    #[test]
    fn creates_set_per_player_case_insensitively() {
        let db = EditDb::new();
        db.insert(edit("Alice", 1));
        db.insert(edit("alice", 2));
        db.insert(edit("Bob", 3));
        assert_eq!(db.player_count(), 2);
        assert_eq!(db.len(), 3);
        assert_eq!(db.edit_set("ALICE").unwrap().player(), "Alice");
    }

    #[test]
    fn visibility_follows_owning_set() {
        let db = EditDb::new();
        db.insert(edit("Alice", 1));
        let stored = db.edit_set("alice").unwrap().snapshot().remove(0);
        assert!(db.is_visible(&stored));
        db.edit_set("alice").unwrap().set_visible(false);
        assert!(!db.is_visible(&stored));
        assert!(!db.is_visible(&edit("Alice", 1)));
    }

    #[test]
    fn clear_drops_everything() {
        let db = EditDb::new();
        db.insert(edit("Alice", 1));
        db.clear();
        assert!(db.is_empty());
        assert!(db.edit_set("alice").is_none());
    }

    #[test]
    fn sets_are_listed_in_key_order() {
        let db = EditDb::new();
        for player in ["carol", "Alice", "bob"] {
            db.insert(edit(player, 1));
        }
        let keys: Vec<String> = db
            .edit_sets()
            .iter()
            .map(|set| set.key().to_string())
            .collect();
        assert_eq!(keys, vec!["alice", "bob", "carol"]);
    }
}
