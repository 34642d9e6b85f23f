use crate::block_type::BlockType;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Key of the [`PlayerEditSet`](crate::PlayerEditSet) that owns an edit: the
/// lowercased player name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditSetKey(String);

impl EditSetKey {
    pub fn for_player(player: &str) -> Self {
        Self(player.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observed block creation or destruction.
///
/// Edits are ordered by time first. Ties are broken by position, action,
/// block type and finally player, so two edits compare equal only when every
/// attribute matches. The owning-set key is not part of the ordering.
#[derive(Debug, Clone)]
pub struct BlockEdit {
    time: i64,
    player: String,
    created: bool,
    x: i32,
    y: i32,
    z: i32,
    block_type: Arc<BlockType>,
    edit_set: Option<EditSetKey>,
}

impl BlockEdit {
    pub fn new(
        time: i64,
        player: impl Into<String>,
        created: bool,
        x: i32,
        y: i32,
        z: i32,
        block_type: Arc<BlockType>,
    ) -> Self {
        Self {
            time,
            player: player.into(),
            created,
            x,
            y,
            z,
            block_type,
            edit_set: None,
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// True for a creation, false for a destruction (kills and replacements
    /// are recorded as destructions).
    pub fn is_creation(&self) -> bool {
        self.created
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn position(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    pub fn block_type(&self) -> &Arc<BlockType> {
        &self.block_type
    }

    /// Key of the edit set this edit was inserted into, if any.
    pub fn edit_set(&self) -> Option<&EditSetKey> {
        self.edit_set.as_ref()
    }

    pub(crate) fn attach(&mut self, key: EditSetKey) {
        self.edit_set = Some(key);
    }

    fn sort_key(&self) -> (i64, i32, i32, i32, bool, u16, u8, &str) {
        (
            self.time,
            self.x,
            self.y,
            self.z,
            self.created,
            self.block_type.id,
            self.block_type.data,
            &self.player,
        )
    }
}

impl PartialEq for BlockEdit {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for BlockEdit {}

impl PartialOrd for BlockEdit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockEdit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> Arc<BlockType> {
        Arc::new(BlockType::new(1, 0, "stone"))
    }

    #[test]
    fn orders_by_time_first() {
        let early = BlockEdit::new(10, "bob", true, 100, 0, 0, stone());
        let late = BlockEdit::new(20, "alice", false, -100, 0, 0, stone());
        assert!(early < late);
    }

    #[test]
    fn same_time_different_edits_are_distinct() {
        let a = BlockEdit::new(10, "bob", false, 1, 2, 3, stone());
        let b = BlockEdit::new(10, "bob", false, 1, 2, 4, stone());
        let c = BlockEdit::new(10, "carol", false, 1, 2, 3, stone());
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn identical_edits_compare_equal_regardless_of_owner() {
        let a = BlockEdit::new(10, "bob", true, 1, 2, 3, stone());
        let mut b = a.clone();
        b.attach(EditSetKey::for_player("bob"));
        assert_eq!(a, b);
    }

    #[test]
    fn key_is_case_insensitive() {
        assert_eq!(EditSetKey::for_player("Bob"), EditSetKey::for_player("bOB"));
        assert_eq!(EditSetKey::for_player("Bob").as_str(), "bob");
    }
}
