use crate::{EditStoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Id of the sentinel type assigned to block names missing from the registry.
pub const UNKNOWN_BLOCK_ID: u16 = 256;

/// Id of the player-shaped marker assigned to kill victims missing from the
/// kill table.
pub const PLAYER_KILL_ID: u16 = 219;

const BUILTIN_BLOCKS: &str = include_str!("blocks.toml");

/// Registered description of a block (or killed entity) type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockType {
    /// Numeric block id, as written to saved edit files
    pub id: u16,

    /// Block data (damage) value
    #[serde(default)]
    pub data: u8,

    /// Canonical name
    pub name: String,

    /// Alternative names LogBlock may print for the same type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl BlockType {
    pub fn new(id: u16, data: u8, name: impl Into<String>) -> Self {
        Self {
            id,
            data,
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// True for the sentinel type that stands in for unregistered names.
    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_BLOCK_ID
    }
}

#[derive(Debug, Default, Deserialize)]
struct BlockTable {
    #[serde(default)]
    block: Vec<BlockType>,
    #[serde(default)]
    kill: Vec<BlockType>,
}

/// Lookup of block and kill types by name and by id.
///
/// Name lookups never fail: unknown block names map to the `256:0 unknown`
/// sentinel and unknown kill victims map to the `219:0 player` marker.
#[derive(Debug)]
pub struct BlockTypeRegistry {
    by_name: HashMap<String, Arc<BlockType>>,
    kills_by_name: HashMap<String, Arc<BlockType>>,
    by_id: HashMap<(u16, u8), Arc<BlockType>>,
    unknown: Arc<BlockType>,
    player: Arc<BlockType>,
}

impl BlockTypeRegistry {
    /// Registry containing only the two sentinel types.
    pub fn empty() -> Self {
        let unknown = Arc::new(BlockType::new(UNKNOWN_BLOCK_ID, 0, "unknown"));
        let player = Arc::new(BlockType::new(PLAYER_KILL_ID, 0, "player"));
        let mut by_id = HashMap::new();
        by_id.insert((unknown.id, unknown.data), unknown.clone());
        by_id.insert((player.id, player.data), player.clone());
        Self {
            by_name: HashMap::new(),
            kills_by_name: HashMap::new(),
            by_id,
            unknown,
            player,
        }
    }

    /// Shared registry built from the table embedded in this crate.
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<BlockTypeRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let registry = Self::from_toml_str(BUILTIN_BLOCKS).unwrap_or_else(|err| {
                    log::error!("built-in block table rejected: {err}");
                    Self::empty()
                });
                Arc::new(registry)
            })
            .clone()
    }

    /// Parse a table of `[[block]]` and `[[kill]]` entries.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: BlockTable =
            toml::from_str(text).map_err(|err| EditStoreError::Registry(err.to_string()))?;

        let mut registry = Self::empty();
        for block in table.block {
            registry.register_block(block);
        }
        for kill in table.kill {
            registry.register_kill(kill);
        }
        Ok(registry)
    }

    /// Built-in table extended (and overridden) by the entries in `text`.
    pub fn builtin_with_overrides(text: &str) -> Result<Self> {
        let overrides: BlockTable =
            toml::from_str(text).map_err(|err| EditStoreError::Registry(err.to_string()))?;
        let mut registry = Self::from_toml_str(BUILTIN_BLOCKS)?;
        for block in overrides.block {
            registry.register_block(block);
        }
        for kill in overrides.kill {
            registry.register_kill(kill);
        }
        Ok(registry)
    }

    pub fn register_block(&mut self, block: BlockType) {
        let block = self.index_by_id(block);
        for name in std::iter::once(&block.name).chain(block.aliases.iter()) {
            self.by_name.insert(normalize_name(name), block.clone());
        }
    }

    pub fn register_kill(&mut self, kill: BlockType) {
        let kill = self.index_by_id(kill);
        for name in std::iter::once(&kill.name).chain(kill.aliases.iter()) {
            self.kills_by_name.insert(normalize_name(name), kill.clone());
        }
    }

    fn index_by_id(&mut self, block_type: BlockType) -> Arc<BlockType> {
        let block_type = Arc::new(block_type);
        let key = (block_type.id, block_type.data);
        if let Some(previous) = self.by_id.insert(key, block_type.clone()) {
            if previous.name != block_type.name {
                log::warn!(
                    "block type {}:{} redefined from {:?} to {:?}",
                    key.0,
                    key.1,
                    previous.name,
                    block_type.name
                );
            }
        }
        block_type
    }

    /// Resolve a block name from a result line.
    pub fn block_type_by_name(&self, name: &str) -> Arc<BlockType> {
        match self.by_name.get(&normalize_name(name)) {
            Some(block_type) => block_type.clone(),
            None => {
                log::debug!("unknown block name {name:?}");
                self.unknown.clone()
            }
        }
    }

    /// Resolve a kill victim. LogBlock does not say whether the victim was a
    /// player, so any name absent from the kill table is assumed to be one.
    pub fn kill_type_by_name(&self, name: &str) -> Arc<BlockType> {
        self.kills_by_name
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_else(|| self.player.clone())
    }

    /// Resolve an id/data pair from a saved file. Falls back to data 0 for
    /// the same id, then to an ad hoc unnamed type so the pair survives a
    /// save/load cycle.
    pub fn block_type_by_id(&self, id: u16, data: u8) -> Arc<BlockType> {
        if let Some(block_type) = self.by_id.get(&(id, data)) {
            return block_type.clone();
        }
        if let Some(base) = self.by_id.get(&(id, 0)) {
            return Arc::new(BlockType {
                data,
                aliases: Vec::new(),
                ..BlockType::clone(base)
            });
        }
        Arc::new(BlockType::new(id, data, format!("{id}:{data}")))
    }

    pub fn unknown(&self) -> Arc<BlockType> {
        self.unknown.clone()
    }

    pub fn player(&self) -> Arc<BlockType> {
        self.player.clone()
    }

    /// Number of distinct registered id/data pairs, sentinels included.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for BlockTypeRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Canonical lookup form: lowercase, `minecraft:` prefix dropped, spaces and
/// hyphens folded to underscores.
fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("minecraft:").unwrap_or(name);
    name.chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let registry = BlockTypeRegistry::from_toml_str(BUILTIN_BLOCKS).unwrap();
        assert!(registry.len() > 50);
        assert_eq!(registry.block_type_by_name("diamond ore").id, 56);
    }

    #[test]
    fn name_lookup_ignores_case_and_separators() {
        let registry = BlockTypeRegistry::builtin();
        assert_eq!(registry.block_type_by_name("Diamond Ore").id, 56);
        assert_eq!(registry.block_type_by_name("diamond_ore").id, 56);
        assert_eq!(registry.block_type_by_name("minecraft:diamond_ore").id, 56);
        assert_eq!(registry.block_type_by_name("crafting-table").id, 58);
    }

    #[test]
    fn unknown_block_maps_to_sentinel() {
        let registry = BlockTypeRegistry::builtin();
        let block_type = registry.block_type_by_name("unobtainium");
        assert_eq!(block_type.id, UNKNOWN_BLOCK_ID);
        assert!(block_type.is_unknown());
    }

    #[test]
    fn unknown_kill_victim_is_player() {
        let registry = BlockTypeRegistry::builtin();
        assert_eq!(registry.kill_type_by_name("creeper").id, 200);
        assert_eq!(registry.kill_type_by_name("Notch").id, PLAYER_KILL_ID);
    }

    #[test]
    fn block_names_do_not_resolve_as_kills() {
        let registry = BlockTypeRegistry::builtin();
        assert_eq!(registry.kill_type_by_name("stone").id, PLAYER_KILL_ID);
        assert!(registry.block_type_by_name("creeper").is_unknown());
    }

    #[test]
    fn id_lookup_falls_back() {
        let registry = BlockTypeRegistry::builtin();
        assert_eq!(registry.block_type_by_id(56, 0).name, "diamond ore");

        let wool = registry.block_type_by_id(35, 14);
        assert_eq!((wool.id, wool.data), (35, 14));
        assert_eq!(wool.name, "wool");

        let odd = registry.block_type_by_id(4000, 3);
        assert_eq!((odd.id, odd.data), (4000, 3));
    }

    #[test]
    fn overrides_extend_builtin() {
        let registry = BlockTypeRegistry::builtin_with_overrides(
            r#"
[[block]]
id = 1
data = 1
name = "granite"
"#,
        )
        .unwrap();
        assert_eq!(registry.block_type_by_name("granite").data, 1);
        assert_eq!(registry.block_type_by_name("stone").id, 1);
    }

    #[test]
    fn malformed_table_is_an_error() {
        let err = BlockTypeRegistry::from_toml_str("[[block]]\nid = \"x\"").unwrap_err();
        assert!(matches!(err, EditStoreError::Registry(_)));
    }
}
