use crate::command::ServerCommand;
use crate::config::ChatConfig;
use crate::patterns::{LineKind, PatternTable};
use crate::Result;

const APPLICABLE_REGIONS: &str = r"^Applicable regions: (?P<regions>.+)$";

pub(crate) fn register_patterns(table: &mut PatternTable) -> Result<()> {
    table.register(LineKind::ApplicableRegions, APPLICABLE_REGIONS)
}

fn is_region_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Region ids in a WorldGuard region list, in order. Duplicates are kept.
pub fn region_names(list: &str) -> Vec<&str> {
    list.split(|c: char| !is_region_char(c))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Rate limiter for `/region info` batches.
///
/// A batch is sent whole or not at all. Each extra command in a batch pushes
/// the next eligible time back by one chat timeout, so a burst of requests is
/// paid for before the next batch may go out. The region info timeout is
/// added on top of that as a fixed pause after every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionInfoIssuer {
    last_issued_at: Option<i64>,
    next_eligible_at: i64,
}

impl RegionInfoIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a batch may be sent at `now`.
    pub fn is_eligible(&self, now: i64) -> bool {
        now >= self.next_eligible_at
    }

    /// Commands to send for a region list seen at `now`. Empty when the
    /// batch is dropped or the list names no regions.
    pub fn on_regions(&mut self, list: &str, now: i64, config: &ChatConfig) -> Vec<ServerCommand> {
        let names = region_names(list);
        if names.is_empty() {
            return Vec::new();
        }
        if !self.is_eligible(now) {
            log::debug!(
                "dropping /region info for {} region(s); next eligible at {}",
                names.len(),
                self.next_eligible_at
            );
            return Vec::new();
        }

        let extra = i64::try_from(names.len() - 1).unwrap_or(i64::MAX);
        let delay = config
            .chat_timeout_ms()
            .saturating_mul(extra)
            .saturating_add(config.region_info_timeout_ms());
        self.last_issued_at = Some(now);
        self.next_eligible_at = now.saturating_add(delay);
        names
            .into_iter()
            .map(|name| ServerCommand::RegionInfo(name.to_string()))
            .collect()
    }

    pub fn last_issued_at(&self) -> Option<i64> {
        self.last_issued_at
    }

    pub fn next_eligible_at(&self) -> i64 {
        self.next_eligible_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn regions(names: &[&str]) -> Vec<ServerCommand> {
        names
            .iter()
            .map(|name| ServerCommand::RegionInfo(name.to_string()))
            .collect()
    }

    #[test]
    fn splits_region_list() {
        assert_eq!(
            region_names("spawn, market_1, east-wall,spawn"),
            vec!["spawn", "market_1", "east-wall", "spawn"]
        );
        assert!(region_names(" , ").is_empty());
    }

    #[test]
    fn batch_delays_next_eligible_time() {
        let config = ChatConfig::default();
        let mut issuer = RegionInfoIssuer::new();

        assert_eq!(issuer.on_regions("a, b, c", 0, &config), regions(&["a", "b", "c"]));
        assert_eq!(issuer.next_eligible_at(), 2_000);

        assert!(issuer.on_regions("d", 1_999, &config).is_empty());
        assert_eq!(issuer.on_regions("d, e", 2_000, &config), regions(&["d", "e"]));
        assert_eq!(issuer.next_eligible_at(), 3_000);
    }

    #[test]
    fn single_region_has_no_extra_delay() {
        let config = ChatConfig::default();
        let mut issuer = RegionInfoIssuer::new();
        assert_eq!(issuer.on_regions("a", 10, &config), regions(&["a"]));
        assert_eq!(issuer.on_regions("b", 10, &config), regions(&["b"]));
    }

    #[test]
    fn region_timeout_adds_to_batch_delay() {
        let config = ChatConfig {
            region_info_timeout_secs: 5.0,
            ..ChatConfig::default()
        };
        let mut issuer = RegionInfoIssuer::new();
        assert_eq!(issuer.on_regions("a, b", 0, &config).len(), 2);
        assert_eq!(issuer.next_eligible_at(), 6_000);
        assert!(issuer.on_regions("c", 5_999, &config).is_empty());
        assert_eq!(issuer.on_regions("c", 6_000, &config).len(), 1);
        assert_eq!(issuer.last_issued_at(), Some(6_000));
    }

    #[test]
    fn empty_list_leaves_clock_alone() {
        let config = ChatConfig::default();
        let mut issuer = RegionInfoIssuer::new();
        assert!(issuer.on_regions(", ,", 100, &config).is_empty());
        assert_eq!(issuer, RegionInfoIssuer::new());
    }
}
