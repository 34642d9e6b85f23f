use crate::{ChatError, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;

/// LogBlock summary and search headers. Only their presence matters: each
/// one marks the start of a new result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    NoResults,
    Changes,
    Blocks,
    SumBlocks,
    SumPlayers,
    Searching,
    Ratio,
    RatioCurrent,
    TimeCheck,
    Block,
}

impl HeaderKind {
    pub const ALL: [HeaderKind; 10] = [
        HeaderKind::NoResults,
        HeaderKind::Changes,
        HeaderKind::Blocks,
        HeaderKind::SumBlocks,
        HeaderKind::SumPlayers,
        HeaderKind::Searching,
        HeaderKind::Ratio,
        HeaderKind::RatioCurrent,
        HeaderKind::TimeCheck,
        HeaderKind::Block,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoResults => "lb.header.noresults",
            Self::Changes => "lb.header.changes",
            Self::Blocks => "lb.header.blocks",
            Self::SumBlocks => "lb.header.sum.blocks",
            Self::SumPlayers => "lb.header.sum.players",
            Self::Searching => "lb.header.searching",
            Self::Ratio => "lb.header.ratio",
            Self::RatioCurrent => "lb.header.ratio.current",
            Self::TimeCheck => "lb.header.timecheck",
            Self::Block => "lb.header.block",
        }
    }

    pub(crate) const fn pattern(self) -> &'static str {
        match self {
            Self::NoResults => r"^No results found\.?$",
            Self::Changes => r"^Changes(?: .*)?:$",
            Self::Blocks => r"^Block changes?(?: .*)?:$",
            Self::SumBlocks => r"^Created - Destroyed - Block$",
            Self::SumPlayers => r"^Created - Destroyed - Player$",
            Self::Searching => r"^Searching .*$",
            Self::Ratio => r"^Ratio .*$",
            Self::RatioCurrent => r"^Current ratio .*$",
            Self::TimeCheck => r"^Time check: .*$",
            Self::Block => r"^Block: .*$",
        }
    }
}

/// Classification of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `/lb coords` creation or destruction
    Coords,
    /// `/lb coords` kill
    KillCoords,
    /// `/lb coords` replacement of one block by another
    ReplacedCoords,
    /// `Page n/m`
    Page,
    Header(HeaderKind),
    /// WorldGuard region list
    ApplicableRegions,
}

impl LineKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Coords => "lb.coord",
            Self::KillCoords => "lb.coord.kills",
            Self::ReplacedCoords => "lb.coord.replaced",
            Self::Page => "lb.page",
            Self::Header(header) => header.label(),
            Self::ApplicableRegions => "wg.regions",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
struct PatternRule {
    kind: LineKind,
    regex: Regex,
}

/// Ordered list of line patterns. The first pattern that matches decides the
/// line's kind; later patterns are not consulted.
#[derive(Debug, Default)]
pub struct PatternTable {
    rules: Vec<PatternRule>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table covering LogBlock results, page and header lines and WorldGuard
    /// region lists.
    pub fn logblock() -> Result<Self> {
        let mut table = Self::new();
        crate::query_results::register_patterns(&mut table)?;
        crate::pagination::register_patterns(&mut table)?;
        crate::region_info::register_patterns(&mut table)?;
        Ok(table)
    }

    pub fn register(&mut self, kind: LineKind, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|source| ChatError::InvalidPattern {
            kind: kind.label(),
            source,
        })?;
        self.rules.push(PatternRule { kind, regex });
        Ok(())
    }

    /// First matching rule for `line`, with its captures.
    pub fn classify<'t>(&self, line: &'t str) -> Option<(LineKind, Captures<'t>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.regex.captures(line).map(|caps| (rule.kind, caps)))
    }

    pub fn kinds(&self) -> impl Iterator<Item = LineKind> + '_ {
        self.rules.iter().map(|rule| rule.kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Remove `§x` formatting codes so patterns see plain text.
pub fn strip_formatting(line: &str) -> Cow<'_, str> {
    if !line.contains('\u{a7}') {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\u{a7}' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
