//! Decoders for the three `/lb coords` result formats.
//!
//! ```text
//! (idx) [yy-]MM-DD hh:mm:ss player created|destroyed block [[s1] [s2] [s3] [s4]] at x:y:z
//! (idx) [yy-]MM-DD hh:mm:ss player killed victim at x:y:z with weapon
//! (idx) [yy-]MM-DD hh:mm:ss player replaced old with new at x:y:z
//! ```

use crate::colour::Colour;
use crate::config::ChatConfig;
use crate::echo::{Echo, LocalChat};
use crate::patterns::{LineKind, PatternTable};
use crate::{ChatError, Result};
use lbtrace_edit_store::timestamp::{self, ReportedDate};
use lbtrace_edit_store::{BlockEdit, BlockTypeRegistry};
use regex::Captures;
use std::fmt;
use std::str::FromStr;

const DATE_TIME: &str = r"(?:(?P<year>\d{4}|\d{2})-)?(?P<month>\d{1,2})-(?P<day>\d{1,2}) (?P<hour>\d{1,2}):(?P<minute>\d{2}):(?P<second>\d{2})";
const POSITION: &str = r"(?P<x>-?\d+):(?P<y>-?\d+):(?P<z>-?\d+)";
const NAME: &str = r"[\w:' -]+?";
const SIGN_LINES: &str =
    r"(?: \[(?P<sign1>[^\]]*)\] \[(?P<sign2>[^\]]*)\] \[(?P<sign3>[^\]]*)\] \[(?P<sign4>[^\]]*)\])?";

pub(crate) fn register_patterns(table: &mut PatternTable) -> Result<()> {
    let prefix = format!(r"^\((?P<index>\d+)\) {DATE_TIME} (?P<player>\w+)");
    table.register(
        LineKind::Coords,
        &format!(
            r"{prefix} (?P<action>created|destroyed) (?P<block>{NAME}){SIGN_LINES} at {POSITION}$"
        ),
    )?;
    table.register(
        LineKind::KillCoords,
        &format!(r"{prefix} killed (?P<victim>{NAME}) at {POSITION} with (?P<weapon>.+)$"),
    )?;
    table.register(
        LineKind::ReplacedCoords,
        &format!(
            r"{prefix} replaced (?P<old_block>{NAME}) with (?P<new_block>{NAME}) at {POSITION}$"
        ),
    )?;
    Ok(())
}

/// Result index and time fields exactly as printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultStamp {
    pub index: u32,
    pub date: ReportedDate,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for ResultStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:2}) ", self.index)?;
        // Only show the year if the server reported one.
        if let Some(year) = self.date.year {
            write!(f, "{:02}-", year.rem_euclid(100))?;
        }
        write!(
            f,
            "{:02}-{:02} {:02}:{:02}:{:02}",
            self.date.month, self.date.day, self.hour, self.minute, self.second
        )
    }
}

/// Format-specific parts of a result that are not stored in the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultDetail {
    Coords { signs: Option<[String; 4]> },
    Kill { victim: String, weapon: String },
    Replaced,
}

/// A decoded result line.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub stamp: ResultStamp,
    pub edit: BlockEdit,
    pub detail: ResultDetail,
}

impl QueryResult {
    /// Compact re-echo form.
    pub fn reformat(&self) -> String {
        let edit = &self.edit;
        let (x, y, z) = edit.position();
        match &self.detail {
            ResultDetail::Coords { signs } => {
                let action = if edit.is_creation() { '+' } else { '-' };
                let sign_text = signs
                    .as_ref()
                    .map(|[s1, s2, s3, s4]| format!(" [{s1}] [{s2}] [{s3}] [{s4}]"))
                    .unwrap_or_default();
                format!(
                    "{} ({x},{y},{z}) {action}{} {}{sign_text}",
                    self.stamp,
                    edit.block_type().id,
                    edit.player()
                )
            }
            ResultDetail::Kill { victim, weapon } => format!(
                "{} ({x},{y},{z}) {} {weapon} > {victim}",
                self.stamp,
                edit.player()
            ),
            ResultDetail::Replaced => format!(
                "{} ({x},{y},{z}) -{} {}",
                self.stamp,
                edit.block_type().id,
                edit.player()
            ),
        }
    }

    /// Local display for this result under the given settings.
    pub fn echo(&self, config: &ChatConfig, colour: Colour, plain_line: &str) -> Echo {
        let colour = config.recolour_query_results.then_some(colour);
        if config.reformat_query_results {
            Echo::Replace(LocalChat::new(colour, self.reformat()))
        } else if colour.is_some() {
            Echo::Replace(LocalChat::new(colour, plain_line))
        } else {
            Echo::Verbatim
        }
    }
}

/// Decode a line already classified as one of the three result kinds.
pub fn parse(
    kind: LineKind,
    caps: &Captures<'_>,
    registry: &BlockTypeRegistry,
    default_year: i32,
) -> Result<QueryResult> {
    match kind {
        LineKind::Coords => parse_coords(caps, registry, default_year),
        LineKind::KillCoords => parse_kill(caps, registry, default_year),
        LineKind::ReplacedCoords => parse_replaced(caps, registry, default_year),
        other => Err(ChatError::malformed(
            other.label(),
            "not a query result line",
        )),
    }
}

/// Creation or destruction, optionally with four sign lines.
pub fn parse_coords(
    caps: &Captures<'_>,
    registry: &BlockTypeRegistry,
    default_year: i32,
) -> Result<QueryResult> {
    let kind = LineKind::Coords;
    let (stamp, millis) = parse_stamp(caps, kind, default_year)?;
    let player = field(caps, kind, "player")?;
    let created = field(caps, kind, "action")? == "created";
    let block = field(caps, kind, "block")?;
    let (x, y, z) = parse_position(caps, kind)?;

    let signs = match (
        caps.name("sign1"),
        caps.name("sign2"),
        caps.name("sign3"),
        caps.name("sign4"),
    ) {
        (Some(s1), Some(s2), Some(s3), Some(s4)) => Some([
            s1.as_str().to_string(),
            s2.as_str().to_string(),
            s3.as_str().to_string(),
            s4.as_str().to_string(),
        ]),
        _ => None,
    };

    let block_type = registry.block_type_by_name(block);
    Ok(QueryResult {
        stamp,
        edit: BlockEdit::new(millis, player, created, x, y, z, block_type),
        detail: ResultDetail::Coords { signs },
    })
}

/// Kill, recorded as a destruction of the victim's type. Victims missing
/// from the kill table are assumed to be players; LogBlock offers nothing
/// more reliable to tell them apart.
pub fn parse_kill(
    caps: &Captures<'_>,
    registry: &BlockTypeRegistry,
    default_year: i32,
) -> Result<QueryResult> {
    let kind = LineKind::KillCoords;
    let (stamp, millis) = parse_stamp(caps, kind, default_year)?;
    let player = field(caps, kind, "player")?;
    let victim = field(caps, kind, "victim")?;
    let (x, y, z) = parse_position(caps, kind)?;
    let weapon = field(caps, kind, "weapon")?;

    let block_type = registry.kill_type_by_name(victim);
    Ok(QueryResult {
        stamp,
        edit: BlockEdit::new(millis, player, false, x, y, z, block_type),
        detail: ResultDetail::Kill {
            victim: victim.to_string(),
            weapon: weapon.to_string(),
        },
    })
}

/// Replacement, recorded only as the destruction of the old block so that
/// one replacement is not counted as two edits.
pub fn parse_replaced(
    caps: &Captures<'_>,
    registry: &BlockTypeRegistry,
    default_year: i32,
) -> Result<QueryResult> {
    let kind = LineKind::ReplacedCoords;
    let (stamp, millis) = parse_stamp(caps, kind, default_year)?;
    let player = field(caps, kind, "player")?;
    let old_block = field(caps, kind, "old_block")?;
    let (x, y, z) = parse_position(caps, kind)?;

    let block_type = registry.block_type_by_name(old_block);
    Ok(QueryResult {
        stamp,
        edit: BlockEdit::new(millis, player, false, x, y, z, block_type),
        detail: ResultDetail::Replaced,
    })
}

fn field<'t>(caps: &Captures<'t>, kind: LineKind, name: &str) -> Result<&'t str> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| ChatError::malformed(kind.label(), format!("missing {name}")))
}

fn number<T>(caps: &Captures<'_>, kind: LineKind, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let text = field(caps, kind, name)?;
    text.parse()
        .map_err(|err| ChatError::malformed(kind.label(), format!("{name} {text:?}: {err}")))
}

fn parse_position(caps: &Captures<'_>, kind: LineKind) -> Result<(i32, i32, i32)> {
    Ok((
        number(caps, kind, "x")?,
        number(caps, kind, "y")?,
        number(caps, kind, "z")?,
    ))
}

fn parse_stamp(
    caps: &Captures<'_>,
    kind: LineKind,
    default_year: i32,
) -> Result<(ResultStamp, i64)> {
    let year = caps
        .name("year")
        .map(|m| timestamp::parse_year(m.as_str()))
        .transpose()
        .map_err(|err| ChatError::malformed(kind.label(), err.to_string()))?;
    let stamp = ResultStamp {
        index: number(caps, kind, "index")?,
        date: ReportedDate {
            year,
            month: number(caps, kind, "month")?,
            day: number(caps, kind, "day")?,
        },
        hour: number(caps, kind, "hour")?,
        minute: number(caps, kind, "minute")?,
        second: number(caps, kind, "second")?,
    };
    let millis = timestamp::to_millis(
        stamp.date.year_or(default_year),
        stamp.date.month,
        stamp.date.day,
        stamp.hour,
        stamp.minute,
        stamp.second,
    )
    .map_err(|err| ChatError::malformed(kind.label(), err.to_string()))?;
    Ok((stamp, millis))
}
