//! Saved edit line format:
//!
//! ```text
//! YYYY-MM-DD|HH:MM:SS|<player>|<c|d>|<blockId>|<blockData>|<x>|<y>|<z>
//! ```

use crate::block_type::BlockTypeRegistry;
use crate::edit::BlockEdit;
use crate::timestamp::{from_millis, to_millis};
use crate::{EditStoreError, Result};

const FIELD_COUNT: usize = 9;

/// Render one edit as a saved record line, without the trailing newline.
pub fn format_record(edit: &BlockEdit) -> Result<String> {
    let t = from_millis(edit.time())?;
    let action = if edit.is_creation() { 'c' } else { 'd' };
    let block_type = edit.block_type();
    Ok(format!(
        "{:04}-{:02}-{:02}|{:02}:{:02}:{:02}|{}|{}|{}|{}|{}|{}|{}",
        t.year,
        t.month,
        t.day,
        t.hour,
        t.minute,
        t.second,
        edit.player(),
        action,
        block_type.id,
        block_type.data,
        edit.x(),
        edit.y(),
        edit.z()
    ))
}

/// Decode a saved record line. `line_no` is only used for error reporting.
pub fn parse_record(line: &str, line_no: usize, registry: &BlockTypeRegistry) -> Result<BlockEdit> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('|').collect();
    if fields.len() != FIELD_COUNT {
        return Err(EditStoreError::invalid_record(
            line_no,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }

    let bad = |what: &str, value: &str| {
        EditStoreError::invalid_record(line_no, format!("bad {what} {value:?}"))
    };

    let date: Vec<&str> = fields[0].split('-').collect();
    let time: Vec<&str> = fields[1].split(':').collect();
    if date.len() != 3 || time.len() != 3 {
        return Err(bad("date/time", &format!("{}|{}", fields[0], fields[1])));
    }
    let year: i32 = date[0].parse().map_err(|_| bad("year", date[0]))?;
    let month: u32 = date[1].parse().map_err(|_| bad("month", date[1]))?;
    let day: u32 = date[2].parse().map_err(|_| bad("day", date[2]))?;
    let hour: u32 = time[0].parse().map_err(|_| bad("hour", time[0]))?;
    let minute: u32 = time[1].parse().map_err(|_| bad("minute", time[1]))?;
    let second: u32 = time[2].parse().map_err(|_| bad("second", time[2]))?;
    let millis = to_millis(year, month, day, hour, minute, second)
        .map_err(|err| EditStoreError::invalid_record(line_no, err.to_string()))?;

    let player = fields[2];
    if player.is_empty() {
        return Err(bad("player", player));
    }
    let created = match fields[3] {
        "c" => true,
        "d" => false,
        other => return Err(bad("action", other)),
    };
    let id: u16 = fields[4].parse().map_err(|_| bad("block id", fields[4]))?;
    let data: u8 = fields[5].parse().map_err(|_| bad("block data", fields[5]))?;
    let x: i32 = fields[6].parse().map_err(|_| bad("x", fields[6]))?;
    let y: i32 = fields[7].parse().map_err(|_| bad("y", fields[7]))?;
    let z: i32 = fields[8].parse().map_err(|_| bad("z", fields[8]))?;

    Ok(BlockEdit::new(
        millis,
        player,
        created,
        x,
        y,
        z,
        registry.block_type_by_id(id, data),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_unknown_destruction() {
        let registry = BlockTypeRegistry::builtin();
        let time = to_millis(2020, 1, 2, 3, 4, 5).unwrap();
        let edit = BlockEdit::new(time, "alice", false, 1, 2, 3, registry.unknown());
        assert_eq!(
            format_record(&edit).unwrap(),
            "2020-01-02|03:04:05|alice|d|256|0|1|2|3"
        );
    }

    #[test]
    fn parses_what_it_formats() {
        let registry = BlockTypeRegistry::builtin();
        let line = "2013-11-30|23:59:01|Bob_1|c|56|0|-120|12|4000";
        let edit = parse_record(line, 1, &registry).unwrap();
        assert_eq!(edit.player(), "Bob_1");
        assert!(edit.is_creation());
        assert_eq!(edit.position(), (-120, 12, 4000));
        assert_eq!(edit.block_type().name, "diamond ore");
        assert_eq!(format_record(&edit).unwrap(), line);
    }

    #[test]
    fn reports_line_number_on_error() {
        let registry = BlockTypeRegistry::builtin();
        let err = parse_record("2013-11-30|23:59:01|bob|x|1|0|0|0|0", 7, &registry).unwrap_err();
        match err {
            EditStoreError::InvalidRecord { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains("action"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_record("2013-11-30|23:59:01|bob|c|1|0|0|0", 1, &registry).is_err());
        assert!(parse_record("2013-02-30|23:59:01|bob|c|1|0|0|0|0", 1, &registry).is_err());
    }
}
