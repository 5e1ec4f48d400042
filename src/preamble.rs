// Preamble scanning: BOM detection and skip-lines/blank/comment-line
// handling before the real header or data begins.
//
// Grounded on `index.h`'s `skip_bom`/`find_first_line` in the original
// vroom sources: the same two-step shape (strip a BOM, then walk forward
// over blank or comment lines and any caller-requested `skip_lines`) is
// kept, rewritten against a `&[u8]` slice instead of a `FILE*` cursor.

use memchr::memchr;

use crate::dialect::DialectConfig;

const BOMS: &[(&[u8], usize)] = &[
    (&[0xEF, 0xBB, 0xBF], 3),             // UTF-8
    (&[0xFF, 0xFE, 0x00, 0x00], 4),       // UTF-32 LE
    (&[0x00, 0x00, 0xFE, 0xFF], 4),       // UTF-32 BE
    (&[0xFF, 0xFE], 2),                   // UTF-16 LE
    (&[0xFE, 0xFF], 2),                   // UTF-16 BE
];

/// Returns the number of leading bytes that make up a byte-order mark, or
/// zero if none is present. Longer marks are checked before their prefixes
/// (UTF-32 LE before UTF-16 LE) so a 4-byte mark isn't mistaken for a 2-byte
/// one.
pub fn detect_bom(data: &[u8]) -> usize {
    for (pattern, len) in BOMS {
        if data.len() >= *len && &data[..*len] == *pattern {
            return *len;
        }
    }
    0
}

fn next_line_start(data: &[u8], from: usize) -> usize {
    match memchr(b'\n', &data[from..]) {
        Some(i) => from + i + 1,
        None => data.len(),
    }
}

fn is_blank_or_comment(line: &[u8], comment_char: Option<u8>) -> bool {
    let mut i = 0;
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    if i >= line.len() {
        return true;
    }
    line[i] == b'\n' || comment_char == Some(line[i])
}

/// Finds the byte offset at which the header (or, with no header, the
/// first data row) begins: past any BOM, past `skip_lines` lines, and past
/// any further blank or comment lines.
pub fn find_first_line(data: &[u8], dialect: &DialectConfig) -> usize {
    let mut begin = detect_bom(data);
    let mut remaining_skip = dialect.skip_lines;

    loop {
        if begin >= data.len() {
            break;
        }
        let should_skip = remaining_skip > 0
            || is_blank_or_comment(&data[begin..], dialect.comment_char);
        if !should_skip {
            break;
        }
        if remaining_skip > 0 {
            remaining_skip -= 1;
        }
        let next = next_line_start(data, begin);
        if next == begin {
            break;
        }
        begin = next;
    }

    begin
}
