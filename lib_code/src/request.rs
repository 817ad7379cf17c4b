use crate::EXIT_TEXT;

pub fn is_exit(line: &str) -> bool {
    line == EXIT_TEXT
}

/// Drops the line ending the operator's line reader leaves in place.
pub fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// ASCII bytes of `line`, silently skipping anything outside ASCII.
/// With `newline` the result always ends with `\n`.
pub fn encode_request(line: &str, newline: bool) -> Vec<u8> {
    let mut bytes: Vec<u8> = line.bytes().filter(u8::is_ascii).collect();
    if newline {
        bytes.push(b'\n');
    }
    bytes
}
