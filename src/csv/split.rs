use super::codec;
use super::options::FormatConfig;
use crate::errors::{CsvError, Result};
use std::io::{self, BufRead};
use tracing::trace;

/// Split one line into raw tokens, keeping quoted fields that contain the delimiter whole.
///
/// The line is first split naively on the delimiter. A fragment that opens a quote without
/// closing it starts a continuation, and fragments are glued back together (with the
/// delimiter they lost) until one ends with a quote.
///
/// Quoted fields spanning several physical lines are not supported. If the line ends while
/// a continuation is still open, whatever was collected is returned as the last token.
pub fn split_line(line: &str, delimiter: char, quote: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buffer: Option<String> = None;
    let mut awaiting_continuation = false;

    for draft in line.split(delimiter) {
        awaiting_continuation = (draft.starts_with(quote) && !draft.ends_with(quote))
            || (awaiting_continuation && !draft.ends_with(quote));

        if awaiting_continuation {
            let buffer = buffer.get_or_insert_with(String::new);
            buffer.push_str(draft);
            buffer.push(delimiter);
        } else {
            match buffer.take() {
                Some(mut buffer) => {
                    buffer.push_str(draft);
                    tokens.push(buffer);
                }
                None => tokens.push(draft.to_string()),
            }
        }
    }

    if let Some(mut unterminated) = buffer {
        // Drop the delimiter that was re-inserted after the last fragment
        unterminated.pop();
        tokens.push(unterminated);
    }

    trace!(line, tokens = tokens.len(), "split line");
    tokens
}

/// Split a line and unescape every token.
pub fn parse_line(line: &str, config: &FormatConfig) -> Vec<String> {
    split_line(line, config.delimiter(), config.quote())
        .iter()
        .map(|token| codec::parse(token, config))
        .collect()
}

/// Iterate the physical lines of a text.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A terminator at the very end of the text
/// does not start another line, so empty text has no lines at all.
pub fn physical_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Read rows one line at a time, without building a grid.
///
/// The line filters, column count filter and row limit apply as they do when loading a
/// document. Two things differ from [`Document::load`](super::document::Document::load):
/// the input is always read as UTF-8 whatever encoding the config names, and lines end only
/// at `\n` or `\r\n`, so a lone `\r` stays inside the line. Bytes that are not UTF-8 are a
/// [`CsvError::Decode`]; other read failures are passed on as [`CsvError::Io`].
pub fn stream_rows<R: BufRead>(
    reader: R,
    config: FormatConfig,
) -> impl Iterator<Item = Result<Vec<String>>> {
    let mut lines = reader.lines();
    let mut retained = 0;
    std::iter::from_fn(move || loop {
        if !config.admits_row(retained) {
            return None;
        }
        let line = match lines.next()? {
            Ok(line) => line,
            Err(error) => return Some(Err(read_error(error))),
        };
        if !config.admits_line(&line) {
            continue;
        }
        let tokens = split_line(&line, config.delimiter(), config.quote());
        if !config.admits_width(tokens.len()) {
            continue;
        }
        retained += 1;
        return Some(Ok(tokens
            .iter()
            .map(|token| codec::parse(token, &config))
            .collect()));
    })
}

fn read_error(error: io::Error) -> CsvError {
    if error.kind() == io::ErrorKind::InvalidData {
        CsvError::Decode {
            encoding: encoding_rs::UTF_8.name(),
        }
    } else {
        CsvError::Io(error)
    }
}
