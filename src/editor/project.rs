use std::str::Chars;

use super::SegmentIntervals;

/// A maximal piece of segment text sharing one highlight state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

impl Run<'_> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `text` into plain and highlighted runs. Concatenating the run texts gives
/// back `text`; no run is empty.
pub fn project<'a>(text: &'a str, intervals: &SegmentIntervals) -> Vec<Run<'a>> {
    let mut runs = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut bytes = ByteOffsets::new(text);
    let mut cursor = 0;
    for interval in intervals {
        let start = bytes.at(interval.start).max(cursor);
        let end = bytes.at(interval.end).max(start);
        push_run(&mut runs, &text[cursor..start], false);
        push_run(&mut runs, &text[start..end], true);
        cursor = end;
    }
    push_run(&mut runs, &text[cursor..], false);
    runs
}

fn push_run<'a>(runs: &mut Vec<Run<'a>>, text: &'a str, highlighted: bool) {
    if !text.is_empty() {
        runs.push(Run { text, highlighted });
    }
}

/// Converts ascending char offsets to byte offsets in a single forward walk. Offsets
/// past the end clamp to the text length.
struct ByteOffsets<'a> {
    chars: Chars<'a>,
    char_offset: usize,
    byte_offset: usize,
}

impl<'a> ByteOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            char_offset: 0,
            byte_offset: 0,
        }
    }

    fn at(&mut self, char_offset: usize) -> usize {
        while self.char_offset < char_offset {
            let Some(ch) = self.chars.next() else {
                break;
            };
            self.byte_offset += ch.len_utf8();
            self.char_offset += 1;
        }
        self.byte_offset
    }
}
