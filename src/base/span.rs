//! Source text positions and ranges.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
/// Columns count UTF-8 bytes. Positions order by line, then column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create from 1-indexed line and column (as displayed to users).
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A `start..end` range of line/column positions.
///
/// The end column is exclusive for the text it covers, but [`Extent::contains`]
/// treats the end position as inside the range so that a cursor placed right
/// after a token still hits it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Extent {
    pub start: LineCol,
    pub end: LineCol,
}

impl Extent {
    #[inline]
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// Single-line range `line:start_col..line:end_col`.
    #[inline]
    pub const fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: LineCol::new(line, start_col),
            end: LineCol::new(line, end_col),
        }
    }

    pub fn contains(&self, pos: LineCol) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn contains_extent(&self, other: &Extent) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }

    pub fn line_count(&self) -> u32 {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.start, self.end)
    }
}

/// Index for converting between byte offsets and line/column positions.
///
/// Lines are separated by `\n`; a `\r` right before the separator belongs to
/// no line, so `\r\n` sources get the same columns as `\n` sources.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
    /// Byte offset just past the content of each line (before `\r\n` / `\n`)
    line_ends: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let mut line_ends = Vec::new();

        for (offset, b) in text.bytes().enumerate() {
            if b == b'\n' {
                let content_end = if offset > 0 && text.as_bytes()[offset - 1] == b'\r' {
                    offset - 1
                } else {
                    offset
                };
                line_ends.push(TextSize::from(content_end as u32));
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }
        line_ends.push(TextSize::of(text));

        Self {
            line_starts,
            line_ends,
        }
    }

    /// Convert a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let col = offset - self.line_starts[line];

        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a line/column position to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line's content end.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line = line_col.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self.line_ends[line];
        Some((start + TextSize::from(line_col.col)).min(end))
    }

    /// Byte range of a line's content, without its line terminator.
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let line = line as usize;
        let start = *self.line_starts.get(line)?;
        Some(TextRange::new(start, self.line_ends[line]))
    }

    /// Position just past the last character of the text.
    pub fn end(&self) -> LineCol {
        let last = self.line_starts.len() - 1;
        let len = self.line_ends[last] - self.line_starts[last];
        LineCol::new(last as u32, len.into())
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}
