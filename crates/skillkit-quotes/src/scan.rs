//! Line-oriented markdown scanner
//!
//! Splits a document into frontmatter, fenced code, fence delimiters and prose
//! lines, and splits prose lines further into prose and inline-code segments.
//! Columns and segment bounds are character indices, not byte offsets.

/// An open code fence: the delimiter character and the length of its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    /// `` ` `` or `~`
    pub ch: char,
    /// Run length of the opening delimiter
    pub len: usize,
}

impl Fence {
    /// Detect an opening fence (three or more backticks or tildes after optional
    /// indentation). Returns the fence and its trimmed info string.
    fn open(line: &str) -> Option<(Self, &str)> {
        let trimmed = line.trim_start();
        let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == ch).count();
        if len < 3 {
            return None;
        }
        // Fence chars are ASCII so `len` is also a byte offset.
        Some((Self { ch, len }, trimmed[len..].trim()))
    }

    fn closes(&self, line: &str) -> bool {
        line.trim().chars().take_while(|c| *c == self.ch).count() >= self.len
    }
}

/// Whether a segment of a prose line is prose or inline code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary text
    Prose,
    /// Backtick span, delimiters included
    InlineCode,
}

/// Half-open char range `[start, end)` within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// What the range holds
    pub kind: SegmentKind,
    /// First char index
    pub start: usize,
    /// One past the last char index
    pub end: usize,
}

/// Classification of one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Leading `---` delimited YAML block, delimiters included
    Frontmatter,
    /// Outside any fence, split into prose and inline code
    Prose(Vec<Segment>),
    /// Opening fence delimiter with its info string (language tag)
    FenceOpen {
        /// Delimiter that will close the block
        fence: Fence,
        /// Info string after the delimiter, trimmed
        info: &'a str,
    },
    /// Closing fence delimiter
    FenceClose,
    /// Inside a fenced block
    Code,
}

/// A scanned line with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// Line text without the newline
    pub text: &'a str,
    /// Classification
    pub kind: LineKind<'a>,
}

impl ScannedLine<'_> {
    /// Every char of the line with its 0-based column and the kind of text it
    /// belongs to. Frontmatter and fence delimiter lines yield nothing.
    pub fn chars(&self) -> Vec<(usize, char, CharKind)> {
        match &self.kind {
            LineKind::Frontmatter | LineKind::FenceOpen { .. } | LineKind::FenceClose => {
                Vec::new()
            }
            LineKind::Code => self
                .text
                .chars()
                .enumerate()
                .map(|(col, c)| (col, c, CharKind::FencedCode))
                .collect(),
            LineKind::Prose(segments) => {
                let mut out = Vec::new();
                let mut segments = segments.iter().peekable();
                for (col, c) in self.text.chars().enumerate() {
                    while segments.peek().is_some_and(|s| col >= s.end) {
                        segments.next();
                    }
                    let kind = match segments.peek().map(|s| s.kind) {
                        Some(SegmentKind::InlineCode) => CharKind::InlineCode,
                        _ => CharKind::Prose,
                    };
                    out.push((col, c, kind));
                }
                out
            }
        }
    }
}

/// Kind of text a single character belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharKind {
    /// Outside any code
    Prose,
    /// Inside a backtick span
    InlineCode,
    /// Inside a fenced block
    FencedCode,
}

impl CharKind {
    /// True for inline or fenced code
    pub fn is_code(self) -> bool {
        !matches!(self, CharKind::Prose)
    }
}

/// Iterator over the classified lines of a document
///
/// Lines are split on `\n` only, so joining the `text` of every line with
/// `\n` reproduces the input exactly. A `---` first line opens frontmatter
/// only when a later `---` line closes it; otherwise line 1 is prose.
pub struct MarkdownScanner<'a> {
    lines: std::str::Split<'a, char>,
    number: usize,
    open: Option<(Fence, usize)>,
    /// Line number of the closing frontmatter delimiter
    frontmatter_end: Option<usize>,
}

impl<'a> MarkdownScanner<'a> {
    /// Scanner positioned at line 1 of `content`
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.split('\n'),
            number: 0,
            open: None,
            frontmatter_end: frontmatter_end(content),
        }
    }

    /// Fence still open at the current position and the line it opened on.
    /// After the scanner is exhausted this is an unterminated fence.
    pub fn open_fence(&self) -> Option<(Fence, usize)> {
        self.open
    }
}

impl<'a> Iterator for MarkdownScanner<'a> {
    type Item = ScannedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.lines.next()?;
        self.number += 1;

        if self.frontmatter_end.is_some_and(|end| self.number <= end) {
            return Some(ScannedLine {
                number: self.number,
                text,
                kind: LineKind::Frontmatter,
            });
        }

        let kind = match self.open {
            Some((fence, _)) => {
                if fence.closes(text) {
                    self.open = None;
                    LineKind::FenceClose
                } else {
                    LineKind::Code
                }
            }
            None => match Fence::open(text) {
                Some((fence, info)) => {
                    self.open = Some((fence, self.number));
                    LineKind::FenceOpen { fence, info }
                }
                None => LineKind::Prose(split_inline_code(text)),
            },
        };

        Some(ScannedLine {
            number: self.number,
            text,
            kind,
        })
    }
}

/// Line number of the `---` that closes leading frontmatter, if any
fn frontmatter_end(content: &str) -> Option<usize> {
    let mut lines = content.split('\n');
    if lines.next()?.trim_end() != "---" {
        return None;
    }
    lines
        .position(|line| line.trim_end() == "---")
        .map(|idx| idx + 2)
}

/// Split a prose line into prose and inline-code segments
///
/// A run of N backticks opens a code span closed by the next run of at least
/// N backticks on the same line. An unclosed run masks the rest of the line.
pub fn split_inline_code(line: &str) -> Vec<Segment> {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut i = 0;

    let run_at = |at: usize| chars[at..].iter().take_while(|c| **c == '`').count();

    while i < n {
        if chars[i] != '`' {
            i += 1;
            continue;
        }

        let open_len = run_at(i);
        let mut k = i + open_len;
        let mut close_end = None;
        while k < n {
            if chars[k] == '`' {
                let len = run_at(k);
                if len >= open_len {
                    close_end = Some(k + len);
                    break;
                }
                k += len;
            } else {
                k += 1;
            }
        }

        if prose_start < i {
            segments.push(Segment {
                kind: SegmentKind::Prose,
                start: prose_start,
                end: i,
            });
        }
        let end = close_end.unwrap_or(n);
        segments.push(Segment {
            kind: SegmentKind::InlineCode,
            start: i,
            end,
        });
        i = end;
        prose_start = end;
    }

    if prose_start < n {
        segments.push(Segment {
            kind: SegmentKind::Prose,
            start: prose_start,
            end: n,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(content: &str) -> Vec<&'static str> {
        MarkdownScanner::new(content)
            .map(|line| match line.kind {
                LineKind::Frontmatter => "frontmatter",
                LineKind::Prose(_) => "prose",
                LineKind::FenceOpen { .. } => "open",
                LineKind::FenceClose => "close",
                LineKind::Code => "code",
            })
            .collect()
    }

    #[test]
    fn test_fenced_block_classification() {
        let doc = "Intro\n```ts\nconst a = 1\n```\nOutro";
        assert_eq!(kinds(doc), vec!["prose", "open", "code", "close", "prose"]);
    }

    #[test]
    fn test_longer_fence_needs_long_close() {
        let doc = "````md\n```js\nx\n```\n````\nafter";
        assert_eq!(
            kinds(doc),
            vec!["open", "code", "code", "code", "close", "prose"]
        );
    }

    #[test]
    fn test_tilde_fence_not_closed_by_backticks() {
        let doc = "~~~\n```\n~~~";
        assert_eq!(kinds(doc), vec!["open", "code", "close"]);
    }

    #[test]
    fn test_indented_fence_and_info_string() {
        let mut scanner = MarkdownScanner::new("  ```tsx title=\"a\"\n  x\n  ```");
        let first = scanner.next().unwrap();
        match first.kind {
            LineKind::FenceOpen { fence, info } => {
                assert_eq!(fence, Fence { ch: '`', len: 3 });
                assert_eq!(info, "tsx title=\"a\"");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(scanner.by_ref().count(), 2);
        assert!(scanner.open_fence().is_none());
    }

    #[test]
    fn test_unterminated_fence_is_reported() {
        let mut scanner = MarkdownScanner::new("text\n```js\nlet x;\n");
        scanner.by_ref().for_each(drop);
        assert_eq!(scanner.open_fence().map(|(_, line)| line), Some(2));
    }

    #[test]
    fn test_frontmatter_is_skipped() {
        let doc = "---\ntitle: \"x\"\n---\nProse\n---\nMore";
        assert_eq!(
            kinds(doc),
            vec!["frontmatter", "frontmatter", "frontmatter", "prose", "prose", "prose"]
        );
        assert!(MarkdownScanner::new(doc).next().unwrap().chars().is_empty());
    }

    #[test]
    fn test_unclosed_frontmatter_is_prose() {
        let doc = "---\n\nDon't\n```\nx";
        assert_eq!(kinds(doc), vec!["prose", "prose", "prose", "open", "code"]);
    }

    #[test]
    fn test_inline_code_segments() {
        let segments = split_inline_code("a `b` c");
        assert_eq!(
            segments,
            vec![
                Segment { kind: SegmentKind::Prose, start: 0, end: 2 },
                Segment { kind: SegmentKind::InlineCode, start: 2, end: 5 },
                Segment { kind: SegmentKind::Prose, start: 5, end: 7 },
            ]
        );
    }

    #[test]
    fn test_double_backtick_span_contains_single() {
        let segments = split_inline_code("x ``a ` b`` y");
        assert_eq!(segments[1].kind, SegmentKind::InlineCode);
        assert_eq!((segments[1].start, segments[1].end), (2, 11));
        assert_eq!(segments[2].kind, SegmentKind::Prose);
    }

    #[test]
    fn test_unclosed_backtick_masks_rest_of_line() {
        let segments = split_inline_code("it's `open");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].kind, SegmentKind::InlineCode);
        assert_eq!(segments[1].end, 10);
    }

    #[test]
    fn test_char_kinds_use_char_columns() {
        let line = MarkdownScanner::new("“é” `'`").next().unwrap();
        let chars = line.chars();
        assert_eq!(chars[5], (5, '\'', CharKind::InlineCode));
        assert_eq!(chars[2], (2, '”', CharKind::Prose));
    }

    #[test]
    fn test_lines_rejoin_to_input() {
        let doc = "a\r\n```\nb\n```\n";
        let joined: Vec<&str> = MarkdownScanner::new(doc).map(|l| l.text).collect();
        assert_eq!(joined.join("\n"), doc);
    }
}
