//! Locating the roster declaration inside arbitrary source text.

use regex::Regex;
use std::sync::OnceLock;

/// Byte span of the roster block within the source file, covering the
/// declaration through its terminating semicolon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    #[must_use]
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Finds the first `const USERS = [` declaration and scans forward tracking
/// bracket depth until the array closes; the span runs through the next `;`.
///
/// Returns `None` if the declaration is absent or the brackets never balance.
/// Brackets inside string literals are not special-cased; the roster format
/// never produces them (known limitation).
#[must_use]
pub fn find_block(source: &str) -> Option<BlockSpan> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"const\s+USERS\s*=\s*\[").expect("Invalid regex"));

    let decl = re.find(source)?;
    let bytes = source.as_bytes();
    let mut depth = 1usize;
    let mut pos = decl.end();

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    let end = source[pos..]
                        .find(';')
                        .map_or(pos + 1, |offset| pos + offset + 1);
                    return Some(BlockSpan {
                        start: decl.start(),
                        end,
                    });
                }
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Replaces `[span.start, span.end)` in `source` with `block`.
#[must_use]
pub fn splice_block(source: &str, span: BlockSpan, block: &str) -> String {
    let mut out = String::with_capacity(source.len() - (span.end - span.start) + block.len());
    out.push_str(&source[..span.start]);
    out.push_str(block);
    out.push_str(&source[span.end..]);
    out
}
