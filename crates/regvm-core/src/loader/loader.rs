//! Source Loader
//!
//! Turns raw source text into a `Program`: decodes escape sequences, strips
//! comments and blank lines, and separates label bodies from the main
//! sequence. Instructions are not decoded here.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{VmError, VmResult};
use super::program::Program;

/// Comment marker; everything from here to end of line is dropped
const COMMENT: char = ';';

/// Line that closes a label body
const RETURN_MARKER: &str = "ret";

/// Source loader
pub struct SourceLoader;

impl SourceLoader {
    /// Load a program from source text
    pub fn load(source: &str) -> VmResult<Program> {
        let mut main = Vec::new();
        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        let mut open_label: Option<String> = None;

        for (index, raw) in source.lines().enumerate() {
            let decoded = Self::decode_escapes(raw, index + 1)?;
            let Some(line) = Self::strip_comment(&decoded) else {
                continue;
            };

            if let Some(name) = line.strip_suffix(':') {
                labels.insert(name.to_string(), Vec::new());
                open_label = Some(name.to_string());
                continue;
            }

            match &open_label {
                Some(_) if line == RETURN_MARKER => open_label = None,
                Some(name) => labels.entry(name.clone()).or_default().push(line.to_string()),
                None => main.push(line.to_string()),
            }
        }

        debug!(instructions = main.len(), labels = labels.len(), "program loaded");
        Ok(Program::new(main, labels))
    }

    /// Read and load a source file
    pub fn load_file(path: &Path) -> VmResult<Program> {
        let source = fs::read_to_string(path)?;
        Self::load(&source)
    }

    /// Trimmed instruction text, or `None` for blank and comment-only lines.
    fn strip_comment(line: &str) -> Option<&str> {
        let code = match line.find(COMMENT) {
            Some(at) => &line[..at],
            None => line,
        };
        let code = code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// Decode backslash escapes. Unknown escapes are kept verbatim and a
    /// trailing backslash is dropped.
    fn decode_escapes(raw: &str, line: usize) -> VmResult<String> {
        if !raw.contains('\\') {
            return Ok(raw.to_string());
        }

        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(next) = chars.next() else {
                break;
            };
            match next {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\x07'),
                'b' => out.push('\x08'),
                'f' => out.push('\x0c'),
                'v' => out.push('\x0b'),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '0'..='7' => {
                    let mut code = next.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match chars.peek().and_then(|d| d.to_digit(8)) {
                            Some(d) => {
                                code = code * 8 + d;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    out.push(Self::char_from(code, line)?);
                }
                'x' => out.push(Self::read_hex(&mut chars, 2, line)?),
                'u' => out.push(Self::read_hex(&mut chars, 4, line)?),
                'U' => out.push(Self::read_hex(&mut chars, 8, line)?),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }

        Ok(out)
    }

    fn read_hex(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        digits: usize,
        line: usize,
    ) -> VmResult<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            let d = chars
                .next()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| VmError::Load {
                    line,
                    message: format!("truncated escape, expected {} hex digits", digits),
                })?;
            code = code * 16 + d;
        }
        Self::char_from(code, line)
    }

    fn char_from(code: u32, line: usize) -> VmResult<char> {
        char::from_u32(code).ok_or_else(|| VmError::Load {
            line,
            message: format!("escape U+{:X} is not a valid character", code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let program = SourceLoader::load(
            "; header\n\nmov r1, 5 ; set\n   \ninc r1\n;only comment\n",
        )
        .unwrap();
        assert_eq!(program.main(), ["mov r1, 5", "inc r1"]);
    }

    #[test]
    fn label_bodies_leave_main_sequence() {
        let src = "jl bump\nbump:\n  inc r1 ; body\n  inc r2\nret\nsys\n";
        let program = SourceLoader::load(src).unwrap();
        assert_eq!(program.main(), ["jl bump", "sys"]);
        let body = program.label("bump").expect("label loaded");
        assert_eq!(&*body, ["inc r1", "inc r2"]);
    }

    #[test]
    fn label_reopened_discards_previous_body() {
        let src = "a:\ninc r1\nret\na:\ninc r2\nret\n";
        let program = SourceLoader::load(src).unwrap();
        assert_eq!(&*program.label("a").unwrap(), ["inc r2"]);
        assert!(program.is_empty());
    }

    #[test]
    fn unterminated_label_keeps_lines() {
        let program = SourceLoader::load("main:\nnop\nnop").unwrap();
        assert_eq!(program.label("main").unwrap().len(), 2);
    }

    #[test]
    fn escapes_decoded_before_splitting() {
        let program = SourceLoader::load(r#"mov ar1, "a\tb\n\x41\u00e9\q""#).unwrap();
        assert_eq!(program.main(), ["mov ar1, \"a\tb\nA\u{e9}\\q\""]);
    }

    #[test]
    fn truncated_hex_escape_names_source_line() {
        let err = SourceLoader::load("nop\nmov r1, \"\\x4\"").unwrap_err();
        assert!(matches!(err, VmError::Load { line: 2, .. }));
    }
}
