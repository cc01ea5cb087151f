//! Line-based re-indenter for the editor's format action.
//!
//! Indentation is two spaces per open `{ [ (` or per keyword block
//! (`then`, `do`, `function` without a brace, closed by `end`). Strings and
//! comments are skipped when counting. Blank lines are kept, trailing
//! whitespace is dropped.

const INDENT: &str = "  ";

pub fn format_source(source: &str) -> String {
    let mut depth: usize = 0;
    let mut in_block_comment = false;
    let mut out: Vec<String> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        let shape = LineShape::scan(line, &mut in_block_comment);
        let indent = depth.saturating_sub(shape.leading_dedent);
        out.push(format!("{}{line}", INDENT.repeat(indent)));
        depth = depth.saturating_add_signed(shape.delta);
    }

    let mut formatted = out.join("\n");
    if source.ends_with('\n') {
        formatted.push('\n');
    }
    formatted
}

/// What one trimmed line does to the indentation level.
#[derive(Debug, Default, PartialEq)]
struct LineShape {
    /// Levels this line itself sits below the running depth.
    leading_dedent: usize,
    /// Change to the running depth for the following lines.
    delta: isize,
}

impl LineShape {
    fn scan(line: &str, in_block_comment: &mut bool) -> Self {
        let mut shape = Self::default();
        let mut words: Vec<&str> = Vec::new();
        let mut has_brace = false;
        let mut leading = true;

        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if *in_block_comment {
                match line[i..].find("*/") {
                    Some(end) => { *in_block_comment = false; i += end + 2; }
                    None => break,
                }
                continue;
            }

            let c = bytes[i];
            match c {
                b'/' if bytes.get(i + 1) == Some(&b'/') => break,
                b'-' if bytes.get(i + 1) == Some(&b'-') => break,
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    *in_block_comment = true;
                    i += 2;
                    continue;
                }
                b'"' | b'\'' => {
                    i = skip_string(bytes, i);
                    leading = false;
                    continue;
                }
                b'{' | b'[' | b'(' => {
                    has_brace |= c == b'{';
                    shape.delta += 1;
                    leading = false;
                }
                b'}' | b']' | b')' => {
                    has_brace |= c == b'}';
                    shape.delta -= 1;
                    if leading {
                        shape.leading_dedent += 1;
                    }
                }
                c if c.is_ascii_alphabetic() || c == b'_' => {
                    let start = i;
                    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                        i += 1;
                    }
                    let word = &line[start..i];
                    if leading && word == "end" {
                        shape.leading_dedent += 1;
                    }
                    words.push(word);
                    leading = false;
                    continue;
                }
                c if c.is_ascii_whitespace() => {}
                _ => leading = false,
            }
            i += 1;
        }

        for (n, word) in words.iter().enumerate() {
            match *word {
                "then" | "do" => shape.delta += 1,
                "end" => shape.delta -= 1,
                "function" if !has_brace => shape.delta += 1,
                // keyword-style `elseif c then` closes the previous branch
                "elseif" if !has_brace => {
                    shape.delta -= 1;
                    if n == 0 {
                        shape.leading_dedent += 1;
                    }
                }
                "else" if !has_brace && n == 0 && shape.leading_dedent == 0 => {
                    shape.leading_dedent += 1;
                }
                _ => {}
            }
        }
        shape
    }
}

/// Index just past the string literal opening at `start`.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braces() {
        let src = "function setup() {\nif x > 1 {\nprint(x)\n} else {\nprint(0)\n}\n}\n";
        let want = "function setup() {\n  if x > 1 {\n    print(x)\n  } else {\n    print(0)\n  }\n}\n";
        assert_eq!(format_source(src), want);
    }

    #[test]
    fn keyword_blocks() {
        let src = "function loop()\nif a then\nx = 1\nelseif b then\nx = 2\nelse\nx = 3\nend\nfor i = 1, 3 do\nprint(i)\nend\nend";
        let want = "function loop()\n  if a then\n    x = 1\n  elseif b then\n    x = 2\n  else\n    x = 3\n  end\n  for i = 1, 3 do\n    print(i)\n  end\nend";
        assert_eq!(format_source(src), want);
    }

    #[test]
    fn multiline_literals() {
        let src = "xs = [\n1,\n2\n]\np = {\nx: 1\n}";
        assert_eq!(format_source(src), "xs = [\n  1,\n  2\n]\np = {\n  x: 1\n}");
    }

    #[test]
    fn blank_lines_and_whitespace() {
        let src = "function f() {   \n\n      x = 1\n}";
        assert_eq!(format_source(src), "function f() {\n\n  x = 1\n}");
    }

    #[test]
    fn strings_and_comments_do_not_count() {
        let src = "function f() {\nprint(\"{ end\") // }\n-- then {\n/* do\n{ */\nx = 1\n}";
        let want = "function f() {\n  print(\"{ end\") // }\n  -- then {\n  /* do\n  { */\n  x = 1\n}";
        assert_eq!(format_source(src), want);
    }

    #[test]
    fn one_line_blocks_are_neutral() {
        let src = "if a then x = 1 end\nwhile b do end\nf() { }\ny = 2";
        assert_eq!(format_source(src), src);
    }

    #[test]
    fn stray_closers_do_not_underflow() {
        assert_eq!(format_source("}\nend\nx = 1"), "}\nend\nx = 1");
    }

    #[test]
    fn idempotent_on_sample() {
        let src = "function setup() {\n    size(200, 200)\n  }\nfunction loop()\nif mouseClicked() then\n print(\"hi\")\n end\nend\n";
        let once = format_source(src);
        assert_eq!(format_source(&once), once);
    }
}
