//! Best-effort recovery of a sketch line from an error message and stack.
//!
//! Errors raised by the interpreter already carry their line; this is for
//! failures that arrive without one. The scans are heuristics and return
//! `None` rather than guess when none of them applies.

/// Tries, in order:
/// 1. a `line N` mention in the message
/// 2. a `position N` character offset in the message
/// 3. the first `:L:C` marker in the stack, minus `wrapper_offset`
/// 4. source scans: the identifier an "undefined" message names, the first
///    line where brackets close more than they opened, a `function` line
///    with no parameter list or body opener
///
/// Every candidate must fall inside the source, otherwise the next rule runs.
pub fn locate_line(message: &str, stack: &str, source: &str, wrapper_offset: usize) -> Option<usize> {
    let lines: Vec<&str> = source.split('\n').collect();
    let in_source = |n: usize| (1..=lines.len()).contains(&n);

    if let Some(n) = number_after(message, "line").filter(|&n| in_source(n)) {
        return Some(n);
    }

    if let Some(offset) = number_after(message, "position").filter(|&p| p < source.len()) {
        let line = source[..floor_char_boundary(source, offset)].matches('\n').count() + 1;
        return Some(line);
    }

    if let Some(line) = stack.lines().find_map(stack_line) {
        let adjusted = line.checked_sub(wrapper_offset).filter(|&n| in_source(n));
        if adjusted.is_some() {
            return adjusted;
        }
    }

    if let Some(name) = undefined_name(message) {
        let found = lines
            .iter()
            .position(|l| !is_comment(l) && contains_word(l, name))
            .map(|i| i + 1);
        if found.is_some() {
            return found;
        }
    }

    first_unbalanced_line(&lines).or_else(|| dangling_function_line(&lines))
}

// ─── Message scans ────────────────────────────────────────────────────────────

/// `word` (case-insensitive) followed by `:` or whitespace, then digits.
fn number_after(text: &str, word: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    lower.match_indices(word).find_map(|(i, _)| {
        let rest = &text[i + word.len()..];
        let rest = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        if rest.len() == text.len() - i - word.len() {
            return None;
        }
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    })
}

/// Line of the first `:L:C` pair in one stack entry.
fn stack_line(entry: &str) -> Option<usize> {
    let bytes = entry.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            let line_digits = digits_at(bytes, i + 1);
            if line_digits > 0 {
                let after = i + 1 + line_digits;
                if bytes.get(after) == Some(&b':') && digits_at(bytes, after + 1) > 0 {
                    return entry[i + 1..after].parse().ok();
                }
            }
        }
        i += 1;
    }
    None
}

fn digits_at(bytes: &[u8], start: usize) -> usize {
    bytes.get(start..).map_or(0, |b| b.iter().take_while(|c| c.is_ascii_digit()).count())
}

/// The name in ``undefined variable `x` `` / ``undefined function `x` `` or
/// `x is not defined`.
fn undefined_name(message: &str) -> Option<&str> {
    for prefix in ["undefined variable `", "undefined function `"] {
        if let Some(start) = message.find(prefix) {
            let rest = &message[start + prefix.len()..];
            return rest.find('`').map(|end| &rest[..end]);
        }
    }
    let end = message.find(" is not defined")?;
    let head = message[..end].trim_end_matches('\'');
    let start = head.rfind(|c: char| !is_word_char(c)).map_or(0, |i| i + 1);
    Some(&head[start..]).filter(|s| !s.is_empty())
}

// ─── Source scans ─────────────────────────────────────────────────────────────

fn first_unbalanced_line(lines: &[&str]) -> Option<usize> {
    let mut depth = 0i64;
    for (i, line) in lines.iter().enumerate() {
        for c in code_part(line).chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Some(i + 1);
            }
        }
    }
    None
}

fn dangling_function_line(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| {
            let code = code_part(line).trim_start();
            code.strip_prefix("function")
                .is_some_and(|rest| rest.starts_with(char::is_whitespace) || rest.is_empty())
                && !code.contains('(')
                && !code.contains('{')
        })
        .map(|i| i + 1)
}

fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("--")
}

/// The line up to a `//` or `--` comment.
fn code_part(line: &str) -> &str {
    [line.find("//"), line.find("--")]
        .into_iter()
        .flatten()
        .min()
        .map_or(line, |i| &line[..i])
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn contains_word(line: &str, word: &str) -> bool {
    line.match_indices(word).any(|(i, _)| {
        let before = line[..i].chars().next_back();
        let after = line[i + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
