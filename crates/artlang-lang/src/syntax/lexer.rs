use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    text: &'a str,
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { text: source, source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<Error>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            match self.next_token() {
                Ok(Some(tok)) => tokens.push(tok),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() { Ok(tokens) } else { Err(errors) }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let line = self.line;
        let col = self.column;
        let ch = self.advance();

        let kind = match ch {
            b'%' => TokenKind::Percent,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,

            b'+' => {
                if self.peek() == b'=' { self.advance(); TokenKind::PlusEq }
                else { TokenKind::Plus }
            }
            b'*' => {
                if self.peek() == b'=' { self.advance(); TokenKind::StarEq }
                else { TokenKind::Star }
            }
            b'-' => {
                if self.peek() == b'-' { self.skip_line(); return Ok(None); }
                else if self.peek() == b'=' { self.advance(); TokenKind::MinusEq }
                else { TokenKind::Minus }
            }
            b'/' => {
                if self.peek() == b'/' { self.skip_line(); return Ok(None); }
                else if self.peek() == b'*' { self.skip_block_comment(); return Ok(None); }
                else if self.peek() == b'=' { self.advance(); TokenKind::SlashEq }
                else { TokenKind::Slash }
            }
            b'=' => {
                if self.peek() == b'=' { self.advance(); TokenKind::EqEq }
                else { TokenKind::Eq }
            }
            b'!' => {
                if self.peek() == b'=' { self.advance(); TokenKind::BangEq }
                else { TokenKind::Not }
            }
            b'~' => {
                if self.peek() == b'=' { self.advance(); TokenKind::BangEq }
                else {
                    return Err(Error::new(ErrorCode::L001, line, col,
                        "expected `~=`, bare `~` is not valid"));
                }
            }
            b'&' => {
                if self.peek() == b'&' { self.advance(); TokenKind::And }
                else {
                    return Err(Error::new(ErrorCode::L001, line, col,
                        "expected `&&`, bare `&` is not valid"));
                }
            }
            b'|' => {
                if self.peek() == b'|' { self.advance(); TokenKind::Or }
                else {
                    return Err(Error::new(ErrorCode::L001, line, col,
                        "expected `||`, bare `|` is not valid"));
                }
            }
            b'<' => {
                if self.peek() == b'=' { self.advance(); TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'=' { self.advance(); TokenKind::GtEq }
                else { TokenKind::Gt }
            }

            b'"' | b'\'' => TokenKind::StringLit(self.read_string(ch, line, col)?),
            b'0'..=b'9' => TokenKind::Number(self.read_number(ch)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(ch)),

            _ => {
                let other = self.unexpected_char();
                return Err(Error::new(ErrorCode::L001, line, col,
                    format!("unexpected character `{other}`")));
            }
        };

        Ok(Some(Token::new(kind, line, col)))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        // columns count characters: UTF-8 continuation bytes add none
        else if ch & 0xC0 != 0x80 { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.source.len() { 0 } else { self.source[self.pos + 1] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // consume *
        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance(); // *
                self.advance(); // /
                break;
            }
            self.advance();
        }
    }

    /// The byte at `pos - 1` started a character we don't recognise. Consume the
    /// rest of its UTF-8 sequence so one stray glyph yields one error.
    fn unexpected_char(&mut self) -> char {
        let start = self.pos - 1;
        let ch = self.text.get(start..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        for _ in 1..ch.len_utf8() {
            if self.is_at_end() { break; }
            self.pos += 1;
        }
        ch
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_string(&mut self, quote: u8, start_line: usize, start_col: usize) -> Result<String, Error> {
        let mut bytes = Vec::new();
        let mut error: Option<Error> = None;
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(Error::new(ErrorCode::L002, start_line, start_col,
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == quote { break; }
            if ch == b'\\' {
                let esc_line = self.line;
                let esc_col  = self.column;
                if self.is_at_end() { continue; }
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b't'  => bytes.push(b'\t'),
                    b'r'  => bytes.push(b'\r'),
                    b'0'  => bytes.push(0),
                    b'"'  => bytes.push(b'"'),
                    b'\'' => bytes.push(b'\''),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        // Keep consuming after a bad escape so the remainder of the
                        // string doesn't produce cascading errors.
                        if error.is_none() {
                            error = Some(Error::new(ErrorCode::L003, esc_line, esc_col,
                                format!("unknown escape sequence `\\{}`", other as char)));
                        }
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        if let Some(e) = error { return Err(e); }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, first: u8) -> f64 {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance() as char);
        }
        // a `.` only belongs to the number when a digit follows (`xs.length` stays a field access)
        if !self.is_at_end() && self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            s.push(self.advance() as char);
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                s.push(self.advance() as char);
            }
        }
        s.parse().unwrap_or(0.0)
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            s.push(self.advance() as char);
        }
        s
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lex(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> Vec<Error> {
        Lexer::new(src).tokenize().unwrap_err()
    }

    fn ident(s: &str) -> TokenKind { TokenKind::Ident(s.into()) }

    #[test]
    fn empty() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn integer_and_decimal() {
        assert_eq!(lex("42"), vec![TokenKind::Number(42.0), TokenKind::Eof]);
        assert_eq!(lex("3.14"), vec![TokenKind::Number(3.14), TokenKind::Eof]);
    }

    #[test]
    fn dot_not_consumed_by_number() {
        assert_eq!(
            lex("xs.length"),
            vec![ident("xs"), TokenKind::Dot, ident("length"), TokenKind::Eof]
        );
        assert_eq!(
            lex("1.x"),
            vec![TokenKind::Number(1.0), TokenKind::Dot, ident("x"), TokenKind::Eof]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(lex("function"), vec![TokenKind::Function, TokenKind::Eof]);
        assert_eq!(lex("end"),      vec![TokenKind::End,      TokenKind::Eof]);
        assert_eq!(lex("elseif"),   vec![TokenKind::ElseIf,   TokenKind::Eof]);
        assert_eq!(lex("do"),       vec![TokenKind::Do,       TokenKind::Eof]);
        assert_eq!(lex("var"),      vec![TokenKind::Var,      TokenKind::Eof]);
        assert_eq!(lex("let"),      vec![TokenKind::Var,      TokenKind::Eof]);
        assert_eq!(lex("nil"),      vec![TokenKind::Nil,      TokenKind::Eof]);
        assert_eq!(lex("null"),     vec![TokenKind::Nil,      TokenKind::Eof]);
    }

    #[test]
    fn word_and_symbolic_logic_are_the_same_token() {
        assert_eq!(lex("and"), lex("&&"));
        assert_eq!(lex("or"),  lex("||"));
        assert_eq!(lex("not"), lex("!"));
        assert_eq!(lex("~="),  lex("!="));
    }

    #[test]
    fn logic_words_inside_identifiers_stay_identifiers() {
        assert_eq!(lex("random"), vec![ident("random"), TokenKind::Eof]);
        assert_eq!(lex("order"),  vec![ident("order"),  TokenKind::Eof]);
        assert_eq!(lex("note"),   vec![ident("note"),   TokenKind::Eof]);
        assert_eq!(lex("format"), vec![ident("format"), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(lex("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(lex("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(lex(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
        assert_eq!(lex("+="), vec![TokenKind::PlusEq, TokenKind::Eof]);
        assert_eq!(
            lex("a<=b"),
            vec![ident("a"), TokenKind::LtEq, ident("b"), TokenKind::Eof]
        );
    }

    #[test]
    fn comments_skipped() {
        assert_eq!(lex("// comment\n42"), vec![TokenKind::Number(42.0), TokenKind::Eof]);
        assert_eq!(lex("-- comment\n42"), vec![TokenKind::Number(42.0), TokenKind::Eof]);
        assert_eq!(lex("/* a\nb */42"),   vec![TokenKind::Number(42.0), TokenKind::Eof]);
    }

    #[test]
    fn double_minus_starts_a_comment() {
        assert_eq!(lex("5--3"), vec![TokenKind::Number(5.0), TokenKind::Eof]);
        assert_eq!(
            lex("5 - -3"),
            vec![TokenKind::Number(5.0), TokenKind::Minus, TokenKind::Minus, TokenKind::Number(3.0), TokenKind::Eof]
        );
    }

    #[test]
    fn string_quotes() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::StringLit("hello".into()), TokenKind::Eof]);
        assert_eq!(lex("'hi'"), vec![TokenKind::StringLit("hi".into()), TokenKind::Eof]);
        assert_eq!(lex(r#"'say "hi"'"#), vec![TokenKind::StringLit("say \"hi\"".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(lex(r#""a\nb""#),  vec![TokenKind::StringLit("a\nb".into()), TokenKind::Eof]);
        assert_eq!(lex(r#""a\tb""#),  vec![TokenKind::StringLit("a\tb".into()), TokenKind::Eof]);
        assert_eq!(lex(r#""\"q\"""#), vec![TokenKind::StringLit("\"q\"".into()), TokenKind::Eof]);
        assert_eq!(lex(r"'it\'s'"),   vec![TokenKind::StringLit("it's".into()), TokenKind::Eof]);
        assert_eq!(lex(r#""\\""#),    vec![TokenKind::StringLit("\\".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_keeps_utf8() {
        assert_eq!(lex("\"héllo ✓\""), vec![TokenKind::StringLit("héllo ✓".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_error() {
        let errs = lex_err(r#""oops"#);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L002);
    }

    #[test]
    fn invalid_escape_error() {
        let errs = lex_err(r#""\q""#);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L003);
    }

    #[test]
    fn unknown_character_error() {
        let errs = lex_err("x = 1 @ 2");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L001);
        assert_eq!((errs[0].line, errs[0].column), (1, 7));
    }

    #[test]
    fn multibyte_stray_character_is_one_error() {
        let errs = lex_err("x = 1 é");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains('é'));
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let tokens = Lexer::new("s = \"café ☕\" + x").tokenize().unwrap();
        assert_eq!(tokens[3].kind, TokenKind::Plus);
        assert_eq!(tokens[3].column, 14);
        assert_eq!(tokens[4].column, 16);

        let errs = lex_err("t = \"ü\" $");
        assert_eq!((errs[0].line, errs[0].column), (1, 9));
    }

    #[test]
    fn function_header() {
        assert_eq!(
            lex("function add(a, b)"),
            vec![
                TokenKind::Function,
                ident("add"),
                TokenKind::LParen,
                ident("a"), TokenKind::Comma, ident("b"),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_closers() {
        assert!(TokenKind::ElseIf.ends_block());
        assert!(TokenKind::Eof.ends_block());
        assert!(!TokenKind::Then.ends_block());
    }

    proptest! {
        #[test]
        fn never_panics(src in "\\PC{0,64}") {
            let _ = Lexer::new(&src).tokenize();
        }

        #[test]
        fn integers_round_trip(n in 0u32..1_000_000) {
            prop_assert_eq!(lex(&n.to_string()), vec![TokenKind::Number(n as f64), TokenKind::Eof]);
        }
    }
}
