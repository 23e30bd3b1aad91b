//! Reader for JavaScript/TypeScript configuration modules.
//!
//! Config modules are almost always a single exported object literal:
//!
//! ```js
//! /** @type {import('tailwindcss').Config} */
//! export default {
//!   content: ["./index.html", "./src/**/*.{vue,js,ts,jsx,tsx}"],
//!   plugins: [require('@tailwindcss/forms')],
//! }
//! ```
//!
//! This module reads the static subset of the language those files use:
//! imports, `const` bindings, `export default` / `module.exports`, and literal
//! expressions. Anything that needs evaluation (functions, template
//! interpolation, operators) is rejected with a positioned [`ParseError`].

use super::literal::Literal;
use super::source::SourceFormat;
use crate::error::ParseError;
use std::collections::HashMap;

/// Parse a config module and return its default export.
pub fn parse_module(text: &str) -> Result<Literal, ParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        bindings: HashMap::new(),
        export: None,
    };
    parser.module()?;
    match parser.export {
        Some(value) => Ok(value),
        None => Err(ParseError::new(
            SourceFormat::Script,
            "module has no default export (expected `export default` or `module.exports =`)",
        )),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Num(f64),
    Punct(&'static str),
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Ident(name) => format!("'{}'", name),
            Tok::Str(_) => "string".to_string(),
            Tok::Num(_) => "number".to_string(),
            Tok::Punct(p) => format!("'{}'", p),
            Tok::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    column: usize,
}

// Longest first so `...` wins over `.` and `=>` over `=`.
const PUNCTUATORS: &[&str] = &[
    "...", "=>", "?.", "{", "}", "[", "]", "(", ")", ",", ":", ";", "=", ".", "<", ">", "|",
    "&", "?", "!", "+", "-", "*", "/", "%",
];

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(SourceFormat::Script, message).at(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    tok: Tok::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let tok = if c == '"' || c == '\'' || c == '`' {
                Tok::Str(self.string(c)?)
            } else if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
                Tok::Num(self.number()?)
            } else if c == '_' || c == '$' || c.is_alphabetic() {
                Tok::Ident(self.ident())
            } else if let Some(&p) = PUNCTUATORS.iter().find(|p| self.src[self.pos..].starts_with(**p)) {
                for _ in 0..p.len() {
                    self.bump();
                }
                Tok::Punct(p)
            } else {
                return Err(self.error(format!("unexpected character '{}'", c)));
            };
            tokens.push(Token { tok, line, column });
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(ParseError::new(
                                    SourceFormat::Script,
                                    "unterminated block comment",
                                )
                                .at(line, column));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(ParseError::new(SourceFormat::Script, "unterminated string literal")
                    .at(line, column));
            };
            match c {
                c if c == quote => return Ok(out),
                '\n' if quote != '`' => {
                    return Err(ParseError::new(SourceFormat::Script, "unterminated string literal")
                        .at(line, column));
                }
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return Err(self.error("template interpolation is not supported in static config"));
                }
                '\\' => out.push(self.escape()?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'x' => self.hex_escape(2)?,
            'u' if self.peek() == Some('{') => {
                self.bump();
                let mut digits = String::new();
                while let Some(d) = self.bump() {
                    if d == '}' {
                        break;
                    }
                    digits.push(d);
                }
                self.code_point(&digits)?
            }
            'u' => self.hex_escape(4)?,
            other => other,
        })
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, ParseError> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.bump() {
                Some(d) => digits.push(d),
                None => return Err(self.error("unterminated escape sequence")),
            }
        }
        self.code_point(&digits)
    }

    fn code_point(&self, digits: &str) -> Result<char, ParseError> {
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid escape sequence '{}'", digits)))
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
            let digits = self.src[digits_start..self.pos].replace('_', "");
            return u64::from_str_radix(&digits, 16)
                .map(|n| n as f64)
                .map_err(|_| self.error("invalid hex number"));
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '_' || c == 'e' || c == 'E')
        {
            let c = self.bump();
            if matches!(c, Some('e' | 'E')) && matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
        }
        let text = self.src[start..self.pos].replace('_', "");
        text.parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{}'", text)))
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c == '_' || c == '$' || c.is_alphanumeric())
        {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }
}

/// Deepest expression nesting accepted, matching serde_json's recursion limit.
const MAX_DEPTH: usize = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    bindings: HashMap<String, Literal>,
    export: Option<Literal>,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn peek_nth(&self, n: usize) -> &Tok {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].tok
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].tok.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = &self.tokens[self.pos];
        ParseError::new(SourceFormat::Script, message).at(token.line, token.column)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error(format!(
            "expected {}, found {}",
            expected,
            self.peek().describe()
        ))
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Tok::Punct(q) if *q == p)
    }

    fn is_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Tok::Ident(name) if name == word)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.is_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), ParseError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", p)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Tok::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Tok::Str(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("a string")),
        }
    }

    fn module(&mut self) -> Result<(), ParseError> {
        while *self.peek() != Tok::Eof {
            if self.eat_punct(";") {
                continue;
            }
            self.statement()?;
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        if self.eat_keyword("import") {
            return self.import();
        }
        if self.eat_keyword("export") {
            if self.eat_keyword("default") {
                let value = self.exported_expression()?;
                return self.set_export(value);
            }
            if self.is_keyword("const") || self.is_keyword("let") || self.is_keyword("var") {
                return self.declaration();
            }
            if self.eat_keyword("type") || self.eat_keyword("interface") {
                return self.skip_type_declaration();
            }
            return Err(self.unexpected("'default' or a declaration after 'export'"));
        }
        if self.is_keyword("const") || self.is_keyword("let") || self.is_keyword("var") {
            return self.declaration();
        }
        if (self.is_keyword("type") || self.is_keyword("interface"))
            && matches!(self.peek_nth(1), Tok::Ident(_))
        {
            self.advance();
            return self.skip_type_declaration();
        }
        if self.is_keyword("module") && matches!(self.peek_nth(1), Tok::Punct(".")) {
            self.advance();
            self.advance();
            let prop = self.expect_ident()?;
            if prop != "exports" {
                return Err(self.error(format!("unsupported assignment to module.{}", prop)));
            }
            self.expect_punct("=")?;
            let value = self.exported_expression()?;
            return self.set_export(value);
        }
        if self.is_keyword("function") || self.is_keyword("class") {
            return Err(self.error("function and class declarations are not supported in static config"));
        }
        // Bare expression statements such as `'use strict'`.
        self.expression()?;
        Ok(())
    }

    fn set_export(&mut self, value: Literal) -> Result<(), ParseError> {
        if self.export.is_some() {
            return Err(self.error("module has more than one default export"));
        }
        self.export = Some(value);
        Ok(())
    }

    fn exported_expression(&mut self) -> Result<Literal, ParseError> {
        let value = self.expression()?;
        while self.eat_keyword("satisfies") || self.eat_keyword("as") {
            self.skip_type()?;
        }
        Ok(value)
    }

    fn import(&mut self) -> Result<(), ParseError> {
        // `import 'side-effect'`
        if let Tok::Str(_) = self.peek() {
            self.advance();
            return Ok(());
        }
        if self.is_keyword("type") && !matches!(self.peek_nth(1), Tok::Ident(w) if w == "from")
        {
            while !self.is_punct(";") && *self.peek() != Tok::Eof && !self.is_keyword("from") {
                self.advance();
            }
            if self.eat_keyword("from") {
                self.expect_string()?;
            }
            return Ok(());
        }

        let mut names: Vec<String> = Vec::new();
        loop {
            if self.eat_punct("*") {
                if !self.eat_keyword("as") {
                    return Err(self.unexpected("'as'"));
                }
                names.push(self.expect_ident()?);
            } else if self.eat_punct("{") {
                while !self.eat_punct("}") {
                    let is_type = self.is_keyword("type") && matches!(self.peek_nth(1), Tok::Ident(_));
                    if is_type {
                        self.advance();
                    }
                    let imported = self.expect_ident()?;
                    let local = if self.eat_keyword("as") {
                        self.expect_ident()?
                    } else {
                        imported
                    };
                    if !is_type {
                        names.push(local);
                    }
                    if !self.eat_punct(",") {
                        self.expect_punct("}")?;
                        break;
                    }
                }
            } else {
                names.push(self.expect_ident()?);
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        if !self.eat_keyword("from") {
            return Err(self.unexpected("'from'"));
        }
        let spec = self.expect_string()?;
        for name in names {
            self.bindings.insert(name, require_call(&spec));
        }
        Ok(())
    }

    fn declaration(&mut self) -> Result<(), ParseError> {
        self.advance();
        loop {
            if self.is_punct("{") || self.is_punct("[") {
                return Err(self.error("destructuring declarations are not supported in static config"));
            }
            let name = self.expect_ident()?;
            if self.eat_punct(":") {
                self.skip_type()?;
            }
            self.expect_punct("=")?;
            let value = self.expression()?;
            while self.eat_keyword("satisfies") || self.eat_keyword("as") {
                self.skip_type()?;
            }
            self.bindings.insert(name, value);
            if !self.eat_punct(",") {
                return Ok(());
            }
        }
    }

    /// Skip a type annotation up to the next token that cannot continue it.
    fn skip_type(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Tok::Eof => return Ok(()),
                Tok::Punct("<" | "(" | "[" | "{") => depth += 1,
                Tok::Punct(">" | ")" | "]" | "}") if depth > 0 => depth -= 1,
                Tok::Punct("=" | ";" | "," | ")" | "]" | "}") if depth == 0 => return Ok(()),
                Tok::Ident(_) | Tok::Str(_) | Tok::Num(_) if depth == 0 => {
                    // A type ends where two atoms would sit next to each other.
                    self.advance();
                    if !matches!(self.peek(), Tok::Punct("." | "<" | "[" | "|" | "&")) {
                        return Ok(());
                    }
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_type_declaration(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.advance() {
                Tok::Eof => return Ok(()),
                Tok::Punct("{" | "(" | "[" | "<") => depth += 1,
                Tok::Punct("}" | ")" | "]" | ">") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && !self.is_punct("|") && !self.is_punct("&") && !self.is_punct("[") {
                        self.eat_punct(";");
                        return Ok(());
                    }
                }
                Tok::Punct(";") if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }

    fn expression(&mut self) -> Result<Literal, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting too deep (more than {} levels)", MAX_DEPTH)));
        }
        self.depth += 1;
        let value = self.postfix();
        self.depth -= 1;
        value
    }

    fn postfix(&mut self) -> Result<Literal, ParseError> {
        let mut value = self.primary()?;
        loop {
            if self.is_punct(".") || self.is_punct("?.") {
                self.advance();
                let prop = self.expect_ident()?;
                value = member(value, &prop).map_err(|message| self.error(message))?;
            } else if self.is_punct("[") {
                return Err(self.error("computed member access is not supported in static config"));
            } else if self.eat_punct("(") {
                let args = self.list(")")?;
                value = Literal::Call {
                    callee: Box::new(value),
                    args,
                };
            } else if self.is_punct("=>") {
                return Err(self.error("arrow functions are not supported in static config"));
            } else {
                return Ok(value);
            }
        }
    }

    fn primary(&mut self) -> Result<Literal, ParseError> {
        match self.peek().clone() {
            Tok::Str(s) => {
                self.advance();
                Ok(Literal::String(s))
            }
            Tok::Num(n) => {
                self.advance();
                Ok(Literal::Number(n))
            }
            Tok::Punct("-") if matches!(self.peek_nth(1), Tok::Num(_)) => {
                self.advance();
                match self.advance() {
                    Tok::Num(n) => Ok(Literal::Number(-n)),
                    _ => Err(self.unexpected("a number")),
                }
            }
            Tok::Punct("{") => {
                self.advance();
                self.object()
            }
            Tok::Punct("[") => {
                self.advance();
                Ok(Literal::Array(self.list("]")?))
            }
            Tok::Punct("(") => {
                if self.looks_like_arrow() {
                    return Err(self.error("arrow functions are not supported in static config"));
                }
                self.advance();
                let value = self.expression()?;
                self.expect_punct(")")?;
                Ok(value)
            }
            Tok::Ident(name) => {
                match name.as_str() {
                    "function" | "async" | "class" | "new" => {
                        return Err(self.error(format!("'{}' expressions are not supported in static config", name)));
                    }
                    _ => {}
                }
                if matches!(self.peek_nth(1), Tok::Punct("=>")) {
                    return Err(self.error("arrow functions are not supported in static config"));
                }
                self.advance();
                Ok(match name.as_str() {
                    "true" => Literal::Bool(true),
                    "false" => Literal::Bool(false),
                    "null" | "undefined" => Literal::Null,
                    _ => self
                        .bindings
                        .get(&name)
                        .cloned()
                        .unwrap_or(Literal::Ident(name)),
                })
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// `(a, b) => ...` starts like a parenthesized expression.
    fn looks_like_arrow(&self) -> bool {
        let close = self.tokens[self.pos..]
            .iter()
            .scan(0usize, |depth, t| {
                match t.tok {
                    Tok::Punct("(") => *depth += 1,
                    Tok::Punct(")") => *depth = depth.saturating_sub(1),
                    _ => {}
                }
                Some(*depth)
            })
            .position(|d| d == 0);
        match close {
            Some(offset) => matches!(self.peek_nth(offset + 1), Tok::Punct("=>")),
            None => false,
        }
    }

    fn list(&mut self, close: &str) -> Result<Vec<Literal>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.eat_punct(close) {
                return Ok(items);
            }
            if self.eat_punct("...") {
                match self.expression()? {
                    Literal::Array(spread) => items.extend(spread),
                    other => {
                        return Err(self.error(format!(
                            "cannot spread {} into an array in static config",
                            other.kind()
                        )));
                    }
                }
            } else {
                items.push(self.expression()?);
            }
            if !self.eat_punct(",") {
                self.expect_punct(close)?;
                return Ok(items);
            }
        }
    }

    fn object(&mut self) -> Result<Literal, ParseError> {
        let mut entries = SpreadEntries::default();
        loop {
            if self.eat_punct("}") {
                return Ok(Literal::Object(entries.items));
            }
            if self.eat_punct("...") {
                match self.expression()? {
                    Literal::Object(spread) => {
                        if let Some(key) = repeated_key(&spread) {
                            return Err(self.error(format!(
                                "key '{}' is defined more than once in the spread object",
                                key
                            )));
                        }
                        for (key, value) in spread {
                            entries.insert(key, value, true);
                        }
                    }
                    other => {
                        return Err(self.error(format!(
                            "cannot spread {} into an object in static config",
                            other.kind()
                        )));
                    }
                }
            } else {
                let key = match self.peek().clone() {
                    Tok::Ident(name) => name,
                    Tok::Str(s) => s,
                    Tok::Num(n) => number_key(n),
                    Tok::Punct("[") => {
                        return Err(self.error("computed property keys are not supported in static config"));
                    }
                    _ => return Err(self.unexpected("a property name")),
                };
                self.advance();
                if self.is_punct("(") {
                    return Err(self.error("method definitions are not supported in static config"));
                }
                if self.eat_punct(":") {
                    let value = self.expression()?;
                    entries.insert(key, value, false);
                } else {
                    // Shorthand `{ colors }`.
                    let value = self
                        .bindings
                        .get(&key)
                        .cloned()
                        .unwrap_or_else(|| Literal::Ident(key.clone()));
                    entries.insert(key, value, false);
                }
            }
            if !self.eat_punct(",") {
                self.expect_punct("}")?;
                return Ok(Literal::Object(entries.items));
            }
        }
    }
}

/// Object entries under construction.
///
/// A key repeated across a spread replaces the earlier value in place, as in
/// JavaScript. Two explicit properties with the same key are both kept so
/// validation reports them.
#[derive(Default)]
struct SpreadEntries {
    items: Vec<(String, Literal)>,
    spread: Vec<bool>,
}

impl SpreadEntries {
    fn insert(&mut self, key: String, value: Literal, from_spread: bool) {
        let existing = self
            .items
            .iter()
            .enumerate()
            .rev()
            .find(|(idx, (k, _))| *k == key && (from_spread || self.spread[*idx]))
            .map(|(idx, _)| idx);
        match existing {
            Some(idx) => {
                self.items[idx].1 = value;
                self.spread[idx] = from_spread;
            }
            None => {
                self.items.push((key, value));
                self.spread.push(from_spread);
            }
        }
    }
}

/// First key that appears more than once.
fn repeated_key(entries: &[(String, Literal)]) -> Option<&str> {
    entries
        .iter()
        .enumerate()
        .find(|(idx, (key, _))| entries[..*idx].iter().any(|(k, _)| k == key))
        .map(|(_, (key, _))| key.as_str())
}

fn require_call(spec: &str) -> Literal {
    Literal::Call {
        callee: Box::new(Literal::Ident("require".to_string())),
        args: vec![Literal::String(spec.to_string())],
    }
}

fn number_key(n: f64) -> String {
    match Literal::Number(n).to_json() {
        Some(value) => value.to_string(),
        None => n.to_string(),
    }
}

/// Static member access: objects are looked into, unresolved names extend the path.
fn member(value: Literal, prop: &str) -> Result<Literal, String> {
    if let Some(spec) = value.as_require().map(str::to_string) {
        return Ok(if prop == "default" {
            value
        } else {
            Literal::Ident(format!("{}.{}", spec, prop))
        });
    }
    match value {
        Literal::Object(entries) => {
            let mut matches = entries.into_iter().filter(|(k, _)| k == prop);
            let first = matches.next();
            if matches.next().is_some() {
                return Err(format!("key '{}' is defined more than once in the referenced object", prop));
            }
            Ok(first.map(|(_, v)| v).unwrap_or(Literal::Null))
        }
        Literal::Ident(path) => Ok(Literal::Ident(format!("{}.{}", path, prop))),
        _ => Err(format!("cannot read property '{}' in static config", prop)),
    }
}
