//! Token-level JSON reader over a [`Reader`]. Numbers are returned as their
//! raw literal so the caller decides the target width.

use shapewire_buffers::Reader;

use crate::DeserializeError;

type Result<T> = std::result::Result<T, DeserializeError>;

pub(crate) struct Tokenizer<'a> {
    reader: Reader<'a>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
        }
    }

    pub fn offset(&self) -> usize {
        self.reader.x()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.reader.remaining()
    }

    fn skip_ws(&mut self) {
        self.reader
            .skip_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    /// Next significant byte, without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.reader.peek()
    }

    /// JSON kind of the next token, for error messages.
    pub fn kind(&mut self) -> &'static str {
        match self.peek() {
            None => "end of input",
            Some(b'"') => "string",
            Some(b'{') => "object",
            Some(b'[') => "array",
            Some(b't' | b'f') => "boolean",
            Some(b'n') => "null",
            Some(b'-' | b'0'..=b'9') => "number",
            Some(_) => "invalid token",
        }
    }

    /// Error for an unexpected next token.
    pub fn unexpected(&mut self, expected: &'static str) -> DeserializeError {
        match self.peek() {
            None => DeserializeError::UnexpectedEof {
                offset: self.offset(),
                expected,
            },
            Some(b) => DeserializeError::Syntax {
                offset: self.offset(),
                expected,
                found: describe(b),
            },
        }
    }

    /// Type error when the next token is a valid JSON value of another kind,
    /// syntax error otherwise.
    pub fn mismatch(&mut self, expected: &'static str) -> DeserializeError {
        match self.kind() {
            found @ ("string" | "object" | "array" | "boolean" | "null" | "number") => {
                DeserializeError::TypeMismatch { expected, found }
            }
            _ => self.unexpected(expected),
        }
    }

    /// Consumes `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.reader.eat(&[byte])
        } else {
            false
        }
    }

    pub fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn keyword(&mut self, word: &'static str) -> Result<()> {
        self.skip_ws();
        if self.reader.eat(word.as_bytes()) {
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    /// Consumes `null` if it is next.
    pub fn eat_null(&mut self) -> bool {
        self.skip_ws();
        self.reader.eat(b"null")
    }

    pub fn read_null(&mut self) -> Result<()> {
        self.keyword("null")
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.peek() {
            Some(b't') => self.keyword("true").map(|()| true),
            Some(b'f') => self.keyword("false").map(|()| false),
            _ => Err(self.mismatch("boolean")),
        }
    }

    pub fn read_string(&mut self) -> Result<String> {
        if self.peek() != Some(b'"') {
            return Err(self.mismatch("string"));
        }
        self.reader.try_u8()?;
        let mut out = String::new();
        loop {
            let mut run = 0;
            while let Some(b) = self.reader.peek_at(run) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                run += 1;
            }
            out.push_str(self.reader.try_utf8(run)?);
            match self.reader.peek() {
                None => return Err(self.unexpected("closing quote")),
                Some(b'"') => {
                    self.reader.try_u8()?;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.reader.try_u8()?;
                    self.read_escape(&mut out)?;
                }
                Some(b) => {
                    return Err(DeserializeError::Syntax {
                        offset: self.offset(),
                        expected: "string character",
                        found: describe(b),
                    })
                }
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<()> {
        let offset = self.offset();
        let c = match self.reader.try_u8()? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let high = self.read_hex4()?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    if !self.reader.eat(b"\\u") {
                        return Err(self.unexpected("low surrogate escape"));
                    }
                    let low = self.read_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(DeserializeError::Syntax {
                            offset,
                            expected: "low surrogate escape",
                            found: format!("\\u{low:04x}"),
                        });
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                char::from_u32(code).ok_or_else(|| DeserializeError::Syntax {
                    offset,
                    expected: "unicode scalar value",
                    found: format!("\\u{code:04x}"),
                })?
            }
            b => {
                return Err(DeserializeError::Syntax {
                    offset,
                    expected: "escape character",
                    found: describe(b),
                })
            }
        };
        out.push(c);
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let offset = self.offset();
        let digits = self.reader.try_buf(4)?;
        let mut code = 0u32;
        for &d in digits {
            let v = (d as char).to_digit(16).ok_or_else(|| DeserializeError::Syntax {
                offset,
                expected: "four hex digits",
                found: String::from_utf8_lossy(digits).into_owned(),
            })?;
            code = code * 16 + v;
        }
        Ok(code)
    }

    /// Raw number literal, validated against the JSON number grammar.
    pub fn read_number(&mut self) -> Result<&'a str> {
        if !matches!(self.peek(), Some(b'-' | b'0'..=b'9')) {
            return Err(self.mismatch("number"));
        }
        let input = self.reader.remaining();
        let digits_from = |i: usize| input[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        let mut len = usize::from(input[0] == b'-');
        let int_digits = digits_from(len);
        if int_digits == 0 || (int_digits > 1 && input[len] == b'0') {
            return Err(self.invalid_number(len + int_digits));
        }
        len += int_digits;
        if input.get(len) == Some(&b'.') {
            let frac = digits_from(len + 1);
            if frac == 0 {
                return Err(self.invalid_number(len + 1));
            }
            len += 1 + frac;
        }
        if matches!(input.get(len), Some(b'e' | b'E')) {
            len += 1;
            if matches!(input.get(len), Some(b'+' | b'-')) {
                len += 1;
            }
            let exp = digits_from(len);
            if exp == 0 {
                return Err(self.invalid_number(len));
            }
            len += exp;
        }
        Ok(self.reader.try_utf8(len)?)
    }

    fn invalid_number(&self, len: usize) -> DeserializeError {
        let input = self.reader.remaining();
        let end = (len + 1).min(input.len());
        DeserializeError::InvalidNumber(String::from_utf8_lossy(&input[..end]).into_owned())
    }

    /// Consumes one complete value of any kind. Nesting is tracked on the
    /// heap, so any depth of valid input is skipped.
    pub fn skip_value(&mut self) -> Result<()> {
        // closing bracket of every container entered so far
        let mut open = Vec::new();
        loop {
            match self.peek() {
                Some(b'"') => self.read_string().map(drop)?,
                Some(b't' | b'f') => self.read_bool().map(drop)?,
                Some(b'n') => self.read_null()?,
                Some(b'-' | b'0'..=b'9') => self.read_number().map(drop)?,
                Some(b'[') => {
                    self.reader.try_u8()?;
                    if !self.eat(b']') {
                        open.push(b']');
                        continue;
                    }
                }
                Some(b'{') => {
                    self.reader.try_u8()?;
                    if !self.eat(b'}') {
                        open.push(b'}');
                        self.object_key()?;
                        continue;
                    }
                }
                _ => return Err(self.unexpected("value")),
            }
            // a value is complete: close finished containers, then expect
            // the separator before the next entry
            loop {
                match open.last() {
                    None => return Ok(()),
                    Some(&close) if self.eat(close) => {
                        open.pop();
                    }
                    Some(b']') => {
                        self.expect(b',', "',' or ']'")?;
                        break;
                    }
                    Some(_) => {
                        self.expect(b',', "',' or '}'")?;
                        self.object_key()?;
                        break;
                    }
                }
            }
        }
    }

    fn object_key(&mut self) -> Result<()> {
        self.read_string()?;
        self.expect(b':', "':'")
    }

    /// Ok when only whitespace is left.
    pub fn end(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(b) => Err(DeserializeError::Syntax {
                offset: self.offset(),
                expected: "end of input",
                found: describe(b),
            }),
        }
    }
}

fn describe(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("byte 0x{b:02x}")
    }
}
