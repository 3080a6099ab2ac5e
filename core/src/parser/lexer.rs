//! Tokeniser for the PDF object grammar (ISO 32000-1 §7.2-7.3).
//!
//! Operates directly on any `Read + Seek` source so the reader can jump to
//! arbitrary offsets found via the xref table before tokenising.

use super::{ParseError, ParseOptions, ParseResult};
use std::io::{Read, Seek, SeekFrom};

/// A single lexical token from the PDF object grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Vec<u8>),
    Name(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    Comment(String),
    Obj,
    EndObj,
    Stream,
    EndStream,
    StartXRef,
    /// `xref` keyword, table-based cross reference section
    XRef,
    /// `trailer` keyword
    Trailer,
    /// Indirect reference operator `R`
    Ref,
    Eof,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Tokeniser over a seekable byte stream.
pub struct Lexer<R: Read + Seek> {
    reader: R,
    options: ParseOptions,
    pushed_back: Option<Token>,
    position: usize,
}

impl<R: Read + Seek> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self::new_with_options(reader, ParseOptions::default())
    }

    pub fn new_with_options(reader: R, options: ParseOptions) -> Self {
        Lexer {
            reader,
            options,
            pushed_back: None,
            position: 0,
        }
    }

    /// Current byte offset in the underlying stream.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn seek_to(&mut self, offset: u64) -> ParseResult<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.position = offset as usize;
        self.pushed_back = None;
        Ok(())
    }

    /// Push a token back so the next call to `next_token` returns it again.
    pub fn push_token(&mut self, token: Token) {
        self.pushed_back = Some(token);
    }

    pub fn read_byte(&mut self) -> ParseResult<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.position += 1;
                Ok(Some(buf[0]))
            }
            Err(e) => Err(ParseError::Io(e)),
        }
    }

    pub fn peek_byte(&mut self) -> ParseResult<Option<u8>> {
        match self.read_byte()? {
            Some(b) => {
                self.reader.seek(SeekFrom::Current(-1))?;
                self.position -= 1;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> ParseResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.reader.read_exact(&mut buf)?;
        self.position += count;
        Ok(buf)
    }

    /// Consume a single newline (`\r\n`, `\r` or `\n`), as required after the
    /// `stream` keyword before raw stream data begins.
    pub fn read_newline(&mut self) -> ParseResult<()> {
        match self.read_byte()? {
            Some(b'\r') => {
                if self.peek_byte()? == Some(b'\n') {
                    self.read_byte()?;
                }
                Ok(())
            }
            Some(b'\n') => Ok(()),
            Some(other) => Err(ParseError::SyntaxError {
                position: self.position,
                message: format!("expected newline after 'stream', found byte {other:#04x}"),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    pub fn skip_whitespace(&mut self) -> ParseResult<()> {
        loop {
            match self.peek_byte()? {
                Some(b) if is_whitespace(b) => {
                    self.read_byte()?;
                }
                Some(b'%') => {
                    // Comment runs to end of line, excluding the terminator.
                    while let Some(b) = self.peek_byte()? {
                        if b == b'\n' || b == b'\r' {
                            break;
                        }
                        self.read_byte()?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Require that the next non-whitespace bytes spell `keyword` exactly.
    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        self.skip_whitespace()?;
        let bytes = self.read_bytes(keyword.len())?;
        if bytes != keyword.as_bytes() {
            return Err(ParseError::SyntaxError {
                position: self.position,
                message: format!(
                    "expected keyword '{keyword}', found {:?}",
                    String::from_utf8_lossy(&bytes)
                ),
            });
        }
        Ok(())
    }

    /// Scan forward (without permanently consuming on failure) for `keyword`
    /// within `window` bytes, used by lenient-mode recovery to relocate a
    /// corrupted `endstream`/`endobj` marker. Returns the offset it was found
    /// at relative to the lexer's current position, if any.
    pub fn find_keyword_ahead(&mut self, keyword: &str, window: usize) -> ParseResult<Option<usize>> {
        let start = self.reader.stream_position()?;
        let mut buf = vec![0u8; window];
        let n = {
            let mut read = 0;
            loop {
                match self.reader.read(&mut buf[read..]) {
                    Ok(0) => break,
                    Ok(k) => {
                        read += k;
                        if read == buf.len() {
                            break;
                        }
                    }
                    Err(e) => return Err(ParseError::Io(e)),
                }
            }
            read
        };
        self.reader.seek(SeekFrom::Start(start))?;
        let needle = keyword.as_bytes();
        let found = buf[..n]
            .windows(needle.len().max(1))
            .position(|w| w == needle);
        Ok(found)
    }

    pub fn peek_token(&mut self) -> ParseResult<Token> {
        let token = self.next_token()?;
        self.pushed_back = Some(token.clone());
        Ok(token)
    }

    pub fn next_token(&mut self) -> ParseResult<Token> {
        if let Some(token) = self.pushed_back.take() {
            return Ok(token);
        }

        self.skip_whitespace()?;

        let b = match self.peek_byte()? {
            Some(b) => b,
            None => return Ok(Token::Eof),
        };

        match b {
            b'/' => self.read_name(),
            b'(' => self.read_literal_string(),
            b'[' => {
                self.read_byte()?;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.read_byte()?;
                Ok(Token::ArrayEnd)
            }
            b'<' => {
                self.read_byte()?;
                if self.peek_byte()? == Some(b'<') {
                    self.read_byte()?;
                    Ok(Token::DictStart)
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                self.read_byte()?;
                if self.peek_byte()? == Some(b'>') {
                    self.read_byte()?;
                    Ok(Token::DictEnd)
                } else {
                    Err(ParseError::UnexpectedCharacter {
                        character: ">".to_string(),
                    })
                }
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => self.read_number(),
            _ if b.is_ascii_alphabetic() => self.read_keyword(),
            _ => Err(ParseError::UnexpectedCharacter {
                character: (b as char).to_string(),
            }),
        }
    }

    fn read_name(&mut self) -> ParseResult<Token> {
        self.read_byte()?; // consume '/'
        let mut name = String::new();
        loop {
            match self.peek_byte()? {
                Some(b) if !is_whitespace(b) && !is_delimiter(b) => {
                    self.read_byte()?;
                    if b == b'#' {
                        let hi = self.read_byte()?.ok_or(ParseError::UnexpectedEof)?;
                        let lo = self.read_byte()?.ok_or(ParseError::UnexpectedEof)?;
                        let hex = [hi, lo];
                        let hex_str = std::str::from_utf8(&hex).unwrap_or("00");
                        if let Ok(value) = u8::from_str_radix(hex_str, 16) {
                            name.push(value as char);
                        }
                    } else {
                        name.push(b as char);
                    }
                }
                _ => break,
            }
        }
        Ok(Token::Name(name))
    }

    fn read_literal_string(&mut self) -> ParseResult<Token> {
        self.read_byte()?; // consume '('
        let mut depth = 1;
        let mut result = Vec::new();
        loop {
            let b = self.read_byte()?.ok_or(ParseError::UnexpectedEof)?;
            match b {
                b'(' => {
                    depth += 1;
                    result.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    result.push(b);
                }
                b'\\' => {
                    let next = self.read_byte()?.ok_or(ParseError::UnexpectedEof)?;
                    match next {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0C),
                        b'(' => result.push(b'('),
                        b')' => result.push(b')'),
                        b'\\' => result.push(b'\\'),
                        b'\r' => {
                            if self.peek_byte()? == Some(b'\n') {
                                self.read_byte()?;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = (next - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek_byte()? {
                                    Some(d @ b'0'..=b'7') => {
                                        self.read_byte()?;
                                        value = value * 8 + (d - b'0') as u32;
                                    }
                                    _ => break,
                                }
                            }
                            result.push((value & 0xFF) as u8);
                        }
                        other => result.push(other),
                    }
                }
                _ => result.push(b),
            }
        }
        Ok(Token::String(result))
    }

    fn read_hex_string(&mut self) -> ParseResult<Token> {
        let mut digits = Vec::new();
        loop {
            let b = self.read_byte()?.ok_or(ParseError::UnexpectedEof)?;
            if b == b'>' {
                break;
            }
            if b.is_ascii_hexdigit() {
                digits.push(b);
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        let mut result = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks(2) {
            let s = std::str::from_utf8(pair).unwrap_or("00");
            result.push(u8::from_str_radix(s, 16).unwrap_or(0));
        }
        Ok(Token::String(result))
    }

    fn read_number(&mut self) -> ParseResult<Token> {
        let mut raw = String::new();
        let mut is_real = false;
        loop {
            match self.peek_byte()? {
                Some(b @ (b'0'..=b'9' | b'+' | b'-')) => {
                    raw.push(b as char);
                    self.read_byte()?;
                }
                Some(b'.') => {
                    is_real = true;
                    raw.push('.');
                    self.read_byte()?;
                }
                _ => break,
            }
        }
        if is_real {
            raw.parse::<f64>()
                .map(Token::Real)
                .map_err(|_| ParseError::SyntaxError {
                    position: self.position,
                    message: format!("invalid real number literal '{raw}'"),
                })
        } else {
            raw.parse::<i64>()
                .map(Token::Integer)
                .or_else(|_| raw.parse::<f64>().map(Token::Real))
                .map_err(|_| ParseError::SyntaxError {
                    position: self.position,
                    message: format!("invalid numeric literal '{raw}'"),
                })
        }
    }

    fn read_keyword(&mut self) -> ParseResult<Token> {
        let mut word = String::new();
        loop {
            match self.peek_byte()? {
                Some(b) if b.is_ascii_alphabetic() => {
                    word.push(b as char);
                    self.read_byte()?;
                }
                _ => break,
            }
        }
        match word.as_str() {
            "true" => Ok(Token::Boolean(true)),
            "false" => Ok(Token::Boolean(false)),
            "null" => Ok(Token::Null),
            "obj" => Ok(Token::Obj),
            "endobj" => Ok(Token::EndObj),
            "stream" => Ok(Token::Stream),
            "endstream" => Ok(Token::EndStream),
            "xref" => Ok(Token::XRef),
            "trailer" => Ok(Token::Trailer),
            "startxref" => Ok(Token::StartXRef),
            "R" => Ok(Token::Ref),
            other => Err(ParseError::UnexpectedToken {
                expected: "keyword".to_string(),
                found: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tokenises_integers_and_reals() {
        let mut lexer = Lexer::new(Cursor::new(b"123 -45 3.14 -0.5".to_vec()));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(123));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(-45));
        assert_eq!(lexer.next_token().unwrap(), Token::Real(3.14));
        assert_eq!(lexer.next_token().unwrap(), Token::Real(-0.5));
    }

    #[test]
    fn tokenises_names_with_hash_escapes() {
        let mut lexer = Lexer::new(Cursor::new(b"/Name#20With#20Spaces".to_vec()));
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Name("Name With Spaces".to_string())
        );
    }

    #[test]
    fn push_token_is_replayed_once() {
        let mut lexer = Lexer::new(Cursor::new(b"1 2".to_vec()));
        let first = lexer.next_token().unwrap();
        lexer.push_token(first.clone());
        assert_eq!(lexer.next_token().unwrap(), first);
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
    }

    #[test]
    fn recognises_indirect_reference_keyword() {
        let mut lexer = Lexer::new(Cursor::new(b"12 0 R".to_vec()));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(12));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(0));
        assert_eq!(lexer.next_token().unwrap(), Token::Ref);
    }
}
