//! PDF Content Stream Parser - Complete support for PDF graphics operators
//!
//! This module implements comprehensive parsing of PDF content streams according to the PDF specification.
//! Content streams contain the actual drawing instructions (operators) that render text, graphics, and images
//! on PDF pages.
//!
//! # Overview
//!
//! Content streams are sequences of PDF operators that describe:
//! - Text positioning and rendering
//! - Path construction and painting
//! - Color and graphics state management
//! - Image and XObject placement
//! - Coordinate transformations
//!
//! # Architecture
//!
//! The parser is divided into two main components:
//! - `ContentTokenizer`: Low-level tokenization of content stream bytes
//! - `ContentParser`: High-level parsing of tokens into structured operations
//!
//! # Example
//!
//! ```rust,no_run
//! use ocrsandwich_core::parser::content::{ContentParser, ContentOperation};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Parse a content stream
//! let content_stream = b"BT /F1 12 Tf 100 200 Td (Hello World) Tj ET";
//! let operations = ContentParser::parse_content(content_stream)?;
//!
//! // Process operations
//! for op in operations {
//!     match op {
//!         ContentOperation::BeginText => println!("Start text object"),
//!         ContentOperation::SetFont(name, size) => println!("Font: {} at {}", name, size),
//!         ContentOperation::ShowText(text) => println!("Text: {:?}", text),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Operators
//!
//! This parser supports all standard PDF operators including:
//! - Text operators (BT, ET, Tj, TJ, Tf, Td, etc.)
//! - Graphics state operators (q, Q, cm, w, J, etc.)
//! - Path construction operators (m, l, c, re, h)
//! - Path painting operators (S, f, B, n, etc.)
//! - Color operators (g, rg, k, cs, scn, etc.)
//! - XObject operators (Do)
//! - Marked content operators (BMC, BDC, EMC, etc.)

use super::{ParseError, ParseResult};
use crate::objects::Object;
use std::collections::HashMap;

/// Represents a single operator in a PDF content stream.
///
/// Each variant corresponds to a specific PDF operator and carries the associated
/// operands. These operations form a complete instruction set for rendering PDF content.
///
/// # Categories
///
/// Operations are grouped into several categories:
/// - **Text Object**: BeginText, EndText
/// - **Text State**: Font, spacing, scaling, rendering mode
/// - **Text Positioning**: Matrix transforms, moves, line advances
/// - **Text Showing**: Display text with various formatting
/// - **Graphics State**: Save/restore, transforms, line properties
/// - **Path Construction**: Move, line, curve, rectangle operations
/// - **Path Painting**: Stroke, fill, clipping operations
/// - **Color**: RGB, CMYK, grayscale, and color space operations
/// - **XObject**: External graphics and form placement
/// - **Marked Content**: Semantic tagging for accessibility
///
/// # Example
///
/// ```rust
/// use ocrsandwich_core::parser::content::{ContentOperation};
///
/// // Text operation
/// let op1 = ContentOperation::ShowText(b"Hello".to_vec());
///
/// // Graphics operation
/// let op2 = ContentOperation::SetLineWidth(2.0);
///
/// // Path operation
/// let op3 = ContentOperation::Rectangle(10.0, 10.0, 100.0, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOperation {
    // Text object operators
    /// Begin a text object (BT operator).
    /// All text showing operations must occur within a text object.
    BeginText,

    /// End a text object (ET operator).
    /// Closes the current text object started with BeginText.
    EndText,

    // Text state operators
    /// Set character spacing (Tc operator).
    /// Additional space between characters in unscaled text units.
    SetCharSpacing(f32),

    /// Set word spacing (Tw operator).
    /// Additional space for ASCII space character (0x20) in unscaled text units.
    SetWordSpacing(f32),

    /// Set horizontal text scaling (Tz operator).
    /// Percentage of normal width (100 = normal).
    SetHorizontalScaling(f32),

    /// Set text leading (TL operator).
    /// Vertical distance between baselines for T* operator.
    SetLeading(f32),

    /// Set font and size (Tf operator).
    /// Font name must match a key in the Resources/Font dictionary.
    SetFont(String, f32),

    /// Set text rendering mode (Tr operator).
    /// 0=fill, 1=stroke, 2=fill+stroke, 3=invisible, 4=fill+clip, 5=stroke+clip, 6=fill+stroke+clip, 7=clip
    SetTextRenderMode(i32),

    /// Set text rise (Ts operator).
    /// Vertical displacement for superscripts/subscripts in text units.
    SetTextRise(f32),

    // Text positioning operators
    /// Move text position (Td operator).
    /// Translates the text matrix by (tx, ty).
    MoveText(f32, f32),

    /// Move text position and set leading (TD operator).
    /// Equivalent to: -ty TL tx ty Td
    MoveTextSetLeading(f32, f32),

    /// Set text matrix directly (Tm operator).
    /// Parameters: [a, b, c, d, e, f] for transformation matrix.
    SetTextMatrix(f32, f32, f32, f32, f32, f32),

    /// Move to start of next line (T* operator).
    /// Uses the current leading value set with TL.
    NextLine,

    // Text showing operators
    /// Show text string (Tj operator).
    /// The bytes are encoded according to the current font's encoding.
    ShowText(Vec<u8>),

    /// Show text with individual positioning (TJ operator).
    /// Array elements can be strings or position adjustments.
    ShowTextArray(Vec<TextElement>),

    /// Move to next line and show text (' operator).
    /// Equivalent to: T* string Tj
    NextLineShowText(Vec<u8>),

    /// Set spacing, move to next line, and show text (" operator).
    /// Equivalent to: word_spacing Tw char_spacing Tc string '
    SetSpacingNextLineShowText(f32, f32, Vec<u8>),

    // Graphics state operators
    /// Save current graphics state (q operator).
    /// Pushes the entire graphics state onto a stack.
    SaveGraphicsState,

    /// Restore graphics state (Q operator).
    /// Pops the graphics state from the stack.
    RestoreGraphicsState,

    /// Concatenate matrix to current transformation matrix (cm operator).
    /// Modifies the CTM: CTM' = CTM × [a b c d e f]
    SetTransformMatrix(f32, f32, f32, f32, f32, f32),

    /// Set line width (w operator) in user space units.
    SetLineWidth(f32),

    /// Set line cap style (J operator).
    /// 0=butt cap, 1=round cap, 2=projecting square cap
    SetLineCap(i32),

    /// Set line join style (j operator).
    /// 0=miter join, 1=round join, 2=bevel join
    SetLineJoin(i32),

    /// Set miter limit (M operator).
    /// Maximum ratio of miter length to line width.
    SetMiterLimit(f32),

    /// Set dash pattern (d operator).
    /// Array of dash/gap lengths and starting phase.
    SetDashPattern(Vec<f32>, f32),

    /// Set rendering intent (ri operator).
    /// Color rendering intent: /AbsoluteColorimetric, /RelativeColorimetric, /Saturation, /Perceptual
    SetIntent(String),

    /// Set flatness tolerance (i operator).
    /// Maximum error when rendering curves as line segments.
    SetFlatness(f32),

    /// Set graphics state from parameter dictionary (gs operator).
    /// References ExtGState resource dictionary.
    SetGraphicsStateParams(String),

    // Path construction operators
    /// Begin new subpath at point (m operator).
    MoveTo(f32, f32),

    /// Append straight line segment (l operator).
    LineTo(f32, f32),

    /// Append cubic Bézier curve (c operator).
    /// Control points: (x1,y1), (x2,y2), endpoint: (x3,y3)
    CurveTo(f32, f32, f32, f32, f32, f32),

    /// Append cubic Bézier curve with first control point = current point (v operator).
    CurveToV(f32, f32, f32, f32),

    /// Append cubic Bézier curve with second control point = endpoint (y operator).
    CurveToY(f32, f32, f32, f32),

    /// Close current subpath (h operator).
    /// Appends straight line to starting point.
    ClosePath,

    /// Append rectangle as complete subpath (re operator).
    /// Parameters: x, y, width, height
    Rectangle(f32, f32, f32, f32),

    // Path painting operators
    /// Stroke the path (S operator).
    Stroke,

    /// Close and stroke the path (s operator).
    /// Equivalent to: h S
    CloseStroke,

    /// Fill the path using nonzero winding rule (f or F operator).
    Fill,

    /// Fill the path using even-odd rule (f* operator).
    FillEvenOdd,

    /// Fill then stroke the path (B operator).
    /// Uses nonzero winding rule.
    FillStroke,

    /// Fill then stroke using even-odd rule (B* operator).
    FillStrokeEvenOdd,

    /// Close, fill, and stroke the path (b operator).
    /// Equivalent to: h B
    CloseFillStroke,

    /// Close, fill, and stroke using even-odd rule (b* operator).
    CloseFillStrokeEvenOdd,

    /// End path without filling or stroking (n operator).
    /// Used primarily before clipping.
    EndPath,

    // Clipping path operators
    Clip,        // W
    ClipEvenOdd, // W*

    // Color operators
    /// Set stroking color space (CS operator).
    /// References ColorSpace resource dictionary.
    SetStrokingColorSpace(String),

    /// Set non-stroking color space (cs operator).
    /// References ColorSpace resource dictionary.
    SetNonStrokingColorSpace(String),

    /// Set stroking color (SC, SCN operators).
    /// Number of components depends on current color space.
    SetStrokingColor(Vec<f32>),

    /// Set non-stroking color (sc, scn operators).
    /// Number of components depends on current color space.
    SetNonStrokingColor(Vec<f32>),

    /// Set stroking color to DeviceGray (G operator).
    /// 0.0 = black, 1.0 = white
    SetStrokingGray(f32),

    /// Set non-stroking color to DeviceGray (g operator).
    SetNonStrokingGray(f32),

    /// Set stroking color to DeviceRGB (RG operator).
    /// Components range from 0.0 to 1.0.
    SetStrokingRGB(f32, f32, f32),

    /// Set non-stroking color to DeviceRGB (rg operator).
    SetNonStrokingRGB(f32, f32, f32),

    /// Set stroking color to DeviceCMYK (K operator).
    SetStrokingCMYK(f32, f32, f32, f32),

    /// Set non-stroking color to DeviceCMYK (k operator).
    SetNonStrokingCMYK(f32, f32, f32, f32),

    // Shading operators
    ShadingFill(String), // sh

    // Inline image operators
    /// Begin inline image (BI operator)
    BeginInlineImage,
    /// Inline image with parsed dictionary and data
    InlineImage {
        /// Image parameters (width, height, colorspace, etc.)
        params: HashMap<String, Object>,
        /// Raw image data
        data: Vec<u8>,
    },

    // XObject operators
    /// Paint external object (Do operator).
    /// References XObject resource dictionary (images, forms).
    PaintXObject(String),

    // Marked content operators
    BeginMarkedContent(String),                                   // BMC
    BeginMarkedContentWithProps(String, HashMap<String, String>), // BDC
    EndMarkedContent,                                             // EMC
    DefineMarkedContentPoint(String),                             // MP
    DefineMarkedContentPointWithProps(String, HashMap<String, String>), // DP

    // Compatibility operators
    BeginCompatibility, // BX
    EndCompatibility,   // EX
}

/// Represents a text element in a TJ array for ShowTextArray operations.
///
/// The TJ operator takes an array of strings and position adjustments,
/// allowing fine control over character and word spacing.
///
/// # Example
///
/// ```rust
/// use ocrsandwich_core::parser::content::{TextElement, ContentOperation};
///
/// // TJ array: [(Hello) -50 (World)]
/// let tj_array = vec![
///     TextElement::Text(b"Hello".to_vec()),
///     TextElement::Spacing(-50.0), // Move left 50 units
///     TextElement::Text(b"World".to_vec()),
/// ];
/// let op = ContentOperation::ShowTextArray(tj_array);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// Text string to show
    Text(Vec<u8>),
    /// Position adjustment in thousandths of text space units
    /// Negative values move to the right (decrease spacing)
    Spacing(f32),
}

/// Token types in content streams
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(f32),
    Integer(i32),
    String(Vec<u8>),
    HexString(Vec<u8>),
    Name(String),
    Operator(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
}

/// Content stream tokenizer
pub struct ContentTokenizer<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> ContentTokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Get the next token from the stream
    pub(super) fn next_token(&mut self) -> ParseResult<Option<Token>> {
        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(None);
        }

        let ch = self.input[self.position];

        match ch {
            // Numbers
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(),

            // Strings
            b'(' => self.read_literal_string(),
            b'<' => {
                if self.peek_next() == Some(b'<') {
                    self.position += 2;
                    Ok(Some(Token::DictStart))
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.peek_next() == Some(b'>') {
                    self.position += 2;
                    Ok(Some(Token::DictEnd))
                } else {
                    Err(ParseError::SyntaxError {
                        position: self.position,
                        message: "Unexpected '>'".to_string(),
                    })
                }
            }

            // Arrays
            b'[' => {
                self.position += 1;
                Ok(Some(Token::ArrayStart))
            }
            b']' => {
                self.position += 1;
                Ok(Some(Token::ArrayEnd))
            }

            // Names
            b'/' => self.read_name(),

            // Operators or other tokens
            _ => self.read_operator(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() {
            match self.input[self.position] {
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' => self.position += 1,
                b'%' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while self.position < self.input.len() && self.input[self.position] != b'\n' {
            self.position += 1;
        }
    }

    fn peek_next(&self) -> Option<u8> {
        if self.position + 1 < self.input.len() {
            Some(self.input[self.position + 1])
        } else {
            None
        }
    }

    fn read_number(&mut self) -> ParseResult<Option<Token>> {
        let start = self.position;
        let mut has_dot = false;

        // Handle optional sign
        if self.position < self.input.len()
            && (self.input[self.position] == b'+' || self.input[self.position] == b'-')
        {
            self.position += 1;
        }

        // Read digits and optional decimal point
        while self.position < self.input.len() {
            match self.input[self.position] {
                b'0'..=b'9' => self.position += 1,
                b'.' if !has_dot => {
                    has_dot = true;
                    self.position += 1;
                }
                _ => break,
            }
        }

        let num_str = std::str::from_utf8(&self.input[start..self.position]).map_err(|_| {
            ParseError::SyntaxError {
                position: start,
                message: "Invalid number format".to_string(),
            }
        })?;

        if has_dot {
            let value = num_str
                .parse::<f32>()
                .map_err(|_| ParseError::SyntaxError {
                    position: start,
                    message: "Invalid float number".to_string(),
                })?;
            Ok(Some(Token::Number(value)))
        } else {
            let value = num_str
                .parse::<i32>()
                .map_err(|_| ParseError::SyntaxError {
                    position: start,
                    message: "Invalid integer number".to_string(),
                })?;
            Ok(Some(Token::Integer(value)))
        }
    }

    fn read_literal_string(&mut self) -> ParseResult<Option<Token>> {
        self.position += 1; // Skip opening '('
        let mut result = Vec::new();
        let mut paren_depth = 1;
        let mut escape = false;

        while self.position < self.input.len() && paren_depth > 0 {
            let ch = self.input[self.position];
            self.position += 1;

            if escape {
                match ch {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(b'\x08'),
                    b'f' => result.push(b'\x0C'),
                    b'(' => result.push(b'('),
                    b')' => result.push(b')'),
                    b'\\' => result.push(b'\\'),
                    b'0'..=b'7' => {
                        // Octal escape sequence
                        self.position -= 1;
                        let octal_value = self.read_octal_escape()?;
                        result.push(octal_value);
                    }
                    _ => result.push(ch), // Unknown escape, treat as literal
                }
                escape = false;
            } else {
                match ch {
                    b'\\' => escape = true,
                    b'(' => {
                        paren_depth += 1;
                        result.push(ch);
                    }
                    b')' => {
                        paren_depth -= 1;
                        if paren_depth > 0 {
                            result.push(ch);
                        }
                    }
                    _ => result.push(ch),
                }
            }
        }

        Ok(Some(Token::String(result)))
    }

    fn read_octal_escape(&mut self) -> ParseResult<u8> {
        let mut value = 0u8;
        let mut count = 0;

        while count < 3 && self.position < self.input.len() {
            match self.input[self.position] {
                b'0'..=b'7' => {
                    value = value * 8 + (self.input[self.position] - b'0');
                    self.position += 1;
                    count += 1;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn read_hex_string(&mut self) -> ParseResult<Option<Token>> {
        self.position += 1; // Skip opening '<'
        let mut result = Vec::new();
        let mut nibble = None;

        while self.position < self.input.len() {
            let ch = self.input[self.position];

            match ch {
                b'>' => {
                    self.position += 1;
                    // Handle odd number of hex digits
                    if let Some(n) = nibble {
                        result.push(n << 4);
                    }
                    return Ok(Some(Token::HexString(result)));
                }
                b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => {
                    let digit = if ch <= b'9' {
                        ch - b'0'
                    } else if ch <= b'F' {
                        ch - b'A' + 10
                    } else {
                        ch - b'a' + 10
                    };

                    if let Some(n) = nibble {
                        result.push((n << 4) | digit);
                        nibble = None;
                    } else {
                        nibble = Some(digit);
                    }
                    self.position += 1;
                }
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' => {
                    // Skip whitespace in hex strings
                    self.position += 1;
                }
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: self.position,
                        message: format!("Invalid character in hex string: {:?}", ch as char),
                    });
                }
            }
        }

        Err(ParseError::SyntaxError {
            position: self.position,
            message: "Unterminated hex string".to_string(),
        })
    }

    fn read_name(&mut self) -> ParseResult<Option<Token>> {
        self.position += 1; // Skip '/'
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.input[self.position];
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'(' | b')' | b'<' | b'>' | b'['
                | b']' | b'{' | b'}' | b'/' | b'%' => break,
                b'#' => {
                    // Handle hex escape in name
                    self.position += 1;
                    if self.position + 1 < self.input.len() {
                        self.position += 2;
                    }
                }
                _ => self.position += 1,
            }
        }

        let name_bytes = &self.input[start..self.position];
        let name = self.decode_name(name_bytes)?;
        Ok(Some(Token::Name(name)))
    }

    fn decode_name(&self, bytes: &[u8]) -> ParseResult<String> {
        let mut result = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'#' && i + 2 < bytes.len() {
                // Hex escape
                let hex_str = std::str::from_utf8(&bytes[i + 1..i + 3]).map_err(|_| {
                    ParseError::SyntaxError {
                        position: self.position,
                        message: "Invalid hex escape in name".to_string(),
                    }
                })?;
                let value =
                    u8::from_str_radix(hex_str, 16).map_err(|_| ParseError::SyntaxError {
                        position: self.position,
                        message: "Invalid hex escape in name".to_string(),
                    })?;
                result.push(value);
                i += 3;
            } else {
                result.push(bytes[i]);
                i += 1;
            }
        }

        String::from_utf8(result).map_err(|_| ParseError::SyntaxError {
            position: self.position,
            message: "Invalid UTF-8 in name".to_string(),
        })
    }

    fn read_operator(&mut self) -> ParseResult<Option<Token>> {
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.input[self.position];
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'(' | b')' | b'<' | b'>' | b'['
                | b']' | b'{' | b'}' | b'/' | b'%' => break,
                _ => self.position += 1,
            }
        }

        let op_bytes = &self.input[start..self.position];
        let op = std::str::from_utf8(op_bytes).map_err(|_| ParseError::SyntaxError {
            position: start,
            message: "Invalid operator".to_string(),
        })?;

        Ok(Some(Token::Operator(op.to_string())))
    }
}

/// High-level content stream parser.
///
/// Converts tokenized content streams into structured `ContentOperation` values.
/// This parser handles the operand stack and operator parsing according to PDF specifications.
///
/// # Usage
///
/// The parser is typically used through its static methods:
///
/// ```rust
/// use ocrsandwich_core::parser::content::ContentParser;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let content = b"q 1 0 0 1 50 50 cm 100 100 200 150 re S Q";
/// let operations = ContentParser::parse(content)?;
/// # Ok(())
/// # }
/// ```
pub struct ContentParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ContentParser {
    /// Create a new content parser
    pub fn new(_content: &[u8]) -> Self {
        Self {
            tokens: Vec::new(),
            position: 0,
        }
    }

    /// Parse a content stream into a vector of operators.
    ///
    /// This is a convenience method that creates a parser and processes the entire stream.
    ///
    /// # Arguments
    ///
    /// * `content` - Raw content stream bytes (may be compressed)
    ///
    /// # Returns
    ///
    /// A vector of parsed `ContentOperation` values in the order they appear.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Invalid operator syntax is encountered
    /// - Operators have incorrect number/type of operands
    /// - Unknown operators are found
    ///
    /// # Example
    ///
    /// ```rust
    /// use ocrsandwich_core::parser::content::{ContentParser, ContentOperation};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let content = b"BT /F1 12 Tf 100 200 Td (Hello) Tj ET";
    /// let operations = ContentParser::parse(content)?;
    ///
    /// assert_eq!(operations.len(), 5);
    /// assert!(matches!(operations[0], ContentOperation::BeginText));
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(content: &[u8]) -> ParseResult<Vec<ContentOperation>> {
        Self::parse_content(content)
    }

    /// Parse a content stream into a vector of operators.
    ///
    /// This method tokenizes the input and converts it to operations.
    /// It handles the PDF postfix notation where operands precede operators.
    pub fn parse_content(content: &[u8]) -> ParseResult<Vec<ContentOperation>> {
        let mut tokenizer = ContentTokenizer::new(content);
        let mut tokens = Vec::new();

        // Tokenize the entire stream
        while let Some(token) = tokenizer.next_token()? {
            tokens.push(token);
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };

        parser.parse_operators()
    }

    fn parse_operators(&mut self) -> ParseResult<Vec<ContentOperation>> {
        let mut operators = Vec::new();
        let mut operand_stack: Vec<Token> = Vec::new();

        while self.position < self.tokens.len() {
            let token = self.tokens[self.position].clone();
            self.position += 1;

            match &token {
                Token::Operator(op) => {
                    let operator = self.parse_operator(op, &mut operand_stack)?;
                    operators.push(operator);
                }
                _ => {
                    // Not an operator, push to operand stack
                    operand_stack.push(token);
                }
            }
        }

        Ok(operators)
    }

    fn parse_operator(
        &mut self,
        op: &str,
        operands: &mut Vec<Token>,
    ) -> ParseResult<ContentOperation> {
        let operator = match op {
            // Text object operators
            "BT" => ContentOperation::BeginText,
            "ET" => ContentOperation::EndText,

            // Text state operators
            "Tc" => {
                let spacing = self.pop_number(operands)?;
                ContentOperation::SetCharSpacing(spacing)
            }
            "Tw" => {
                let spacing = self.pop_number(operands)?;
                ContentOperation::SetWordSpacing(spacing)
            }
            "Tz" => {
                let scale = self.pop_number(operands)?;
                ContentOperation::SetHorizontalScaling(scale)
            }
            "TL" => {
                let leading = self.pop_number(operands)?;
                ContentOperation::SetLeading(leading)
            }
            "Tf" => {
                let size = self.pop_number(operands)?;
                let font = self.pop_name(operands)?;
                ContentOperation::SetFont(font, size)
            }
            "Tr" => {
                let mode = self.pop_integer(operands)?;
                ContentOperation::SetTextRenderMode(mode)
            }
            "Ts" => {
                let rise = self.pop_number(operands)?;
                ContentOperation::SetTextRise(rise)
            }

            // Text positioning operators
            "Td" => {
                let ty = self.pop_number(operands)?;
                let tx = self.pop_number(operands)?;
                ContentOperation::MoveText(tx, ty)
            }
            "TD" => {
                let ty = self.pop_number(operands)?;
                let tx = self.pop_number(operands)?;
                ContentOperation::MoveTextSetLeading(tx, ty)
            }
            "Tm" => {
                let f = self.pop_number(operands)?;
                let e = self.pop_number(operands)?;
                let d = self.pop_number(operands)?;
                let c = self.pop_number(operands)?;
                let b = self.pop_number(operands)?;
                let a = self.pop_number(operands)?;
                ContentOperation::SetTextMatrix(a, b, c, d, e, f)
            }
            "T*" => ContentOperation::NextLine,

            // Text showing operators
            "Tj" => {
                let text = self.pop_string(operands)?;
                ContentOperation::ShowText(text)
            }
            "TJ" => {
                let array = self.pop_array(operands)?;
                let elements = self.parse_text_array(array)?;
                ContentOperation::ShowTextArray(elements)
            }
            "'" => {
                let text = self.pop_string(operands)?;
                ContentOperation::NextLineShowText(text)
            }
            "\"" => {
                let text = self.pop_string(operands)?;
                let aw = self.pop_number(operands)?;
                let ac = self.pop_number(operands)?;
                ContentOperation::SetSpacingNextLineShowText(ac, aw, text)
            }

            // Graphics state operators
            "q" => ContentOperation::SaveGraphicsState,
            "Q" => ContentOperation::RestoreGraphicsState,
            "cm" => {
                let f = self.pop_number(operands)?;
                let e = self.pop_number(operands)?;
                let d = self.pop_number(operands)?;
                let c = self.pop_number(operands)?;
                let b = self.pop_number(operands)?;
                let a = self.pop_number(operands)?;
                ContentOperation::SetTransformMatrix(a, b, c, d, e, f)
            }
            "w" => {
                let width = self.pop_number(operands)?;
                ContentOperation::SetLineWidth(width)
            }
            "J" => {
                let cap = self.pop_integer(operands)?;
                ContentOperation::SetLineCap(cap)
            }
            "j" => {
                let join = self.pop_integer(operands)?;
                ContentOperation::SetLineJoin(join)
            }
            "M" => {
                let limit = self.pop_number(operands)?;
                ContentOperation::SetMiterLimit(limit)
            }
            "d" => {
                let phase = self.pop_number(operands)?;
                let array = self.pop_array(operands)?;
                let pattern = self.parse_dash_array(array)?;
                ContentOperation::SetDashPattern(pattern, phase)
            }
            "ri" => {
                let intent = self.pop_name(operands)?;
                ContentOperation::SetIntent(intent)
            }
            "i" => {
                let flatness = self.pop_number(operands)?;
                ContentOperation::SetFlatness(flatness)
            }
            "gs" => {
                let name = self.pop_name(operands)?;
                ContentOperation::SetGraphicsStateParams(name)
            }

            // Path construction operators
            "m" => {
                let y = self.pop_number(operands)?;
                let x = self.pop_number(operands)?;
                ContentOperation::MoveTo(x, y)
            }
            "l" => {
                let y = self.pop_number(operands)?;
                let x = self.pop_number(operands)?;
                ContentOperation::LineTo(x, y)
            }
            "c" => {
                let y3 = self.pop_number(operands)?;
                let x3 = self.pop_number(operands)?;
                let y2 = self.pop_number(operands)?;
                let x2 = self.pop_number(operands)?;
                let y1 = self.pop_number(operands)?;
                let x1 = self.pop_number(operands)?;
                ContentOperation::CurveTo(x1, y1, x2, y2, x3, y3)
            }
            "v" => {
                let y3 = self.pop_number(operands)?;
                let x3 = self.pop_number(operands)?;
                let y2 = self.pop_number(operands)?;
                let x2 = self.pop_number(operands)?;
                ContentOperation::CurveToV(x2, y2, x3, y3)
            }
            "y" => {
                let y3 = self.pop_number(operands)?;
                let x3 = self.pop_number(operands)?;
                let y1 = self.pop_number(operands)?;
                let x1 = self.pop_number(operands)?;
                ContentOperation::CurveToY(x1, y1, x3, y3)
            }
            "h" => ContentOperation::ClosePath,
            "re" => {
                let height = self.pop_number(operands)?;
                let width = self.pop_number(operands)?;
                let y = self.pop_number(operands)?;
                let x = self.pop_number(operands)?;
                ContentOperation::Rectangle(x, y, width, height)
            }

            // Path painting operators
            "S" => ContentOperation::Stroke,
            "s" => ContentOperation::CloseStroke,
            "f" | "F" => ContentOperation::Fill,
            "f*" => ContentOperation::FillEvenOdd,
            "B" => ContentOperation::FillStroke,
            "B*" => ContentOperation::FillStrokeEvenOdd,
            "b" => ContentOperation::CloseFillStroke,
            "b*" => ContentOperation::CloseFillStrokeEvenOdd,
            "n" => ContentOperation::EndPath,

            // Clipping path operators
            "W" => ContentOperation::Clip,
            "W*" => ContentOperation::ClipEvenOdd,

            // Color operators
            "CS" => {
                let name = self.pop_name(operands)?;
                ContentOperation::SetStrokingColorSpace(name)
            }
            "cs" => {
                let name = self.pop_name(operands)?;
                ContentOperation::SetNonStrokingColorSpace(name)
            }
            "SC" | "SCN" => {
                let components = self.pop_color_components(operands)?;
                ContentOperation::SetStrokingColor(components)
            }
            "sc" | "scn" => {
                let components = self.pop_color_components(operands)?;
                ContentOperation::SetNonStrokingColor(components)
            }
            "G" => {
                let gray = self.pop_number(operands)?;
                ContentOperation::SetStrokingGray(gray)
            }
            "g" => {
                let gray = self.pop_number(operands)?;
                ContentOperation::SetNonStrokingGray(gray)
            }
            "RG" => {
                let b = self.pop_number(operands)?;
                let g = self.pop_number(operands)?;
                let r = self.pop_number(operands)?;
                ContentOperation::SetStrokingRGB(r, g, b)
            }
            "rg" => {
                let b = self.pop_number(operands)?;
                let g = self.pop_number(operands)?;
                let r = self.pop_number(operands)?;
                ContentOperation::SetNonStrokingRGB(r, g, b)
            }
            "K" => {
                let k = self.pop_number(operands)?;
                let y = self.pop_number(operands)?;
                let m = self.pop_number(operands)?;
                let c = self.pop_number(operands)?;
                ContentOperation::SetStrokingCMYK(c, m, y, k)
            }
            "k" => {
                let k = self.pop_number(operands)?;
                let y = self.pop_number(operands)?;
                let m = self.pop_number(operands)?;
                let c = self.pop_number(operands)?;
                ContentOperation::SetNonStrokingCMYK(c, m, y, k)
            }

            // Shading operators
            "sh" => {
                let name = self.pop_name(operands)?;
                ContentOperation::ShadingFill(name)
            }

            // XObject operators
            "Do" => {
                let name = self.pop_name(operands)?;
                ContentOperation::PaintXObject(name)
            }

            // Marked content operators
            "BMC" => {
                let tag = self.pop_name(operands)?;
                ContentOperation::BeginMarkedContent(tag)
            }
            "BDC" => {
                let props = self.pop_dict_or_name(operands)?;
                let tag = self.pop_name(operands)?;
                ContentOperation::BeginMarkedContentWithProps(tag, props)
            }
            "EMC" => ContentOperation::EndMarkedContent,
            "MP" => {
                let tag = self.pop_name(operands)?;
                ContentOperation::DefineMarkedContentPoint(tag)
            }
            "DP" => {
                let props = self.pop_dict_or_name(operands)?;
                let tag = self.pop_name(operands)?;
                ContentOperation::DefineMarkedContentPointWithProps(tag, props)
            }

            // Compatibility operators
            "BX" => ContentOperation::BeginCompatibility,
            "EX" => ContentOperation::EndCompatibility,

            // Inline images are handled specially
            "BI" => {
                operands.clear(); // Clear any remaining operands
                self.parse_inline_image()?
            }

            _ => {
                return Err(ParseError::SyntaxError {
                    position: self.position,
                    message: format!("Unknown operator: {op}"),
                });
            }
        };

        operands.clear(); // Clear operands after processing
        Ok(operator)
    }

    // Helper methods for popping operands
    fn pop_number(&self, operands: &mut Vec<Token>) -> ParseResult<f32> {
        match operands.pop() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Integer(i)) => Ok(i as f32),
            _ => Err(ParseError::SyntaxError {
                position: self.position,
                message: "Expected number operand".to_string(),
            }),
        }
    }

    fn pop_integer(&self, operands: &mut Vec<Token>) -> ParseResult<i32> {
        match operands.pop() {
            Some(Token::Integer(i)) => Ok(i),
            _ => Err(ParseError::SyntaxError {
                position: self.position,
                message: "Expected integer operand".to_string(),
            }),
        }
    }

    fn pop_name(&self, operands: &mut Vec<Token>) -> ParseResult<String> {
        match operands.pop() {
            Some(Token::Name(n)) => Ok(n),
            _ => Err(ParseError::SyntaxError {
                position: self.position,
                message: "Expected name operand".to_string(),
            }),
        }
    }

    fn pop_string(&self, operands: &mut Vec<Token>) -> ParseResult<Vec<u8>> {
        match operands.pop() {
            Some(Token::String(s)) => Ok(s),
            Some(Token::HexString(s)) => Ok(s),
            _ => Err(ParseError::SyntaxError {
                position: self.position,
                message: "Expected string operand".to_string(),
            }),
        }
    }

    fn pop_array(&self, operands: &mut Vec<Token>) -> ParseResult<Vec<Token>> {
        // First check if we have an ArrayEnd at the top (which we should for a complete array)
        let has_array_end = matches!(operands.last(), Some(Token::ArrayEnd));
        if has_array_end {
            operands.pop(); // Remove the ArrayEnd
        }

        let mut array = Vec::new();
        let mut found_start = false;

        // Pop tokens until we find ArrayStart
        while let Some(token) = operands.pop() {
            match token {
                Token::ArrayStart => {
                    found_start = true;
                    break;
                }
                Token::ArrayEnd => {
                    // Skip any additional ArrayEnd tokens (shouldn't happen in well-formed PDFs)
                    continue;
                }
                _ => array.push(token),
            }
        }

        if !found_start {
            return Err(ParseError::SyntaxError {
                position: self.position,
                message: "Expected array".to_string(),
            });
        }

        array.reverse(); // We collected in reverse order
        Ok(array)
    }

    fn pop_dict_or_name(&self, operands: &mut Vec<Token>) -> ParseResult<HashMap<String, String>> {
        if let Some(token) = operands.pop() {
            match token {
                Token::Name(name) => {
                    // Name token - this is a reference to properties in the resource dictionary
                    // For now, we'll store it as a special entry to indicate it's a resource reference
                    let mut props = HashMap::new();
                    props.insert("__resource_ref".to_string(), name);
                    Ok(props)
                }
                Token::DictStart => {
                    // Inline dictionary - parse key-value pairs
                    let mut props = HashMap::new();

                    // Look for dictionary entries in remaining operands
                    while let Some(value_token) = operands.pop() {
                        if matches!(value_token, Token::DictEnd) {
                            break;
                        }

                        // Expect key-value pairs
                        if let Token::Name(key) = value_token {
                            if let Some(value_token) = operands.pop() {
                                let value = match value_token {
                                    Token::Name(name) => name,
                                    Token::String(s) => String::from_utf8_lossy(&s).to_string(),
                                    Token::Integer(i) => i.to_string(),
                                    Token::Number(f) => f.to_string(),
                                    _ => continue, // Skip unsupported value types
                                };
                                props.insert(key, value);
                            }
                        }
                    }

                    Ok(props)
                }
                _ => {
                    // Unexpected token type, treat as empty properties
                    Ok(HashMap::new())
                }
            }
        } else {
            // No operand available
            Err(ParseError::SyntaxError {
                position: 0,
                message: "Expected dictionary or name for marked content properties".to_string(),
            })
        }
    }

    fn pop_color_components(&self, operands: &mut Vec<Token>) -> ParseResult<Vec<f32>> {
        let mut components = Vec::new();

        // Pop all numeric values from the stack
        while let Some(token) = operands.last() {
            match token {
                Token::Number(n) => {
                    components.push(*n);
                    operands.pop();
                }
                Token::Integer(i) => {
                    components.push(*i as f32);
                    operands.pop();
                }
                _ => break,
            }
        }

        components.reverse();
        Ok(components)
    }

    fn parse_text_array(&self, tokens: Vec<Token>) -> ParseResult<Vec<TextElement>> {
        let mut elements = Vec::new();

        for token in tokens {
            match token {
                Token::String(s) | Token::HexString(s) => {
                    elements.push(TextElement::Text(s));
                }
                Token::Number(n) => {
                    elements.push(TextElement::Spacing(n));
                }
                Token::Integer(i) => {
                    elements.push(TextElement::Spacing(i as f32));
                }
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: self.position,
                        message: "Invalid element in text array".to_string(),
                    });
                }
            }
        }

        Ok(elements)
    }

    fn parse_dash_array(&self, tokens: Vec<Token>) -> ParseResult<Vec<f32>> {
        let mut pattern = Vec::new();

        for token in tokens {
            match token {
                Token::Number(n) => pattern.push(n),
                Token::Integer(i) => pattern.push(i as f32),
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: self.position,
                        message: "Invalid element in dash array".to_string(),
                    });
                }
            }
        }

        Ok(pattern)
    }

    fn parse_inline_image(&mut self) -> ParseResult<ContentOperation> {
        // Parse inline image dictionary until we find ID
        let mut params = HashMap::new();

        while self.position < self.tokens.len() {
            // Check if we've reached the ID operator
            if let Token::Operator(op) = &self.tokens[self.position] {
                if op == "ID" {
                    self.position += 1;
                    break;
                }
            }

            // Parse key-value pairs for image parameters
            // Keys are abbreviated in inline images:
            // /W -> Width, /H -> Height, /CS -> ColorSpace, /BPC -> BitsPerComponent
            // /F -> Filter, /DP -> DecodeParms, /IM -> ImageMask, /I -> Interpolate
            if let Token::Name(key) = &self.tokens[self.position] {
                self.position += 1;
                if self.position >= self.tokens.len() {
                    break;
                }

                // Parse the value
                let value = match &self.tokens[self.position] {
                    Token::Integer(n) => Object::Integer(*n as i64),
                    Token::Number(n) => Object::Real(*n as f64),
                    Token::Name(s) => Object::Name(expand_inline_name(s)),
                    Token::String(s) => Object::String(String::from_utf8_lossy(s).to_string()),
                    Token::HexString(s) => Object::String(String::from_utf8_lossy(s).to_string()),
                    _ => Object::Null,
                };

                // Expand abbreviated keys to full names
                let full_key = expand_inline_key(key);
                params.insert(full_key, value);
                self.position += 1;
            } else {
                self.position += 1;
            }
        }

        // Now we should be at the image data
        // Collect bytes until we find EI
        let mut data = Vec::new();

        // For inline images, we need to read raw bytes until EI
        // This is tricky because EI could appear in the image data
        // We need to look for EI followed by a whitespace or operator

        // Simplified approach: collect all tokens until we find EI operator
        while self.position < self.tokens.len() {
            if let Token::Operator(op) = &self.tokens[self.position] {
                if op == "EI" {
                    self.position += 1;
                    break;
                }
            }

            // Convert token to bytes (simplified - real implementation would need raw byte access)
            match &self.tokens[self.position] {
                Token::String(bytes) => data.extend_from_slice(bytes),
                Token::HexString(bytes) => data.extend_from_slice(bytes),
                Token::Integer(n) => data.extend_from_slice(n.to_string().as_bytes()),
                Token::Number(n) => data.extend_from_slice(n.to_string().as_bytes()),
                Token::Name(s) => data.extend_from_slice(s.as_bytes()),
                Token::Operator(s) if s != "EI" => data.extend_from_slice(s.as_bytes()),
                _ => {}
            }
            self.position += 1;
        }

        Ok(ContentOperation::InlineImage { params, data })
    }
}

/// Expand abbreviated inline image key names to full names
fn expand_inline_key(key: &str) -> String {
    match key {
        "W" => "Width".to_string(),
        "H" => "Height".to_string(),
        "CS" | "ColorSpace" => "ColorSpace".to_string(),
        "BPC" | "BitsPerComponent" => "BitsPerComponent".to_string(),
        "F" => "Filter".to_string(),
        "DP" | "DecodeParms" => "DecodeParms".to_string(),
        "IM" => "ImageMask".to_string(),
        "I" => "Interpolate".to_string(),
        "Intent" => "Intent".to_string(),
        "D" => "Decode".to_string(),
        _ => key.to_string(),
    }
}

/// Expand abbreviated inline image color space names
fn expand_inline_name(name: &str) -> String {
    match name {
        "G" => "DeviceGray".to_string(),
        "RGB" => "DeviceRGB".to_string(),
        "CMYK" => "DeviceCMYK".to_string(),
        "I" => "Indexed".to_string(),
        "AHx" => "ASCIIHexDecode".to_string(),
        "A85" => "ASCII85Decode".to_string(),
        "LZW" => "LZWDecode".to_string(),
        "Fl" => "FlateDecode".to_string(),
        "RL" => "RunLengthDecode".to_string(),
        "DCT" => "DCTDecode".to_string(),
        "CCF" => "CCITTFaxDecode".to_string(),
        _ => name.to_string(),
    }
}
