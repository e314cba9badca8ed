//! Line scanner for position records.
//!
//! A record looks like `0.125 A(1.5, -2.0), B(0.0, 3e-1)`: an optional leading
//! timestamp followed by any number of `Tag(x, y)` tokens. Text between tokens
//! is ignored, but once a tag letter is followed by `(` the rest of the token
//! must be well formed.

use crate::types::{FrameRecord, Point, Species};
use crate::{DEFAULT_SPACE_BIAS, DEFAULT_SPACE_SCALE};
use snafu::prelude::*;

#[derive(Debug, Snafu, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[snafu(display("expected a number at column {column}"))]
    ExpectedNumber { column: usize },

    #[snafu(display("exponent without digits at column {column}"))]
    MalformedExponent { column: usize },

    #[snafu(display("expected '{expected}' at column {column}"))]
    ExpectedDelimiter { expected: char, column: usize },
}

/// Affine map from simulation coordinates to plot coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpaceTransform {
    pub bias: Point,
    pub scale: f64,
}

impl Default for SpaceTransform {
    fn default() -> Self {
        Self {
            bias: Point::new(DEFAULT_SPACE_BIAS, DEFAULT_SPACE_BIAS),
            scale: DEFAULT_SPACE_SCALE,
        }
    }
}

impl SpaceTransform {
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Point {
        Point::new((x + self.bias.x) * self.scale, (y + self.bias.y) * self.scale)
    }
}

/// A `Tag(x, y)` token with its raw coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TaggedPoint {
    pub tag: char,
    pub x: f64,
    pub y: f64,
}

impl TaggedPoint {
    pub fn species(&self) -> Species {
        Species::from_tag(self.tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedLine {
    pub time: Option<f64>,
    pub points: Vec<TaggedPoint>,
}

struct Scanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            pos: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn column(&self) -> usize {
        self.pos + 1
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        ensure!(
            self.peek() == Some(expected as u8),
            ExpectedDelimiterSnafu {
                expected,
                column: self.column(),
            }
        );
        self.pos += 1;
        Ok(())
    }

    /// True if a number starts at the cursor.
    fn at_number(&self) -> bool {
        let digit_at = |offset: usize| self.peek_at(offset).is_some_and(|b| b.is_ascii_digit());
        match self.peek() {
            Some(b'0'..=b'9') => true,
            Some(b'.') => digit_at(1),
            Some(b'+' | b'-') => digit_at(1) || (self.peek_at(1) == Some(b'.') && digit_at(2)),
            _ => false,
        }
    }

    fn at_exponent(&self) -> bool {
        let digit_at = |offset: usize| self.peek_at(offset).is_some_and(|b| b.is_ascii_digit());
        matches!(self.peek(), Some(b'e' | b'E'))
            && (digit_at(1) || (matches!(self.peek_at(1), Some(b'+' | b'-')) && digit_at(2)))
    }

    /// A number inside a point token, where nothing may trail it but a delimiter.
    fn coordinate(&mut self) -> Result<f64, ParseError> {
        let value = self.number()?;
        ensure!(
            !matches!(self.peek(), Some(b'e' | b'E')),
            MalformedExponentSnafu {
                column: self.column()
            }
        );
        Ok(value)
    }

    // [+-]? (digits [. digits*]? | . digits) ([eE] [+-]? digits)?
    fn number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }

        let int_digits = self.eat_digits();
        let mut frac_digits = 0;
        if self.peek() == Some(b'.')
            && (int_digits > 0 || self.peek_at(1).is_some_and(|b| b.is_ascii_digit()))
        {
            self.pos += 1;
            frac_digits = self.eat_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            self.pos = start;
            return ExpectedNumberSnafu { column: start + 1 }.fail();
        }

        // An `e` without exponent digits ends the number, so `5E(1, 2)` is a
        // timestamp followed by a tag.
        if self.at_exponent() {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.eat_digits();
        }

        self.line
            .get(start..self.pos)
            .and_then(|text| text.parse::<f64>().ok())
            .context(ExpectedNumberSnafu { column: start + 1 })
    }

    fn point(&mut self, tag: char) -> Result<TaggedPoint, ParseError> {
        self.expect('(')?;
        self.skip_whitespace();
        let x = self.coordinate()?;
        self.skip_whitespace();
        self.expect(',')?;
        self.skip_whitespace();
        let y = self.coordinate()?;
        self.skip_whitespace();
        self.expect(')')?;
        Ok(TaggedPoint { tag, x, y })
    }
}

/// Split a line into its timestamp and tagged point tokens, in order.
pub fn scan_line(line: &str) -> Result<ScannedLine, ParseError> {
    let mut scanner = Scanner::new(line);
    let mut scanned = ScannedLine::default();

    scanner.skip_whitespace();
    if scanner.at_number() {
        scanned.time = Some(scanner.number()?);
    }

    while let Some(b) = scanner.peek() {
        if b.is_ascii_uppercase() && scanner.peek_at(1) == Some(b'(') {
            scanner.pos += 1;
            let point = scanner.point(b as char)?;
            scanned.points.push(point);
        } else {
            scanner.pos += 1;
        }
    }

    Ok(scanned)
}

/// Parse a record into transformed cell and mutant positions.
///
/// A line without any point tokens is not an error, it yields an empty record.
pub fn parse_line(line: &str, transform: &SpaceTransform) -> Result<FrameRecord, ParseError> {
    let scanned = scan_line(line)?;
    let mut record = FrameRecord {
        time: scanned.time,
        ..FrameRecord::default()
    };

    for token in &scanned.points {
        let point = transform.apply(token.x, token.y);
        match token.species() {
            Species::Cell => record.cells.push(point),
            Species::Mutant => record.mutants.push(point),
        }
    }

    Ok(record)
}
