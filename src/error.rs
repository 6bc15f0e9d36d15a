//! Error types reported by the codec and the generator.

#[cfg(not(feature = "std"))]
use core as std;

use std::{error, fmt, str};

/// An error constructing a SCRU128 ID from a field value that does not fit in its width.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FieldRangeError {
    field: &'static str,
    value: u64,
}

impl FieldRangeError {
    pub(crate) const fn new(field: &'static str, value: u64) -> Self {
        Self { field, value }
    }

    /// Returns the name of the offending field (e.g., `"counter_hi"`).
    pub const fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for FieldRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid field value: `{}` out of range: {}",
            self.field, self.value
        )
    }
}

impl error::Error for FieldRangeError {}

/// An error parsing an invalid string representation of SCRU128 ID.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub(crate) kind: ParseErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum ParseErrorKind {
    InvalidLength {
        n_bytes: usize,
    },
    InvalidDigit {
        /// The offending character as a UTF-8 byte array so that it can be built in `const fn`.
        utf8_char: [u8; 4],
        position: usize,
    },
    OutOfU128Range,
}

impl ParseError {
    pub(crate) const fn invalid_length(n_bytes: usize) -> Self {
        Self {
            kind: ParseErrorKind::InvalidLength { n_bytes },
        }
    }

    /// Creates an `InvalidDigit` error from the source string and the byte position of the first
    /// byte of the offending character.
    pub(crate) const fn invalid_digit(src: &str, position: usize) -> Self {
        let bytes = src.as_bytes();
        let mut utf8_char = [bytes[position], 0, 0, 0];

        // continuation bytes of UTF-8 are 0b10xx_xxxx
        let mut i = 1;
        while i < 4 && position + i < bytes.len() && bytes[position + i] & 0xc0 == 0x80 {
            utf8_char[i] = bytes[position + i];
            i += 1;
        }

        Self {
            kind: ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            },
        }
    }

    pub(crate) const fn out_of_u128_range() -> Self {
        Self {
            kind: ParseErrorKind::OutOfU128Range,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse string as SCRU128 ID: ")?;
        match &self.kind {
            ParseErrorKind::InvalidLength { n_bytes } => {
                write!(f, "invalid length: {} bytes (expected 25)", n_bytes)
            }
            ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            } => {
                let len = utf8_char.iter().take_while(|&&b| b != 0).count().max(1);
                match str::from_utf8(&utf8_char[..len]) {
                    Ok(chr) => write!(f, "invalid digit '{}' at {}", chr.escape_debug(), position),
                    Err(_) => write!(f, "invalid digit at {}", position),
                }
            }
            ParseErrorKind::OutOfU128Range => write!(f, "out of 128-bit value range"),
        }
    }
}

impl error::Error for ParseError {}

/// An error reading the current time from a [`TimeSource`](crate::generator::TimeSource).
#[derive(Debug)]
pub struct ClockError {
    #[cfg(feature = "std")]
    source: Option<std::time::SystemTimeError>,
}

impl ClockError {
    /// Creates an error without an underlying cause, for use by custom time sources.
    pub const fn new() -> Self {
        Self {
            #[cfg(feature = "std")]
            source: None,
        }
    }
}

impl Default for ClockError {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl From<std::time::SystemTimeError> for ClockError {
    fn from(err: std::time::SystemTimeError) -> Self {
        Self { source: Some(err) }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read current time")
    }
}

impl error::Error for ClockError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        #[cfg(feature = "std")]
        if let Some(err) = &self.source {
            return Some(err);
        }
        None
    }
}

/// An error obtaining random bits from a [`RandSource`](crate::generator::RandSource).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RandError {
    message: &'static str,
}

impl RandError {
    /// Creates an error with a short description of the failure.
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl fmt::Display for RandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "random source failed: {}", self.message)
    }
}

impl error::Error for RandError {}

/// An error returned by a generation method of
/// [`Scru128Generator`](crate::Scru128Generator).
///
/// The generator state is left untouched when this error is returned, so the caller may simply
/// retry.
#[derive(Debug)]
pub struct GeneratorError {
    kind: GeneratorErrorKind,
}

/// The reason of a [`GeneratorError`].
#[derive(Debug)]
#[non_exhaustive]
pub enum GeneratorErrorKind {
    /// The timestamp passed was zero or did not fit in 48 bits.
    InvalidTimestamp(u64),

    /// The rollback allowance passed did not fit in 48 bits.
    InvalidRollbackAllowance(u64),

    /// Incrementing the timestamp upon counter overflow exceeded the 48-bit range.
    TimestampOverflow,

    /// The time source failed.
    Clock(ClockError),

    /// The random source failed.
    RandSource(RandError),
}

impl GeneratorError {
    pub(crate) const fn new(kind: GeneratorErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the reason of this error.
    pub const fn kind(&self) -> &GeneratorErrorKind {
        &self.kind
    }
}

impl From<ClockError> for GeneratorError {
    fn from(err: ClockError) -> Self {
        Self::new(GeneratorErrorKind::Clock(err))
    }
}

impl From<RandError> for GeneratorError {
    fn from(err: RandError) -> Self {
        Self::new(GeneratorErrorKind::RandSource(err))
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not generate SCRU128 ID: ")?;
        match &self.kind {
            GeneratorErrorKind::InvalidTimestamp(ts) => {
                write!(f, "`timestamp` must be a 48-bit positive integer: {}", ts)
            }
            GeneratorErrorKind::InvalidRollbackAllowance(value) => {
                write!(f, "`rollback_allowance` out of reasonable range: {}", value)
            }
            GeneratorErrorKind::TimestampOverflow => write!(f, "`timestamp` overflowed"),
            GeneratorErrorKind::Clock(err) => fmt::Display::fmt(err, f),
            GeneratorErrorKind::RandSource(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            GeneratorErrorKind::Clock(err) => Some(err),
            GeneratorErrorKind::RandSource(err) => Some(err),
            _ => None,
        }
    }
}
