#[cfg(not(feature = "std"))]
use core as std;

use crate::error::{FieldRangeError, ParseError};
use crate::{MAX_COUNTER_HI, MAX_COUNTER_LO, MAX_TIMESTAMP};
use fstr::FStr;
use std::{cmp, fmt, str};

/// Digit characters used in the Base36 notation.
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of Base36 digits per `u64` chunk.
const CHUNK_DIGITS: usize = 10;

/// `36^10`, the radix of one chunk, which keeps every chunk below `2^52`.
const CHUNK_RADIX: u128 = 36u128.pow(CHUNK_DIGITS as u32);

/// An O(1) map from ASCII code points to Base36 digit values; `0xff` marks non-digits.
const DECODE_MAP: [u8; 256] = {
    let mut map = [0xffu8; 256];
    let mut i = 0;
    while i < 36 {
        map[DIGITS[i] as usize] = i as u8;
        map[DIGITS[i].to_ascii_uppercase() as usize] = i as u8;
        i += 1;
    }
    map
};

/// Represents a SCRU128 ID and provides converters and comparison operators.
///
/// The 128 bits are held as a big-endian byte array, so the derived comparison operators compare
/// IDs by `timestamp`, `counter_hi`, `counter_lo` and `entropy` in this order, which is also the
/// lexicographic order of their 25-digit string representations.
///
/// # Examples
///
/// ```rust
/// use scru128::Scru128Id;
///
/// let x = "036z968fu2tugy7svkfznewkk".parse::<Scru128Id>()?;
/// assert_eq!(x.to_string(), "036z968fu2tugy7svkfznewkk");
///
/// let y = Scru128Id::from(0x017fa1de51a80fd992f9e8cc2d5eb88eu128);
/// assert_eq!(y.to_u128(), 0x017fa1de51a80fd992f9e8cc2d5eb88eu128);
/// # Ok::<(), scru128::ParseError>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Scru128Id([u8; 16]);

impl Scru128Id {
    /// Creates an object from a 128-bit unsigned integer.
    pub const fn from_u128(int_value: u128) -> Self {
        Self(int_value.to_be_bytes())
    }

    /// Returns the 128-bit unsigned integer representation.
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Creates an object from a 16-byte big-endian byte array.
    ///
    /// Every bit pattern is a valid SCRU128 ID, so this conversion never fails.
    pub const fn from_bytes(array_value: [u8; 16]) -> Self {
        Self(array_value)
    }

    /// Returns the big-endian byte array representation.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a reference to the big-endian byte array representation.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates an object from field values.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument is out of the value range of the field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::Scru128Id;
    ///
    /// let x = Scru128Id::from_fields(0x0186_7c71_b8b0, 0x1b_6a2c, 0x4f_80f1, 0xdead_beef)?;
    /// assert_eq!(x.timestamp(), 0x0186_7c71_b8b0);
    /// assert_eq!(x.entropy(), 0xdead_beef);
    ///
    /// assert!(Scru128Id::from_fields(0, 1 << 24, 0, 0).is_err());
    /// # Ok::<(), scru128::FieldRangeError>(())
    /// ```
    pub const fn from_fields(
        timestamp: u64,
        counter_hi: u32,
        counter_lo: u32,
        entropy: u32,
    ) -> Result<Self, FieldRangeError> {
        if timestamp > MAX_TIMESTAMP {
            Err(FieldRangeError::new("timestamp", timestamp))
        } else if counter_hi > MAX_COUNTER_HI {
            Err(FieldRangeError::new("counter_hi", counter_hi as u64))
        } else if counter_lo > MAX_COUNTER_LO {
            Err(FieldRangeError::new("counter_lo", counter_lo as u64))
        } else {
            Ok(Self::from_fields_unchecked(timestamp, counter_hi, counter_lo, entropy))
        }
    }

    /// Packs field values that the caller has already checked against their widths.
    pub(crate) const fn from_fields_unchecked(
        timestamp: u64,
        counter_hi: u32,
        counter_lo: u32,
        entropy: u32,
    ) -> Self {
        Self::from_u128(
            ((timestamp as u128) << 80)
                | ((counter_hi as u128) << 56)
                | ((counter_lo as u128) << 32)
                | (entropy as u128),
        )
    }

    /// Returns the 48-bit `timestamp` field value.
    pub const fn timestamp(&self) -> u64 {
        (self.to_u128() >> 80) as u64
    }

    /// Returns the 24-bit `counter_hi` field value.
    pub const fn counter_hi(&self) -> u32 {
        (self.to_u128() >> 56) as u32 & MAX_COUNTER_HI
    }

    /// Returns the 24-bit `counter_lo` field value.
    pub const fn counter_lo(&self) -> u32 {
        (self.to_u128() >> 32) as u32 & MAX_COUNTER_LO
    }

    /// Returns the 32-bit `entropy` field value.
    pub const fn entropy(&self) -> u32 {
        self.to_u128() as u32
    }

    /// Compares two IDs as unsigned 128-bit integers.
    ///
    /// The result equals that of comparing the byte arrays or the string representations.
    pub fn compare(&self, other: &Self) -> cmp::Ordering {
        Ord::cmp(self, other)
    }

    /// Creates an object from a 25-digit string representation.
    ///
    /// Both upper- and lowercase letters are accepted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::Scru128Id;
    ///
    /// let x = Scru128Id::try_from_str("037d0xye6op48cmce8ey4xlcf")?;
    /// let y = "037D0XYE6OP48CMCE8EY4XLCF".parse::<Scru128Id>()?;
    /// assert_eq!(x, y);
    /// # Ok::<(), scru128::ParseError>(())
    /// ```
    pub const fn try_from_str(str_value: &str) -> Result<Self, ParseError> {
        let src = str_value.as_bytes();
        if src.len() != 25 {
            return Err(ParseError::invalid_length(src.len()));
        }

        // fold 5 + 10 + 10 digits into u64 chunks and accumulate them at radix 36^n
        let mut int_value = 0u128;
        let mut start = 0;
        let mut end = src.len() % CHUNK_DIGITS;
        while start < src.len() {
            let mut chunk = 0u64;
            let mut i = start;
            while i < end {
                let n = DECODE_MAP[src[i] as usize];
                if n == 0xff {
                    return Err(ParseError::invalid_digit(str_value, i));
                }
                chunk = chunk * 36 + n as u64;
                i += 1;
            }

            let radix = 36u128.pow((end - start) as u32);
            int_value = match int_value.checked_mul(radix) {
                Some(shifted) => match shifted.checked_add(chunk as u128) {
                    Some(sum) => sum,
                    None => return Err(ParseError::out_of_u128_range()),
                },
                None => return Err(ParseError::out_of_u128_range()),
            };

            start = end;
            end += CHUNK_DIGITS;
        }
        Ok(Self::from_u128(int_value))
    }

    /// Returns the 25-digit string representation stored in a stack-allocated string-like type
    /// that can be handled like [`String`] through common traits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::Scru128Id;
    ///
    /// let x = "037d0xye6op48cmce8ey4xlcf".parse::<Scru128Id>()?;
    /// let y = x.encode();
    /// assert_eq!(y, "037d0xye6op48cmce8ey4xlcf");
    /// assert_eq!(format!("{}", y), "037d0xye6op48cmce8ey4xlcf");
    /// # Ok::<(), scru128::ParseError>(())
    /// ```
    pub const fn encode(&self) -> FStr<25> {
        let mut dst = [b'0'; 25];
        let mut int_value = self.to_u128();
        let mut end = dst.len();
        while int_value > 0 {
            let mut chunk = (int_value % CHUNK_RADIX) as u64;
            int_value /= CHUNK_RADIX;

            let mut i = end;
            while chunk > 0 {
                i -= 1;
                dst[i] = DIGITS[(chunk % 36) as usize];
                chunk /= 36;
            }
            end = end.saturating_sub(CHUNK_DIGITS);
        }

        // SAFETY: `dst` consists of ASCII digits and letters only.
        unsafe { FStr::from_bytes_unchecked(dst) }
    }
}

impl From<u128> for Scru128Id {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<Scru128Id> for u128 {
    fn from(object: Scru128Id) -> Self {
        object.to_u128()
    }
}

impl From<[u8; 16]> for Scru128Id {
    /// Creates an object from a 16-byte big-endian byte array.
    fn from(value: [u8; 16]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<Scru128Id> for [u8; 16] {
    /// Returns the big-endian byte array representation.
    fn from(object: Scru128Id) -> Self {
        object.to_bytes()
    }
}

impl AsRef<[u8]> for Scru128Id {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl str::FromStr for Scru128Id {
    type Err = ParseError;

    /// Creates an object from a 25-digit string representation.
    fn from_str(str_value: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(str_value)
    }
}

impl TryFrom<&str> for Scru128Id {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from_str(value)
    }
}

impl fmt::Display for Scru128Id {
    /// Returns the 25-digit canonical string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::Scru128Id;
    ///
    /// let x = "03997ft3ckz99o1i3f82zat1t".parse::<Scru128Id>()?;
    /// assert_eq!(format!("{}", x), "03997ft3ckz99o1i3f82zat1t");
    /// assert_eq!(format!("{:->32}", x), "-------03997ft3ckz99o1i3f82zat1t");
    /// # Ok::<(), scru128::ParseError>(())
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.encode().as_str(), f)
    }
}

#[cfg(feature = "std")]
mod with_std {
    use super::{ParseError, Scru128Id};

    impl TryFrom<String> for Scru128Id {
        type Error = ParseError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_from_str(&value)
        }
    }

    impl From<Scru128Id> for String {
        fn from(object: Scru128Id) -> Self {
            object.encode().into()
        }
    }
}


#[cfg(feature = "serde")]
mod with_serde {
    use super::{fmt, str, Scru128Id};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Scru128Id {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Scru128Id {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(IdVisitor)
            } else {
                deserializer.deserialize_bytes(IdVisitor)
            }
        }
    }

    struct IdVisitor;

    impl de::Visitor<'_> for IdVisitor {
        type Value = Scru128Id;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a SCRU128 ID as 25-digit string or 16-byte array")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Scru128Id::try_from_str(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            if let Ok(array_value) = <[u8; 16]>::try_from(value) {
                return Ok(Scru128Id::from_bytes(array_value));
            }
            match str::from_utf8(value) {
                Ok(str_value) => self.visit_str(str_value),
                Err(_) => Err(de::Error::invalid_length(value.len(), &self)),
            }
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
            Ok(Scru128Id::from_u128(value))
        }
    }

}
