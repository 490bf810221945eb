//! Fixed-point decimal arithmetic
//!
//! Every number is a signed big integer scaled by 10^18. Any result with more
//! fractional precision is truncated toward zero, never rounded. Division and
//! remainder by zero return `None`, which callers surface as NaN.

use crate::error::Result;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Number of fractional digits carried by every value
pub const SCALE_DIGITS: u32 = 18;

/// Largest decimal exponent accepted when parsing (`1e1024`)
pub const MAX_EXPONENT: i64 = 1024;

fn scale() -> &'static BigInt {
    static SCALE: OnceLock<BigInt> = OnceLock::new();
    SCALE.get_or_init(|| pow10(SCALE_DIGITS))
}

fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u32), exp as usize)
}

/// Signed fixed-point decimal with 18 fractional digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal {
    /// value * 10^18
    raw: BigInt,
}

impl Decimal {
    pub fn zero() -> Self {
        Self { raw: BigInt::zero() }
    }

    pub fn one() -> Self {
        Self { raw: scale().clone() }
    }

    /// Build from an integer value
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            raw: value.into() * scale(),
        }
    }

    /// 64-bit words in the scaled representation
    pub fn limbs(&self) -> u64 {
        self.raw.bits() / 64 + 1
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        (&self.raw % scale()).is_zero()
    }

    /// Integer part, truncated toward zero
    pub fn trunc(&self) -> BigInt {
        &self.raw / scale()
    }

    /// Literal value from decimal digit runs: `int_digits.frac_digits e exponent`.
    /// The exponent applies to the whole mantissa before truncation.
    pub fn from_parts(int_digits: &str, frac_digits: &str, exponent: i64) -> Option<Self> {
        if exponent.abs() > MAX_EXPONENT {
            return None;
        }
        let digits = format!("{int_digits}{frac_digits}");
        let mantissa = if digits.is_empty() {
            BigInt::zero()
        } else {
            BigInt::parse_bytes(digits.as_bytes(), 10)?
        };
        let shift = SCALE_DIGITS as i64 + exponent - frac_digits.len() as i64;
        let raw = if shift >= 0 {
            mantissa * pow10(shift as u32)
        } else if -shift > digits.len() as i64 {
            BigInt::zero()
        } else {
            mantissa / pow10((-shift) as u32)
        };
        Some(Self { raw })
    }

    /// Integer literal in the given radix (`0x`, `0o`, `0b` bodies)
    pub fn from_radix(digits: &str, radix: u32) -> Option<Self> {
        if digits.is_empty() {
            return None;
        }
        BigInt::parse_bytes(digits.as_bytes(), radix).map(Self::from_integer)
    }

    /// Numeric text as accepted by string-to-number coercion.
    ///
    /// Accepts an optionally signed decimal with fraction and exponent,
    /// unsigned `0x`/`0o`/`0b` integers and legacy octal (`017`).
    /// Surrounding whitespace is ignored and blank text is zero.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Self::zero());
        }

        let bytes = text.as_bytes();
        if bytes.len() > 2 && bytes[0] == b'0' {
            let body = &text[2..];
            match bytes[1] {
                b'x' | b'X' => return Self::from_radix(body, 16),
                b'o' | b'O' => return Self::from_radix(body, 8),
                b'b' | b'B' => return Self::from_radix(body, 2),
                _ => {}
            }
        }
        if is_legacy_octal(text) {
            return Self::from_radix(&text[1..], 8);
        }

        let (negative, unsigned) = match bytes[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exp_text = &unsigned[pos + 1..];
                let digits = exp_text.strip_prefix(['+', '-']).unwrap_or(exp_text);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (&unsigned[..pos], exp_text.parse::<i64>().ok()?)
            }
            None => (unsigned, 0),
        };
        let (int_digits, frac_digits) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }
        if !int_digits.bytes().chain(frac_digits.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = Self::from_parts(int_digits, frac_digits, exponent)?;
        Some(if negative { value.neg() } else { value })
    }

    pub fn neg(&self) -> Self {
        Self { raw: -&self.raw }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self {
            raw: &self.raw + &other.raw,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self {
            raw: &self.raw - &other.raw,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            raw: (&self.raw * &other.raw) / scale(),
        }
    }

    /// Truncating division; `None` when dividing by zero
    pub fn div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Some(Self {
            raw: (&self.raw * scale()) / &other.raw,
        })
    }

    /// Remainder with the sign of the dividend; `None` when dividing by zero
    pub fn rem(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Some(Self {
            raw: &self.raw % &other.raw,
        })
    }

    /// Integer power. Fractional exponents and `0 ** -n` have no result.
    ///
    /// `charge` is called with the word product of every multiplication
    /// before it happens, so a failing charge stops runaway growth early.
    pub fn pow(&self, exponent: &Self, mut charge: impl FnMut(u64) -> Result<()>) -> Result<Option<Self>> {
        if !exponent.is_integer() {
            return Ok(None);
        }
        let n = exponent.trunc();
        let Some(mut count) = n.abs().to_u64() else {
            return Ok(None);
        };
        let mut base = self.clone();
        let mut acc = Self::one();
        while count > 0 {
            if count & 1 == 1 {
                charge(acc.limbs().saturating_mul(base.limbs()))?;
                acc = acc.mul(&base);
            }
            count >>= 1;
            if count > 0 {
                charge(base.limbs().saturating_mul(base.limbs()))?;
                base = base.mul(&base);
            }
        }
        if n.is_negative() {
            charge(acc.limbs())?;
            Ok(Self::one().div(&acc))
        } else {
            Ok(Some(acc))
        }
    }

    /// Truncate, then wrap into a signed 32-bit integer
    pub fn to_i32_wrapping(&self) -> i32 {
        wrap_bits(&self.trunc(), 32) as u32 as i32
    }

    /// Truncate, then reinterpret as a 64-bit two's-complement word
    pub fn to_u64_wrapping(&self) -> u64 {
        wrap_bits(&self.trunc(), 64)
    }

    /// Exact comparison after scale alignment
    pub fn compare(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

fn wrap_bits(value: &BigInt, bits: u32) -> u64 {
    let modulus = BigInt::one() << bits;
    let wrapped = ((value % &modulus) + &modulus) % &modulus;
    wrapped.to_u64().unwrap_or(0)
}

fn is_legacy_octal(text: &str) -> bool {
    text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| (b'0'..=b'7').contains(&b))
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::from_integer(value)
    }
}

impl From<usize> for Decimal {
    fn from(value: usize) -> Self {
        Self::from_integer(value)
    }
}

/// Minimal decimal form: no exponent, no trailing fractional zeros, no `-0`
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.raw.abs();
        let int_part = &abs / scale();
        let frac_part = &abs % scale();
        if self.raw.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{int_part}")?;
        if !frac_part.is_zero() {
            let frac = format!("{:0>width$}", frac_part.to_string(), width = SCALE_DIGITS as usize);
            write!(f, ".{}", frac.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
