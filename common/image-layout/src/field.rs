// Licensed under the Apache-2.0 license

use core::fmt;

/// Byte order of a multi-byte scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Placement of one field inside a fixed-size record.
///
/// A field is either a sub-byte bit group (`mask` is `Some`) or a run of
/// whole bytes starting at `byte_offset`. For a bit group the mask holds
/// the bits of the byte that the field must *preserve*; the field itself
/// occupies the `bit_width` bits starting at `shift`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub byte_offset: usize,
    pub bit_width: u16,
    pub shift: u8,
    pub mask: Option<u8>,
    pub endian: Endian,
}

impl FieldSpec {
    /// Whole-byte little-endian field.
    pub const fn le(name: &'static str, byte_offset: usize, bit_width: u16) -> Self {
        Self {
            name,
            byte_offset,
            bit_width,
            shift: 0,
            mask: None,
            endian: Endian::Little,
        }
    }

    /// Whole-byte big-endian field.
    pub const fn be(name: &'static str, byte_offset: usize, bit_width: u16) -> Self {
        Self {
            name,
            byte_offset,
            bit_width,
            shift: 0,
            mask: None,
            endian: Endian::Big,
        }
    }

    /// Bit group within a single byte.
    pub const fn bits(
        name: &'static str,
        byte_offset: usize,
        bit_width: u16,
        shift: u8,
        mask: u8,
    ) -> Self {
        Self {
            name,
            byte_offset,
            bit_width,
            shift,
            mask: Some(mask),
            endian: Endian::Little,
        }
    }

    /// Number of bytes the field occupies.
    pub const fn byte_len(&self) -> usize {
        (self.bit_width as usize + 7) / 8
    }

    /// True if the field can be written from a `u64` value.
    pub const fn is_scalar(&self) -> bool {
        self.bit_width <= 64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Value does not fit in the field's bit width.
    OutOfRange {
        name: &'static str,
        value: u64,
        bit_width: u16,
    },
    /// Field extends past the end of the record buffer.
    OutOfBounds { name: &'static str },
    /// Byte slice length does not match the field width.
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Field is wider than 64 bits and has no scalar encoding.
    NotScalar { name: &'static str },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::OutOfRange {
                name,
                value,
                bit_width,
            } => write!(
                f,
                "value {value:#x} does not fit in {bit_width}-bit field {name}"
            ),
            FieldError::OutOfBounds { name } => {
                write!(f, "field {name} lies outside the record")
            }
            FieldError::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "field {name} takes {expected} bytes, got {actual}"
            ),
            FieldError::NotScalar { name } => {
                write!(f, "field {name} is wider than 64 bits")
            }
        }
    }
}

impl core::error::Error for FieldError {}

/// Errors if `value` has bits set above the field's width.
pub const fn check_range(spec: &FieldSpec, value: u64) -> Result<(), FieldError> {
    if spec.bit_width < 64 && value > (1u64 << spec.bit_width) - 1 {
        return Err(FieldError::OutOfRange {
            name: spec.name,
            value,
            bit_width: spec.bit_width,
        });
    }
    Ok(())
}

fn check_bounds(buf: &[u8], spec: &FieldSpec) -> Result<(), FieldError> {
    if spec.byte_offset + spec.byte_len() > buf.len() {
        return Err(FieldError::OutOfBounds { name: spec.name });
    }
    Ok(())
}

/// Writes a scalar value into `buf` at the field's position.
///
/// Bit groups are merged with a read-modify-write that keeps the masked
/// bits of the existing byte; whole-byte fields are serialized in the
/// field's byte order.
pub fn write_field(buf: &mut [u8], spec: &FieldSpec, value: u64) -> Result<(), FieldError> {
    if !spec.is_scalar() {
        return Err(FieldError::NotScalar { name: spec.name });
    }
    check_range(spec, value)?;
    check_bounds(buf, spec)?;
    match spec.mask {
        Some(mask) => {
            let old = buf[spec.byte_offset];
            buf[spec.byte_offset] = (old & mask) | ((value as u8) << spec.shift);
        }
        None => {
            let n = spec.byte_len();
            let dst = &mut buf[spec.byte_offset..spec.byte_offset + n];
            match spec.endian {
                Endian::Little => dst.copy_from_slice(&value.to_le_bytes()[..n]),
                Endian::Big => dst.copy_from_slice(&value.to_be_bytes()[8 - n..]),
            }
        }
    }
    Ok(())
}

/// Reads a scalar field back out of `buf`.
pub fn read_field(buf: &[u8], spec: &FieldSpec) -> Result<u64, FieldError> {
    if !spec.is_scalar() {
        return Err(FieldError::NotScalar { name: spec.name });
    }
    check_bounds(buf, spec)?;
    match spec.mask {
        Some(mask) => Ok(u64::from((buf[spec.byte_offset] & !mask) >> spec.shift)),
        None => {
            let src = &buf[spec.byte_offset..spec.byte_offset + spec.byte_len()];
            let mut value = 0u64;
            match spec.endian {
                Endian::Little => {
                    for &b in src.iter().rev() {
                        value = (value << 8) | u64::from(b);
                    }
                }
                Endian::Big => {
                    for &b in src {
                        value = (value << 8) | u64::from(b);
                    }
                }
            }
            Ok(value)
        }
    }
}

/// Copies raw bytes into a wide field. The slice must cover the field
/// exactly; padding is the caller's problem.
pub fn write_bytes(buf: &mut [u8], spec: &FieldSpec, bytes: &[u8]) -> Result<(), FieldError> {
    if bytes.len() != spec.byte_len() {
        return Err(FieldError::LengthMismatch {
            name: spec.name,
            expected: spec.byte_len(),
            actual: bytes.len(),
        });
    }
    check_bounds(buf, spec)?;
    buf[spec.byte_offset..spec.byte_offset + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Borrows the raw bytes of a field.
pub fn read_bytes<'a>(buf: &'a [u8], spec: &FieldSpec) -> Result<&'a [u8], FieldError> {
    check_bounds(buf, spec)?;
    Ok(&buf[spec.byte_offset..spec.byte_offset + spec.byte_len()])
}
