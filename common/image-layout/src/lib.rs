// Licensed under the Apache-2.0 license

//! Binary layout of the EC firmware image format.
//!
//! The signed image starts with a fixed 1280-byte firmware header followed
//! by a 256-byte hash chain, then the firmware segments. An optional OTP
//! configuration block (64-byte header plus 1024-byte table) may trail the
//! image at a 256-byte boundary. This crate holds the field tables and
//! record definitions shared by the image builder and by anything that has
//! to parse an assembled image; the assembly logic lives in the builder.

#![cfg_attr(target_arch = "arm", no_std)]

mod field;
mod fw;
mod otp;
mod records;

pub use field::{
    read_bytes, read_field, write_bytes, write_field, Endian, FieldError, FieldSpec,
};
pub use fw::FwField;
pub use otp::OtpField;
pub use records::{
    CodePointers, OtpHeader, SegmentTable, CODE_POINTERS_OFFSET, SEGMENT_TABLE_OFFSET,
};

/// Total size of the firmware header record.
pub const FW_HEADER_LEN: usize = 1280;

/// Size of the hash chain that immediately follows the header.
pub const HASH_CHAIN_LEN: usize = 256;

/// Size of one slot in the hash chain.
pub const HASH_SLOT_LEN: usize = 64;

/// Size of the signature field inside the header.
pub const SIGNATURE_LEN: usize = 512;

/// Size of the OTP configuration table.
pub const OTP_IMAGE_LEN: usize = 1024;

/// Size of the header record prepended to the OTP table.
pub const OTP_HEADER_LEN: usize = 64;

/// The OTP block is placed at the next multiple of this after the segments.
pub const OTP_ALIGNMENT: usize = 256;

/// A boot block appended from a file is placed at this alignment.
pub const BB_ALIGNMENT: usize = 256;

/// Offset of the signed region of the header.
pub const SIGN_FIELD_OFFSET: usize = 528;

/// Length of the signed region; it runs to the end of the header.
pub const SIGN_FIELD_LEN: usize = FW_HEADER_LEN - SIGN_FIELD_OFFSET;

/// Magic tag at offset 0 of the firmware header.
pub const FW_IMAGE_TAG: [u8; 8] = *b"%FiMg32@";

/// Magic tag at offset 0 of the OTP block header.
pub const OTP_IMAGE_TAG: [u8; 8] = *b"%OtPmAp@";

/// Number of zero bytes needed to pad `len` up to a multiple of `align`.
pub const fn align_pad(len: usize, align: usize) -> usize {
    let rem = len % align;
    if rem == 0 {
        0
    } else {
        align - rem
    }
}
