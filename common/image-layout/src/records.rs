// Licensed under the Apache-2.0 license

use zerocopy::{
    byteorder::{U16, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout,
};

use crate::fw::FwField;
use crate::{OTP_IMAGE_LEN, OTP_IMAGE_TAG};

/// Offset of [`CodePointers`] inside the header record.
pub const CODE_POINTERS_OFFSET: usize = FwField::UserFwEntryPoint.spec().byte_offset;

/// Offset of [`SegmentTable`] inside the header record.
pub const SEGMENT_TABLE_OFFSET: usize = FwField::FwSeg1Offset.spec().byte_offset;

/// Code placement words the build tool copies through from the source
/// blob without interpretation, except for the RAM code bounds which
/// drive the segment split.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct CodePointers {
    pub entry_point: U32<zerocopy::byteorder::LittleEndian>,
    pub ram_code_flash_start: U32<zerocopy::byteorder::LittleEndian>,
    pub ram_code_flash_end: U32<zerocopy::byteorder::LittleEndian>,
    pub ram_code_ram_start: U32<zerocopy::byteorder::LittleEndian>,
}

/// Segment directory at the tail of the header.
///
/// In a source blob each pair holds (offset, end); in an assembled image
/// the second word of each pair holds the segment size instead.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct SegmentTable {
    pub seg1_offset: U32<zerocopy::byteorder::LittleEndian>,
    pub seg1_end: U32<zerocopy::byteorder::LittleEndian>,
    pub seg2_offset: U32<zerocopy::byteorder::LittleEndian>,
    pub seg2_end: U32<zerocopy::byteorder::LittleEndian>,
    pub seg3_offset: U32<zerocopy::byteorder::LittleEndian>,
    pub seg3_end: U32<zerocopy::byteorder::LittleEndian>,
    pub seg4_offset: U32<zerocopy::byteorder::LittleEndian>,
    pub seg4_end: U32<zerocopy::byteorder::LittleEndian>,
}

impl SegmentTable {
    /// The four (offset, end) pairs in segment order.
    pub fn entries(&self) -> [(u32, u32); 4] {
        [
            (self.seg1_offset.get(), self.seg1_end.get()),
            (self.seg2_offset.get(), self.seg2_end.get()),
            (self.seg3_offset.get(), self.seg3_end.get()),
            (self.seg4_offset.get(), self.seg4_end.get()),
        ]
    }
}

/// 64-byte record prepended to the OTP table when it rides along with
/// the firmware image.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct OtpHeader {
    pub tag: [u8; 8],
    pub checksum: [u8; 32],
    pub image_len: U16<zerocopy::byteorder::BigEndian>,
    pub reserved: [u8; 22],
}

impl OtpHeader {
    pub fn new(checksum: [u8; 32]) -> Self {
        Self {
            tag: OTP_IMAGE_TAG,
            checksum,
            image_len: U16::new(OTP_IMAGE_LEN as u16),
            reserved: [0u8; 22],
        }
    }

    pub fn verify(&self) -> bool {
        self.tag == OTP_IMAGE_TAG && self.image_len.get() == OTP_IMAGE_LEN as u16
    }
}
