// Licensed under the Apache-2.0 license

//! Splits the monolithic firmware blob into its package segments.
//!
//! The source image carries its own placement metadata: RAM code bounds
//! in the code pointer words and the segment directory at the tail of
//! the header. Everything here is derived from those plus the region
//! geometry in the manifest; the split itself is not configurable.

use std::fs;
use std::mem::size_of;
use std::path::Path;

use anyhow::{Context, Result};
use zerocopy::FromBytes;

use ec_image_layout::{
    align_pad, read_field, CodePointers, FwField, SegmentTable, BB_ALIGNMENT,
    CODE_POINTERS_OFFSET, FW_HEADER_LEN, HASH_CHAIN_LEN, SEGMENT_TABLE_OFFSET,
};

use crate::config::{FirmwareConfig, HeaderConfig};
use crate::error::BuildError;

/// Any of these address bits marks a RAM code pointer as FIU-mapped.
const FIU_ADDRESS_BITS: u32 = 0xF000_0000;
/// FIU-mapped pointers are confined to the low 24 bits.
const FIU_ADDRESS_MASK: u32 = 0x00FF_FFFF;
/// Base of the MCP code mapping.
const MCP_CODE_BASE: u32 = 0x0008_0000;
/// Region granularity when the MCP size code is zero (auto mode).
const AUTO_REGION_SIZE: u32 = 8192;
/// The fan table segment starts at the next multiple of this.
const SEG4_ALIGNMENT: usize = 256;
/// Offset of the work RAM pointer inside a boot block file.
const BB_WORK_RAM_OFFSET: usize = 32;

/// Monolithic firmware blob as produced by the firmware link step.
#[derive(Debug)]
pub struct SourceImage {
    data: Vec<u8>,
    pointers: CodePointers,
    segments: SegmentTable,
}

impl SourceImage {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("cannot read firmware image {}", path.display()))?;
        Ok(Self::from_vec(data)?)
    }

    pub fn from_vec(data: Vec<u8>) -> Result<Self, BuildError> {
        if data.len() < FW_HEADER_LEN {
            return Err(BuildError::SourceTooShort {
                need: FW_HEADER_LEN,
                have: data.len(),
            });
        }
        let pointers = CodePointers::read_from_bytes(
            &data[CODE_POINTERS_OFFSET..CODE_POINTERS_OFFSET + size_of::<CodePointers>()],
        )
        .map_err(|_| BuildError::RecordLength {
            name: "code pointers",
            expected: size_of::<CodePointers>(),
            actual: data.len() - CODE_POINTERS_OFFSET,
        })?;
        let segments = SegmentTable::read_from_bytes(
            &data[SEGMENT_TABLE_OFFSET..SEGMENT_TABLE_OFFSET + size_of::<SegmentTable>()],
        )
        .map_err(|_| BuildError::RecordLength {
            name: "segment table",
            expected: size_of::<SegmentTable>(),
            actual: data.len() - SEGMENT_TABLE_OFFSET,
        })?;
        Ok(Self {
            data,
            pointers,
            segments,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn code_pointers(&self) -> &CodePointers {
        &self.pointers
    }

    pub fn segment_table(&self) -> &SegmentTable {
        &self.segments
    }

    /// Scalar header field of the source blob.
    pub fn header_field(&self, field: FwField) -> Result<u64, BuildError> {
        Ok(read_field(&self.data, &field.spec())?)
    }
}

/// Boot block carried by the package, either appended from a standalone
/// file or already embedded in the source blob.
#[derive(Debug)]
pub enum BootBlock {
    /// File contents zero-padded to the AES block multiple. Appended
    /// behind the data code and digested.
    File { data: Vec<u8>, work_ram: u32 },
    /// Slice of the source blob named by the header's size and offset
    /// fields. Digested but not re-emitted.
    Embedded { data: Vec<u8>, work_ram: u32 },
}

impl BootBlock {
    /// Picks the boot block for a build: a manifest file wins over one
    /// embedded in the source header.
    pub fn resolve(config: &FirmwareConfig, source: &SourceImage) -> Result<Option<Self>> {
        if let Some(path) = &config.boot_block {
            let mut data = fs::read(path)
                .with_context(|| format!("cannot read boot block {}", path.display()))?;
            if data.len() < BB_WORK_RAM_OFFSET + 4 {
                return Err(BuildError::RecordLength {
                    name: "boot block work RAM pointer",
                    expected: BB_WORK_RAM_OFFSET + 4,
                    actual: data.len(),
                }
                .into());
            }
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&data[BB_WORK_RAM_OFFSET..BB_WORK_RAM_OFFSET + 4]);
            let work_ram = u32::from_le_bytes(raw);
            let pad = align_pad(data.len(), BB_ALIGNMENT);
            data.resize(data.len() + pad, 0);
            return Ok(Some(Self::File { data, work_ram }));
        }

        let size = source.header_field(FwField::BbSize)? as usize;
        if size == 0 {
            return Ok(None);
        }
        let offset = source.header_field(FwField::BbOffset)? as usize;
        let end = offset.checked_add(size).unwrap_or(usize::MAX);
        if end > source.len() {
            return Err(BuildError::SegmentBounds {
                name: "embedded boot block",
                start: offset,
                end,
                len: source.len(),
            }
            .into());
        }
        let work_ram = source.header_field(FwField::BbWorkRam)? as u32;
        Ok(Some(Self::Embedded {
            data: source.bytes()[offset..end].to_vec(),
            work_ram,
        }))
    }

    /// Bytes folded into the RAM code digest.
    pub fn digest_bytes(&self) -> &[u8] {
        match self {
            Self::File { data, .. } | Self::Embedded { data, .. } => data,
        }
    }

    /// Bytes appended to the package, if any. An embedded boot block
    /// already travels inside the main firmware segment.
    pub fn appended(&self) -> Option<&[u8]> {
        match self {
            Self::File { data, .. } => Some(data),
            Self::Embedded { .. } => None,
        }
    }

    pub fn work_ram(&self) -> u32 {
        match self {
            Self::File { work_ram, .. } | Self::Embedded { work_ram, .. } => *work_ram,
        }
    }
}

/// Byte geometry of the assembled package, before any OTP block.
#[derive(Debug)]
pub struct SegmentLayout {
    /// First word of the source segment directory, copied through.
    pub seg1_offset: u32,
    pub seg1_size: u32,
    /// Blob offset of the hook segment, copied through.
    pub seg2_offset: u32,
    pub seg2_size: usize,
    /// Blob offset where the flash code starts.
    pub seg3_offset: usize,
    /// Flash, RAM and data code plus any appended boot block.
    pub seg3_size: usize,
    pub seg4_offset: usize,
    pub seg4_size: usize,
    pub seg4_align: usize,
    /// Blob offsets of the RAM code window.
    pub ram_start: usize,
    pub ram_end: usize,
    /// Zero gap between the data code and an appended boot block.
    pub bb_align: usize,
    /// Package length excluding the OTP block.
    pub total_len: usize,
}

impl SegmentLayout {
    pub fn compute(
        source: &SourceImage,
        header: &HeaderConfig,
        boot_block: Option<&BootBlock>,
        fan_table_len: usize,
    ) -> Result<Self, BuildError> {
        let table = source.segment_table();
        let pointers = source.code_pointers();
        let base = active_region_base(header);

        // The RAM code pointers are flash-mapped addresses. Rebase them
        // to blob offsets: strip the active-region base, then either the
        // FIU window bits or the MCP mapping base.
        let mut ram_start = pointers.ram_code_flash_start.get().wrapping_sub(base);
        let mut ram_end = pointers.ram_code_flash_end.get().wrapping_sub(base);
        if ram_end & FIU_ADDRESS_BITS != 0 {
            ram_start &= FIU_ADDRESS_MASK;
            ram_end &= FIU_ADDRESS_MASK;
        } else {
            ram_start = ram_start.wrapping_sub(MCP_CODE_BASE);
            ram_end = ram_end.wrapping_sub(MCP_CODE_BASE);
        }
        let ram_start = ram_start as usize;
        let ram_end = ram_end as usize;

        let seg1_offset = table.seg1_offset.get();
        let seg1_end = table.seg1_end.get();
        if seg1_end < seg1_offset {
            return Err(BuildError::SegmentBounds {
                name: "header segment",
                start: seg1_offset as usize,
                end: seg1_end as usize,
                len: source.len(),
            });
        }
        let seg1_size = seg1_end - seg1_offset;

        let seg2_offset = table.seg2_offset.get();
        let seg2_end = table.seg2_end.get() as usize;
        if (seg2_offset as usize) > seg2_end || seg2_end > source.len() {
            return Err(BuildError::SegmentBounds {
                name: "hook segment",
                start: seg2_offset as usize,
                end: seg2_end,
                len: source.len(),
            });
        }
        let seg2_size = seg2_end - seg2_offset as usize;

        let seg3_offset = table.seg3_offset.get() as usize;
        if seg3_offset > ram_start {
            return Err(BuildError::SegmentBounds {
                name: "flash code",
                start: seg3_offset,
                end: ram_start,
                len: source.len(),
            });
        }
        if ram_start > ram_end || ram_end > source.len() {
            return Err(BuildError::SegmentBounds {
                name: "RAM code",
                start: ram_start,
                end: ram_end,
                len: source.len(),
            });
        }

        let flash_size = ram_start - seg3_offset;
        let ram_size = ram_end - ram_start;
        let data_size = source.len() - ram_end;

        let (bb_len, bb_align) = match boot_block {
            Some(BootBlock::File { data, .. }) => {
                (data.len(), align_pad(source.len(), BB_ALIGNMENT))
            }
            _ => (0, 0),
        };
        let seg3_size = flash_size + ram_size + data_size + bb_len + bb_align;

        let mut total_len = source.len();
        if bb_len != 0 {
            total_len += bb_len + bb_align;
        }

        let (seg4_offset, seg4_size, seg4_align) = if fan_table_len > 0 {
            let seg4_align = align_pad(seg3_offset + seg3_size, SEG4_ALIGNMENT);
            (seg3_offset + seg3_size + seg4_align, fan_table_len, seg4_align)
        } else {
            (0, 0, 0)
        };
        total_len += seg4_size + seg4_align;

        let expected =
            FW_HEADER_LEN + HASH_CHAIN_LEN + seg2_size + seg3_size + seg4_size + seg4_align;
        if expected != total_len {
            return Err(BuildError::PackageLength {
                expected,
                actual: total_len,
            });
        }

        Ok(Self {
            seg1_offset,
            seg1_size,
            seg2_offset,
            seg2_size,
            seg3_offset,
            seg3_size,
            seg4_offset,
            seg4_size,
            seg4_align,
            ram_start,
            ram_end,
            bb_align,
            total_len,
        })
    }

    // The accessors below index without rechecking; compute() validated
    // every bound against the blob length.

    pub fn hook<'a>(&self, source: &'a SourceImage) -> &'a [u8] {
        let start = self.seg2_offset as usize;
        &source.bytes()[start..start + self.seg2_size]
    }

    pub fn flash_code<'a>(&self, source: &'a SourceImage) -> &'a [u8] {
        &source.bytes()[self.seg3_offset..self.ram_start]
    }

    pub fn ram_code<'a>(&self, source: &'a SourceImage) -> &'a [u8] {
        &source.bytes()[self.ram_start..self.ram_end]
    }

    pub fn data_code<'a>(&self, source: &'a SourceImage) -> &'a [u8] {
        &source.bytes()[self.ram_end..]
    }

    /// Package offset where an appended boot block lands.
    pub fn appended_bb_offset(&self, source: &SourceImage) -> u32 {
        (source.len() + self.bb_align) as u32
    }
}

/// Byte base of the active firmware region selected by the manifest.
fn active_region_base(header: &HeaderConfig) -> u32 {
    let index = header.active_fw_offset as u32;
    if header.mcp_flash_size == 0 {
        // auto mode, 8 KiB regions
        index * AUTO_REGION_SIZE
    } else {
        index * (2048u32 << header.mcp_flash_size)
    }
}
