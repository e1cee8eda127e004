// Licensed under the Apache-2.0 license

//! The four-slot hash chain between the header and the first segment.
//!
//! Slot 1 digests the signed region of the header; slots 2 through 4
//! digest the hook, main firmware and fan table segments. A 256-bit
//! digest fills the front half of its 64-byte slot and leaves the rest
//! zero. Absent segments leave their whole slot zero.

use ec_image_layout::{HASH_CHAIN_LEN, HASH_SLOT_LEN, SIGN_FIELD_LEN, SIGN_FIELD_OFFSET};

use crate::crypto::{HashWidth, ImageCrypto};
use crate::error::BuildError;
use crate::segments::{BootBlock, SegmentLayout, SourceImage};

pub fn build_hash_chain(
    header: &[u8],
    source: &SourceImage,
    layout: &SegmentLayout,
    boot_block: Option<&BootBlock>,
    fan_table: Option<&[u8]>,
    width: HashWidth,
    crypto: &dyn ImageCrypto,
) -> Result<[u8; HASH_CHAIN_LEN], BuildError> {
    let mut chain = [0u8; HASH_CHAIN_LEN];

    let sign_field = &header[SIGN_FIELD_OFFSET..SIGN_FIELD_OFFSET + SIGN_FIELD_LEN];
    fill_slot(&mut chain, 0, &crypto.digest(sign_field, width), width)?;

    if layout.seg2_size > 0 {
        fill_slot(&mut chain, 1, &crypto.digest(layout.hook(source), width), width)?;
    }

    // The main firmware digest covers the bytes as they land in the
    // package: flash, RAM and data code, then the alignment gap and the
    // boot block when one is appended.
    let mut seg3 = Vec::with_capacity(layout.seg3_size);
    seg3.extend_from_slice(layout.flash_code(source));
    seg3.extend_from_slice(layout.ram_code(source));
    seg3.extend_from_slice(layout.data_code(source));
    if let Some(appended) = boot_block.and_then(BootBlock::appended) {
        seg3.resize(seg3.len() + layout.bb_align, 0);
        seg3.extend_from_slice(appended);
    }
    fill_slot(&mut chain, 2, &crypto.digest(&seg3, width), width)?;

    if let Some(fan) = fan_table {
        if !fan.is_empty() {
            fill_slot(&mut chain, 3, &crypto.digest(fan, width), width)?;
        }
    }

    Ok(chain)
}

fn fill_slot(
    chain: &mut [u8; HASH_CHAIN_LEN],
    index: usize,
    digest: &[u8],
    width: HashWidth,
) -> Result<(), BuildError> {
    if digest.len() != width.digest_len() {
        return Err(BuildError::DigestLength {
            expected: width.digest_len(),
            actual: digest.len(),
        });
    }
    let start = index * HASH_SLOT_LEN;
    chain[start..start + digest.len()].copy_from_slice(digest);
    Ok(())
}
