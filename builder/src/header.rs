// Licensed under the Apache-2.0 license

//! Produces the 1280-byte firmware header record.
//!
//! Only the tail of the record, from the active-offset word at 528
//! onward, is covered by the signature. The build fills that signed
//! region first, digests it into the hash chain, and folds the outer
//! wrap (tag, signature, OTP header offset) in afterwards.

use zerocopy::IntoBytes;

use ec_image_layout::{
    read_bytes, write_bytes, write_field, FwField, CODE_POINTERS_OFFSET, FW_IMAGE_TAG,
};

use crate::config::HeaderConfig;
use crate::crypto::{HashWidth, ImageCrypto};
use crate::error::BuildError;
use crate::segments::{BootBlock, SegmentLayout, SourceImage};

/// Values for the hRevokeKey / hRevokeKeyInv pair. Anything but the two
/// defined revocation indexes writes a cleared pair.
fn revoke_pair(index: Option<u8>) -> (u8, u8) {
    match index {
        Some(0x58) => (0x58, 0xA7),
        Some(0x59) => (0x59, 0xA6),
        _ => (0, 0),
    }
}

/// OEM version is stored right-padded with ASCII zeros. Length is
/// re-checked here; callers are not required to come through manifest
/// validation.
fn oem_version_bytes(text: &str) -> Result<[u8; 8], BuildError> {
    if text.len() > 8 {
        return Err(BuildError::Manifest {
            field: "header.oem_version",
            reason: format!("{:?} exceeds 8 bytes", text),
        });
    }
    let mut out = [b'0'; 8];
    out[..text.len()].copy_from_slice(text.as_bytes());
    Ok(out)
}

/// Fills the signed region of a zeroed header buffer.
pub fn fill_sign_field(
    buf: &mut [u8],
    config: &HeaderConfig,
    source: &SourceImage,
    layout: &SegmentLayout,
    boot_block: Option<&BootBlock>,
    crypto: &dyn ImageCrypto,
) -> Result<(), BuildError> {
    let width = HashWidth::from_bits(config.hash_width)?;

    write_field(
        buf,
        &FwField::ActiveEcFwOffset.spec(),
        config.active_fw_offset.into(),
    )?;
    write_field(
        buf,
        &FwField::SystemEcFwOffset.spec(),
        config.system_fw_offset.into(),
    )?;
    write_field(buf, &FwField::DevMode.spec(), config.dev_mode.into())?;
    write_field(
        buf,
        &FwField::EcFwRegionSize.spec(),
        config.ec_fw_region_size.into(),
    )?;

    // Code pointers pass through from the source blob untouched.
    let pointers = source.code_pointers().as_bytes();
    buf[CODE_POINTERS_OFFSET..CODE_POINTERS_OFFSET + pointers.len()].copy_from_slice(pointers);

    write_field(buf, &FwField::ImageLen.spec(), layout.total_len as u64)?;
    if matches!(width, HashWidth::Sha512) {
        write_field(buf, &FwField::ShaAlgoUsed.spec(), 1)?;
    }
    write_field(buf, &FwField::MajorVer.spec(), config.major_version.into())?;
    write_field(buf, &FwField::MinorVer.spec(), config.minor_version.into())?;

    let (revoke, revoke_inv) = revoke_pair(config.revoke_key_index);
    write_field(buf, &FwField::RevokeKey.spec(), revoke.into())?;
    write_field(buf, &FwField::RevokeKeyInv.spec(), revoke_inv.into())?;

    match boot_block {
        Some(bb @ BootBlock::File { .. }) => {
            write_field(buf, &FwField::BbSize.spec(), bb.digest_bytes().len() as u64)?;
            write_field(
                buf,
                &FwField::BbOffset.spec(),
                layout.appended_bb_offset(source).into(),
            )?;
        }
        // An embedded or absent boot block keeps the source's values.
        _ => {
            write_field(buf, &FwField::BbSize.spec(), source.header_field(FwField::BbSize)?)?;
            write_field(
                buf,
                &FwField::BbOffset.spec(),
                source.header_field(FwField::BbOffset)?,
            )?;
        }
    }
    match boot_block {
        Some(bb) => write_field(buf, &FwField::BbWorkRam.spec(), bb.work_ram().into())?,
        None => write_field(
            buf,
            &FwField::BbWorkRam.spec(),
            source.header_field(FwField::BbWorkRam)?,
        )?,
    }

    // The RAM code hash stays 256-bit regardless of the package hash
    // width; the boot loader checks it before anything else runs.
    let mut ram_bb = layout.ram_code(source).to_vec();
    if let Some(bb) = boot_block {
        ram_bb.extend_from_slice(bb.digest_bytes());
    }
    write_bytes(
        buf,
        &FwField::RamCodeHash.spec(),
        &crypto.digest(&ram_bb, HashWidth::Sha256),
    )?;

    write_bytes(
        buf,
        &FwField::OemVersion.spec(),
        &oem_version_bytes(&config.oem_version)?,
    )?;
    write_field(buf, &FwField::ReleaseDate.spec(), config.release_date.into())?;
    write_field(buf, &FwField::ProjectId.spec(), config.project_id.into())?;
    write_bytes(
        buf,
        &FwField::OemReserved.spec(),
        read_bytes(source.bytes(), &FwField::OemReserved.spec())?,
    )?;

    // Segment directory: offsets plus sizes, replacing the source's
    // (offset, end) pairs.
    write_field(buf, &FwField::FwSeg1Offset.spec(), layout.seg1_offset.into())?;
    write_field(buf, &FwField::FwSeg1End.spec(), layout.seg1_size.into())?;
    write_field(buf, &FwField::FwSeg2Offset.spec(), layout.seg2_offset.into())?;
    write_field(buf, &FwField::FwSeg2End.spec(), layout.seg2_size as u64)?;
    write_field(buf, &FwField::FwSeg3Offset.spec(), layout.seg3_offset as u64)?;
    write_field(buf, &FwField::FwSeg3End.spec(), layout.seg3_size as u64)?;
    write_field(buf, &FwField::FwSeg4Offset.spec(), layout.seg4_offset as u64)?;
    write_field(buf, &FwField::FwSeg4End.spec(), layout.seg4_size as u64)?;

    Ok(())
}

/// Applies the outer wrap around the signed region: the image tag, the
/// signature over the hash chain, and the OTP header offset when an OTP
/// block trails the package.
pub fn apply_wrap(
    buf: &mut [u8],
    config: &HeaderConfig,
    signature: Option<&[u8]>,
    otp_header_offset: Option<u32>,
) -> Result<(), BuildError> {
    let tag = config.image_tag.as_bytes();
    if tag.len() != FW_IMAGE_TAG.len() {
        return Err(BuildError::Manifest {
            field: "header.image_tag",
            reason: format!("{:?} is not 8 bytes", config.image_tag),
        });
    }
    buf[..tag.len()].copy_from_slice(tag);

    if let Some(sig) = signature {
        let spec = FwField::Signature.spec();
        if sig.len() > spec.byte_len() {
            return Err(BuildError::RecordLength {
                name: "signature",
                expected: spec.byte_len(),
                actual: sig.len(),
            });
        }
        // Shorter signatures sit at the front of the zeroed field.
        buf[spec.byte_offset..spec.byte_offset + sig.len()].copy_from_slice(sig);
    }

    if let Some(offset) = otp_header_offset {
        write_field(buf, &FwField::OtpImgHdrOffset.spec(), offset.into())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha2Crypto;
    use ec_image_layout::FW_HEADER_LEN;
    use sha2::{Digest, Sha256};

    fn put_u32_le(blob: &mut [u8], offset: usize, value: u32) {
        blob[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// 4096-byte blob with a hook at [1536, 1544) and an MCP-mapped RAM
    /// code window at [0x800, 0xA00).
    fn fixture_source() -> SourceImage {
        let mut blob = vec![0u8; 4096];
        put_u32_le(&mut blob, 540, 0x1111_2222);
        put_u32_le(&mut blob, 544, 0x0008_0800);
        put_u32_le(&mut blob, 548, 0x0008_0A00);
        put_u32_le(&mut blob, 552, 0x2000_0000);
        blob[1197..1200].copy_from_slice(&[0xDE, 0xAD, 0xBE]);
        put_u32_le(&mut blob, 1216, 8);
        put_u32_le(&mut blob, 1220, 520);
        put_u32_le(&mut blob, 1224, 1536);
        put_u32_le(&mut blob, 1228, 1544);
        put_u32_le(&mut blob, 1232, 1544);
        for i in 0x800..0xA00 {
            blob[i] = (i & 0xFF) as u8;
        }
        SourceImage::from_vec(blob).unwrap()
    }

    fn build_header(config: &HeaderConfig) -> (Vec<u8>, SourceImage) {
        let source = fixture_source();
        let layout = SegmentLayout::compute(&source, config, None, 0).unwrap();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        fill_sign_field(&mut buf, config, &source, &layout, None, &Sha2Crypto).unwrap();
        (buf, source)
    }

    #[test]
    fn test_sign_field_values() {
        let config = HeaderConfig {
            active_fw_offset: 0,
            system_fw_offset: 0x0010_0000,
            major_version: 2,
            minor_version: 0x0304,
            project_id: 0x1234,
            release_date: 0x24_01_15,
            ..HeaderConfig::default()
        };
        let (buf, source) = build_header(&config);

        assert_eq!(&buf[528..530], &[0, 0]);
        assert_eq!(&buf[532..536], &0x0010_0000u32.to_le_bytes());
        assert_eq!(buf[536], 0x30);
        // Code pointers copied verbatim.
        assert_eq!(&buf[540..556], &source.bytes()[540..556]);
        // Package length, big-endian.
        assert_eq!(&buf[556..560], &4096u32.to_be_bytes());
        assert_eq!(buf[560], 0);
        assert_eq!(buf[561], 2);
        assert_eq!(&buf[562..564], &0x0304u16.to_le_bytes());
        // Release date and project id are big-endian.
        assert_eq!(&buf[1192..1195], &[0x24, 0x01, 0x15]);
        assert_eq!(&buf[1195..1197], &[0x12, 0x34]);
        // OEM reserved bytes pass through.
        assert_eq!(&buf[1197..1200], &[0xDE, 0xAD, 0xBE]);
        // Segment directory holds offset and size pairs.
        assert_eq!(&buf[1216..1220], &8u32.to_le_bytes());
        assert_eq!(&buf[1220..1224], &512u32.to_le_bytes());
        assert_eq!(&buf[1224..1228], &1536u32.to_le_bytes());
        assert_eq!(&buf[1228..1232], &8u32.to_le_bytes());
        assert_eq!(&buf[1232..1236], &1544u32.to_le_bytes());
        assert_eq!(&buf[1236..1240], &(4096u32 - 1544).to_le_bytes());
        assert_eq!(&buf[1240..1248], &[0u8; 8]);
        // Wrap region untouched by the sign-field pass.
        assert_eq!(&buf[0..528], &[0u8; 528][..]);
    }

    #[test]
    fn test_ram_code_hash_is_sha256_of_ram_window() {
        let config = HeaderConfig::default();
        let (buf, source) = build_header(&config);
        let expected = Sha256::digest(&source.bytes()[0x800..0xA00]);
        assert_eq!(&buf[1152..1184], expected.as_slice());
    }

    #[test]
    fn test_oem_version_right_padded() {
        assert_eq!(&oem_version_bytes("A0B1").unwrap(), b"A0B10000");
        assert_eq!(&oem_version_bytes("").unwrap(), b"00000000");
        assert_eq!(&oem_version_bytes("ABCDEFGH").unwrap(), b"ABCDEFGH");

        let config = HeaderConfig {
            oem_version: "A0B1".to_string(),
            ..HeaderConfig::default()
        };
        let (buf, _) = build_header(&config);
        assert_eq!(&buf[1184..1192], b"A0B10000");
    }

    #[test]
    fn test_oem_version_too_long_rejected() {
        let config = HeaderConfig {
            oem_version: "ABCDEFGHI".to_string(),
            ..HeaderConfig::default()
        };
        let source = fixture_source();
        let layout = SegmentLayout::compute(&source, &config, None, 0).unwrap();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        let err =
            fill_sign_field(&mut buf, &config, &source, &layout, None, &Sha2Crypto).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Manifest {
                field: "header.oem_version",
                ..
            }
        ));
    }

    #[test]
    fn test_revoke_pairs() {
        assert_eq!(revoke_pair(Some(0x58)), (0x58, 0xA7));
        assert_eq!(revoke_pair(Some(0x59)), (0x59, 0xA6));
        assert_eq!(revoke_pair(Some(0x10)), (0, 0));
        assert_eq!(revoke_pair(None), (0, 0));

        let config = HeaderConfig {
            revoke_key_index: Some(0x59),
            ..HeaderConfig::default()
        };
        let (buf, _) = build_header(&config);
        assert_eq!(&buf[564..566], &[0x59, 0xA6]);
    }

    #[test]
    fn test_sha512_width_sets_algo_bit() {
        let config = HeaderConfig {
            hash_width: 512,
            ..HeaderConfig::default()
        };
        let (buf, _) = build_header(&config);
        assert_eq!(buf[560], 0x40);
    }

    #[test]
    fn test_wrap_fields() {
        let config = HeaderConfig::default();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        let sig = vec![0xA5u8; 96];
        apply_wrap(&mut buf, &config, Some(&sig), Some(0x1100)).unwrap();

        assert_eq!(&buf[0..8], b"%FiMg32@");
        assert_eq!(&buf[8..104], &sig[..]);
        assert_eq!(&buf[104..520], &[0u8; 416][..]);
        assert_eq!(&buf[520..524], &0x1100u32.to_be_bytes());
        assert_eq!(&buf[524..528], &[0u8; 4]);
    }

    #[test]
    fn test_wrap_without_otp_or_signature() {
        let config = HeaderConfig::default();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        apply_wrap(&mut buf, &config, None, None).unwrap();
        assert_eq!(&buf[8..528], &[0u8; 520][..]);
    }

    #[test]
    fn test_oversized_signature_rejected() {
        let config = HeaderConfig::default();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        let sig = vec![0u8; 513];
        let err = apply_wrap(&mut buf, &config, Some(&sig), None).unwrap_err();
        assert_eq!(
            err,
            BuildError::RecordLength {
                name: "signature",
                expected: 512,
                actual: 513
            }
        );
    }

    #[test]
    fn test_dev_mode_out_of_range() {
        let config = HeaderConfig {
            dev_mode: 0x40,
            ..HeaderConfig::default()
        };
        let source = fixture_source();
        let layout = SegmentLayout::compute(&source, &config, None, 0).unwrap();
        let mut buf = vec![0u8; FW_HEADER_LEN];
        let err =
            fill_sign_field(&mut buf, &config, &source, &layout, None, &Sha2Crypto).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Field(ec_image_layout::FieldError::OutOfRange { .. })
        ));
    }
}
