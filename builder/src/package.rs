// Licensed under the Apache-2.0 license

//! Assembles the firmware package from the manifest's inputs.
//!
//! Packing order matches what the boot ROM walks at verification time:
//! header, hash chain, hook code, flash/RAM/data code, then the
//! optional boot block, fan table and OTP block, each aligned to a
//! 256-byte boundary.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tempfile::NamedTempFile;
use zerocopy::IntoBytes;

use ec_image_layout::{align_pad, FW_HEADER_LEN, OTP_ALIGNMENT};

use crate::config::Manifest;
use crate::crypto::{HashWidth, ImageCrypto};
use crate::error::BuildError;
use crate::hash_chain::build_hash_chain;
use crate::header::{apply_wrap, fill_sign_field};
use crate::otp::build_otp_image;
use crate::segments::{BootBlock, SegmentLayout, SourceImage};

/// Builds the package and writes it to the manifest's output path.
///
/// The bytes go through a temporary file beside the output and only
/// take its name once complete; a failed build leaves no artifact.
pub fn build(manifest: &Manifest, crypto: &dyn ImageCrypto) -> Result<()> {
    let package = build_package(manifest, crypto)?;
    let output = &manifest.firmware.output;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create package file in {}", dir.display()))?;
    file.write_all(&package)
        .with_context(|| format!("cannot write package {}", output.display()))?;
    file.persist(output)
        .map_err(|e| e.error)
        .with_context(|| format!("cannot write package {}", output.display()))?;
    info!("wrote {} ({} bytes)", output.display(), package.len());
    Ok(())
}

/// Assembles the package in memory.
pub fn build_package(manifest: &Manifest, crypto: &dyn ImageCrypto) -> Result<Vec<u8>> {
    let width = HashWidth::from_bits(manifest.header.hash_width)?;
    let source = SourceImage::load(&manifest.firmware.image)?;
    info!(
        "loaded {} ({} bytes)",
        manifest.firmware.image.display(),
        source.len()
    );

    let boot_block = BootBlock::resolve(&manifest.firmware, &source)?;
    let fan_table = manifest
        .fan_table
        .as_ref()
        .map(|f| f.values.as_slice())
        .filter(|v| !v.is_empty());
    let layout = SegmentLayout::compute(
        &source,
        &manifest.header,
        boot_block.as_ref(),
        fan_table.map_or(0, |v| v.len()),
    )?;
    info!("segment layout resolved, package length {}", layout.total_len);

    // Sign-field first; the hash chain covers it, and the wrap fields
    // written afterwards all sit below offset 528.
    let mut header = vec![0u8; FW_HEADER_LEN];
    fill_sign_field(
        &mut header,
        &manifest.header,
        &source,
        &layout,
        boot_block.as_ref(),
        crypto,
    )?;
    let chain = build_hash_chain(
        &header,
        &source,
        &layout,
        boot_block.as_ref(),
        fan_table,
        width,
        crypto,
    )?;
    info!("hash chain sealed");

    let signature = if manifest.signing.enabled {
        let key = manifest.signing.key.as_deref().ok_or(BuildError::Manifest {
            field: "signing.key",
            reason: "required when signing is enabled".into(),
        })?;
        let signature = crypto.sign(&chain, key)?;
        info!("hash chain signed with {}", key.display());
        Some(signature)
    } else {
        None
    };

    let otp = manifest
        .otp
        .as_ref()
        .map(|config| build_otp_image(config, width, crypto))
        .transpose()?;
    let otp_align = align_pad(layout.total_len, OTP_ALIGNMENT);
    let otp_header_offset = otp.as_ref().map(|_| (layout.total_len + otp_align) as u32);

    apply_wrap(
        &mut header,
        &manifest.header,
        signature.as_deref(),
        otp_header_offset,
    )?;

    let mut package = Vec::with_capacity(layout.total_len);
    package.extend_from_slice(&header);
    package.extend_from_slice(&chain);
    if layout.seg2_size > 0 {
        package.extend_from_slice(layout.hook(&source));
    }
    package.extend_from_slice(layout.flash_code(&source));
    package.extend_from_slice(layout.ram_code(&source));
    package.extend_from_slice(layout.data_code(&source));
    if let Some(bb) = boot_block.as_ref().and_then(BootBlock::appended) {
        package.resize(package.len() + layout.bb_align, 0);
        package.extend_from_slice(bb);
    }
    if let Some(fan) = fan_table {
        package.resize(package.len() + layout.seg4_align, 0);
        package.extend_from_slice(fan);
    }
    if package.len() != layout.total_len {
        return Err(BuildError::PackageLength {
            expected: layout.total_len,
            actual: package.len(),
        }
        .into());
    }
    if let Some(otp) = &otp {
        package.resize(package.len() + otp_align, 0);
        package.extend_from_slice(otp.header.as_bytes());
        package.extend_from_slice(&otp.table);
    }
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FanTableConfig, FirmwareConfig, HeaderConfig, OtpConfig, SigningConfig};
    use crate::crypto::testutil::StubCrypto;
    use crate::crypto::Sha2Crypto;
    use ec_image_layout::{read_bytes, read_field, FwField};
    use sha2::{Digest, Sha256};
    use std::fs;
    use std::path::PathBuf;

    fn put_u32_le(blob: &mut [u8], offset: usize, value: u32) {
        blob[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Source blob with a hook at [1536, 1544), MCP-mapped RAM window
    /// and patterned code bytes after the header.
    fn source_blob(len: usize, ram_start: u32, ram_end: u32) -> Vec<u8> {
        let mut blob = vec![0u8; len];
        for (i, byte) in blob.iter_mut().enumerate().skip(FW_HEADER_LEN) {
            *byte = (i % 251) as u8;
        }
        put_u32_le(&mut blob, 544, 0x0008_0000 + ram_start);
        put_u32_le(&mut blob, 548, 0x0008_0000 + ram_end);
        put_u32_le(&mut blob, 1216, 8);
        put_u32_le(&mut blob, 1220, 520);
        put_u32_le(&mut blob, 1224, 1536);
        put_u32_le(&mut blob, 1228, 1544);
        put_u32_le(&mut blob, 1232, 1544);
        blob
    }

    fn write_temp(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents).expect("Failed to write temp file");
        file
    }

    fn manifest(image: &Path) -> Manifest {
        Manifest {
            firmware: FirmwareConfig {
                image: image.to_path_buf(),
                output: PathBuf::from("unused.bin"),
                boot_block: None,
            },
            header: HeaderConfig::default(),
            signing: SigningConfig::default(),
            fan_table: None,
            otp: None,
        }
    }

    #[test]
    fn test_bare_package() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let manifest = manifest(image.path());

        let package = build_package(&manifest, &Sha2Crypto).unwrap();
        assert_eq!(package.len(), 4096);
        assert_eq!(&package[..8], b"%FiMg32@");
        // No signature and no OTP offset.
        assert_eq!(&package[8..524], &vec![0u8; 516][..]);
        assert_eq!(
            read_field(&package, &FwField::ImageLen.spec()).unwrap(),
            4096
        );
        // First chain slot covers the header sign-field.
        assert_eq!(
            &package[1280..1312],
            Sha256::digest(&package[528..1280]).as_slice()
        );
        // Hook and code bytes carry over from the blob unchanged.
        assert_eq!(&package[1536..1544], &blob[1536..1544]);
        assert_eq!(&package[1544..], &blob[1544..]);
    }

    #[test]
    fn test_build_writes_output() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let output = NamedTempFile::new().unwrap();
        let mut manifest = manifest(image.path());
        manifest.firmware.output = output.path().to_path_buf();

        build(&manifest, &Sha2Crypto).unwrap();
        let written = fs::read(output.path()).unwrap();
        assert_eq!(written.len(), 4096);
        assert_eq!(&written[..8], b"%FiMg32@");
    }

    #[test]
    fn test_failed_build_leaves_no_output() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("ec.pkg");
        let mut manifest = manifest(image.path());
        manifest.firmware.output = output.clone();
        // 0x40 does not fit the six device mode bits.
        manifest.header.dev_mode = 0x40;

        let err = build(&manifest, &Sha2Crypto).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Field(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_signed_package_fills_slot() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let mut manifest = manifest(image.path());
        manifest.signing = SigningConfig {
            enabled: true,
            key: Some(PathBuf::from("keys/builder.pem")),
        };

        let package = build_package(&manifest, &StubCrypto).unwrap();
        assert_eq!(&package[8..104], &[0xA5u8; 96][..]);
        assert_eq!(&package[104..520], &vec![0u8; 416][..]);
    }

    #[test]
    fn test_default_provider_rejects_signing() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let mut manifest = manifest(image.path());
        manifest.signing = SigningConfig {
            enabled: true,
            key: Some(PathBuf::from("keys/builder.pem")),
        };

        let err = build_package(&manifest, &Sha2Crypto).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::KeyReference(_))
        ));
    }

    #[test]
    fn test_empty_fan_table_adds_nothing() {
        let blob = source_blob(4096, 0x800, 0xA00);
        let image = write_temp(&blob);
        let mut manifest = manifest(image.path());
        manifest.fan_table = Some(FanTableConfig { values: Vec::new() });

        let package = build_package(&manifest, &Sha2Crypto).unwrap();
        assert_eq!(package.len(), 4096);
    }

    #[test]
    fn test_package_with_boot_block_fan_and_otp() {
        // 4000-byte blob: the boot block gap is 96, the 300-byte file
        // pads to 512, and the fan table lands at 4608 with no extra
        // alignment. The OTP block starts at the next 256 boundary
        // past 4708.
        let blob = source_blob(4000, 0x700, 0x900);
        let image = write_temp(&blob);
        let bb_file = write_temp(&{
            let mut bb = vec![0xBBu8; 300];
            put_u32_le(&mut bb, 32, 0x2000_8000);
            bb
        });
        let mut manifest = manifest(image.path());
        manifest.firmware.boot_block = Some(bb_file.path().to_path_buf());
        manifest.fan_table = Some(FanTableConfig {
            values: vec![0x10; 100],
        });
        let mut otp = OtpConfig::default();
        otp.fields.insert("oSecureBoot".into(), 1);
        manifest.otp = Some(otp);

        let package = build_package(&manifest, &Sha2Crypto).unwrap();
        assert_eq!(package.len(), 4708 + 156 + 64 + 1024);

        assert_eq!(
            read_field(&package, &FwField::ImageLen.spec()).unwrap(),
            4708
        );
        assert_eq!(
            read_field(&package, &FwField::OtpImgHdrOffset.spec()).unwrap(),
            4864
        );
        assert_eq!(read_field(&package, &FwField::BbSize.spec()).unwrap(), 512);
        assert_eq!(
            read_field(&package, &FwField::BbOffset.spec()).unwrap(),
            4096
        );
        assert_eq!(
            read_field(&package, &FwField::BbWorkRam.spec()).unwrap(),
            0x2000_8000
        );

        let mut padded = vec![0xBBu8; 300];
        put_u32_le(&mut padded, 32, 0x2000_8000);
        padded.resize(512, 0);

        // Gap, padded boot block, fan table, OTP alignment.
        assert_eq!(&package[4000..4096], &[0u8; 96][..]);
        assert_eq!(&package[4096..4608], &padded[..]);
        assert_eq!(&package[4608..4708], &[0x10u8; 100][..]);
        assert_eq!(&package[4708..4864], &vec![0u8; 156][..]);
        assert_eq!(&package[4864..4872], b"%OtPmAp@");
        assert_eq!(package[4928 + 4], 0x01);

        // RAM code hash covers the RAM window plus the padded block.
        let mut hashed = blob[0x700..0x900].to_vec();
        hashed.extend_from_slice(&padded);
        let ram_hash = read_bytes(&package, &FwField::RamCodeHash.spec()).unwrap();
        assert_eq!(ram_hash, Sha256::digest(&hashed).as_slice());
    }
}
