// Licensed under the Apache-2.0 license

//! Builds the 1024-byte OTP configuration table and its 64-byte header.
//!
//! Scalar fields come straight from the manifest's `[otp.fields]` map;
//! the wide slots hold public key digests, raw key material and the
//! user data words. Untouched bytes stay zero, which is also the
//! unprogrammed state of the OTP array.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use ec_image_layout::{write_bytes, write_field, OtpField, OtpHeader, OTP_IMAGE_LEN};

use crate::config::{lookup_otp_field, parse_hex_value, OtpConfig};
use crate::crypto::{HashWidth, ImageCrypto};
use crate::error::BuildError;

/// OTP block ready to append behind the firmware package.
#[derive(Debug)]
pub struct OtpImage {
    pub header: OtpHeader,
    pub table: [u8; OTP_IMAGE_LEN],
}

pub fn build_otp_image(
    config: &OtpConfig,
    ec_hash_width: HashWidth,
    crypto: &dyn ImageCrypto,
) -> Result<OtpImage> {
    let mut table = [0u8; OTP_IMAGE_LEN];

    for (name, value) in &config.fields {
        let field = lookup_otp_field(name).ok_or_else(|| BuildError::Manifest {
            field: "otp.fields",
            reason: format!("unknown field {name}"),
        })?;
        write_field(&mut table, &field.spec(), *value).map_err(BuildError::from)?;
    }

    let user_fields = [
        ("otp.user_data", &config.user_data, OtpField::UserData),
        ("otp.user_data1", &config.user_data1, OtpField::UserData1),
        ("otp.user_data2", &config.user_data2, OtpField::UserData2),
        ("otp.user_data3", &config.user_data3, OtpField::UserData3),
        ("otp.user_data4", &config.user_data4, OtpField::UserData4),
    ];
    for (label, text, field) in user_fields {
        if let Some(text) = text {
            let spec = field.spec();
            let value = parse_hex_value(label, text, spec.byte_len())?;
            write_bytes(&mut table, &spec, &value).map_err(BuildError::from)?;
        }
    }

    let keys = &config.keys;
    let sys_width = HashWidth::from_bits(keys.sys_hash_width)?;
    write_key_hash(
        &mut table,
        OtpField::EcFwPubKey0Hash,
        keys.ec_pub_key_0.as_deref(),
        ec_hash_width,
        crypto,
    )?;
    write_key_hash(
        &mut table,
        OtpField::EcFwPubKey1Hash,
        keys.ec_pub_key_1.as_deref(),
        ec_hash_width,
        crypto,
    )?;
    write_key_hash(
        &mut table,
        OtpField::SysFwPubKey0Hash,
        keys.sys_pub_key_0.as_deref(),
        sys_width,
        crypto,
    )?;
    write_key_hash(
        &mut table,
        OtpField::SysFwPubKey1Hash,
        keys.sys_pub_key_1.as_deref(),
        sys_width,
        crypto,
    )?;
    write_raw_key(&mut table, OtpField::SessPrivKey, keys.session_priv_key.as_deref())?;
    write_raw_key(&mut table, OtpField::AesKey, keys.aes_key.as_deref())?;

    let digest = crypto.digest(&table, HashWidth::Sha256);
    let mut checksum = [0u8; 32];
    if digest.len() != checksum.len() {
        return Err(BuildError::DigestLength {
            expected: checksum.len(),
            actual: digest.len(),
        }
        .into());
    }
    checksum.copy_from_slice(&digest);

    let mut header = OtpHeader::new(checksum);
    let tag = config.image_tag.as_bytes();
    if tag.len() != header.tag.len() {
        return Err(BuildError::Manifest {
            field: "otp.image_tag",
            reason: format!("{:?} is not 8 bytes", config.image_tag),
        }
        .into());
    }
    header.tag.copy_from_slice(tag);

    Ok(OtpImage { header, table })
}

/// Digest of a public key file, front-aligned in its 64-byte slot.
fn write_key_hash(
    table: &mut [u8],
    field: OtpField,
    path: Option<&Path>,
    width: HashWidth,
    crypto: &dyn ImageCrypto,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let raw = fs::read(path).with_context(|| format!("cannot read key {}", path.display()))?;
    let digest = crypto.digest(&raw, width);
    if digest.len() != width.digest_len() {
        return Err(BuildError::DigestLength {
            expected: width.digest_len(),
            actual: digest.len(),
        }
        .into());
    }
    let spec = field.spec();
    let mut slot = vec![0u8; spec.byte_len()];
    slot[..digest.len()].copy_from_slice(&digest);
    write_bytes(table, &spec, &slot).map_err(BuildError::from)?;
    Ok(())
}

/// Raw key material; the file must match the slot width exactly.
fn write_raw_key(table: &mut [u8], field: OtpField, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let raw = fs::read(path).with_context(|| format!("cannot read key {}", path.display()))?;
    let spec = field.spec();
    if raw.len() != spec.byte_len() {
        return Err(BuildError::RecordLength {
            name: spec.name,
            expected: spec.byte_len(),
            actual: raw.len(),
        }
        .into());
    }
    write_bytes(table, &spec, &raw).map_err(BuildError::from)?;
    Ok(())
}
