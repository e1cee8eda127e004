// Licensed under the Apache-2.0 license

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use ec_image_layout::{OtpField, FW_IMAGE_TAG, OTP_IMAGE_TAG};

use crate::crypto::HashWidth;
use crate::error::BuildError;

/// Build manifest, one TOML file per package.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub firmware: FirmwareConfig,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub signing: SigningConfig,
    pub fan_table: Option<FanTableConfig>,
    pub otp: Option<OtpConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirmwareConfig {
    /// Monolithic source blob the segments are cut from.
    pub image: PathBuf,
    /// Destination for the assembled package.
    pub output: PathBuf,
    /// Boot block file appended behind the data code.
    pub boot_block: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HeaderConfig {
    pub image_tag: String,
    /// Index of the active firmware region, not a byte address.
    pub active_fw_offset: u16,
    pub system_fw_offset: u32,
    pub ec_fw_region_size: u8,
    pub dev_mode: u8,
    pub major_version: u8,
    pub minor_version: u16,
    pub oem_version: String,
    pub release_date: u32,
    pub project_id: u16,
    pub revoke_key_index: Option<u8>,
    pub hash_width: u16,
    /// Region-size code for the active-offset multiplier; 0 selects the
    /// 8 KiB auto mode.
    pub mcp_flash_size: u8,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            image_tag: String::from_utf8_lossy(&FW_IMAGE_TAG).into_owned(),
            active_fw_offset: 0,
            system_fw_offset: 0,
            ec_fw_region_size: 0,
            dev_mode: 0x30,
            major_version: 0,
            minor_version: 0,
            oem_version: String::new(),
            release_date: 0,
            project_id: 0,
            revoke_key_index: None,
            hash_width: 256,
            mcp_flash_size: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct SigningConfig {
    pub enabled: bool,
    pub key: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanTableConfig {
    /// Raw fan-table payload, placed as segment 4.
    pub values: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OtpConfig {
    pub image_tag: String,
    /// Scalar fields by their table name, e.g. `oSecureBoot = 1`.
    pub fields: BTreeMap<String, u64>,
    pub user_data: Option<String>,
    pub user_data1: Option<String>,
    pub user_data2: Option<String>,
    pub user_data3: Option<String>,
    pub user_data4: Option<String>,
    pub keys: OtpKeysConfig,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            image_tag: String::from_utf8_lossy(&OTP_IMAGE_TAG).into_owned(),
            fields: BTreeMap::new(),
            user_data: None,
            user_data1: None,
            user_data2: None,
            user_data3: None,
            user_data4: None,
            keys: OtpKeysConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OtpKeysConfig {
    pub ec_pub_key_0: Option<PathBuf>,
    pub ec_pub_key_1: Option<PathBuf>,
    pub sys_pub_key_0: Option<PathBuf>,
    pub sys_pub_key_1: Option<PathBuf>,
    pub session_priv_key: Option<PathBuf>,
    pub aes_key: Option<PathBuf>,
    pub sys_hash_width: u16,
}

impl Default for OtpKeysConfig {
    fn default() -> Self {
        Self {
            ec_pub_key_0: None,
            ec_pub_key_1: None,
            sys_pub_key_0: None,
            sys_pub_key_1: None,
            session_priv_key: None,
            aes_key: None,
            sys_hash_width: 256,
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read manifest {}", path.display()))?;
        let manifest: Manifest = toml::de::from_str(&contents)
            .with_context(|| format!("cannot parse manifest {}", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        validate_tag("header.image_tag", &self.header.image_tag)?;
        if !self.header.oem_version.is_ascii() || self.header.oem_version.len() > 8 {
            bail!(BuildError::Manifest {
                field: "header.oem_version",
                reason: format!(
                    "{:?} must be at most 8 ASCII characters",
                    self.header.oem_version
                ),
            });
        }
        if self.header.release_date > 0x00FF_FFFF {
            bail!(BuildError::Manifest {
                field: "header.release_date",
                reason: format!("{:#x} does not fit in 24 bits", self.header.release_date),
            });
        }
        if self.header.mcp_flash_size > 3 {
            bail!(BuildError::Manifest {
                field: "header.mcp_flash_size",
                reason: format!("{} is not a 2-bit size code", self.header.mcp_flash_size),
            });
        }
        HashWidth::from_bits(self.header.hash_width)?;
        if self.signing.enabled && self.signing.key.is_none() {
            bail!(BuildError::Manifest {
                field: "signing.key",
                reason: "required when signing.enabled is set".into(),
            });
        }
        if let Some(otp) = &self.otp {
            validate_tag("otp.image_tag", &otp.image_tag)?;
            HashWidth::from_bits(otp.keys.sys_hash_width)?;
            for name in otp.fields.keys() {
                if lookup_otp_field(name).is_none() {
                    bail!(BuildError::Manifest {
                        field: "otp.fields",
                        reason: format!("unknown field {name}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Resolves a manifest key against the OTP field table.
pub(crate) fn lookup_otp_field(name: &str) -> Option<OtpField> {
    OtpField::ALL.into_iter().find(|f| f.spec().name == name)
}

fn validate_tag(field: &'static str, tag: &str) -> Result<()> {
    if tag.len() != 8 || !tag.is_ascii() {
        bail!(BuildError::Manifest {
            field,
            reason: format!("{tag:?} must be exactly 8 ASCII characters"),
        });
    }
    Ok(())
}

/// Parses a hex string into exactly `width` bytes, left-padded like a
/// big-endian integer.
pub(crate) fn parse_hex_value(field: &'static str, text: &str, width: usize) -> Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let raw = hex::decode(&padded).with_context(|| format!("{field}: invalid hex string"))?;
    if raw.len() > width {
        bail!(BuildError::Manifest {
            field,
            reason: format!("{} bytes exceed the {width}-byte field", raw.len()),
        });
    }
    let mut value = vec![0u8; width - raw.len()];
    value.extend_from_slice(&raw);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_manifest(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write manifest");
        file
    }

    #[test]
    fn test_minimal_manifest_defaults() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"
            "#,
        );
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.header.image_tag, "%FiMg32@");
        assert_eq!(manifest.header.dev_mode, 0x30);
        assert_eq!(manifest.header.hash_width, 256);
        assert!(!manifest.signing.enabled);
        assert!(manifest.fan_table.is_none());
        assert!(manifest.otp.is_none());
    }

    #[test]
    fn test_full_manifest() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"
            boot_block = "bb.bin"

            [header]
            active_fw_offset = 2
            oem_version = "A0B1"
            major_version = 1
            minor_version = 0x0203
            release_date = 0x240115
            project_id = 0x1234
            revoke_key_index = 0x58
            hash_width = 512

            [fan_table]
            values = [1, 2, 3, 4]

            [otp]
            user_data1 = "0xdeadbeef"

            [otp.fields]
            oSecureBoot = 1
            oMCPFlashSize = 2

            [otp.keys]
            ec_pub_key_0 = "keys/ec0.pub"
            sys_hash_width = 512
            "#,
        );
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.header.revoke_key_index, Some(0x58));
        let otp = manifest.otp.unwrap();
        assert_eq!(otp.fields["oSecureBoot"], 1);
        assert_eq!(otp.keys.sys_hash_width, 512);
        assert_eq!(manifest.fan_table.unwrap().values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"
            imge_tag = "oops"
            "#,
        );
        assert!(Manifest::load(file.path()).is_err());
    }

    #[test]
    fn test_unknown_otp_field_rejected() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"

            [otp.fields]
            oNoSuchField = 1
            "#,
        );
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("oNoSuchField"));
    }

    #[test]
    fn test_oem_version_too_long_rejected() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"

            [header]
            oem_version = "ABCDEFGHI"
            "#,
        );
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Manifest {
                field: "header.oem_version",
                ..
            })
        ));
    }

    #[test]
    fn test_signing_requires_key() {
        let file = write_manifest(
            r#"
            [firmware]
            image = "fw.bin"
            output = "fw.pkg"

            [signing]
            enabled = true
            "#,
        );
        assert!(Manifest::load(file.path()).is_err());
    }

    #[test]
    fn test_hex_value_padding() {
        assert_eq!(
            parse_hex_value("otp.user_data", "0xbeef", 4).unwrap(),
            vec![0, 0, 0xbe, 0xef]
        );
        assert_eq!(
            parse_hex_value("otp.user_data", "f", 2).unwrap(),
            vec![0, 0x0f]
        );
        assert!(parse_hex_value("otp.user_data", "0102030405", 4).is_err());
        assert!(parse_hex_value("otp.user_data", "xyz", 4).is_err());
    }

    #[test]
    fn test_field_lookup_uses_table_names() {
        assert_eq!(lookup_otp_field("oSecureBoot"), Some(OtpField::SecureBoot));
        assert_eq!(lookup_otp_field("oFIUClkDiv"), Some(OtpField::FiuClkDiv));
        assert!(lookup_otp_field("hImageLen").is_none());
    }
}
