// Licensed under the Apache-2.0 license

mod config;
mod crypto;
mod error;
mod hash_chain;
mod header;
mod otp;
mod package;
mod segments;

pub use config::{
    FanTableConfig, FirmwareConfig, HeaderConfig, Manifest, OtpConfig, OtpKeysConfig,
    SigningConfig,
};
pub use crypto::{HashWidth, ImageCrypto, Sha2Crypto};
pub use error::BuildError;
pub use hash_chain::build_hash_chain;
pub use otp::{build_otp_image, OtpImage};
pub use package::{build, build_package};
pub use segments::{BootBlock, SegmentLayout, SourceImage};
