// Licensed under the Apache-2.0 license

use crate::field::FieldSpec;

/// Fields of the firmware header record.
///
/// Offsets are in image coordinates, so the four segment-hash slots land
/// past the 1280-byte header, inside the hash chain that follows it.
/// Everything from `ActiveEcFwOffset` onward is covered by the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwField {
    Signature,
    OtpImgHdrOffset,
    ActiveEcFwOffset,
    RecoveryEcFwOffset,
    SystemEcFwOffset,
    DevMode,
    SecureBoot,
    SecurityLvl,
    OtpRefToTable,
    HwTrimRefOtpTable,
    NotUpdateOtpRegister,
    NotEraseOtpTable,
    OtpRefToSrcTable,
    NotDoBackup,
    FlashLockReg0,
    EcFwRegionSize,
    UserFwEntryPoint,
    UserFwRamCodeFlashStart,
    UserFwRamCodeFlashEnd,
    UserFwRamCodeRamStart,
    ImageLen,
    SigPubKeyHashIdx,
    ShaAlgoUsed,
    MajorVer,
    MinorVer,
    RevokeKey,
    RevokeKeyInv,
    BbSize,
    BbOffset,
    BuildersPubKey,
    BbWorkRam,
    SigPubKey,
    RamCodeHash,
    OemVersion,
    ReleaseDate,
    ProjectId,
    OemReserved,
    Hook1Ptr,
    Hook2Ptr,
    Hook3Ptr,
    Hook4Ptr,
    FwSeg1Offset,
    FwSeg1End,
    FwSeg2Offset,
    FwSeg2End,
    FwSeg3Offset,
    FwSeg3End,
    FwSeg4Offset,
    FwSeg4End,
    RamCodeAesTag,
    BootBlockAesTag,
    FwSeg1Hash,
    FwSeg2Hash,
    FwSeg3Hash,
    FwSeg4Hash,
}

impl FwField {
    pub const fn spec(self) -> FieldSpec {
        match self {
            Self::Signature => FieldSpec::le("hSignature", 8, 4096),
            Self::OtpImgHdrOffset => FieldSpec::be("hOtpImgHdrOffset", 520, 32),
            Self::ActiveEcFwOffset => FieldSpec::le("hActiveECFwOffset", 528, 16),
            Self::RecoveryEcFwOffset => FieldSpec::le("hRecoveryEcFwOffset", 530, 16),
            Self::SystemEcFwOffset => FieldSpec::le("hSystemECFWOffset", 532, 32),
            Self::DevMode => FieldSpec::bits("hDevMode", 536, 6, 0, 0xC0),
            Self::SecureBoot => FieldSpec::bits("hSecureBoot", 536, 1, 0, 0xFE),
            Self::SecurityLvl => FieldSpec::bits("hSecurityLvl", 536, 1, 1, 0xFD),
            Self::OtpRefToTable => FieldSpec::bits("hOTPRefToTable", 536, 1, 2, 0xFB),
            Self::HwTrimRefOtpTable => FieldSpec::bits("hHwTrimRefOTPTable", 536, 1, 3, 0xF7),
            Self::NotUpdateOtpRegister => {
                FieldSpec::bits("hNotUpdateOTPRegister", 536, 1, 4, 0xEF)
            }
            Self::NotEraseOtpTable => FieldSpec::bits("hNotEraseOTPTable", 536, 1, 5, 0xDF),
            Self::OtpRefToSrcTable => FieldSpec::bits("hOTPRefToSrcTable", 536, 1, 6, 0xBF),
            Self::NotDoBackup => FieldSpec::bits("hNotDoBackup", 536, 1, 7, 0x7F),
            Self::FlashLockReg0 => FieldSpec::le("hFlashLockReg0", 537, 8),
            Self::EcFwRegionSize => FieldSpec::le("hEcFwRegionSize", 539, 8),
            Self::UserFwEntryPoint => FieldSpec::le("hUserFWEntryPoint", 540, 32),
            Self::UserFwRamCodeFlashStart => FieldSpec::le("hUserFWRamCodeFlashStart", 544, 32),
            Self::UserFwRamCodeFlashEnd => FieldSpec::le("hUserFWRamCodeFlashEnd", 548, 32),
            Self::UserFwRamCodeRamStart => FieldSpec::le("hUserFWRamCodeRamStart", 552, 32),
            Self::ImageLen => FieldSpec::be("hImageLen", 556, 32),
            Self::SigPubKeyHashIdx => FieldSpec::bits("hSigPubKeyHashIdx", 560, 1, 0, 0xFE),
            Self::ShaAlgoUsed => FieldSpec::bits("hShaAlgoUsed", 560, 1, 6, 0xBF),
            Self::MajorVer => FieldSpec::le("hMajorVer", 561, 8),
            Self::MinorVer => FieldSpec::le("hMinorVer", 562, 16),
            Self::RevokeKey => FieldSpec::le("hRevokeKey", 564, 8),
            Self::RevokeKeyInv => FieldSpec::le("hRevokeKeyInv", 565, 8),
            Self::BbSize => FieldSpec::le("hBBSize", 566, 16),
            Self::BbOffset => FieldSpec::le("hBBOffset", 568, 32),
            Self::BuildersPubKey => FieldSpec::le("hBuildersPubKey", 572, 512),
            Self::BbWorkRam => FieldSpec::le("hBBWorkRAM", 636, 32),
            Self::SigPubKey => FieldSpec::le("hSigPubKey", 640, 4096),
            Self::RamCodeHash => FieldSpec::le("hRamCodeHash", 1152, 256),
            Self::OemVersion => FieldSpec::le("hOEMversion", 1184, 64),
            Self::ReleaseDate => FieldSpec::be("hReleaseDate", 1192, 24),
            Self::ProjectId => FieldSpec::be("hProjectID", 1195, 16),
            Self::OemReserved => FieldSpec::le("hOEMreserved", 1197, 24),
            Self::Hook1Ptr => FieldSpec::le("hHook1Ptr", 1200, 32),
            Self::Hook2Ptr => FieldSpec::le("hHook2Ptr", 1204, 32),
            Self::Hook3Ptr => FieldSpec::le("hHook3Ptr", 1208, 32),
            Self::Hook4Ptr => FieldSpec::le("hHook4Ptr", 1212, 32),
            Self::FwSeg1Offset => FieldSpec::le("hFwSeg1Offset", 1216, 32),
            Self::FwSeg1End => FieldSpec::le("hFwSeg1End", 1220, 32),
            Self::FwSeg2Offset => FieldSpec::le("hFwSeg2Offset", 1224, 32),
            Self::FwSeg2End => FieldSpec::le("hFwSeg2End", 1228, 32),
            Self::FwSeg3Offset => FieldSpec::le("hFwSeg3Offset", 1232, 32),
            Self::FwSeg3End => FieldSpec::le("hFwSeg3End", 1236, 32),
            Self::FwSeg4Offset => FieldSpec::le("hFwSeg4Offset", 1240, 32),
            Self::FwSeg4End => FieldSpec::le("hFwSeg4End", 1244, 32),
            Self::RamCodeAesTag => FieldSpec::le("hRamCodeAESTag", 1248, 128),
            Self::BootBlockAesTag => FieldSpec::le("hBootBlockAESTag", 1264, 128),
            Self::FwSeg1Hash => FieldSpec::le("hFwSeg1Hash", 1280, 512),
            Self::FwSeg2Hash => FieldSpec::le("hFwSeg2Hash", 1344, 512),
            Self::FwSeg3Hash => FieldSpec::le("hFwSeg3Hash", 1408, 512),
            Self::FwSeg4Hash => FieldSpec::le("hFwSeg4Hash", 1472, 512),
        }
    }

    pub const ALL: [FwField; 55] = [
        Self::Signature,
        Self::OtpImgHdrOffset,
        Self::ActiveEcFwOffset,
        Self::RecoveryEcFwOffset,
        Self::SystemEcFwOffset,
        Self::DevMode,
        Self::SecureBoot,
        Self::SecurityLvl,
        Self::OtpRefToTable,
        Self::HwTrimRefOtpTable,
        Self::NotUpdateOtpRegister,
        Self::NotEraseOtpTable,
        Self::OtpRefToSrcTable,
        Self::NotDoBackup,
        Self::FlashLockReg0,
        Self::EcFwRegionSize,
        Self::UserFwEntryPoint,
        Self::UserFwRamCodeFlashStart,
        Self::UserFwRamCodeFlashEnd,
        Self::UserFwRamCodeRamStart,
        Self::ImageLen,
        Self::SigPubKeyHashIdx,
        Self::ShaAlgoUsed,
        Self::MajorVer,
        Self::MinorVer,
        Self::RevokeKey,
        Self::RevokeKeyInv,
        Self::BbSize,
        Self::BbOffset,
        Self::BuildersPubKey,
        Self::BbWorkRam,
        Self::SigPubKey,
        Self::RamCodeHash,
        Self::OemVersion,
        Self::ReleaseDate,
        Self::ProjectId,
        Self::OemReserved,
        Self::Hook1Ptr,
        Self::Hook2Ptr,
        Self::Hook3Ptr,
        Self::Hook4Ptr,
        Self::FwSeg1Offset,
        Self::FwSeg1End,
        Self::FwSeg2Offset,
        Self::FwSeg2End,
        Self::FwSeg3Offset,
        Self::FwSeg3End,
        Self::FwSeg4Offset,
        Self::FwSeg4End,
        Self::RamCodeAesTag,
        Self::BootBlockAesTag,
        Self::FwSeg1Hash,
        Self::FwSeg2Hash,
        Self::FwSeg3Hash,
        Self::FwSeg4Hash,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{read_field, write_field};
    use crate::{FW_HEADER_LEN, HASH_CHAIN_LEN, SIGN_FIELD_OFFSET};

    #[test]
    fn test_bit_masks_complement_field_bits() {
        for field in FwField::ALL {
            let spec = field.spec();
            if let Some(mask) = spec.mask {
                let field_bits = (((1u16 << spec.bit_width) - 1) as u8) << spec.shift;
                assert_eq!(mask, !field_bits, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_fields_stay_inside_image_prefix() {
        for field in FwField::ALL {
            let spec = field.spec();
            assert!(
                spec.byte_offset + spec.byte_len() <= FW_HEADER_LEN + HASH_CHAIN_LEN,
                "{}",
                spec.name
            );
        }
    }

    #[test]
    fn test_signed_region_boundary() {
        assert!(FwField::OtpImgHdrOffset.spec().byte_offset + 4 <= SIGN_FIELD_OFFSET);
        assert_eq!(FwField::ActiveEcFwOffset.spec().byte_offset, SIGN_FIELD_OFFSET);
    }

    #[test]
    fn test_dev_mode_byte_composition() {
        let mut buf = [0u8; FW_HEADER_LEN];
        write_field(&mut buf, &FwField::DevMode.spec(), 0x30).unwrap();
        assert_eq!(buf[536], 0x30);
        write_field(&mut buf, &FwField::OtpRefToSrcTable.spec(), 1).unwrap();
        assert_eq!(buf[536], 0x70);
        assert_eq!(read_field(&buf, &FwField::DevMode.spec()).unwrap(), 0x30);
    }

    #[test]
    fn test_sha_algo_flag_sets_bit_six() {
        let mut buf = [0u8; FW_HEADER_LEN];
        write_field(&mut buf, &FwField::ShaAlgoUsed.spec(), 1).unwrap();
        assert_eq!(buf[560], 0x40);
    }

    #[test]
    fn test_segment_table_is_contiguous() {
        let mut offset = FwField::FwSeg1Offset.spec().byte_offset;
        for field in [
            FwField::FwSeg1Offset,
            FwField::FwSeg1End,
            FwField::FwSeg2Offset,
            FwField::FwSeg2End,
            FwField::FwSeg3Offset,
            FwField::FwSeg3End,
            FwField::FwSeg4Offset,
            FwField::FwSeg4End,
        ] {
            assert_eq!(field.spec().byte_offset, offset);
            offset += 4;
        }
        assert_eq!(offset, FwField::RamCodeAesTag.spec().byte_offset);
    }
}
