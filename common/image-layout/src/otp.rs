// Licensed under the Apache-2.0 license

use crate::field::FieldSpec;

/// Fields of the 1024-byte OTP configuration table.
///
/// Offsets are in table coordinates, not image coordinates. The key and
/// digest slots (`EcFwPubKey0Hash` and friends) take raw bytes; everything
/// else is a packed scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpField {
    FlashConnection,
    StrapMode1,
    StrapMode2,
    NotTrySysIfFiuPvt,
    NotTrySysIfFiuShd,
    NotTryMafAndAmd,
    NotTrySysIfSpi1,
    NotTrySysIfFiuBkp,
    FiuShr4bMode,
    Spip4bMode,
    SpiQuadPEn,
    EcPtrCheckCrc,
    McpFlashSize,
    McpFlMode,
    FiuShrFlMode,
    SpipFlMode,
    FiuClkDiv,
    SpimClkDiv,
    SpipClkDiv,
    FwNotUse4kStep,
    FwNotUse2nStep,
    SecureBoot,
    SecurityLvl,
    HaltIfMafRollbk,
    HaltIfActiveRollbk,
    HaltIfOnlyMafValid,
    TryBootIfAllCrashed,
    UnmapRomBfXferCtl,
    DisableDbgAtRst,
    AesKeyLock,
    HwCfgFieldLock,
    OtpRgn2Lock,
    OtpRgn3Lock,
    OtpRgn4Lock,
    OtpRgn5Lock,
    OtpRgn6Lock,
    SecEvnLogLoc,
    RsaPubKeySts,
    EcPubKeySts,
    RevokeKeySts,
    LongKeyUsed,
    Sha512Used,
    LongKeySel,
    RsaPkcPad,
    AesDecryptEn,
    RetryLimitEn,
    SkipCryptoSelfTest,
    OnlyLogCriticalEvent,
    OtpRegionRdLock,
    ClrRamExitRom,
    VSpiExistNoTimeOut,
    NoWaitVSpiExist,
    TryBootNotCtrlFwRdy,
    NotUpdateToPrvFw,
    SysPfrWp0En,
    SysPfrWp1En,
    OtpDatValid0,
    OtpDatValid1,
    Led1Sel,
    Led1Pole,
    Led2Sel,
    Led2Pole,
    LedActRbkBlkDef,
    LedSysRbkBlkDef,
    LedFwCpyBlkDef,
    LedSysOnlyBlkDef,
    LedAllCrashBlkDef,
    LedCryptoTestFailBlkDef,
    EcFwPubKey0Hash,
    EcFwPubKey1Hash,
    OtpRegion0Digest,
    SessPrivKey,
    AesKey,
    PartId,
    AesNotSupport,
    McuClkNNotDiv2,
    McpRdDly,
    McpRdEdge,
    McpSel,
    Anad2Low,
    Anad2High,
    ValAnad,
    DevId,
    ValDevId,
    RsmRstL,
    ValRsmRstL,
    RsmRstSys,
    ValRsmRstSys,
    DivMinLow,
    DivMinHigh,
    ValDivMin,
    DivMaxLow,
    DivMaxHigh,
    ValDivMax,
    FrcDivLow,
    FrcDivHigh,
    ValFrcDiv,
    FrClk,
    ValFrClk,
    OtpWriteTime,
    DnxRsmrstWidth,
    DnxDpOkWidth,
    EcTestMode0,
    ChipTesterId,
    VSpiExistWaitCnter,
    PwmLedAdj,
    Fpred,
    Ahb6Div,
    Apb2Div,
    Apb1Div,
    RefOtpClk,
    Xfrange,
    Apb3Div,
    SysFwSigPubKeySts,
    SysFwPubKey0Hash,
    SysFwPubKey1Hash,
    UserData,
    UserData1,
    UserData2,
    UserData3,
    UserData4,
}

impl OtpField {
    pub const fn spec(self) -> FieldSpec {
        match self {
            Self::FlashConnection => FieldSpec::bits("oFlashConnection", 0, 2, 0, 0xFC),
            Self::StrapMode1 => FieldSpec::bits("oStrapMode1", 0, 1, 2, 0xFB),
            Self::StrapMode2 => FieldSpec::bits("oStrapMode2", 0, 1, 3, 0xF7),
            Self::NotTrySysIfFiuPvt => FieldSpec::bits("oNotTrySysIfFIUPvt", 0, 1, 4, 0xEF),
            Self::NotTrySysIfFiuShd => FieldSpec::bits("oNotTrySysIfFIUShd", 0, 1, 5, 0xDF),
            Self::NotTryMafAndAmd => FieldSpec::bits("oNotTryMafAndAMD", 0, 1, 6, 0xBF),
            Self::NotTrySysIfSpi1 => FieldSpec::bits("oNotTrySysIfSPI1", 0, 1, 7, 0x7F),
            Self::NotTrySysIfFiuBkp => FieldSpec::bits("oNotTrySysIfFIUBkp", 1, 1, 0, 0xFE),
            Self::FiuShr4bMode => FieldSpec::bits("oFIUShr4BMode", 1, 1, 1, 0xFD),
            Self::Spip4bMode => FieldSpec::bits("oSPIP4BMode", 1, 1, 2, 0xFB),
            Self::SpiQuadPEn => FieldSpec::bits("oSpiQuadPEn", 1, 1, 3, 0xF7),
            Self::EcPtrCheckCrc => FieldSpec::bits("oECPTRCheckCRC", 1, 1, 4, 0xEF),
            Self::McpFlashSize => FieldSpec::bits("oMCPFlashSize", 1, 2, 6, 0x3F),
            Self::McpFlMode => FieldSpec::bits("oMCPFLMode", 2, 2, 0, 0xFC),
            Self::FiuShrFlMode => FieldSpec::bits("oFIUShrFLMode", 2, 2, 2, 0xF3),
            Self::SpipFlMode => FieldSpec::bits("oSPIPFLMode", 2, 2, 4, 0xCF),
            Self::FiuClkDiv => FieldSpec::bits("oFIUClkDiv", 3, 2, 0, 0xFC),
            Self::SpimClkDiv => FieldSpec::bits("oSPIMClkDiv", 3, 2, 2, 0xF3),
            Self::SpipClkDiv => FieldSpec::bits("oSPIPClkDiv", 3, 2, 4, 0xCF),
            Self::FwNotUse4kStep => FieldSpec::bits("oFwNotUse4KStep", 3, 1, 6, 0xBF),
            Self::FwNotUse2nStep => FieldSpec::bits("oFwNotUse2NStep", 3, 1, 7, 0x7F),
            Self::SecureBoot => FieldSpec::bits("oSecureBoot", 4, 1, 0, 0xFE),
            Self::SecurityLvl => FieldSpec::bits("oSecurityLvl", 4, 1, 1, 0xFD),
            Self::HaltIfMafRollbk => FieldSpec::bits("oHaltIfMafRollbk", 4, 1, 2, 0xFB),
            Self::HaltIfActiveRollbk => FieldSpec::bits("oHaltIfActiveRollbk", 4, 1, 3, 0xF7),
            Self::HaltIfOnlyMafValid => FieldSpec::bits("oHaltIfOnlyMafValid", 4, 1, 4, 0xEF),
            Self::TryBootIfAllCrashed => FieldSpec::bits("oTryBootIfAllCrashed", 4, 1, 5, 0xDF),
            Self::UnmapRomBfXferCtl => FieldSpec::bits("oUnmapRomBfXferCtl", 4, 1, 7, 0x7F),
            Self::DisableDbgAtRst => FieldSpec::bits("oDisableDBGAtRst", 5, 1, 0, 0xFE),
            Self::AesKeyLock => FieldSpec::bits("oAESKeyLock", 5, 1, 1, 0xFD),
            Self::HwCfgFieldLock => FieldSpec::bits("oHWCfgFieldLock", 5, 1, 2, 0xFB),
            Self::OtpRgn2Lock => FieldSpec::bits("oOtpRgn2Lock", 5, 1, 3, 0xF7),
            Self::OtpRgn3Lock => FieldSpec::bits("oOtpRgn3Lock", 5, 1, 4, 0xEF),
            Self::OtpRgn4Lock => FieldSpec::bits("oOtpRgn4Lock", 5, 1, 5, 0xDF),
            Self::OtpRgn5Lock => FieldSpec::bits("oOtpRgn5Lock", 5, 1, 6, 0xBF),
            Self::OtpRgn6Lock => FieldSpec::bits("oOtpRgn6Lock", 5, 1, 7, 0x7F),
            Self::SecEvnLogLoc => FieldSpec::le("oSecEvnLogLoc", 6, 16),
            Self::RsaPubKeySts => FieldSpec::bits("oRSAPubKeySts", 8, 2, 0, 0xFC),
            Self::EcPubKeySts => FieldSpec::bits("oECPubKeySts", 8, 2, 2, 0xF3),
            Self::RevokeKeySts => FieldSpec::bits("oRevokeKeySts", 8, 2, 4, 0xCF),
            Self::LongKeyUsed => FieldSpec::bits("oLongKeyUsed", 8, 1, 6, 0xBF),
            Self::Sha512Used => FieldSpec::bits("oSHA512Used", 8, 1, 7, 0x7F),
            Self::LongKeySel => FieldSpec::bits("oLongKeySel", 16, 1, 0, 0xFE),
            Self::RsaPkcPad => FieldSpec::bits("oRSAPKCPAD", 16, 1, 1, 0xFD),
            Self::AesDecryptEn => FieldSpec::bits("oAESDecryptEn", 16, 2, 4, 0xCF),
            Self::RetryLimitEn => FieldSpec::bits("oRetryLimitEn", 17, 1, 2, 0xFB),
            Self::SkipCryptoSelfTest => FieldSpec::bits("oSkipCryptoSelfTest", 17, 1, 3, 0xF7),
            Self::OnlyLogCriticalEvent => {
                FieldSpec::bits("oOnlyLogCriticalEvent", 17, 1, 4, 0xEF)
            }
            Self::OtpRegionRdLock => FieldSpec::bits("oOTPRegionRdLock", 17, 1, 6, 0xBF),
            Self::ClrRamExitRom => FieldSpec::bits("oClrRamExitRom", 17, 1, 7, 0x7F),
            Self::VSpiExistNoTimeOut => FieldSpec::bits("oVSpiExistNoTimeOut", 18, 1, 0, 0xFE),
            Self::NoWaitVSpiExist => FieldSpec::bits("oNoWaitVSpiExist", 18, 1, 1, 0xFD),
            Self::TryBootNotCtrlFwRdy => FieldSpec::bits("oTryBootNotCtrlFWRdy", 18, 1, 2, 0xFB),
            Self::NotUpdateToPrvFw => FieldSpec::bits("oNotUpdateToPrvFw", 18, 1, 3, 0xF7),
            Self::SysPfrWp0En => FieldSpec::bits("oSysPfrWP0En", 19, 1, 0, 0xFE),
            Self::SysPfrWp1En => FieldSpec::bits("oSysPfrWP1En", 19, 1, 1, 0xFD),
            Self::OtpDatValid0 => FieldSpec::le("oOTPDatValid0", 21, 8),
            Self::OtpDatValid1 => FieldSpec::le("oOTPDatValid1", 22, 8),
            Self::Led1Sel => FieldSpec::bits("oLed1Sel", 23, 4, 0, 0xF0),
            Self::Led1Pole => FieldSpec::bits("oLed1Pole", 23, 1, 4, 0xEF),
            Self::Led2Sel => FieldSpec::bits("oLed2Sel", 24, 4, 0, 0xF0),
            Self::Led2Pole => FieldSpec::bits("oLed2Pole", 24, 1, 4, 0xEF),
            Self::LedActRbkBlkDef => FieldSpec::bits("oLedActRbkBlkDef", 25, 4, 0, 0xF0),
            Self::LedSysRbkBlkDef => FieldSpec::bits("oLedSysRbkBlkDef", 25, 4, 4, 0x0F),
            Self::LedFwCpyBlkDef => FieldSpec::bits("oLedFwCpyBlkDef", 26, 4, 0, 0xF0),
            Self::LedSysOnlyBlkDef => FieldSpec::bits("oLedSysOnlyBlkDef", 26, 4, 4, 0x0F),
            Self::LedAllCrashBlkDef => FieldSpec::bits("oLedAllCrashBlkDef", 27, 4, 0, 0xF0),
            Self::LedCryptoTestFailBlkDef => {
                FieldSpec::bits("oLedCryptoTestFailBlkDef", 27, 4, 4, 0x0F)
            }
            Self::EcFwPubKey0Hash => FieldSpec::le("EcFwPubKey0", 32, 512),
            Self::EcFwPubKey1Hash => FieldSpec::le("EcFwPubKey1", 96, 512),
            Self::OtpRegion0Digest => FieldSpec::le("oOtpRegion0Digest", 160, 256),
            Self::SessPrivKey => FieldSpec::le("oSessPrivKey", 192, 256),
            Self::AesKey => FieldSpec::le("oAESKey", 288, 256),
            Self::PartId => FieldSpec::bits("oPartID", 320, 1, 0, 0xFE),
            Self::AesNotSupport => FieldSpec::bits("oAESNotSupport", 320, 1, 1, 0xFD),
            Self::McuClkNNotDiv2 => FieldSpec::bits("oMCUClkNNotDiv2", 320, 1, 2, 0xFB),
            Self::McpRdDly => FieldSpec::bits("oMCPRdDly", 320, 3, 3, 0xC7),
            Self::McpRdEdge => FieldSpec::bits("oMCPRdEdge", 320, 1, 6, 0xBF),
            Self::McpSel => FieldSpec::bits("oMCPSel", 320, 1, 7, 0x7F),
            Self::Anad2Low => FieldSpec::le("oANAD2Low", 321, 8),
            Self::Anad2High => FieldSpec::bits("oANAD2High", 322, 1, 0, 0xFE),
            Self::ValAnad => FieldSpec::bits("oValANAD", 322, 1, 7, 0x7F),
            Self::DevId => FieldSpec::bits("oDevId", 323, 5, 0, 0xE0),
            Self::ValDevId => FieldSpec::bits("oValDevId", 323, 1, 7, 0x7F),
            Self::RsmRstL => FieldSpec::le("oRSMRST_L", 324, 8),
            Self::ValRsmRstL => FieldSpec::bits("oValRSMRST_L", 325, 1, 7, 0x7F),
            Self::RsmRstSys => FieldSpec::le("oRSMRST_Sys", 326, 8),
            Self::ValRsmRstSys => FieldSpec::bits("oValRSMRST_Sys", 327, 1, 7, 0x7F),
            Self::DivMinLow => FieldSpec::le("oDivMinLow", 328, 8),
            Self::DivMinHigh => FieldSpec::bits("oDivMinHigh", 329, 1, 0, 0xFE),
            Self::ValDivMin => FieldSpec::bits("oValDivMin", 329, 1, 7, 0x7F),
            Self::DivMaxLow => FieldSpec::le("oDivMaxLow", 330, 8),
            Self::DivMaxHigh => FieldSpec::bits("oDivMaxHigh", 331, 1, 0, 0xFE),
            Self::ValDivMax => FieldSpec::bits("oValDivMax", 331, 1, 7, 0x7F),
            Self::FrcDivLow => FieldSpec::le("oFrcDivLow", 332, 8),
            Self::FrcDivHigh => FieldSpec::bits("oFrcDivHigh", 333, 1, 0, 0xFE),
            Self::ValFrcDiv => FieldSpec::bits("oValFrcDiv", 333, 1, 7, 0x7F),
            Self::FrClk => FieldSpec::bits("oFR_CLK", 334, 4, 0, 0xF0),
            Self::ValFrClk => FieldSpec::bits("oValFR_CLK", 334, 1, 7, 0x7F),
            Self::OtpWriteTime => FieldSpec::le("oOTPWriteTime", 335, 8),
            Self::DnxRsmrstWidth => FieldSpec::le("oDnxRsmrstWidth", 336, 8),
            Self::DnxDpOkWidth => FieldSpec::le("oDnxDPOkWidth", 337, 8),
            Self::EcTestMode0 => FieldSpec::be("oECTestMode0", 338, 16),
            Self::ChipTesterId => FieldSpec::be("oChipTesterID", 340, 32),
            Self::VSpiExistWaitCnter => FieldSpec::le("oVSpiExistWaitCnter", 344, 8),
            Self::PwmLedAdj => FieldSpec::le("oPwmLedAdj", 345, 8),
            Self::Fpred => FieldSpec::bits("oFPRED", 346, 4, 4, 0x0F),
            Self::Ahb6Div => FieldSpec::bits("oAHB6DIV", 346, 2, 0, 0xFC),
            Self::Apb2Div => FieldSpec::bits("oAPB2DIV", 347, 4, 4, 0x0F),
            Self::Apb1Div => FieldSpec::bits("oAPB1DIV", 347, 4, 0, 0xF0),
            Self::RefOtpClk => FieldSpec::bits("oRefOTPClk", 348, 1, 7, 0x7F),
            Self::Xfrange => FieldSpec::bits("oXFRANGE", 348, 1, 4, 0xEF),
            Self::Apb3Div => FieldSpec::bits("oAPB3DIV", 348, 4, 0, 0xF0),
            Self::SysFwSigPubKeySts => FieldSpec::le("oSysFwSigPubKeySts", 363, 8),
            Self::SysFwPubKey0Hash => FieldSpec::le("SySFwPubKey0", 364, 512),
            Self::SysFwPubKey1Hash => FieldSpec::le("SySFwPubKey1", 428, 512),
            Self::UserData => FieldSpec::be("oUserDataField", 492, 160),
            Self::UserData1 => FieldSpec::be("oUserDataField1", 512, 1024),
            Self::UserData2 => FieldSpec::be("oUserDataField2", 640, 1024),
            Self::UserData3 => FieldSpec::be("oUserDataField3", 768, 1024),
            Self::UserData4 => FieldSpec::be("oUserDataField4", 896, 1024),
        }
    }

    pub const ALL: [OtpField; 121] = [
        Self::FlashConnection,
        Self::StrapMode1,
        Self::StrapMode2,
        Self::NotTrySysIfFiuPvt,
        Self::NotTrySysIfFiuShd,
        Self::NotTryMafAndAmd,
        Self::NotTrySysIfSpi1,
        Self::NotTrySysIfFiuBkp,
        Self::FiuShr4bMode,
        Self::Spip4bMode,
        Self::SpiQuadPEn,
        Self::EcPtrCheckCrc,
        Self::McpFlashSize,
        Self::McpFlMode,
        Self::FiuShrFlMode,
        Self::SpipFlMode,
        Self::FiuClkDiv,
        Self::SpimClkDiv,
        Self::SpipClkDiv,
        Self::FwNotUse4kStep,
        Self::FwNotUse2nStep,
        Self::SecureBoot,
        Self::SecurityLvl,
        Self::HaltIfMafRollbk,
        Self::HaltIfActiveRollbk,
        Self::HaltIfOnlyMafValid,
        Self::TryBootIfAllCrashed,
        Self::UnmapRomBfXferCtl,
        Self::DisableDbgAtRst,
        Self::AesKeyLock,
        Self::HwCfgFieldLock,
        Self::OtpRgn2Lock,
        Self::OtpRgn3Lock,
        Self::OtpRgn4Lock,
        Self::OtpRgn5Lock,
        Self::OtpRgn6Lock,
        Self::SecEvnLogLoc,
        Self::RsaPubKeySts,
        Self::EcPubKeySts,
        Self::RevokeKeySts,
        Self::LongKeyUsed,
        Self::Sha512Used,
        Self::LongKeySel,
        Self::RsaPkcPad,
        Self::AesDecryptEn,
        Self::RetryLimitEn,
        Self::SkipCryptoSelfTest,
        Self::OnlyLogCriticalEvent,
        Self::OtpRegionRdLock,
        Self::ClrRamExitRom,
        Self::VSpiExistNoTimeOut,
        Self::NoWaitVSpiExist,
        Self::TryBootNotCtrlFwRdy,
        Self::NotUpdateToPrvFw,
        Self::SysPfrWp0En,
        Self::SysPfrWp1En,
        Self::OtpDatValid0,
        Self::OtpDatValid1,
        Self::Led1Sel,
        Self::Led1Pole,
        Self::Led2Sel,
        Self::Led2Pole,
        Self::LedActRbkBlkDef,
        Self::LedSysRbkBlkDef,
        Self::LedFwCpyBlkDef,
        Self::LedSysOnlyBlkDef,
        Self::LedAllCrashBlkDef,
        Self::LedCryptoTestFailBlkDef,
        Self::EcFwPubKey0Hash,
        Self::EcFwPubKey1Hash,
        Self::OtpRegion0Digest,
        Self::SessPrivKey,
        Self::AesKey,
        Self::PartId,
        Self::AesNotSupport,
        Self::McuClkNNotDiv2,
        Self::McpRdDly,
        Self::McpRdEdge,
        Self::McpSel,
        Self::Anad2Low,
        Self::Anad2High,
        Self::ValAnad,
        Self::DevId,
        Self::ValDevId,
        Self::RsmRstL,
        Self::ValRsmRstL,
        Self::RsmRstSys,
        Self::ValRsmRstSys,
        Self::DivMinLow,
        Self::DivMinHigh,
        Self::ValDivMin,
        Self::DivMaxLow,
        Self::DivMaxHigh,
        Self::ValDivMax,
        Self::FrcDivLow,
        Self::FrcDivHigh,
        Self::ValFrcDiv,
        Self::FrClk,
        Self::ValFrClk,
        Self::OtpWriteTime,
        Self::DnxRsmrstWidth,
        Self::DnxDpOkWidth,
        Self::EcTestMode0,
        Self::ChipTesterId,
        Self::VSpiExistWaitCnter,
        Self::PwmLedAdj,
        Self::Fpred,
        Self::Ahb6Div,
        Self::Apb2Div,
        Self::Apb1Div,
        Self::RefOtpClk,
        Self::Xfrange,
        Self::Apb3Div,
        Self::SysFwSigPubKeySts,
        Self::SysFwPubKey0Hash,
        Self::SysFwPubKey1Hash,
        Self::UserData,
        Self::UserData1,
        Self::UserData2,
        Self::UserData3,
        Self::UserData4,
    ];
}
