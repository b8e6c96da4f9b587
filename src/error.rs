//! Error taxonomy for the three fallible surfaces: codec (pack/unpack),
//! assembler, and validator. Each mirrors the `#[error("...")]`-per-variant
//! style already used for instruction decoding elsewhere in this codebase.

use thiserror::Error;

/// Failures from [`crate::decode`] and [`crate::encode`].
///
/// No partial writes happen on failure: a packed word is valid only when
/// `pack` returns `Ok`, and a structured record is valid only when
/// `unpack` returns `Ok`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("signal index {0} is out of range 0..31")]
    InvalidSignal(u32),
    #[error("signal index {0} maps to a reserved (all-zero) signal entry")]
    ReservedSignal(u32),
    #[error("flags field {0:#09b} is a reserved bit pattern")]
    ReservedFlags(u32),
    #[error("no flag encoding matches the requested combination of flags")]
    UnrepresentableFlags,
    #[error("opcode {opcode:#x} (mux_a={mux_a}, mux_b={mux_b}) does not match any add-op descriptor for this device version")]
    UnknownAddOpcode { opcode: u8, mux_a: u8, mux_b: u8 },
    #[error("opcode {opcode:#x} (mux_a={mux_a}, mux_b={mux_b}) does not match any mul-op descriptor for this device version")]
    UnknownMulOpcode { opcode: u8, mux_a: u8, mux_b: u8 },
    #[error("word has a nonzero mul opcode but signal bits imply a branch instruction")]
    MalformedInstruction,
    #[error("small immediate index {0} is out of range 0..47")]
    InvalidSmallImmediateIndex(u32),
    #[error("value {0:#x} has no small-immediate encoding")]
    UnrepresentableSmallImmediate(u32),
    #[error("add op {0:?} has no opcode descriptor for this device version")]
    AddOpNotEncodable(crate::instr::AddOp),
    #[error("mul op {0:?} has no opcode descriptor for this device version")]
    MulOpNotEncodable(crate::instr::MulOp),
    #[error("input unpack mode {0:?} cannot be encoded for this op")]
    UnrepresentableUnpack(crate::instr::InputUnpack),
    #[error("output pack mode {0:?} cannot be encoded for this op")]
    UnrepresentableOutputPack(crate::instr::OutputPack),
    #[error("commutative operand swap cannot satisfy the small-immediate slot constraint")]
    UnresolvableCommutativeSwap,
    #[error("waddr {0} exceeds the 6-bit write-address field")]
    WaddrOutOfRange(u8),
}

/// A location within the source buffer passed to the assembler, reused as
/// the anchor for both successful byte-count results and error offsets.
pub type ByteOffset = usize;

/// Failure from [`crate::asm`]. Every variant carries the byte offset of
/// the token that failed to parse and, where the source format supports
/// it, a static list of valid spellings for editor suggestions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("at byte {offset}: unknown add-op mnemonic")]
    UnknownAddOp {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: unknown mul-op mnemonic")]
    UnknownMulOp {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: expected ';' before the mul instruction")]
    ExpectedSemicolon { offset: ByteOffset },
    #[error("at byte {offset}: expected a write address")]
    ExpectedWaddr {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: expected a source operand")]
    ExpectedOperand { offset: ByteOffset },
    #[error("at byte {offset}: unknown signal name")]
    UnknownSignal {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: only one address-carrying signal is permitted per instruction")]
    MultipleAddressSignals { offset: ByteOffset },
    #[error("at byte {offset}: an instruction may have at most one small immediate operand")]
    MultipleSmallImmediates { offset: ByteOffset },
    #[error("at byte {offset}: an instruction may reference at most two distinct register files")]
    TooManyRegisterFiles { offset: ByteOffset },
    #[error("at byte {offset}: register file index {index} is out of range 0..31")]
    RegisterFileOutOfRange { offset: ByteOffset, index: u32 },
    #[error("at byte {offset}: unterminated block comment")]
    UnterminatedComment { offset: ByteOffset },
    #[error("at byte {offset}: unknown condition/push-flag/update-flag suffix")]
    UnknownFlagSuffix {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: unknown input-unpack suffix")]
    UnknownInputUnpack {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: unknown output-pack suffix")]
    UnknownOutputPack {
        offset: ByteOffset,
        candidates: &'static [&'static str],
    },
    #[error("at byte {offset}: register-file read address {index} is out of range 0..63")]
    RaddrOutOfRange { offset: ByteOffset, index: u32 },
    #[error("at byte {offset}: a small immediate may only occupy the B operand of this device's encoding")]
    SmallImmWrongSlot { offset: ByteOffset },
    #[error("at byte {offset}: this op takes no source operands")]
    UnexpectedOperand { offset: ByteOffset },
    #[error("at byte {offset}: expected ',' before the next operand")]
    ExpectedComma { offset: ByteOffset },
}

impl AsmError {
    pub fn offset(&self) -> ByteOffset {
        match self {
            AsmError::UnknownAddOp { offset, .. }
            | AsmError::UnknownMulOp { offset, .. }
            | AsmError::ExpectedSemicolon { offset }
            | AsmError::ExpectedWaddr { offset, .. }
            | AsmError::ExpectedOperand { offset }
            | AsmError::UnknownSignal { offset, .. }
            | AsmError::MultipleAddressSignals { offset }
            | AsmError::MultipleSmallImmediates { offset }
            | AsmError::TooManyRegisterFiles { offset }
            | AsmError::RegisterFileOutOfRange { offset, .. }
            | AsmError::UnterminatedComment { offset }
            | AsmError::UnknownFlagSuffix { offset, .. }
            | AsmError::UnknownInputUnpack { offset, .. }
            | AsmError::UnknownOutputPack { offset, .. }
            | AsmError::RaddrOutOfRange { offset, .. }
            | AsmError::SmallImmWrongSlot { offset }
            | AsmError::UnexpectedOperand { offset }
            | AsmError::ExpectedComma { offset } => *offset,
        }
    }

    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            AsmError::UnknownAddOp { candidates, .. }
            | AsmError::UnknownMulOp { candidates, .. }
            | AsmError::ExpectedWaddr { candidates, .. }
            | AsmError::UnknownSignal { candidates, .. }
            | AsmError::UnknownFlagSuffix { candidates, .. }
            | AsmError::UnknownInputUnpack { candidates, .. }
            | AsmError::UnknownOutputPack { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

/// The 29 named validator error kinds from the "Summary of Instruction
/// Restrictions" rules, each mapped to a distinct variant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidateErrorKind {
    #[error("implicit branch msf read after a TLB-Z write")]
    ImplicitBranchMsfReadAfterTlbZWrite,
    #[error("SETMSF after a TLB-Z write")]
    SetmsfAfterTlbZWrite,
    #[error("MSF read after a TLB-Z write")]
    MsfReadAfterTlbZWrite,
    #[error("small_imm_a/c/d set on a device version older than 7.1")]
    SmallImmBeforeV71,
    #[error("small_imm_a/b set but the add op is NOP")]
    SmallImmOnAddNop,
    #[error("small_imm_c/d set but the mul op is NOP")]
    SmallImmOnMulNop,
    #[error("more than one small_imm bit set in a single v7.1 instruction")]
    MultipleSmallImmBits,
    #[error("LDUNIF/LDUNIFA immediately after LDVARY")]
    LdunifAfterLdvary,
    #[error("consecutive LDUNIF/LDUNIFA on a device version older than 4.2")]
    ConsecutiveLdunif,
    #[error("SFU write inside a THRSW delay slot")]
    SfuWriteDuringThrswDelaySlots,
    #[error("LDVARY inside a THRSW delay slot")]
    LdvaryDuringThrswDelaySlots,
    #[error("LDVARY in the second THRSW delay slot on v7.1+")]
    LdvaryInSecondThrswDelaySlot,
    #[error("R4 read or written within 2 instructions of an SFU write")]
    R4AccessNearSfuWrite,
    #[error("new SFU write within 2 instructions of a previous SFU write")]
    SfuWriteNearSfuWrite,
    #[error("only one of TMU/SFU/TSY/TLB write, VPM write, or read-signal load is allowed per instruction")]
    OnlyOneOfTmuSfuTsyTlbReadVpmAllowed,
    #[error("THRSW occurred in a branch delay slot")]
    ThrswInBranchDelaySlot,
    #[error("THRSW occurred after the thread-end THRSW was already found")]
    ThrswAfterLastThrsw,
    #[error("THRSW occurred inside another THRSW's delay-slot window without being adjacent to it")]
    ThrswInThrswDelaySlot,
    #[error("non-magic register-file write within the final 2 instructions on v4.2")]
    RfWriteNearThreadEnd,
    #[error("write to rf2/rf3 within the final 2 instructions on v7.1+")]
    Rf2Rf3WriteNearThreadEnd,
    #[error("register-file write at the thread-end THRSW itself on v7.1+")]
    RfWriteAtThreadEnd,
    #[error("TMUWT in the final instruction of the program")]
    TmuwtInFinalInstruction,
    #[error("branch occurred in a branch delay slot")]
    BranchInBranchDelaySlot,
    #[error("branch occurred in a THRSW delay slot")]
    BranchInThrswDelaySlot,
    #[error("program had two or more THRSWs but never marked a thread-end THRSW")]
    NoLastThrswMarked,
    #[error("program ended without two THRSW delay-slot instructions")]
    NoProgramEndThrswDelaySlots,
    #[error("branch destination selector is invalid for this device version")]
    InvalidBranchDest,
    #[error("branch offset does not fit in the packed field width")]
    BranchOffsetOutOfRange,
    #[error("instruction index is out of range for this program")]
    IndexOutOfRange,
    #[error("device version is not one of the recognized V3D revisions")]
    UnrecognizedVersion,
}

/// Validator failure: the offending index, the human message (carried by
/// the `ValidateErrorKind`'s `Display`), and the stable error kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("instruction {index}: {kind}")]
pub struct ValidateError {
    pub index: usize,
    pub kind: ValidateErrorKind,
}
