#![forbid(unsafe_code)]

//! Codec, assembler, disassembler, and static validator for the Broadcom
//! VideoCore VI V3D QPU shader instruction set.
//!
//! The three representations in play are a packed 64-bit instruction word
//! (the hardware wire format), a structured [`instr::Instruction`] record,
//! and a single line of text. Conversion between them is driven by
//! per-version tables in [`tables`], since the V3D opcode space is reused
//! across several source-operand encodings depending on the chip revision.

pub mod asm;
pub mod decode;
pub mod device;
pub mod disasm;
pub mod encode;
pub mod error;
pub mod fields;
pub mod instr;
pub mod tables;
pub mod validate;

pub use device::DeviceInfo;
pub use error::{AsmError, CodecError, ValidateError};
pub use instr::Instruction;
