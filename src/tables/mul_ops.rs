//! Opcode descriptor dispatch for the MUL-ALU. Much smaller than the
//! ADD-ALU's space so overlap is rarer, but two ranges still need a
//! secondary discriminator: opcode 15 (pre-v7.1) picks among
//! `FMOV`/`NOP`/`MOV` by an exact sub-value, and opcode 14 (v7.1) picks
//! among `FMOV`/`MOV`/the unorm-snorm conversions/`NOP` by a raddr bit —
//! `NOP` relocating from opcode 15 to a bit of opcode 14 between the two
//! eras is a real encoding change, not an oversight.

use crate::instr::MulOp;

/// How a shared opcode's sub-variants are told apart.
#[derive(Debug, Clone, Copy)]
pub enum MulDisc {
    /// Exact match against the raw discriminator value.
    Exact(u8),
    /// Any of these bits set in the raw discriminator value.
    Mask(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct MulOpDesc {
    pub op: MulOp,
    pub opcode_first: u8,
    pub opcode_last: u8,
    pub disc: Option<MulDisc>,
    pub first_ver: u8,
    pub last_ver: u8,
}

const fn d(
    op: MulOp,
    first: u8,
    last: u8,
    disc: Option<MulDisc>,
    first_ver: u8,
    last_ver: u8,
) -> MulOpDesc {
    MulOpDesc {
        op,
        opcode_first: first,
        opcode_last: last,
        disc,
        first_ver,
        last_ver,
    }
}

pub const MUL_OPS: &[MulOpDesc] = &[
    d(MulOp::Add, 1, 1, None, 33, 71),
    d(MulOp::Sub, 2, 2, None, 33, 71),
    d(MulOp::Umul24, 3, 3, None, 33, 71),
    // Preserved from the source tables, which list this a second time
    // further down; the duplicate is unreachable since lookup takes the
    // first match, but it is left in place rather than silently dropped.
    d(MulOp::Umul24, 3, 3, None, 71, 71),
    d(MulOp::Vfmul, 4, 8, None, 33, 71),
    d(MulOp::Smul24, 9, 9, None, 33, 71),
    d(MulOp::Multop, 10, 10, None, 33, 71),
    // Pre-v7.1: opcode 14 is plain FMOV, opcode 15 is a 3-way bucket.
    d(MulOp::Fmov, 14, 14, None, 33, 42),
    d(MulOp::Fmov, 15, 15, Some(MulDisc::Exact(0)), 33, 42),
    d(MulOp::Nop, 15, 15, Some(MulDisc::Exact(1)), 33, 42),
    d(MulOp::Mov, 15, 15, Some(MulDisc::Exact(2)), 33, 42),
    // v7.1: opcode 14 becomes the bucket, with NOP relocated to bit 63.
    d(MulOp::Fmov, 14, 14, Some(MulDisc::Mask(1 << 0)), 71, 71),
    d(MulOp::Mov, 14, 14, Some(MulDisc::Mask(1 << 1)), 71, 71),
    d(MulOp::Ftounorm16, 14, 14, Some(MulDisc::Mask(1 << 2)), 71, 71),
    d(MulOp::Ftosnorm16, 14, 14, Some(MulDisc::Mask(1 << 3)), 71, 71),
    d(MulOp::Vftounorm8, 14, 14, Some(MulDisc::Mask(1 << 4)), 71, 71),
    d(MulOp::Vftosnorm8, 14, 14, Some(MulDisc::Mask(1 << 5)), 71, 71),
    d(MulOp::Vftounorm10lo, 14, 14, Some(MulDisc::Mask(1 << 6)), 71, 71),
    d(MulOp::Vftounorm10hi, 14, 14, Some(MulDisc::Mask(1 << 7)), 71, 71),
    d(MulOp::Nop, 14, 14, Some(MulDisc::Mask(1 << 63)), 71, 71),
    d(MulOp::Fmul, 16, 63, None, 33, 71),
];

pub fn table_for(ver: u8) -> impl Iterator<Item = &'static MulOpDesc> {
    MUL_OPS
        .iter()
        .filter(move |desc| desc.first_ver <= ver && ver <= desc.last_ver)
}

/// Resolves the real opcode/discriminator-value pair for a decoded
/// instruction. `raw_disc` is the raw mux/raddr value consulted only
/// when the candidate descriptor requires one.
pub fn resolve(ver: u8, opcode: u8, raw_disc: u8) -> Option<&'static MulOpDesc> {
    table_for(ver).find(|desc| {
        (desc.opcode_first..=desc.opcode_last).contains(&opcode)
            && match desc.disc {
                None => true,
                Some(MulDisc::Exact(v)) => v == raw_disc,
                Some(MulDisc::Mask(m)) => m & (1u64 << raw_disc) != 0,
            }
    })
}
