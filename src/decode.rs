//! Unpacking: 64-bit instruction word to structured [`Instruction`].

use crate::device::DeviceInfo;
use crate::error::CodecError;
use crate::fields::{get_field, layout};
use crate::instr::{
    AddOp, AluHalf, AluInput, AluInstr, AluRecord, BranchCond, BranchDest, BranchInstr,
    BranchRecord, Cond, Flags, InputUnpack, Instruction, Msfign, MulOp, Mux, OutputPack, Pf,
    SharedFields, Signal, Uf,
};
use crate::tables::{add_ops, flags, mul_ops, pack_codes, signals, waddr::Waddr};

/// The `sig` field value reserved to mark a branch instruction: every
/// per-version signal map leaves this index unpopulated (`None`) for
/// exactly this reason.
const BRANCH_SIG: u32 = 31;

pub fn unpack(devinfo: &DeviceInfo, word: u64) -> Result<Instruction, CodecError> {
    let sig_raw = get_field(word, layout::SIG) as u32;

    if sig_raw == BRANCH_SIG {
        unpack_branch(devinfo, word).map(Instruction::Branch)
    } else {
        unpack_alu(devinfo, word).map(Instruction::Alu)
    }
}

fn unpack_shared(devinfo: &DeviceInfo, word: u64, sig: Signal) -> SharedFields {
    let mut shared = SharedFields {
        signal: sig,
        raddr_a: get_field(word, layout::RADDR_A) as u8,
        raddr_b: get_field(word, layout::RADDR_B) as u8,
        ..Default::default()
    };

    if shared.signal.writes_address() && devinfo.is_at_least(41) {
        shared.signal_magic = get_field(word, layout::MA) != 0;
        shared.signal_address = get_field(word, layout::WADDR_A) as u8;
    }

    shared
}

/// The ordering key used to resolve a commutative-pair opcode ambiguity:
/// on v7.1, `small_imm*256 + unpack*64 + raddr`; pre-v7.1 (no small
/// immediates, an 8-valued mux instead of a 64-valued raddr),
/// `unpack*8 + mux`.
fn commutative_key(v71: bool, small_imm: bool, unpack_code: u8, raw: u8) -> u32 {
    if v71 {
        (small_imm as u32) * 256 + (unpack_code as u32) * 64 + raw as u32
    } else {
        (unpack_code as u32) * 8 + raw as u32
    }
}

/// Resolves a commutative-pair opcode ambiguity (`FADD`/`FADDNF`,
/// `FMIN`/`FMAX`) by the relative order of the two operands' full
/// [`commutative_key`], not just their raw mux/raddr value — two
/// instructions that differ only in which operand carries an unpack mode
/// or a small immediate still need a stable, order-dependent resolution.
/// Non-ambiguous ops pass through unchanged.
#[allow(clippy::too_many_arguments)]
fn resolve_commutative_add(
    op: AddOp,
    v71: bool,
    small_imm_a: bool,
    small_imm_b: bool,
    a_unpack_code: u8,
    b_unpack_code: u8,
    raw_a: u8,
    raw_b: u8,
) -> AddOp {
    let key_a = commutative_key(v71, small_imm_a, a_unpack_code, raw_a);
    let key_b = commutative_key(v71, small_imm_b, b_unpack_code, raw_b);
    match op {
        AddOp::Fadd | AddOp::Faddnf => {
            if key_a <= key_b {
                AddOp::Fadd
            } else {
                AddOp::Faddnf
            }
        }
        AddOp::Fmin | AddOp::Fmax => {
            if key_a <= key_b {
                AddOp::Fmin
            } else {
                AddOp::Fmax
            }
        }
        other => other,
    }
}

fn unpack_alu(devinfo: &DeviceInfo, word: u64) -> Result<AluRecord, CodecError> {
    let sig_raw = get_field(word, layout::SIG) as u32;
    let sig = signals::unpack(devinfo.ver, sig_raw)?;

    let cond_raw = get_field(word, layout::COND) as u32;
    let flags = if sig.writes_address() {
        Flags::default()
    } else {
        flags::unpack(cond_raw)?
    };

    let op_add_raw = get_field(word, layout::OP_ADD) as u8;
    let op_mul_raw = get_field(word, layout::OP_MUL) as u8;

    let mux_a_add = get_field(word, layout::ADD_A) as u8;
    let mux_b_add = get_field(word, layout::ADD_B) as u8;
    let mux_a_mul = get_field(word, layout::MUL_A) as u8;
    let mux_b_mul = get_field(word, layout::MUL_B) as u8;

    let raddr_a = get_field(word, layout::RADDR_A) as u8;
    let raddr_b = get_field(word, layout::RADDR_B) as u8;
    let raddr_c = get_field(word, layout::RADDR_C) as u8;
    let raddr_d = get_field(word, layout::RADDR_D) as u8;

    let v71 = devinfo.is_at_least(71);

    // v4.x disambiguates shared ADD opcode ranges by mux_a/mux_b; v7.1 has
    // no mux at all and disambiguates by raddr_a alone.
    let (add_disc_a, add_disc_b) = if v71 {
        (raddr_a, 0)
    } else {
        (mux_a_add, mux_b_add)
    };

    let add_desc = add_ops::table_for(devinfo.ver)
        .find(|d| {
            (d.opcode_first..=d.opcode_last).contains(&op_add_raw)
                && d.a_mask.map_or(true, |m| m & (1u64 << add_disc_a) != 0)
                && d.b_mask.map_or(true, |m| m & (1u64 << add_disc_b) != 0)
        })
        .ok_or(CodecError::UnknownAddOpcode {
            opcode: op_add_raw,
            mux_a: mux_a_add,
            mux_b: mux_b_add,
        })?;
    let add_op_raw = add_desc.op;

    // The opcode range's width alone tells us which pack/unpack scheme (if
    // any) its low bits carry — see `tables::pack_codes`.
    let add_width = add_desc.opcode_last as u16 - add_desc.opcode_first as u16 + 1;
    let add_scheme = pack_codes::scheme_for_width(add_width);
    let add_raw_offset = op_add_raw - add_desc.opcode_first;
    let (add_output_pack, add_a_unpack, add_b_unpack) =
        pack_codes::decode_pack_fields(add_scheme, add_raw_offset);

    let add_order_a = if v71 { raddr_a } else { mux_a_add };
    let add_order_b = if v71 { raddr_b } else { mux_b_add };
    let add_a_unpack_code = pack_codes::float32_unpack_code(add_a_unpack).unwrap_or(0);
    let add_b_unpack_code = pack_codes::float32_unpack_code(add_b_unpack).unwrap_or(0);
    let add_op = resolve_commutative_add(
        add_op_raw,
        v71,
        sig.small_imm_a,
        sig.small_imm_b,
        add_a_unpack_code,
        add_b_unpack_code,
        add_order_a,
        add_order_b,
    );

    let mul_disc_raw = if v71 { raddr_d } else { mux_b_mul };
    let mul_desc = mul_ops::resolve(devinfo.ver, op_mul_raw, mul_disc_raw).ok_or(
        CodecError::UnknownMulOpcode {
            opcode: op_mul_raw,
            mux_a: mux_a_mul,
            mux_b: mux_b_mul,
        },
    )?;
    let mul_op = mul_desc.op;

    let mul_width = mul_desc.opcode_last as u16 - mul_desc.opcode_first as u16 + 1;
    let mul_scheme = pack_codes::scheme_for_width(mul_width);
    let mul_raw_offset = op_mul_raw - mul_desc.opcode_first;
    let (mut mul_output_pack, mul_a_unpack, mul_b_unpack) =
        pack_codes::decode_pack_fields(mul_scheme, mul_raw_offset);

    // Pre-v7.1 FMOV's opcode range is a single value with no spare bits
    // at all, so the format steals mux_b for the output-pack code
    // instead — FMOV is unary, so mux_b carries no real operand anyway.
    if !v71 && mul_op == MulOp::Fmov {
        mul_output_pack = pack_codes::float_pack_from_code(mux_b_mul).unwrap_or(OutputPack::None);
    }

    let waddr_add = get_field(word, layout::WADDR_A) as u8;
    let waddr_mul = get_field(word, layout::WADDR_M) as u8;
    let magic_a = get_field(word, layout::MA) != 0;
    let magic_m = get_field(word, layout::MM) != 0;

    let add = AluHalf {
        op: add_op,
        a: unpack_input(v71, mux_a_add, raddr_a, add_a_unpack),
        b: unpack_input(v71, mux_b_add, raddr_b, add_b_unpack),
        waddr: waddr_add,
        magic_write: magic_a,
        output_pack: add_output_pack,
    };

    let mul = AluHalf {
        op: mul_op,
        a: unpack_input(v71, mux_a_mul, raddr_c, mul_a_unpack),
        b: unpack_input(v71, mux_b_mul, raddr_d, mul_b_unpack),
        waddr: waddr_mul,
        magic_write: magic_m,
        output_pack: mul_output_pack,
    };

    Ok(AluRecord {
        shared: unpack_shared(devinfo, word, sig),
        flags,
        alu: AluInstr { add, mul },
    })
}

/// Builds one ALU operand. On v4.x the mux selector picks the source
/// (accumulator, or register file A/B via the shared `raddr_a`/`raddr_b`
/// fields); on v7.1 there is no mux and the per-operand raddr is the
/// source directly. `unpack` is supplied by the caller, already decoded
/// from the owning op's opcode sub-bits (or mux_b, for FMOV).
fn unpack_input(v71: bool, mux_raw: u8, raddr: u8, unpack: InputUnpack) -> AluInput {
    if v71 {
        AluInput {
            mux: None,
            raddr,
            unpack,
        }
    } else {
        let mux = Mux::from_packed(mux_raw);
        let effective_raddr = match mux {
            Some(Mux::A) | Some(Mux::B) => raddr,
            _ => 0,
        };
        AluInput {
            mux,
            raddr: effective_raddr,
            unpack,
        }
    }
}

fn unpack_branch(devinfo: &DeviceInfo, word: u64) -> Result<BranchRecord, CodecError> {
    let sig = Signal::default();

    let cond_raw = get_field(word, layout::BRANCH_COND) as u32;
    let cond = match cond_raw {
        0 => BranchCond::All,
        1 => BranchCond::Any,
        2 => BranchCond::AllNotM,
        3 => BranchCond::AnyNotM,
        4 => BranchCond::Always,
        5 => BranchCond::A0,
        6 => BranchCond::NotA0,
        _ => return Err(CodecError::MalformedInstruction),
    };

    let msfign_raw = get_field(word, layout::BRANCH_MSFIGN) as u32;
    let msfign = match msfign_raw {
        0 => Msfign::None,
        1 => Msfign::P,
        2 => Msfign::Q,
        _ => Msfign::None,
    };

    let bdi = get_field(word, layout::BRANCH_BDI) as u8;
    let bdu = get_field(word, layout::BRANCH_BDU) as u8;
    let dest = match bdi {
        0 => BranchDest::Relative,
        1 => BranchDest::RegfileA(bdu),
        2 => BranchDest::LinkReg,
        _ => BranchDest::Relative,
    };

    let addr_high = get_field(word, layout::BRANCH_ADDR_HIGH) as u32;
    let addr_low = get_field(word, layout::BRANCH_ADDR_LOW) as u32;
    let offset = ((addr_high << 24) | addr_low) as i32;

    Ok(BranchRecord {
        shared: unpack_shared(devinfo, word, sig),
        branch: BranchInstr {
            cond,
            msfign,
            dest,
            relative: true,
            link: !matches!(dest, BranchDest::Relative),
            offset,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(ver: u8) -> DeviceInfo {
        DeviceInfo::new(ver, 0, 1024, 8, ver < 71).unwrap()
    }

    #[test]
    fn nop_nop_word_decodes_as_alu() {
        let d = dev(42);
        // add NOP is opcode 187 with mux_a/mux_b both zero; mul NOP is
        // opcode 15 sub 1 (mux_b = 1).
        let word = (187u64 << 24) | (15u64 << 58) | (1u64 << 21);
        let instr = unpack(&d, word).unwrap();
        assert!(!instr.is_branch());
    }

    #[test]
    fn branch_sig_dispatches_to_branch_decode() {
        let d = dev(42);
        let word = (BRANCH_SIG as u64) << 53;
        let instr = unpack(&d, word).unwrap();
        assert!(instr.is_branch());
    }

    #[test]
    fn reserved_signal_index_is_rejected() {
        let d = dev(33);
        let word = (18u64) << 53;
        assert!(unpack(&d, word).is_err());
    }

    #[test]
    fn v71_mul_nop_lives_at_opcode_14_bit_63() {
        let d = dev(71);
        let word = (187u64 << 24) | (14u64 << 58) | (63u64 << 12); // raddr_d = 63
        let instr = unpack(&d, word).unwrap();
        match instr {
            Instruction::Alu(rec) => assert_eq!(rec.alu.mul.op, MulOp::Nop),
            _ => panic!("expected an ALU instruction"),
        }
    }

    #[test]
    fn commutative_add_pair_resolves_by_operand_order() {
        let d = dev(42);
        // Opcode 10 is within the shared FADD/FADDNF range (0-47).
        let lo = (10u64 << 24) | (2u64 << 12); // mux_a=2, mux_b=0
        let hi = (10u64 << 24) | (2u64 << 15); // mux_a=0, mux_b=2
        match unpack(&d, lo).unwrap() {
            Instruction::Alu(rec) => assert_eq!(rec.alu.add.op, AddOp::Fadd),
            _ => panic!(),
        }
        match unpack(&d, hi).unwrap() {
            Instruction::Alu(rec) => assert_eq!(rec.alu.add.op, AddOp::Faddnf),
            _ => panic!(),
        }
    }

    #[test]
    fn fadd_decodes_output_pack_and_per_operand_unpack_from_the_opcode() {
        let d = dev(42);
        // Offset 17 within the FADD/FADDNF range: output_pack=L (1*16),
        // a_unpack=Abs (0*4), b_unpack=None (1).
        let word = (17u64 << 24) | (15u64 << 58) | (1u64 << 21);
        match unpack(&d, word).unwrap() {
            Instruction::Alu(rec) => {
                assert_eq!(rec.alu.add.output_pack, OutputPack::L);
                assert_eq!(rec.alu.add.a.unpack, InputUnpack::Abs);
                assert_eq!(rec.alu.add.b.unpack, InputUnpack::None);
            }
            _ => panic!("expected an ALU instruction"),
        }
    }

    #[test]
    fn vfmin_decodes_the_combined_float16_unpack_code() {
        let d = dev(42);
        // Opcode 176 + 4 = SWAP16 (code 4), shared by both operands.
        let word = (180u64 << 24) | (15u64 << 58) | (1u64 << 21);
        match unpack(&d, word).unwrap() {
            Instruction::Alu(rec) => {
                assert_eq!(rec.alu.add.op, AddOp::Vfmin);
                assert_eq!(rec.alu.add.a.unpack, InputUnpack::Swap16);
                assert_eq!(rec.alu.add.b.unpack, InputUnpack::Swap16);
                assert_eq!(rec.alu.add.output_pack, OutputPack::None);
            }
            _ => panic!("expected an ALU instruction"),
        }
    }

    #[test]
    fn integer_ops_never_report_a_pack_or_unpack_mode() {
        let d = dev(42);
        // ADD is opcode 56, a 1-wide range with no spare bits.
        let word = (56u64 << 24) | (15u64 << 58) | (1u64 << 21);
        match unpack(&d, word).unwrap() {
            Instruction::Alu(rec) => {
                assert_eq!(rec.alu.add.op, AddOp::Add);
                assert_eq!(rec.alu.add.output_pack, OutputPack::None);
                assert_eq!(rec.alu.add.a.unpack, InputUnpack::None);
                assert_eq!(rec.alu.add.b.unpack, InputUnpack::None);
            }
            _ => panic!("expected an ALU instruction"),
        }
    }
}
