//! Packing: structured [`Instruction`] to a 64-bit instruction word.

use crate::device::DeviceInfo;
use crate::error::CodecError;
use crate::fields::{layout, set_field};
use crate::instr::{
    AddOp, AluInput, BranchCond, BranchDest, InputUnpack, Instruction, Msfign, MulOp, OutputPack,
    Signal,
};
use crate::tables::add_ops::{self, ANY};
use crate::tables::mul_ops::{self, MulDisc};
use crate::tables::{flags, pack_codes, signals};

const BRANCH_SIG: u32 = 31;

pub fn pack(devinfo: &DeviceInfo, instr: &Instruction) -> Result<u64, CodecError> {
    match instr {
        Instruction::Alu(record) => pack_alu(devinfo, record),
        Instruction::Branch(record) => pack_branch(devinfo, record),
    }
}

/// Writes the fields shared by both instruction kinds. `skip_raddr_ab`
/// is set for a v7.1 ALU word, where `RADDR_A`/`RADDR_B` were already
/// written from the ADD operands themselves — `shared.raddr_a/b` would
/// otherwise stomp on that with stale or default values.
fn pack_shared(
    word: u64,
    devinfo: &DeviceInfo,
    shared: &crate::instr::SharedFields,
    skip_raddr_ab: bool,
) -> u64 {
    let mut word = word;
    if !skip_raddr_ab {
        word = set_field(word, shared.raddr_a as u64, layout::RADDR_A);
        word = set_field(word, shared.raddr_b as u64, layout::RADDR_B);
    }
    if shared.signal.writes_address() && devinfo.is_at_least(41) {
        word = set_field(word, shared.signal_magic as u64, layout::MA);
        word = set_field(word, shared.signal_address as u64, layout::WADDR_A);
    }
    word
}

fn pack_input_mux(input: &AluInput) -> u8 {
    match input.mux {
        Some(mux) => mux.packed(),
        None => input.raddr,
    }
}

/// Resolves the raw mux/raddr value for one ADD operand slot: the real
/// operand when the slot carries one, or the lowest value matching the
/// descriptor's discriminator mask when the slot is a pure op selector
/// (e.g. `mux_b` for the opcode-186 unary family).
fn add_slot_value(mask: Option<u64>, real: u8) -> u8 {
    match mask {
        None | Some(ANY) => real,
        Some(m) => add_ops::first_set(m),
    }
}

/// The ordering key used to resolve a commutative-pair opcode ambiguity:
/// on v7.1, `small_imm*256 + unpack*64 + raddr`; pre-v7.1,
/// `unpack*8 + mux`. Mirrors [`crate::decode`]'s key exactly, since the
/// two must agree for `pack`/`unpack` to round-trip.
fn commutative_key(v71: bool, small_imm: bool, unpack_code: u8, raw: u8) -> u32 {
    if v71 {
        (small_imm as u32) * 256 + (unpack_code as u32) * 64 + raw as u32
    } else {
        (unpack_code as u32) * 8 + raw as u32
    }
}

/// Given the requested op name and the two operands as the caller
/// provided them, returns the operand order that actually encodes that
/// name for a commutative-pair op (`FADD`/`FADDNF`, `FMIN`/`FMAX`), or the
/// operands unchanged for every other op. The real pair is distinguished
/// by the operands' full [`commutative_key`] (mux/raddr plus unpack mode
/// and small-immediate flag), so two operands that agree on all of those
/// have no valid encoding for the `NF`/`MAX` spelling.
fn resolve_commutative_operands<'a>(
    devinfo: &DeviceInfo,
    op: AddOp,
    signal: &Signal,
    a: &'a AluInput,
    b: &'a AluInput,
) -> Result<(&'a AluInput, &'a AluInput), CodecError> {
    let wants_low = matches!(op, AddOp::Fadd | AddOp::Fmin);
    let wants_high = matches!(op, AddOp::Faddnf | AddOp::Fmax);
    if !wants_low && !wants_high {
        return Ok((a, b));
    }
    let v71 = devinfo.is_at_least(71);
    let a_unpack_code = pack_codes::float32_unpack_code(a.unpack).unwrap_or(0);
    let b_unpack_code = pack_codes::float32_unpack_code(b.unpack).unwrap_or(0);
    let key_a = commutative_key(v71, signal.small_imm_a, a_unpack_code, pack_input_mux(a));
    let key_b = commutative_key(v71, signal.small_imm_b, b_unpack_code, pack_input_mux(b));
    if key_a == key_b {
        return Err(CodecError::UnresolvableCommutativeSwap);
    }
    let in_order = key_a <= key_b;
    if (wants_low && in_order) || (wants_high && !in_order) {
        Ok((a, b))
    } else {
        Ok((b, a))
    }
}

/// Validates that `output_pack`/`a_unpack`/`b_unpack` are all representable
/// under `scheme` and, if so, returns the offset within the matched opcode
/// range that encodes them. Checked field-by-field so a rejection names the
/// specific field that cannot be encoded rather than a generic failure.
fn validate_pack_fields(
    scheme: pack_codes::PackScheme,
    output_pack: OutputPack,
    a_unpack: InputUnpack,
    b_unpack: InputUnpack,
) -> Result<u8, CodecError> {
    use pack_codes::PackScheme;
    match scheme {
        PackScheme::BinaryFloat => {
            pack_codes::float32_unpack_code(a_unpack)
                .ok_or(CodecError::UnrepresentableUnpack(a_unpack))?;
            pack_codes::float32_unpack_code(b_unpack)
                .ok_or(CodecError::UnrepresentableUnpack(b_unpack))?;
        }
        PackScheme::BinaryFloatNoOutputPack => {
            if output_pack != OutputPack::None {
                return Err(CodecError::UnrepresentableOutputPack(output_pack));
            }
            pack_codes::float32_unpack_code(a_unpack)
                .ok_or(CodecError::UnrepresentableUnpack(a_unpack))?;
            pack_codes::float32_unpack_code(b_unpack)
                .ok_or(CodecError::UnrepresentableUnpack(b_unpack))?;
        }
        PackScheme::CombinedFloat16 => {
            if output_pack != OutputPack::None {
                return Err(CodecError::UnrepresentableOutputPack(output_pack));
            }
            if a_unpack != b_unpack {
                return Err(CodecError::UnrepresentableUnpack(b_unpack));
            }
            pack_codes::float16_unpack_code(a_unpack)
                .ok_or(CodecError::UnrepresentableUnpack(a_unpack))?;
        }
        PackScheme::None => {
            if output_pack != OutputPack::None {
                return Err(CodecError::UnrepresentableOutputPack(output_pack));
            }
            if a_unpack != InputUnpack::None {
                return Err(CodecError::UnrepresentableUnpack(a_unpack));
            }
            if b_unpack != InputUnpack::None {
                return Err(CodecError::UnrepresentableUnpack(b_unpack));
            }
        }
    }
    pack_codes::encode_pack_fields(scheme, output_pack, a_unpack, b_unpack)
        .ok_or(CodecError::UnrepresentableUnpack(a_unpack))
}

fn pack_alu(devinfo: &DeviceInfo, record: &crate::instr::AluRecord) -> Result<u64, CodecError> {
    let sig_packed = signals::pack(devinfo.ver, &record.shared.signal)?;
    let mut word = set_field(0, sig_packed as u64, layout::SIG);

    let cond_packed = if record.shared.signal.writes_address() {
        0
    } else {
        flags::pack(&record.flags)?
    };
    word = set_field(word, cond_packed as u64, layout::COND);

    let v71 = devinfo.is_at_least(71);

    let add_desc = add_ops::table_for(devinfo.ver)
        .find(|d| d.op == record.alu.add.op)
        .ok_or(CodecError::AddOpNotEncodable(record.alu.add.op))?;
    let mul_desc = mul_ops::table_for(devinfo.ver)
        .find(|d| d.op == record.alu.mul.op)
        .ok_or(CodecError::MulOpNotEncodable(record.alu.mul.op))?;

    let (add_a, add_b) = resolve_commutative_operands(
        devinfo,
        record.alu.add.op,
        &record.shared.signal,
        &record.alu.add.a,
        &record.alu.add.b,
    )?;

    let add_width = add_desc.opcode_last as u16 - add_desc.opcode_first as u16 + 1;
    let add_scheme = pack_codes::scheme_for_width(add_width);
    let add_offset = validate_pack_fields(
        add_scheme,
        record.alu.add.output_pack,
        add_a.unpack,
        add_b.unpack,
    )?;
    word = set_field(word, (add_desc.opcode_first + add_offset) as u64, layout::OP_ADD);

    // Pre-v7.1 FMOV has a 1-wide opcode range with no spare bits; its
    // output-pack code rides in mux_b instead (see the matching special
    // case in `crate::decode`).
    let fmov_via_mux_b = !v71 && record.alu.mul.op == MulOp::Fmov;
    let mul_offset = if fmov_via_mux_b {
        if record.alu.mul.a.unpack != InputUnpack::None
            || record.alu.mul.b.unpack != InputUnpack::None
        {
            return Err(CodecError::UnrepresentableUnpack(record.alu.mul.a.unpack));
        }
        0
    } else {
        let mul_width = mul_desc.opcode_last as u16 - mul_desc.opcode_first as u16 + 1;
        let mul_scheme = pack_codes::scheme_for_width(mul_width);
        validate_pack_fields(
            mul_scheme,
            record.alu.mul.output_pack,
            record.alu.mul.a.unpack,
            record.alu.mul.b.unpack,
        )?
    };
    word = set_field(word, (mul_desc.opcode_first + mul_offset) as u64, layout::OP_MUL);

    if v71 {
        let raddr_a = add_slot_value(add_desc.a_mask, pack_input_mux(add_a));
        let raddr_b = pack_input_mux(add_b);
        word = set_field(word, raddr_a as u64, layout::RADDR_A);
        word = set_field(word, raddr_b as u64, layout::RADDR_B);
    } else {
        let mux_a = add_slot_value(add_desc.a_mask, pack_input_mux(add_a));
        let mux_b = add_slot_value(add_desc.b_mask, pack_input_mux(add_b));
        word = set_field(word, mux_a as u64, layout::ADD_A);
        word = set_field(word, mux_b as u64, layout::ADD_B);
    }

    if v71 {
        let raddr_c = pack_input_mux(&record.alu.mul.a);
        word = set_field(word, raddr_c as u64, layout::RADDR_C);
        let raddr_d = match mul_desc.disc {
            Some(MulDisc::Mask(m)) => add_ops::first_set(m),
            _ => pack_input_mux(&record.alu.mul.b),
        };
        word = set_field(word, raddr_d as u64, layout::RADDR_D);
    } else {
        word = set_field(
            word,
            pack_input_mux(&record.alu.mul.a) as u64,
            layout::MUL_A,
        );
        let mux_b = match mul_desc.disc {
            Some(MulDisc::Exact(v)) => v,
            _ if fmov_via_mux_b => pack_codes::float_pack_code(record.alu.mul.output_pack),
            _ => pack_input_mux(&record.alu.mul.b),
        };
        word = set_field(word, mux_b as u64, layout::MUL_B);
    }

    if record.alu.add.waddr > 0x3f {
        return Err(CodecError::WaddrOutOfRange(record.alu.add.waddr));
    }
    if record.alu.mul.waddr > 0x3f {
        return Err(CodecError::WaddrOutOfRange(record.alu.mul.waddr));
    }
    word = set_field(word, record.alu.add.waddr as u64, layout::WADDR_A);
    word = set_field(word, record.alu.mul.waddr as u64, layout::WADDR_M);
    word = set_field(word, record.alu.add.magic_write as u64, layout::MA);
    word = set_field(word, record.alu.mul.magic_write as u64, layout::MM);

    Ok(pack_shared(word, devinfo, &record.shared, v71))
}

fn pack_branch(devinfo: &DeviceInfo, record: &crate::instr::BranchRecord) -> Result<u64, CodecError> {
    let mut word = set_field(0, BRANCH_SIG as u64, layout::SIG);

    let cond_raw = match record.branch.cond {
        BranchCond::All => 0,
        BranchCond::Any => 1,
        BranchCond::AllNotM => 2,
        BranchCond::AnyNotM => 3,
        BranchCond::Always => 4,
        BranchCond::A0 => 5,
        BranchCond::NotA0 => 6,
    };
    word = set_field(word, cond_raw, layout::BRANCH_COND);

    let msfign_raw = match record.branch.msfign {
        Msfign::None => 0,
        Msfign::P => 1,
        Msfign::Q => 2,
    };
    word = set_field(word, msfign_raw, layout::BRANCH_MSFIGN);

    let (bdi, bdu) = match record.branch.dest {
        BranchDest::Relative => (0u64, 0u64),
        BranchDest::RegfileA(r) => (1, r as u64),
        BranchDest::LinkReg => (2, 0),
    };
    word = set_field(word, bdi, layout::BRANCH_BDI);
    word = set_field(word, bdu, layout::BRANCH_BDU);

    let offset = record.branch.offset as u32;
    word = set_field(word, (offset >> 24) as u64 & 0xff, layout::BRANCH_ADDR_HIGH);
    word = set_field(word, (offset & 0x1f_ffff) as u64, layout::BRANCH_ADDR_LOW);

    let shared = crate::instr::SharedFields {
        signal: Signal::default(),
        ..record.shared
    };
    Ok(pack_shared(word, devinfo, &shared, false))
}
