//! Assembly: one line of text to a structured [`Instruction`].
//!
//! Grammar, informally (§4.6 of the format this crate implements):
//!
//! ```text
//! <add-op>[.cond][.pf][.uf] [<waddr>[.pack][, <a>[.unpack]][, <b>[.unpack]]]
//!   ; <mul-op>[.cond][.pf][.uf] [<waddr>[.pack][, <a>[.unpack]][, <b>[.unpack]]]
//!   [; <signal>[.<sig-addr>]]*
//! ```
//!
//! Branch assembly is deferred: a line beginning with `b` and not
//! `barrierid` would classify as a branch, but this crate only implements
//! branch *disassembly* and *decode* — the textual branch grammar isn't
//! pinned down precisely enough anywhere in the retrieval pack to
//! transcribe with confidence, mirroring the source's own incomplete
//! branch-assembler state.

use crate::device::DeviceInfo;
use crate::error::{AsmError, ByteOffset};
use crate::instr::{
    AluHalf, AluInput, AluInstr, AluRecord, Cond, Flags, Instruction, InputUnpack, Mux, OutputPack,
    Pf, Signal, Uf,
};
use crate::tables::{names, small_imm, waddr::Waddr};

struct Tokenizer<'a> {
    src: &'a str,
    pos: ByteOffset,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Tokenizer { src, pos: 0 }
    }

    /// Skips whitespace, `//` line comments, and `/* ... */` block
    /// comments. A block comment that never closes within this line is an
    /// error: this crate parses one line at a time, so a comment spanning
    /// multiple lines has no way to resume here.
    fn skip_ws_and_comments(&mut self) -> Result<(), AsmError> {
        loop {
            let rest = &self.src[self.pos..];
            if let Some(c) = rest.chars().next() {
                if c.is_whitespace() {
                    self.pos += c.len_utf8();
                    continue;
                }
            }
            if rest.starts_with("//") {
                self.pos = self.src.len();
                continue;
            }
            if rest.starts_with("/*") {
                let start = self.pos;
                match rest[2..].find("*/") {
                    Some(i) => self.pos += 2 + i + 2,
                    None => return Err(AsmError::UnterminatedComment { offset: start }),
                }
                continue;
            }
            return Ok(());
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws_and_comments().is_ok() && self.pos >= self.src.len()
    }

    fn next_token(&mut self) -> Option<(&'a str, ByteOffset)> {
        self.skip_ws_and_comments().ok()?;
        let start = self.pos;
        if start >= self.src.len() {
            return None;
        }
        let rest = &self.src[start..];
        if let Some(c) = rest.chars().next() {
            if c == ';' || c == ',' {
                self.pos += c.len_utf8();
                return Some((&self.src[start..self.pos], start));
            }
        }
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';' || c == ',')
            .map(|i| start + i)
            .unwrap_or(self.src.len());
        self.pos = end;
        Some((&self.src[start..end], start))
    }
}

/// Splits a dotted token (`fadd.ifa.pushz`, `rf3.abs`) into its base
/// spelling and the list of suffixes following it.
fn split_dots(tok: &str) -> (&str, impl Iterator<Item = &str>) {
    let mut parts = tok.split('.');
    let base = parts.next().unwrap_or("");
    (base, parts)
}

/// Collects the `.cond` / `.pf` / `.uf` suffixes following an op
/// mnemonic. Each category may appear at most once; a later one of the
/// same category overrides an earlier one rather than erroring, since
/// nothing in the format description requires rejecting that.
fn parse_flag_suffixes<'a>(
    suffixes: impl Iterator<Item = &'a str>,
    offset: ByteOffset,
) -> Result<(Cond, Pf, Uf), AsmError> {
    let mut cond = Cond::None;
    let mut pf = Pf::None;
    let mut uf = Uf::None;
    for suf in suffixes {
        if let Some(c) = names::cond_from_name(suf) {
            cond = c;
        } else if let Some(p) = names::pf_from_name(suf) {
            pf = p;
        } else if let Some(u) = names::uf_from_name(suf) {
            uf = u;
        } else {
            return Err(AsmError::UnknownFlagSuffix {
                offset,
                candidates: names::flag_suffix_candidates(),
            });
        }
    }
    Ok((cond, pf, uf))
}

fn accumulator_mux(base: &str) -> Option<Mux> {
    Some(match base {
        "r0" => Mux::R0,
        "r1" => Mux::R1,
        "r2" => Mux::R2,
        "r3" => Mux::R3,
        "r4" => Mux::R4,
        "r5" => Mux::R5,
        _ => return None,
    })
}

/// Tracks which register-file indices have been bound to the shared
/// `raddr_a`/`raddr_b` slots for a pre-v7.1 instruction (ADD and MUL share
/// these two read ports). A small immediate, when present, also lives in
/// slot B — the invariant the codec and validator both rely on.
#[derive(Default)]
struct RegBinder {
    slot_a: Option<u8>,
    slot_b: Option<u8>,
    slot_b_is_small_imm: bool,
}

impl RegBinder {
    fn bind_regfile(&mut self, rf: u8, offset: ByteOffset) -> Result<Mux, AsmError> {
        if self.slot_a == Some(rf) {
            return Ok(Mux::A);
        }
        if self.slot_b == Some(rf) && !self.slot_b_is_small_imm {
            return Ok(Mux::B);
        }
        if self.slot_a.is_none() {
            self.slot_a = Some(rf);
            return Ok(Mux::A);
        }
        if self.slot_b.is_none() {
            self.slot_b = Some(rf);
            return Ok(Mux::B);
        }
        Err(AsmError::TooManyRegisterFiles { offset })
    }

    fn bind_small_imm(&mut self, packed: u8, offset: ByteOffset) -> Result<(), AsmError> {
        if self.slot_b_is_small_imm {
            return Err(AsmError::MultipleSmallImmediates { offset });
        }
        if self.slot_b.is_some() {
            return Err(AsmError::SmallImmWrongSlot { offset });
        }
        self.slot_b = Some(packed);
        self.slot_b_is_small_imm = true;
        Ok(())
    }
}

/// Parses one ADD/MUL source operand against the pre-v7.1 mux encoding.
/// `is_b_slot` is the textual position (first operand vs second) — only
/// the second operand may be a small immediate, which always occupies
/// mux slot B regardless of which ALU half it belongs to.
fn parse_pre71_operand(
    tok: &str,
    offset: ByteOffset,
    binder: &mut RegBinder,
    is_b_slot: bool,
    signal: &mut Signal,
) -> Result<AluInput, AsmError> {
    let (base, suffixes) = split_dots(tok);
    let mut input = if let Some(mux) = accumulator_mux(base) {
        AluInput { mux: Some(mux), raddr: 0, unpack: InputUnpack::None }
    } else if let Some(rest) = base.strip_prefix("rf") {
        let index: u32 = rest
            .parse()
            .map_err(|_| AsmError::ExpectedOperand { offset })?;
        if index >= 64 {
            return Err(AsmError::RaddrOutOfRange { offset, index });
        }
        let mux = binder.bind_regfile(index as u8, offset)?;
        AluInput { mux: Some(mux), raddr: 0, unpack: InputUnpack::None }
    } else if let Some(packed) = small_imm::from_name(base) {
        if !is_b_slot {
            return Err(AsmError::SmallImmWrongSlot { offset });
        }
        binder.bind_small_imm(packed, offset)?;
        signal.small_imm_b = true;
        AluInput { mux: Some(Mux::B), raddr: 0, unpack: InputUnpack::None }
    } else {
        return Err(AsmError::ExpectedOperand { offset });
    };
    for suf in suffixes {
        input.unpack = names::input_unpack_from_name(suf).ok_or(AsmError::UnknownInputUnpack {
            offset,
            candidates: names::input_unpack_candidates(),
        })?;
    }
    Ok(input)
}

/// Which signal bit a v7.1 small immediate in a given operand slot sets:
/// `a`/`b` are the ADD operands (`raddr_a`/`raddr_b`), `c`/`d` the MUL
/// operands (`raddr_c`/`raddr_d`).
#[derive(Clone, Copy)]
enum V71Slot {
    A,
    B,
    C,
    D,
}

impl V71Slot {
    fn set(self, signal: &mut Signal) {
        match self {
            V71Slot::A => signal.small_imm_a = true,
            V71Slot::B => signal.small_imm_b = true,
            V71Slot::C => signal.small_imm_c = true,
            V71Slot::D => signal.small_imm_d = true,
        }
    }
}

/// Parses one ADD/MUL source operand against the v7.1 encoding: every
/// operand owns its raddr directly, so there is no cross-operand mux
/// binding to track, only the instruction-wide "at most one small
/// immediate" rule.
fn parse_v71_operand(
    tok: &str,
    offset: ByteOffset,
    signal: &mut Signal,
    small_imm_used: &mut bool,
    slot: V71Slot,
) -> Result<AluInput, AsmError> {
    let (base, suffixes) = split_dots(tok);
    let mut input = if let Some(rest) = base.strip_prefix("rf") {
        let index: u32 = rest
            .parse()
            .map_err(|_| AsmError::ExpectedOperand { offset })?;
        if index >= 64 {
            return Err(AsmError::RaddrOutOfRange { offset, index });
        }
        AluInput { mux: None, raddr: index as u8, unpack: InputUnpack::None }
    } else if let Some(packed) = small_imm::from_name(base) {
        if *small_imm_used {
            return Err(AsmError::MultipleSmallImmediates { offset });
        }
        *small_imm_used = true;
        slot.set(signal);
        AluInput { mux: None, raddr: packed, unpack: InputUnpack::None }
    } else {
        return Err(AsmError::ExpectedOperand { offset });
    };
    for suf in suffixes {
        input.unpack = names::input_unpack_from_name(suf).ok_or(AsmError::UnknownInputUnpack {
            offset,
            candidates: names::input_unpack_candidates(),
        })?;
    }
    Ok(input)
}

fn parse_waddr_base(devinfo: &DeviceInfo, base: &str, offset: ByteOffset) -> Result<(u8, bool), AsmError> {
    if let Some(rest) = base.strip_prefix("rf") {
        let index: u32 = rest
            .parse()
            .map_err(|_| AsmError::ExpectedWaddr { offset, candidates: &[] })?;
        if index >= 32 {
            return Err(AsmError::RegisterFileOutOfRange { offset, index });
        }
        return Ok((index as u8, false));
    }
    Waddr::from_name(base, devinfo.ver)
        .map(|w| (w.packed(), true))
        .ok_or(AsmError::ExpectedWaddr { offset, candidates: &[] })
}

fn parse_waddr_token(
    devinfo: &DeviceInfo,
    tok: &str,
    offset: ByteOffset,
) -> Result<(u8, bool, OutputPack), AsmError> {
    let (base, suffixes) = split_dots(tok);
    let (waddr, magic) = parse_waddr_base(devinfo, base, offset)?;
    let mut pack = OutputPack::None;
    for suf in suffixes {
        pack = names::output_pack_from_name(suf).ok_or(AsmError::UnknownOutputPack {
            offset,
            candidates: names::output_pack_candidates(),
        })?;
    }
    Ok((waddr, magic, pack))
}

fn apply_signal(
    signal: &mut Signal,
    signal_address: &mut u8,
    signal_magic: &mut bool,
    devinfo: &DeviceInfo,
    tok: &str,
    offset: ByteOffset,
) -> Result<(), AsmError> {
    let (name, mut suffixes) = split_dots(tok);
    let writes_address = match name {
        "thrsw" => {
            signal.thrsw = true;
            false
        }
        "ldunif" => {
            signal.ldunif = true;
            false
        }
        "ldunifa" => {
            signal.ldunifa = true;
            false
        }
        "ldunifrf" => {
            signal.ldunifrf = true;
            true
        }
        "ldunifarf" => {
            signal.ldunifarf = true;
            true
        }
        "ldtmu" => {
            signal.ldtmu = true;
            true
        }
        "ldvary" => {
            signal.ldvary = true;
            true
        }
        "ldvpm" => {
            signal.ldvpm = true;
            false
        }
        "ldtlb" => {
            signal.ldtlb = true;
            true
        }
        "ldtlbu" => {
            signal.ldtlbu = true;
            true
        }
        "ucb" => {
            signal.ucb = true;
            false
        }
        "rotate" => {
            signal.rotate = true;
            false
        }
        "wrtmuc" => {
            signal.wrtmuc = true;
            false
        }
        _ => {
            return Err(AsmError::UnknownSignal {
                offset,
                candidates: &[
                    "thrsw", "ldunif", "ldunifa", "ldunifrf", "ldunifarf", "ldtmu", "ldvary",
                    "ldvpm", "ldtlb", "ldtlbu", "ucb", "rotate", "wrtmuc",
                ],
            })
        }
    };

    if let Some(addr_tok) = suffixes.next() {
        if !writes_address {
            return Err(AsmError::UnknownSignal { offset, candidates: &[] });
        }
        let (addr, magic) = parse_waddr_base(devinfo, addr_tok, offset)?;
        *signal_address = addr;
        *signal_magic = magic;
    }
    Ok(())
}

pub fn assemble(devinfo: &DeviceInfo, line: &str) -> Result<Option<Instruction>, AsmError> {
    let instr = assemble_inner(devinfo, line);
    if let Err(ref e) = instr {
        tracing::debug!(offset = e.offset(), "assembly failed: {e}");
    }
    instr
}

fn assemble_inner(devinfo: &DeviceInfo, line: &str) -> Result<Option<Instruction>, AsmError> {
    let mut tok = Tokenizer::new(line);
    if tok.at_end() {
        return Ok(None);
    }

    let v71 = devinfo.is_v71();
    let mut binder = RegBinder::default();
    let mut small_imm_used = false;
    let mut signal = Signal::default();
    let mut signal_address = 0u8;
    let mut signal_magic = false;

    // --- ADD half ---
    let (add_tok, add_offset) = tok
        .next_token()
        .ok_or(AsmError::ExpectedOperand { offset: 0 })?;
    let (add_name, add_suffixes) = split_dots(add_tok);
    let add_op = names::add_op_from_name(add_name).ok_or(AsmError::UnknownAddOp {
        offset: add_offset,
        candidates: names::add_op_candidates(),
    })?;
    let (ac, apf, auf) = parse_flag_suffixes(add_suffixes, add_offset)?;

    let mut need_comma = false;
    let (mut add_waddr, mut add_magic, mut add_pack) = (6u8, true, OutputPack::None);
    if add_op.has_dst() {
        let (wtok, woffset) = tok
            .next_token()
            .ok_or(AsmError::ExpectedWaddr { offset: add_offset, candidates: &[] })?;
        let (w, magic, pack) = parse_waddr_token(devinfo, wtok, woffset)?;
        add_waddr = w;
        add_magic = magic;
        add_pack = pack;
        need_comma = true;
    }

    let mut add_a = AluInput::default();
    let mut add_b = AluInput::default();
    for slot in (0..add_op.num_src()).zip([false, true]).map(|(_, s)| s) {
        if need_comma {
            let (sep, sep_offset) = tok
                .next_token()
                .ok_or(AsmError::ExpectedOperand { offset: add_offset })?;
            if sep != "," {
                return Err(AsmError::ExpectedComma { offset: sep_offset });
            }
        }
        let (otok, ooffset) = tok
            .next_token()
            .ok_or(AsmError::ExpectedOperand { offset: add_offset })?;
        let input = if v71 {
            parse_v71_operand(
                otok,
                ooffset,
                &mut signal,
                &mut small_imm_used,
                if slot { V71Slot::B } else { V71Slot::A },
            )?
        } else {
            parse_pre71_operand(otok, ooffset, &mut binder, slot, &mut signal)?
        };
        if slot {
            add_b = input;
        } else {
            add_a = input;
        }
        need_comma = true;
    }

    // --- separator ---
    let (sep, sep_offset) = tok
        .next_token()
        .ok_or(AsmError::ExpectedSemicolon { offset: line.len() })?;
    if sep != ";" {
        return Err(AsmError::ExpectedSemicolon { offset: sep_offset });
    }

    // --- MUL half ---
    let (mul_tok, mul_offset) = tok
        .next_token()
        .ok_or(AsmError::ExpectedOperand { offset: sep_offset })?;
    let (mul_name, mul_suffixes) = split_dots(mul_tok);
    let mul_op = names::mul_op_from_name(mul_name).ok_or(AsmError::UnknownMulOp {
        offset: mul_offset,
        candidates: names::mul_op_candidates(),
    })?;
    let (mc, mpf, muf) = parse_flag_suffixes(mul_suffixes, mul_offset)?;

    let mut need_comma = false;
    let (mut mul_waddr, mut mul_magic, mut mul_pack) = (6u8, true, OutputPack::None);
    if mul_op.has_dst() {
        let (wtok, woffset) = tok
            .next_token()
            .ok_or(AsmError::ExpectedWaddr { offset: mul_offset, candidates: &[] })?;
        let (w, magic, pack) = parse_waddr_token(devinfo, wtok, woffset)?;
        mul_waddr = w;
        mul_magic = magic;
        mul_pack = pack;
        need_comma = true;
    }

    let mut mul_a = AluInput::default();
    let mut mul_b = AluInput::default();
    for slot in (0..mul_op.num_src()).zip([false, true]).map(|(_, s)| s) {
        if need_comma {
            let (sep, sep_offset) = tok
                .next_token()
                .ok_or(AsmError::ExpectedOperand { offset: mul_offset })?;
            if sep != "," {
                return Err(AsmError::ExpectedComma { offset: sep_offset });
            }
        }
        let (otok, ooffset) = tok
            .next_token()
            .ok_or(AsmError::ExpectedOperand { offset: mul_offset })?;
        let input = if v71 {
            parse_v71_operand(
                otok,
                ooffset,
                &mut signal,
                &mut small_imm_used,
                if slot { V71Slot::D } else { V71Slot::C },
            )?
        } else {
            parse_pre71_operand(otok, ooffset, &mut binder, slot, &mut signal)?
        };
        if slot {
            mul_b = input;
        } else {
            mul_a = input;
        }
        need_comma = true;
    }

    // --- trailing signals ---
    let mut signal_seen_address = false;
    while let Some((sep, sep_offset)) = tok.next_token() {
        if sep != ";" {
            return Err(AsmError::ExpectedSemicolon { offset: sep_offset });
        }
        let (sigtok, sigoffset) = tok
            .next_token()
            .ok_or(AsmError::ExpectedOperand { offset: sep_offset })?;
        apply_signal(&mut signal, &mut signal_address, &mut signal_magic, devinfo, sigtok, sigoffset)?;
        if signal.writes_address() {
            if signal_seen_address {
                return Err(AsmError::MultipleAddressSignals { offset: sigoffset });
            }
            signal_seen_address = true;
        }
    }

    Ok(Some(Instruction::Alu(AluRecord {
        shared: crate::instr::SharedFields {
            signal,
            signal_address,
            signal_magic,
            raddr_a: binder.slot_a.unwrap_or(0),
            raddr_b: binder.slot_b.unwrap_or(0),
        },
        flags: Flags { ac, mc, apf, mpf, auf, muf },
        alu: AluInstr {
            add: AluHalf {
                op: add_op,
                a: add_a,
                b: add_b,
                waddr: add_waddr,
                magic_write: add_magic,
                output_pack: add_pack,
            },
            mul: AluHalf {
                op: mul_op,
                a: mul_a,
                b: mul_b,
                waddr: mul_waddr,
                magic_write: mul_magic,
                output_pack: mul_pack,
            },
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(ver: u8) -> DeviceInfo {
        DeviceInfo::new(ver, 0, 1024, 8, ver < 71).unwrap()
    }

    #[test]
    fn assembles_nop_nop() {
        let instr = assemble(&dev(42), "nop ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert_eq!(r.alu.add.op, crate::instr::AddOp::Nop);
                assert_eq!(r.alu.mul.op, crate::instr::MulOp::Nop);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn blank_line_is_none() {
        assert!(assemble(&dev(42), "   // just a comment").unwrap().is_none());
        assert!(assemble(&dev(42), "").unwrap().is_none());
    }

    #[test]
    fn assembles_with_destination_and_signal() {
        let instr = assemble(&dev(42), "tidx r0 ; nop ; ldunif").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert!(r.shared.signal.ldunif);
                assert_eq!(r.alu.add.waddr, 0);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn unknown_mnemonic_reports_offset_and_candidates() {
        let err = assemble(&dev(42), "bogus ; nop").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(!err.candidates().is_empty());
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        assert!(assemble(&dev(42), "nop nop").is_err());
    }

    #[test]
    fn register_file_index_out_of_range_is_rejected() {
        assert!(matches!(
            assemble(&dev(42), "mov rf40 ; nop"),
            Err(AsmError::RegisterFileOutOfRange { .. })
        ));
    }

    #[test]
    fn parses_two_register_file_operands_on_add() {
        let instr = assemble(&dev(42), "fadd rf4, rf1, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert_eq!(r.alu.add.a.mux, Some(Mux::A));
                assert_eq!(r.alu.add.b.mux, Some(Mux::B));
                assert_eq!(r.shared.raddr_a, 1);
                assert_eq!(r.shared.raddr_b, 2);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn reusing_the_same_register_file_reuses_its_slot() {
        let instr = assemble(&dev(42), "fadd rf4, rf1, rf1 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert_eq!(r.alu.add.a.mux, Some(Mux::A));
                assert_eq!(r.alu.add.b.mux, Some(Mux::A));
                assert_eq!(r.shared.raddr_a, 1);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn a_third_distinct_register_file_is_rejected() {
        assert!(matches!(
            assemble(&dev(42), "fadd rf4, rf1, rf2 ; fadd rf5, rf3, rf1"),
            Err(AsmError::TooManyRegisterFiles { .. })
        ));
    }

    #[test]
    fn small_immediate_must_be_the_b_operand() {
        assert!(matches!(
            assemble(&dev(42), "fadd rf4, 3, rf1 ; nop"),
            Err(AsmError::SmallImmWrongSlot { .. })
        ));
        let instr = assemble(&dev(42), "fadd rf4, rf1, 3 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert!(r.shared.signal.small_imm_b);
                assert_eq!(r.shared.raddr_b, small_imm::from_name("3").unwrap());
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn input_unpack_suffix_parses() {
        let instr = assemble(&dev(42), "fadd rf4, rf1.abs, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => assert_eq!(r.alu.add.a.unpack, InputUnpack::Abs),
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn cond_and_pf_suffixes_parse_in_any_order() {
        let instr = assemble(&dev(42), "add.pushz.ifa rf4, rf1, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert_eq!(r.flags.ac, Cond::Ifa);
                assert_eq!(r.flags.apf, Pf::Pushz);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn output_pack_suffix_on_waddr_parses() {
        let instr = assemble(&dev(42), "fadd rf4.l, rf1, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => assert_eq!(r.alu.add.output_pack, OutputPack::L),
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn v71_operands_use_independent_raddrs_with_no_mux() {
        let instr = assemble(&dev(71), "fadd rf4, rf1, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert_eq!(r.alu.add.a.mux, None);
                assert_eq!(r.alu.add.a.raddr, 1);
                assert_eq!(r.alu.add.b.raddr, 2);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn v71_allows_small_immediate_on_either_add_operand() {
        let instr = assemble(&dev(71), "fadd rf4, 3, rf2 ; nop").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => assert!(r.shared.signal.small_imm_a),
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn v71_rejects_a_second_small_immediate() {
        assert!(matches!(
            assemble(&dev(71), "fadd rf4, 3, 5 ; nop"),
            Err(AsmError::MultipleSmallImmediates { .. })
        ));
    }

    #[test]
    fn signal_with_address_suffix_sets_signal_address() {
        let instr = assemble(&dev(42), "nop ; nop ; ldtmu.rf3").unwrap().unwrap();
        match instr {
            Instruction::Alu(r) => {
                assert!(r.shared.signal.ldtmu);
                assert_eq!(r.shared.signal_address, 3);
                assert!(!r.shared.signal_magic);
            }
            _ => panic!("expected ALU"),
        }
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(matches!(
            assemble(&dev(42), "nop ; nop /* oops"),
            Err(AsmError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn block_comment_is_skipped() {
        let instr = assemble(&dev(42), "nop /* comment */ ; nop").unwrap().unwrap();
        assert!(!instr.is_branch());
    }
}
