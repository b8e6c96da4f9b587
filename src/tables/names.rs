//! Mnemonic strings for add/mul ops, in the same order the enums declare
//! their variants, plus the suffix spellings for conditions, flag-update
//! modes, and input/output (un)pack modes used by the single-line
//! assembler and its disassembler.

use crate::instr::{AddOp, Cond, InputUnpack, MulOp, OutputPack, Pf, Uf};

pub const ADD_OP_NAMES: [(&str, AddOp); 89] = {
    use AddOp::*;
    [
        ("fadd", Fadd),
        ("faddnf", Faddnf),
        ("vfpack", Vfpack),
        ("add", Add),
        ("sub", Sub),
        ("fsub", Fsub),
        ("min", Min),
        ("max", Max),
        ("umin", Umin),
        ("umax", Umax),
        ("shl", Shl),
        ("shr", Shr),
        ("asr", Asr),
        ("ror", Ror),
        ("fmin", Fmin),
        ("fmax", Fmax),
        ("vfmin", Vfmin),
        ("and", And),
        ("or", Or),
        ("xor", Xor),
        ("vadd", Vadd),
        ("vsub", Vsub),
        ("not", Not),
        ("neg", Neg),
        ("flapush", Flapush),
        ("flbpush", Flbpush),
        ("flpop", Flpop),
        ("recip", Recip),
        ("setmsf", Setmsf),
        ("setrevf", Setrevf),
        ("nop", Nop),
        ("tidx", Tidx),
        ("eidx", Eidx),
        ("lr", Lr),
        ("vfla", Vfla),
        ("vflna", Vflna),
        ("vflb", Vflb),
        ("vflnb", Vflnb),
        ("fxcd", Fxcd),
        ("xcd", Xcd),
        ("fycd", Fycd),
        ("ycd", Ycd),
        ("msf", Msf),
        ("revf", Revf),
        ("vdwwt", Vdwwt),
        ("iid", Iid),
        ("sampid", Sampid),
        ("barrierid", Barrierid),
        ("tmuwt", Tmuwt),
        ("vpmsetup", Vpmsetup),
        ("vpmwt", Vpmwt),
        ("flafirst", Flafirst),
        ("flnafirst", Flnafirst),
        ("ldvpmv_in", LdvpmvIn),
        ("ldvpmv_out", LdvpmvOut),
        ("ldvpmd_in", LdvpmdIn),
        ("ldvpmd_out", LdvpmdOut),
        ("ldvpmp", Ldvpmp),
        ("rsqrt", Rsqrt),
        ("exp", Exp),
        ("log", Log),
        ("sin", Sin),
        ("rsqrt2", Rsqrt2),
        ("ldvpmg_in", LdvpmgIn),
        ("ldvpmg_out", LdvpmgOut),
        ("fcmp", Fcmp),
        ("vfmax", Vfmax),
        ("fround", Fround),
        ("ftoin", Ftoin),
        ("ftrunc", Ftrunc),
        ("ftoiz", Ftoiz),
        ("ffloor", Ffloor),
        ("ftouz", Ftouz),
        ("fceil", Fceil),
        ("ftoc", Ftoc),
        ("fdx", Fdx),
        ("fdy", Fdy),
        ("stvpmv", Stvpmv),
        ("stvpmd", Stvpmd),
        ("stvpmp", Stvpmp),
        ("itof", Itof),
        ("clz", Clz),
        ("utof", Utof),
        ("fmov", Fmov),
        ("mov", Mov),
        ("vpack", Vpack),
        ("v8pack", V8pack),
        ("v10pack", V10pack),
        ("v11fpack", V11fpack),
    ]
};

pub const MUL_OP_NAMES: [(&str, MulOp); 16] = {
    use MulOp::*;
    [
        ("add", Add),
        ("sub", Sub),
        ("umul24", Umul24),
        ("vfmul", Vfmul),
        ("smul24", Smul24),
        ("multop", Multop),
        ("fmov", Fmov),
        ("mov", Mov),
        ("nop", Nop),
        ("fmul", Fmul),
        ("ftounorm16", Ftounorm16),
        ("ftosnorm16", Ftosnorm16),
        ("vftounorm8", Vftounorm8),
        ("vftosnorm8", Vftosnorm8),
        ("vftounorm10lo", Vftounorm10lo),
        ("vftounorm10hi", Vftounorm10hi),
    ]
};

pub fn add_op_name(op: AddOp) -> &'static str {
    ADD_OP_NAMES
        .iter()
        .find(|(_, o)| *o == op)
        .map(|(n, _)| *n)
        .expect("every AddOp variant has a name table entry")
}

pub fn mul_op_name(op: MulOp) -> &'static str {
    MUL_OP_NAMES
        .iter()
        .find(|(_, o)| *o == op)
        .map(|(n, _)| *n)
        .expect("every MulOp variant has a name table entry")
}

pub fn add_op_from_name(name: &str) -> Option<AddOp> {
    ADD_OP_NAMES.iter().find(|(n, _)| *n == name).map(|(_, o)| *o)
}

pub fn mul_op_from_name(name: &str) -> Option<MulOp> {
    MUL_OP_NAMES.iter().find(|(n, _)| *n == name).map(|(_, o)| *o)
}

pub fn add_op_candidates() -> &'static [&'static str] {
    const NAMES: [&str; 89] = [
        "fadd", "faddnf", "vfpack", "add", "sub", "fsub", "min", "max", "umin", "umax", "shl",
        "shr", "asr", "ror", "fmin", "fmax", "vfmin", "and", "or", "xor", "vadd", "vsub", "not",
        "neg", "flapush", "flbpush", "flpop", "recip", "setmsf", "setrevf", "nop", "tidx", "eidx",
        "lr", "vfla", "vflna", "vflb", "vflnb", "fxcd", "xcd", "fycd", "ycd", "msf", "revf",
        "vdwwt", "iid", "sampid", "barrierid", "tmuwt", "vpmsetup", "vpmwt", "flafirst",
        "flnafirst", "ldvpmv_in", "ldvpmv_out", "ldvpmd_in", "ldvpmd_out", "ldvpmp", "rsqrt",
        "exp", "log", "sin", "rsqrt2", "ldvpmg_in", "ldvpmg_out", "fcmp", "vfmax", "fround",
        "ftoin", "ftrunc", "ftoiz", "ffloor", "ftouz", "fceil", "ftoc", "fdx", "fdy", "stvpmv",
        "stvpmd", "stvpmp", "itof", "clz", "utof", "fmov", "mov", "vpack", "v8pack", "v10pack",
        "v11fpack",
    ];
    &NAMES
}

pub fn mul_op_candidates() -> &'static [&'static str] {
    const NAMES: [&str; 16] = [
        "add",
        "sub",
        "umul24",
        "vfmul",
        "smul24",
        "multop",
        "fmov",
        "mov",
        "nop",
        "fmul",
        "ftounorm16",
        "ftosnorm16",
        "vftounorm8",
        "vftosnorm8",
        "vftounorm10lo",
        "vftounorm10hi",
    ];
    &NAMES
}

/// `.cond` suffix spellings (`ifa`/`ifb`/`ifna`/`ifnb`).
pub const COND_NAMES: [(&str, Cond); 4] = [
    ("ifa", Cond::Ifa),
    ("ifb", Cond::Ifb),
    ("ifna", Cond::Ifna),
    ("ifnb", Cond::Ifnb),
];

/// `.pf` (push-flag) suffix spellings.
pub const PF_NAMES: [(&str, Pf); 3] = [
    ("pushz", Pf::Pushz),
    ("pushn", Pf::Pushn),
    ("pushc", Pf::Pushc),
];

/// `.uf` (update-flag) suffix spellings: the AND/NOR combinators.
pub const UF_NAMES: [(&str, Uf); 12] = [
    ("andz", Uf::Andz),
    ("andnz", Uf::Andnz),
    ("nornz", Uf::Nornz),
    ("norz", Uf::Norz),
    ("andn", Uf::Andn),
    ("andnn", Uf::Andnn),
    ("nornn", Uf::Nornn),
    ("norn", Uf::Norn),
    ("andc", Uf::Andc),
    ("andnc", Uf::Andnc),
    ("nornc", Uf::Nornc),
    ("norc", Uf::Norc),
];

/// Input-unpack suffixes recognized by the assembler grammar (§4.6): the
/// 16-bit-extension modes (`ul`/`uh`/`il`/`ih`) have no textual spelling
/// here because the source operand syntax never needs to name them
/// explicitly — they only arise on ops the table transcription ties to a
/// fixed unpack mode.
pub const INPUT_UNPACK_NAMES: [(&str, InputUnpack); 7] = [
    ("l", InputUnpack::L),
    ("h", InputUnpack::H),
    ("abs", InputUnpack::Abs),
    ("ff", InputUnpack::Replicate32fTo16),
    ("ll", InputUnpack::ReplicateL16),
    ("hh", InputUnpack::ReplicateH16),
    ("swp", InputUnpack::Swap16),
];

/// Output-pack suffixes on a destination (`.l` / `.h`).
pub const OUTPUT_PACK_NAMES: [(&str, OutputPack); 2] =
    [("l", OutputPack::L), ("h", OutputPack::H)];

pub fn cond_from_name(name: &str) -> Option<Cond> {
    COND_NAMES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

pub fn pf_from_name(name: &str) -> Option<Pf> {
    PF_NAMES.iter().find(|(n, _)| *n == name).map(|(_, p)| *p)
}

pub fn uf_from_name(name: &str) -> Option<Uf> {
    UF_NAMES.iter().find(|(n, _)| *n == name).map(|(_, u)| *u)
}

pub fn input_unpack_from_name(name: &str) -> Option<InputUnpack> {
    INPUT_UNPACK_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, u)| *u)
}

pub fn output_pack_from_name(name: &str) -> Option<OutputPack> {
    OUTPUT_PACK_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, p)| *p)
}

pub fn cond_name(c: Cond) -> Option<&'static str> {
    COND_NAMES.iter().find(|(_, v)| *v == c).map(|(n, _)| *n)
}

pub fn pf_name(p: Pf) -> Option<&'static str> {
    PF_NAMES.iter().find(|(_, v)| *v == p).map(|(n, _)| *n)
}

pub fn uf_name(u: Uf) -> Option<&'static str> {
    UF_NAMES.iter().find(|(_, v)| *v == u).map(|(n, _)| *n)
}

pub fn input_unpack_name(u: InputUnpack) -> Option<&'static str> {
    INPUT_UNPACK_NAMES
        .iter()
        .find(|(_, v)| *v == u)
        .map(|(n, _)| *n)
}

pub fn output_pack_name(p: OutputPack) -> Option<&'static str> {
    OUTPUT_PACK_NAMES
        .iter()
        .find(|(_, v)| *v == p)
        .map(|(n, _)| *n)
}

/// Flat candidate list of every flag-suffix spelling (cond, pf, and uf
/// names combined), for the assembler's "unknown suffix" error hints.
pub fn flag_suffix_candidates() -> &'static [&'static str] {
    const NAMES: [&str; 19] = [
        "ifa", "ifb", "ifna", "ifnb", "pushz", "pushn", "pushc", "andz", "andnz", "nornz", "norz",
        "andn", "andnn", "nornn", "norn", "andc", "andnc", "nornc", "norc",
    ];
    &NAMES
}

pub fn input_unpack_candidates() -> &'static [&'static str] {
    const NAMES: [&str; 7] = ["l", "h", "abs", "ff", "ll", "hh", "swp"];
    &NAMES
}

pub fn output_pack_candidates() -> &'static [&'static str] {
    const NAMES: [&str; 2] = ["l", "h"];
    &NAMES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_suffix_names_round_trip() {
        for (name, c) in COND_NAMES {
            assert_eq!(cond_from_name(name), Some(c));
            assert_eq!(cond_name(c), Some(name));
        }
        for (name, p) in PF_NAMES {
            assert_eq!(pf_from_name(name), Some(p));
            assert_eq!(pf_name(p), Some(name));
        }
        for (name, u) in UF_NAMES {
            assert_eq!(uf_from_name(name), Some(u));
            assert_eq!(uf_name(u), Some(name));
        }
    }

    #[test]
    fn input_unpack_and_output_pack_names_round_trip() {
        for (name, u) in INPUT_UNPACK_NAMES {
            assert_eq!(input_unpack_from_name(name), Some(u));
            assert_eq!(input_unpack_name(u), Some(name));
        }
        for (name, p) in OUTPUT_PACK_NAMES {
            assert_eq!(output_pack_from_name(name), Some(p));
            assert_eq!(output_pack_name(p), Some(name));
        }
    }

    #[test]
    fn every_add_op_name_round_trips() {
        for (name, op) in ADD_OP_NAMES {
            assert_eq!(add_op_from_name(name), Some(op));
            assert_eq!(add_op_name(op), name);
        }
    }

    #[test]
    fn every_mul_op_name_round_trips() {
        for (name, op) in MUL_OP_NAMES {
            assert_eq!(mul_op_from_name(name), Some(op));
            assert_eq!(mul_op_name(op), name);
        }
    }

    #[test]
    fn unknown_mnemonic_is_none() {
        assert_eq!(add_op_from_name("bogus"), None);
    }
}
