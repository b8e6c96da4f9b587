//! The structured instruction record: a tagged variant over {ALU, Branch}
//! with the shared signal/flags/raddr fields each carries.

pub mod alu;
pub mod branch;

pub use alu::{AddOp, AluHalf, AluInput, AluInstr, InputUnpack, Mux, MulOp, OutputPack};
pub use branch::{BranchCond, BranchDest, BranchInstr, Msfign};

/// Up to 14 one-bit side-channel flags carried in the `sig` field.
///
/// `small_imm_{c,d}` are only meaningful from V3D 7.1 (raddr_c/raddr_d did
/// not exist before then); `ldunifrf`/`ldunifarf` are only meaningful from
/// V3D 4.1 (signals that write an address required the waddr companion
/// fields introduced that version).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signal {
    pub thrsw: bool,
    pub ldunif: bool,
    pub ldunifa: bool,
    pub ldunifrf: bool,
    pub ldunifarf: bool,
    pub ldtmu: bool,
    pub ldvary: bool,
    pub ldvpm: bool,
    pub ldtlb: bool,
    pub ldtlbu: bool,
    pub ucb: bool,
    pub rotate: bool,
    pub wrtmuc: bool,
    pub small_imm_a: bool,
    pub small_imm_b: bool,
    pub small_imm_c: bool,
    pub small_imm_d: bool,
}

impl Signal {
    /// True when this signal is one of the address-carrying family: the
    /// `cond` field then holds `(sig_magic, sig_addr)` instead of flags.
    pub fn writes_address(&self) -> bool {
        self.ldunifrf || self.ldunifarf || self.ldtmu || self.ldvary || self.ldtlb || self.ldtlbu
    }

    pub fn popcount_small_imm(&self) -> u32 {
        [
            self.small_imm_a,
            self.small_imm_b,
            self.small_imm_c,
            self.small_imm_d,
        ]
        .iter()
        .filter(|b| **b)
        .count() as u32
    }
}

/// Branch or ALU condition applied per-ALU-half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cond {
    #[default]
    None,
    Ifa,
    Ifb,
    Ifna,
    Ifnb,
}

impl Cond {
    pub fn invert(self) -> Self {
        match self {
            Cond::Ifa => Cond::Ifna,
            Cond::Ifna => Cond::Ifa,
            Cond::Ifb => Cond::Ifnb,
            Cond::Ifnb => Cond::Ifb,
            Cond::None => panic!("Cond::None has no inverse"),
        }
    }
}

/// Push-flag mode: whether this ALU half's result updates the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pf {
    #[default]
    None,
    Pushz,
    Pushn,
    Pushc,
}

/// Update-flag mode: the AND/NOR combinators applied to existing flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Uf {
    #[default]
    None,
    Andz,
    Andnz,
    Nornz,
    Norz,
    Andn,
    Andnn,
    Nornn,
    Norn,
    Andc,
    Andnc,
    Nornc,
    Norc,
}

/// The six optional condition/flag fields shared by ALU instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub ac: Cond,
    pub mc: Cond,
    pub apf: Pf,
    pub mpf: Pf,
    pub auf: Uf,
    pub muf: Uf,
}

impl Flags {
    pub fn is_all_none(&self) -> bool {
        *self == Flags::default()
    }
}

/// A single instruction: either a co-issued ADD/MUL pair or a branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Alu(AluRecord),
    Branch(BranchRecord),
}

/// Fields shared by both instruction kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SharedFields {
    pub signal: Signal,
    /// 6-bit target register companion to address-writing signals (v4.1+).
    pub signal_address: u8,
    pub signal_magic: bool,
    /// Register-file read addresses used by the v4.x ALU encoding. In
    /// v7.1 these are superseded by the per-input raddrs on `AluInput`,
    /// except `raddr_b`, which v7.1 also reuses to carry the packed small
    /// immediate value regardless of encoding generation.
    pub raddr_a: u8,
    pub raddr_b: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AluRecord {
    pub shared: SharedFields,
    pub flags: Flags,
    pub alu: AluInstr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchRecord {
    pub shared: SharedFields,
    pub branch: BranchInstr,
}

impl Instruction {
    pub fn shared(&self) -> &SharedFields {
        match self {
            Instruction::Alu(r) => &r.shared,
            Instruction::Branch(r) => &r.shared,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Instruction::Branch(_))
    }
}
