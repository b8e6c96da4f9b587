//! Per-version signal maps. The 5-bit `sig` field is a closed set of
//! named signals whose available range grows with device version: v3.3
//! lacks `ldunifa`/`ldunifrf`/`ldunifarf`, which were added for v4.0 and
//! v4.1 respectively, and v7.1 repurposes the small-immediate slot into
//! four (`small_imm_a/b/c/d`) now that per-operand raddrs exist to carry
//! them.
//!
//! Index 0 is always the empty signal set on every version; it is never
//! reserved. Every other unlisted index is reserved.

use crate::error::CodecError;
use crate::instr::Signal;

/// One populated entry in a version's signal map; `None` marks a
/// reserved (invalid) index for that version.
type SigEntry = Option<fn(&mut Signal)>;

const NONE_ENTRY: SigEntry = None;

fn set(field: fn(&mut Signal)) -> SigEntry {
    Some(field)
}

macro_rules! sig_map {
    ($name:ident => [$($entry:expr),* $(,)?]) => {
        const $name: [SigEntry; 32] = [$($entry),*];
    };
}

sig_map!(V33_SIG_MAP => [
    set(|_| {}),
    set(|s| s.thrsw = true),
    set(|s| s.ldunif = true),
    set(|s| { s.thrsw = true; s.ldunif = true; }),
    set(|s| s.ldtmu = true),
    set(|s| { s.thrsw = true; s.ldtmu = true; }),
    set(|s| { s.ldtmu = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldtmu = true; s.ldunif = true; }),
    set(|s| s.ldvary = true),
    set(|s| { s.thrsw = true; s.ldvary = true; }),
    set(|s| { s.ldvary = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.ldunif = true; }),
    set(|s| { s.ldvary = true; s.ldtmu = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.ldtmu = true; }),
    set(|s| { s.small_imm_b = true; s.ldvary = true; }),
    set(|s| s.small_imm_b = true),
    set(|s| s.ldtlb = true),
    set(|s| s.ldtlbu = true),
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    set(|s| s.ucb = true),
    set(|s| s.rotate = true),
    set(|s| s.ldvpm = true),
    set(|s| { s.thrsw = true; s.ldvpm = true; }),
    set(|s| { s.ldvpm = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldvpm = true; s.ldunif = true; }),
    set(|s| { s.ldvpm = true; s.ldtmu = true; }),
    set(|s| { s.thrsw = true; s.ldvpm = true; s.ldtmu = true; }),
    set(|s| { s.small_imm_b = true; s.ldvpm = true; }),
    set(|s| s.small_imm_b = true),
]);

sig_map!(V40_SIG_MAP => [
    set(|_| {}),
    set(|s| s.thrsw = true),
    set(|s| s.ldunif = true),
    set(|s| { s.thrsw = true; s.ldunif = true; }),
    set(|s| s.ldtmu = true),
    set(|s| { s.thrsw = true; s.ldtmu = true; }),
    set(|s| { s.ldtmu = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldtmu = true; s.ldunif = true; }),
    set(|s| s.ldvary = true),
    set(|s| { s.thrsw = true; s.ldvary = true; }),
    set(|s| { s.ldvary = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.ldunif = true; }),
    NONE_ENTRY,
    NONE_ENTRY,
    set(|s| { s.small_imm_b = true; s.ldvary = true; }),
    set(|s| s.small_imm_b = true),
    set(|s| s.ldtlb = true),
    set(|s| s.ldtlbu = true),
    set(|s| s.wrtmuc = true),
    set(|s| { s.thrsw = true; s.wrtmuc = true; }),
    set(|s| { s.ldvary = true; s.wrtmuc = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.wrtmuc = true; }),
    set(|s| s.ucb = true),
    set(|s| s.rotate = true),
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    set(|s| { s.small_imm_b = true; s.ldtmu = true; }),
]);

sig_map!(V41_SIG_MAP => [
    set(|_| {}),
    set(|s| s.thrsw = true),
    set(|s| s.ldunif = true),
    set(|s| { s.thrsw = true; s.ldunif = true; }),
    set(|s| s.ldtmu = true),
    set(|s| { s.thrsw = true; s.ldtmu = true; }),
    set(|s| { s.ldtmu = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldtmu = true; s.ldunif = true; }),
    set(|s| s.ldvary = true),
    set(|s| { s.thrsw = true; s.ldvary = true; }),
    set(|s| { s.ldvary = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.ldunif = true; }),
    set(|s| s.ldunifrf = true),
    set(|s| { s.thrsw = true; s.ldunifrf = true; }),
    set(|s| { s.small_imm_b = true; s.ldvary = true; }),
    set(|s| s.small_imm_b = true),
    set(|s| s.ldtlb = true),
    set(|s| s.ldtlbu = true),
    set(|s| s.wrtmuc = true),
    set(|s| { s.thrsw = true; s.wrtmuc = true; }),
    set(|s| { s.ldvary = true; s.wrtmuc = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.wrtmuc = true; }),
    set(|s| s.ucb = true),
    set(|s| s.rotate = true),
    set(|s| s.ldunifa = true),
    set(|s| s.ldunifarf = true),
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    set(|s| { s.small_imm_b = true; s.ldtmu = true; }),
]);

sig_map!(V71_SIG_MAP => [
    set(|_| {}),
    set(|s| s.thrsw = true),
    set(|s| s.ldunif = true),
    set(|s| { s.thrsw = true; s.ldunif = true; }),
    set(|s| s.ldtmu = true),
    set(|s| { s.thrsw = true; s.ldtmu = true; }),
    set(|s| { s.ldtmu = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldtmu = true; s.ldunif = true; }),
    set(|s| s.ldvary = true),
    set(|s| { s.thrsw = true; s.ldvary = true; }),
    set(|s| { s.ldvary = true; s.ldunif = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.ldunif = true; }),
    set(|s| s.ldunifrf = true),
    set(|s| { s.thrsw = true; s.ldunifrf = true; }),
    set(|s| s.small_imm_a = true),
    set(|s| s.small_imm_b = true),
    set(|s| s.ldtlb = true),
    set(|s| s.ldtlbu = true),
    set(|s| s.wrtmuc = true),
    set(|s| { s.thrsw = true; s.wrtmuc = true; }),
    set(|s| { s.ldvary = true; s.wrtmuc = true; }),
    set(|s| { s.thrsw = true; s.ldvary = true; s.wrtmuc = true; }),
    set(|s| s.ucb = true),
    NONE_ENTRY,
    set(|s| s.ldunifa = true),
    set(|s| s.ldunifarf = true),
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    NONE_ENTRY,
    set(|s| s.small_imm_c = true),
    set(|s| s.small_imm_d = true),
]);

/// Index 31 always dispatches to a branch instruction rather than a
/// signal on every device version; the maps above still carry its real
/// entry (`small_imm_b` on v3.3/v4.x, `small_imm_d` on v7.1) so `unpack`
/// doesn't special-case it, but the caller in [`crate::decode`] checks
/// the raw 5-bit field against this constant first.
pub const BRANCH_SIG: u32 = 31;

fn map_for(ver: u8) -> &'static [SigEntry; 32] {
    if ver >= 71 {
        &V71_SIG_MAP
    } else if ver >= 41 {
        &V41_SIG_MAP
    } else if ver == 40 {
        &V40_SIG_MAP
    } else {
        &V33_SIG_MAP
    }
}

pub fn unpack(ver: u8, packed: u32) -> Result<Signal, CodecError> {
    if packed >= 32 {
        return Err(CodecError::InvalidSignal(packed));
    }
    match map_for(ver)[packed as usize] {
        Some(setter) => {
            let mut sig = Signal::default();
            setter(&mut sig);
            Ok(sig)
        }
        None => Err(CodecError::ReservedSignal(packed)),
    }
}

pub fn pack(ver: u8, sig: &Signal) -> Result<u32, CodecError> {
    let map = map_for(ver);
    for (index, entry) in map.iter().enumerate() {
        if let Some(setter) = entry {
            let mut candidate = Signal::default();
            setter(&mut candidate);
            if candidate == *sig {
                return Ok(index as u32);
            }
        }
    }
    Err(CodecError::UnrepresentableSmallImmediate(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_the_empty_signal_on_every_version() {
        for ver in [33, 40, 41, 42, 71] {
            let sig = unpack(ver, 0).unwrap();
            assert_eq!(sig, Signal::default());
        }
    }

    #[test]
    fn thrsw_is_index_one() {
        for ver in [33, 40, 41, 42, 71] {
            assert!(unpack(ver, 1).unwrap().thrsw);
        }
    }

    #[test]
    fn ldunifa_reserved_before_v40() {
        assert!(unpack(33, 24).is_err());
        assert!(unpack(41, 24).unwrap().ldunifa);
    }

    #[test]
    fn ldunifrf_reserved_before_v41() {
        assert!(unpack(40, 12).is_err());
        assert!(unpack(41, 12).unwrap().ldunifrf);
    }

    #[test]
    fn small_imm_a_c_d_only_exist_from_v71() {
        assert!(unpack(42, 14).is_err());
        assert!(unpack(71, 14).unwrap().small_imm_a);
        assert!(unpack(71, 30).unwrap().small_imm_c);
        assert!(unpack(71, 31).unwrap().small_imm_d);
    }

    #[test]
    fn small_imm_b_is_legal_before_v71() {
        assert!(unpack(33, 15).unwrap().small_imm_b);
        assert!(unpack(42, 15).unwrap().small_imm_b);
    }

    #[test]
    fn pack_round_trips_ldvary_ldunif() {
        let mut sig = Signal::default();
        sig.ldvary = true;
        sig.ldunif = true;
        let packed = pack(42, &sig).unwrap();
        assert_eq!(unpack(42, packed).unwrap(), sig);
    }

    #[test]
    fn out_of_range_index_rejected() {
        assert!(unpack(42, 32).is_err());
    }

    #[test]
    fn v40_selection_is_exact_not_a_floor() {
        // v41 reassigns index 12/13 to ldunifrf, which v40 leaves reserved.
        assert!(unpack(40, 12).is_err());
        assert!(unpack(42, 12).unwrap().ldunifrf);
    }
}
