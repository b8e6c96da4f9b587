//! The 7-bit packed flags field: a prefix-coded encoding that crams six
//! independent optional fields (two conditions, two push-flags, two
//! update-flags) into far fewer bits than a naive fixed-width packing
//! would need, at the cost of only allowing certain combinations.

use crate::error::CodecError;
use crate::instr::{Cond, Flags, Pf, Uf};

fn cond_index(c: Cond) -> u32 {
    match c {
        Cond::None => panic!("Cond::None has no packed index"),
        Cond::Ifa => 0,
        Cond::Ifb => 1,
        Cond::Ifna => 2,
        Cond::Ifnb => 3,
    }
}

fn cond_from_index(i: u32) -> Cond {
    match i & 0x3 {
        0 => Cond::Ifa,
        1 => Cond::Ifb,
        2 => Cond::Ifna,
        3 => Cond::Ifnb,
        _ => unreachable!(),
    }
}

fn pf_from_bits(bits: u32) -> Pf {
    match bits & 0x3 {
        0 => Pf::None,
        1 => Pf::Pushz,
        2 => Pf::Pushn,
        3 => Pf::Pushc,
        _ => unreachable!(),
    }
}

fn uf_index(u: Uf) -> u32 {
    match u {
        Uf::None => panic!("Uf::None has no packed index"),
        Uf::Andz => 0,
        Uf::Andnz => 1,
        Uf::Nornz => 2,
        Uf::Norz => 3,
        Uf::Andn => 4,
        Uf::Andnn => 5,
        Uf::Nornn => 6,
        Uf::Norn => 7,
        Uf::Andc => 8,
        Uf::Andnc => 9,
        Uf::Nornc => 10,
        Uf::Norc => 11,
    }
}

fn uf_from_index(i: u32) -> Uf {
    match i & 0xf {
        0 => Uf::Andz,
        1 => Uf::Andnz,
        2 => Uf::Nornz,
        3 => Uf::Norz,
        4 => Uf::Andn,
        5 => Uf::Andnn,
        6 => Uf::Nornn,
        7 => Uf::Norn,
        8 => Uf::Andc,
        9 => Uf::Andnc,
        10 => Uf::Nornc,
        11 => Uf::Norc,
        _ => unreachable!(),
    }
}

pub fn unpack(packed: u32) -> Result<Flags, CodecError> {
    let mut f = Flags::default();

    if packed == 0 {
        return Ok(f);
    } else if packed >> 2 == 0 {
        f.apf = pf_from_bits(packed);
    } else if packed >> 4 == 0 {
        f.auf = uf_from_index((packed & 0xf).wrapping_sub(4));
    } else if packed == 0x10 {
        return Err(CodecError::ReservedFlags(packed));
    } else if packed >> 2 == 0x4 {
        f.mpf = pf_from_bits(packed);
    } else if packed >> 4 == 0x1 {
        f.muf = uf_from_index((packed & 0xf).wrapping_sub(4));
    } else if packed >> 4 == 0x2 {
        f.ac = cond_from_index((packed >> 2) & 0x3);
        f.mpf = pf_from_bits(packed);
    } else if packed >> 4 == 0x3 {
        f.mc = cond_from_index((packed >> 2) & 0x3);
        f.apf = pf_from_bits(packed);
    } else if packed >> 6 != 0 {
        f.mc = cond_from_index((packed >> 4) & 0x3);
        if (packed >> 2) & 0x3 == 0 {
            f.ac = cond_from_index(packed & 0x3);
        } else {
            f.auf = uf_from_index((packed & 0xf).wrapping_sub(4));
        }
    }

    Ok(f)
}

const AC: u8 = 1 << 0;
const MC: u8 = 1 << 1;
const APF: u8 = 1 << 2;
const MPF: u8 = 1 << 3;
const AUF: u8 = 1 << 4;
const MUF: u8 = 1 << 5;

const FLAGS_TABLE: [(u8, u32); 11] = [
    (0, 0),
    (APF, 0),
    (AUF, 0),
    (MPF, 1 << 4),
    (MUF, 1 << 4),
    (AC, 1 << 5),
    (AC | MPF, 1 << 5),
    (MC, (1 << 5) | (1 << 4)),
    (MC | APF, (1 << 5) | (1 << 4)),
    (MC | AC, 1 << 6),
    (MC | AUF, 1 << 6),
];

pub fn pack(flags: &Flags) -> Result<u32, CodecError> {
    let mut present = 0u8;
    if flags.ac != Cond::None {
        present |= AC;
    }
    if flags.mc != Cond::None {
        present |= MC;
    }
    if flags.apf != Pf::None {
        present |= APF;
    }
    if flags.mpf != Pf::None {
        present |= MPF;
    }
    if flags.auf != Uf::None {
        present |= AUF;
    }
    if flags.muf != Uf::None {
        present |= MUF;
    }

    let (_, bits) = FLAGS_TABLE
        .iter()
        .find(|(p, _)| *p == present)
        .ok_or(CodecError::UnrepresentableFlags)?;
    let mut packed = *bits;

    packed |= pf_bits(flags.apf);
    packed |= pf_bits(flags.mpf);

    if present & AUF != 0 {
        packed |= uf_index(flags.auf) + 4;
    }
    if present & MUF != 0 {
        packed |= uf_index(flags.muf) + 4;
    }
    if present & AC != 0 {
        if packed & (1 << 6) != 0 {
            packed |= cond_index(flags.ac);
        } else {
            packed |= cond_index(flags.ac) << 2;
        }
    }
    if present & MC != 0 {
        if packed & (1 << 6) != 0 {
            packed |= cond_index(flags.mc) << 4;
        } else {
            packed |= cond_index(flags.mc) << 2;
        }
    }

    Ok(packed)
}

fn pf_bits(pf: Pf) -> u32 {
    match pf {
        Pf::None => 0,
        Pf::Pushz => 1,
        Pf::Pushn => 2,
        Pf::Pushc => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_pack_to_zero() {
        assert_eq!(pack(&Flags::default()).unwrap(), 0);
        assert!(unpack(0).unwrap().is_all_none());
    }

    #[test]
    fn single_pf_round_trips() {
        let f = Flags {
            apf: Pf::Pushz,
            ..Default::default()
        };
        let packed = pack(&f).unwrap();
        assert_eq!(unpack(packed).unwrap(), f);
    }

    #[test]
    fn ac_and_mpf_round_trip() {
        let f = Flags {
            ac: Cond::Ifnb,
            mpf: Pf::Pushc,
            ..Default::default()
        };
        let packed = pack(&f).unwrap();
        assert_eq!(unpack(packed).unwrap(), f);
    }

    #[test]
    fn mc_and_ac_both_set_round_trips() {
        let f = Flags {
            mc: Cond::Ifb,
            ac: Cond::Ifa,
            ..Default::default()
        };
        let packed = pack(&f).unwrap();
        assert_eq!(unpack(packed).unwrap(), f);
    }

    #[test]
    fn reserved_pattern_rejected() {
        assert!(unpack(0x10).is_err());
    }
}
