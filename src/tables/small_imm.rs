//! The 48-entry small-immediate table and its 64-entry name-lookup
//! extension (which maps several aliases, including an extended positive
//! range used by `ldvpm` attribute indices, back onto the same 48 packed
//! values).

pub const SMALL_IMMEDIATES: [i64; 48] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, -16, -15, -14, -13, -12, -11, -10, -9,
    -8, -7, -6, -5, -4, -3, -2, -1, 0x3b80_0000, 0x3c00_0000, 0x3c80_0000, 0x3d00_0000,
    0x3d80_0000, 0x3e00_0000, 0x3e80_0000, 0x3f00_0000, 0x3f80_0000, 0x4000_0000, 0x4080_0000,
    0x4100_0000, 0x4180_0000, 0x4200_0000, 0x4280_0000, 0x4300_0000,
];

/// Every name a small immediate may be written as in assembly, paired
/// with the packed index it resolves to. The first 32 map 1:1 onto
/// `SMALL_IMMEDIATES[0..32]`; `16`..`31` duplicate as both plain decimal
/// and (not usable in arithmetic ops) attribute-index spellings; the
/// last 32 are the `2f^x` power-of-two spellings and their hex
/// equivalents, both resolving to indices 32..48.
pub const SMALL_IMMEDIATE_NAMES: [(&str, u8); 64] = [
    ("0", 0),
    ("1", 1),
    ("2", 2),
    ("3", 3),
    ("4", 4),
    ("5", 5),
    ("6", 6),
    ("7", 7),
    ("8", 8),
    ("9", 9),
    ("10", 10),
    ("11", 11),
    ("12", 12),
    ("13", 13),
    ("14", 14),
    ("15", 15),
    ("-16", 16),
    ("-15", 17),
    ("-14", 18),
    ("-13", 19),
    ("-12", 20),
    ("-11", 21),
    ("-10", 22),
    ("-9", 23),
    ("-8", 24),
    ("-7", 25),
    ("-6", 26),
    ("-5", 27),
    ("-4", 28),
    ("-3", 29),
    ("-2", 30),
    ("-1", 31),
    ("16", 16),
    ("17", 17),
    ("18", 18),
    ("19", 19),
    ("20", 20),
    ("21", 21),
    ("22", 22),
    ("23", 23),
    ("24", 24),
    ("25", 25),
    ("26", 26),
    ("27", 27),
    ("28", 28),
    ("29", 29),
    ("30", 30),
    ("31", 31),
    ("2f^-8", 32),
    ("2f^-7", 33),
    ("2f^-6", 34),
    ("2f^-5", 35),
    ("2f^-4", 36),
    ("2f^-3", 37),
    ("2f^-2", 38),
    ("2f^-1", 39),
    ("2f^0", 40),
    ("2f^1", 41),
    ("2f^2", 42),
    ("2f^3", 43),
    ("2f^4", 44),
    ("2f^5", 45),
    ("2f^6", 46),
    ("2f^7", 47),
];

pub fn unpack(packed: u8) -> Option<i64> {
    SMALL_IMMEDIATES.get(packed as usize).copied()
}

pub fn pack(value: i64) -> Option<u8> {
    SMALL_IMMEDIATES
        .iter()
        .position(|&v| v == value)
        .map(|i| i as u8)
}

pub fn from_name(name: &str) -> Option<u8> {
    SMALL_IMMEDIATE_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, packed)| *packed)
}

/// The canonical spelling for a packed small-immediate index, used by the
/// disassembler. Where a packed value has more than one valid spelling
/// (16..=31 may be written as either a negative decimal or its
/// attribute-index alias) this picks the first one in
/// [`SMALL_IMMEDIATE_NAMES`], which is the negative form.
pub fn display_name(packed: u8) -> Option<&'static str> {
    SMALL_IMMEDIATE_NAMES
        .iter()
        .find(|(_, p)| *p == packed)
        .map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_48_entries() {
        assert_eq!(SMALL_IMMEDIATES.len(), 48);
    }

    #[test]
    fn round_trips_small_ints() {
        for v in 0..16i64 {
            let packed = pack(v).unwrap();
            assert_eq!(unpack(packed).unwrap(), v);
        }
    }

    #[test]
    fn negative_range_packs() {
        assert_eq!(pack(-16), Some(16));
        assert_eq!(pack(-1), Some(31));
    }

    #[test]
    fn power_of_two_float_bits_pack() {
        assert_eq!(pack(0x3f80_0000), Some(40));
    }

    #[test]
    fn extended_positive_aliases_share_a_packed_value() {
        assert_eq!(from_name("16"), Some(16));
        assert_eq!(from_name("2f^0"), Some(40));
        assert_eq!(unpack(from_name("2f^0").unwrap()).unwrap(), 0x3f80_0000);
    }

    #[test]
    fn unrepresentable_value_fails_to_pack() {
        assert_eq!(pack(32), None);
    }

    #[test]
    fn display_name_picks_the_negative_spelling() {
        assert_eq!(display_name(16), Some("-16"));
        assert_eq!(display_name(40), Some("2f^0"));
    }
}
