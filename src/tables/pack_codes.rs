//! Numeric encodings for the input-unpack and output-pack sub-fields that
//! live inside the opcode ranges of certain float ops (or, for `FMOV`,
//! inside `mux_b`). The codes themselves are fixed by the format (§4.4);
//! which ops carry which scheme, and at what sub-bit offset, follows
//! directly from the opcode range *width* already present in
//! [`crate::tables::add_ops`]/[`crate::tables::mul_ops`]: a 48-wide range
//! has exactly enough room for `output_pack(0..=2) * 16 + a_unpack(0..=3) *
//! 4 + b_unpack(0..=3)`, a 16-wide range has room for the same `a_unpack`/
//! `b_unpack` pair without the output-pack term, and a 5-wide range has
//! room for one float16-unpack code (0..=4) shared by both operands.
//! Every other width carries no unpack/pack capability at all.

use crate::instr::{InputUnpack, OutputPack};

/// float-pack code used for `output_pack`: NONE=0, L=1, H=2.
pub fn float_pack_code(p: OutputPack) -> u8 {
    match p {
        OutputPack::None => 0,
        OutputPack::L => 1,
        OutputPack::H => 2,
    }
}

pub fn float_pack_from_code(code: u8) -> Option<OutputPack> {
    match code {
        0 => Some(OutputPack::None),
        1 => Some(OutputPack::L),
        2 => Some(OutputPack::H),
        _ => None,
    }
}

/// float32-unpack code: ABS=0, NONE=1, L=2, H=3.
pub fn float32_unpack_code(u: InputUnpack) -> Option<u8> {
    match u {
        InputUnpack::Abs => Some(0),
        InputUnpack::None => Some(1),
        InputUnpack::L => Some(2),
        InputUnpack::H => Some(3),
        _ => None,
    }
}

pub fn float32_unpack_from_code(code: u8) -> InputUnpack {
    match code {
        0 => InputUnpack::Abs,
        2 => InputUnpack::L,
        3 => InputUnpack::H,
        _ => InputUnpack::None,
    }
}

/// float16-unpack code: NONE=0, REP32F=1, REPL=2, REPH=3, SWAP=4.
pub fn float16_unpack_code(u: InputUnpack) -> Option<u8> {
    match u {
        InputUnpack::None => Some(0),
        InputUnpack::Replicate32fTo16 => Some(1),
        InputUnpack::ReplicateL16 => Some(2),
        InputUnpack::ReplicateH16 => Some(3),
        InputUnpack::Swap16 => Some(4),
        _ => None,
    }
}

pub fn float16_unpack_from_code(code: u8) -> InputUnpack {
    match code {
        1 => InputUnpack::Replicate32fTo16,
        2 => InputUnpack::ReplicateL16,
        3 => InputUnpack::ReplicateH16,
        4 => InputUnpack::Swap16,
        _ => InputUnpack::None,
    }
}

/// Which sub-bits of a matched opcode range (if any) carry pack/unpack
/// fields, selected purely from the range's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackScheme {
    /// 48-wide: `output_pack*16 + a_unpack*4 + b_unpack`, all three in the
    /// float32 domain.
    BinaryFloat,
    /// 16-wide: `a_unpack*4 + b_unpack`, no output-pack term (V3D 7.1's
    /// `FCMP`, which produces flags rather than a packable value).
    BinaryFloatNoOutputPack,
    /// 5-wide: a single float16-unpack code shared by both operands.
    CombinedFloat16,
    /// Anything else: no spare opcode bits, no unpack/pack capability.
    None,
}

pub fn scheme_for_width(width: u16) -> PackScheme {
    match width {
        48 => PackScheme::BinaryFloat,
        16 => PackScheme::BinaryFloatNoOutputPack,
        5 => PackScheme::CombinedFloat16,
        _ => PackScheme::None,
    }
}

/// Decodes the `(output_pack, a_unpack, b_unpack)` triple from an opcode's
/// offset within its matched range, per `scheme`.
pub fn decode_pack_fields(scheme: PackScheme, raw_offset: u8) -> (OutputPack, InputUnpack, InputUnpack) {
    match scheme {
        PackScheme::BinaryFloat => {
            let output_code = raw_offset / 16;
            let a_code = (raw_offset % 16) / 4;
            let b_code = raw_offset % 4;
            (
                float_pack_from_code(output_code).unwrap_or(OutputPack::None),
                float32_unpack_from_code(a_code),
                float32_unpack_from_code(b_code),
            )
        }
        PackScheme::BinaryFloatNoOutputPack => {
            let a_code = raw_offset / 4;
            let b_code = raw_offset % 4;
            (
                OutputPack::None,
                float32_unpack_from_code(a_code),
                float32_unpack_from_code(b_code),
            )
        }
        PackScheme::CombinedFloat16 => {
            let unpack = float16_unpack_from_code(raw_offset);
            (OutputPack::None, unpack, unpack)
        }
        PackScheme::None => (OutputPack::None, InputUnpack::None, InputUnpack::None),
    }
}

/// Encodes the offset within a matched opcode range that carries the
/// requested pack/unpack combination, or `None` if `scheme` cannot
/// represent it (e.g. a float16-only code requested for a `BinaryFloat`
/// op, or anything but `None`/`None`/`None` requested for `PackScheme::None`).
pub fn encode_pack_fields(
    scheme: PackScheme,
    output_pack: OutputPack,
    a_unpack: InputUnpack,
    b_unpack: InputUnpack,
) -> Option<u8> {
    match scheme {
        PackScheme::BinaryFloat => {
            let output_code = float_pack_code(output_pack);
            let a_code = float32_unpack_code(a_unpack)?;
            let b_code = float32_unpack_code(b_unpack)?;
            Some(output_code * 16 + a_code * 4 + b_code)
        }
        PackScheme::BinaryFloatNoOutputPack => {
            if output_pack != OutputPack::None {
                return None;
            }
            let a_code = float32_unpack_code(a_unpack)?;
            let b_code = float32_unpack_code(b_unpack)?;
            Some(a_code * 4 + b_code)
        }
        PackScheme::CombinedFloat16 => {
            if output_pack != OutputPack::None || a_unpack != b_unpack {
                return None;
            }
            float16_unpack_code(a_unpack)
        }
        PackScheme::None => {
            if output_pack == OutputPack::None
                && a_unpack == InputUnpack::None
                && b_unpack == InputUnpack::None
            {
                Some(0)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_float_round_trips_every_combination() {
        let unpacks = [
            InputUnpack::Abs,
            InputUnpack::None,
            InputUnpack::L,
            InputUnpack::H,
        ];
        let packs = [OutputPack::None, OutputPack::L, OutputPack::H];
        for &p in &packs {
            for &a in &unpacks {
                for &b in &unpacks {
                    let offset =
                        encode_pack_fields(PackScheme::BinaryFloat, p, a, b).unwrap();
                    assert!(offset < 48);
                    assert_eq!(decode_pack_fields(PackScheme::BinaryFloat, offset), (p, a, b));
                }
            }
        }
    }

    #[test]
    fn binary_float_no_output_pack_rejects_nonzero_pack() {
        assert_eq!(
            encode_pack_fields(
                PackScheme::BinaryFloatNoOutputPack,
                OutputPack::L,
                InputUnpack::None,
                InputUnpack::None
            ),
            None
        );
    }

    #[test]
    fn combined_float16_requires_matching_operands() {
        assert_eq!(
            encode_pack_fields(
                PackScheme::CombinedFloat16,
                OutputPack::None,
                InputUnpack::Swap16,
                InputUnpack::ReplicateL16
            ),
            None
        );
        let offset = encode_pack_fields(
            PackScheme::CombinedFloat16,
            OutputPack::None,
            InputUnpack::Swap16,
            InputUnpack::Swap16,
        )
        .unwrap();
        assert_eq!(offset, 4);
    }

    #[test]
    fn none_scheme_only_accepts_all_default() {
        assert_eq!(
            encode_pack_fields(PackScheme::None, OutputPack::None, InputUnpack::None, InputUnpack::None),
            Some(0)
        );
        assert_eq!(
            encode_pack_fields(PackScheme::None, OutputPack::L, InputUnpack::None, InputUnpack::None),
            None
        );
    }

    #[test]
    fn width_selects_the_right_scheme() {
        assert_eq!(scheme_for_width(48), PackScheme::BinaryFloat);
        assert_eq!(scheme_for_width(16), PackScheme::BinaryFloatNoOutputPack);
        assert_eq!(scheme_for_width(5), PackScheme::CombinedFloat16);
        assert_eq!(scheme_for_width(1), PackScheme::None);
    }
}
