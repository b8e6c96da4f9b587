//! Magic (non-register-file) write addresses and their version-dependent
//! display names.

/// A magic write address. Discriminants match the packed 6-bit `waddr`
/// field exactly, including the two real aliasing pairs: `Tmu` doubles as
/// `Unifa` in the v4.x+ naming ladder, and `R5rep` doubles as the v7.1
/// `rep` destination (with `R5` correspondingly also named `quad` from
/// v7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waddr {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    Nop = 6,
    Tlb = 7,
    Tlbu = 8,
    /// v3.3 names this `tmu`; v4.0+ names it `unifa`.
    TmuUnifa = 9,
    Tmul = 10,
    Tmud = 11,
    Tmua = 12,
    Tmuau = 13,
    Vpm = 14,
    Vpmu = 15,
    Sync = 16,
    Syncu = 17,
    Syncb = 18,
    Recip = 19,
    Rsqrt = 20,
    Exp = 21,
    Log = 22,
    Sin = 23,
    Rsqrt2 = 24,
    Tmuc = 32,
    Tmus = 33,
    Tmut = 34,
    Tmur = 35,
    Tmui = 36,
    Tmub = 37,
    Tmudref = 38,
    Tmuoff = 39,
    Tmuscm = 40,
    Tmusf = 41,
    Tmuslod = 42,
    Tmuhs = 43,
    /// Shares its display name, `"tmuscm"`, with [`Waddr::Tmuscm`] — a
    /// duplicate carried over from the source's name table.
    Tmuhscm = 44,
    Tmuhsf = 45,
    Tmuhslod = 46,
    /// v3.3-v4.2 name `"r5rep"`; v7.1+ names it `"rep"` (and correspondingly
    /// renames plain `R5` to `"quad"`).
    R5rep = 55,
}

impl Waddr {
    pub fn from_packed(v: u8) -> Option<Self> {
        use Waddr::*;
        Some(match v {
            0 => R0,
            1 => R1,
            2 => R2,
            3 => R3,
            4 => R4,
            5 => R5,
            6 => Nop,
            7 => Tlb,
            8 => Tlbu,
            9 => TmuUnifa,
            10 => Tmul,
            11 => Tmud,
            12 => Tmua,
            13 => Tmuau,
            14 => Vpm,
            15 => Vpmu,
            16 => Sync,
            17 => Syncu,
            18 => Syncb,
            19 => Recip,
            20 => Rsqrt,
            21 => Exp,
            22 => Log,
            23 => Sin,
            24 => Rsqrt2,
            32 => Tmuc,
            33 => Tmus,
            34 => Tmut,
            35 => Tmur,
            36 => Tmui,
            37 => Tmub,
            38 => Tmudref,
            39 => Tmuoff,
            40 => Tmuscm,
            41 => Tmusf,
            42 => Tmuslod,
            43 => Tmuhs,
            44 => Tmuhscm,
            45 => Tmuhsf,
            46 => Tmuhslod,
            55 => R5rep,
            _ => return None,
        })
    }

    pub fn packed(self) -> u8 {
        self as u8
    }

    /// Display name for this waddr under the given device version,
    /// applying the `tmu`/`unifa` and `quad`/`rep` aliasing rules.
    pub fn name(self, ver: u8) -> &'static str {
        match self {
            Waddr::TmuUnifa if ver < 40 => "tmu",
            Waddr::TmuUnifa => "unifa",
            Waddr::R5 if ver >= 71 => "quad",
            Waddr::R5rep if ver >= 71 => "rep",
            Waddr::R0 => "r0",
            Waddr::R1 => "r1",
            Waddr::R2 => "r2",
            Waddr::R3 => "r3",
            Waddr::R4 => "r4",
            Waddr::R5 => "r5",
            Waddr::Nop => "-",
            Waddr::Tlb => "tlb",
            Waddr::Tlbu => "tlbu",
            Waddr::Tmul => "tmul",
            Waddr::Tmud => "tmud",
            Waddr::Tmua => "tmua",
            Waddr::Tmuau => "tmuau",
            Waddr::Vpm => "vpm",
            Waddr::Vpmu => "vpmu",
            Waddr::Sync => "sync",
            Waddr::Syncu => "syncu",
            Waddr::Syncb => "syncb",
            Waddr::Recip => "recip",
            Waddr::Rsqrt => "rsqrt",
            Waddr::Exp => "exp",
            Waddr::Log => "log",
            Waddr::Sin => "sin",
            Waddr::Rsqrt2 => "rsqrt2",
            Waddr::Tmuc => "tmuc",
            Waddr::Tmus => "tmus",
            Waddr::Tmut => "tmut",
            Waddr::Tmur => "tmur",
            Waddr::Tmui => "tmui",
            Waddr::Tmub => "tmub",
            Waddr::Tmudref => "tmudref",
            Waddr::Tmuoff => "tmuoff",
            Waddr::Tmuscm => "tmuscm",
            Waddr::Tmusf => "tmusf",
            Waddr::Tmuslod => "tmuslod",
            Waddr::Tmuhs => "tmuhs",
            Waddr::Tmuhscm => "tmuscm",
            Waddr::Tmuhsf => "tmuhsf",
            Waddr::Tmuhslod => "tmuhslod",
            Waddr::R5rep => "r5rep",
        }
    }

    pub fn from_name(name: &str, ver: u8) -> Option<Self> {
        use Waddr::*;
        [
            R0, R1, R2, R3, R4, R5, Nop, Tlb, Tlbu, TmuUnifa, Tmul, Tmud, Tmua, Tmuau, Vpm, Vpmu,
            Sync, Syncu, Syncb, Recip, Rsqrt, Exp, Log, Sin, Rsqrt2, Tmuc, Tmus, Tmut, Tmur, Tmui,
            Tmub, Tmudref, Tmuoff, Tmuscm, Tmusf, Tmuslod, Tmuhs, Tmuhscm, Tmuhsf, Tmuhslod,
            R5rep,
        ]
        .into_iter()
        .find(|w| w.name(ver) == name)
    }

    pub fn is_sfu(self) -> bool {
        matches!(
            self,
            Waddr::Recip | Waddr::Rsqrt | Waddr::Exp | Waddr::Log | Waddr::Sin | Waddr::Rsqrt2
        )
    }

    /// TMU write addresses. The range's lower bound differs by version:
    /// v3.3 also treats the aliased `TmuUnifa` slot as a TMU write, while
    /// v4.0+ starts the contiguous range at `Tmud`.
    pub fn is_tmu(self, ver: u8) -> bool {
        let packed = self.packed();
        if ver < 40 {
            (Waddr::TmuUnifa.packed()..=Waddr::Tmuau.packed()).contains(&packed)
                || (Waddr::Tmuc.packed()..=Waddr::Tmuhslod.packed()).contains(&packed)
        } else {
            (Waddr::Tmud.packed()..=Waddr::Tmuau.packed()).contains(&packed)
                || (Waddr::Tmuc.packed()..=Waddr::Tmuhslod.packed()).contains(&packed)
        }
    }

    pub fn is_tlb(self) -> bool {
        matches!(self, Waddr::Tlb | Waddr::Tlbu)
    }

    pub fn is_vpm(self) -> bool {
        matches!(self, Waddr::Vpm | Waddr::Vpmu)
    }

    pub fn is_tsy(self) -> bool {
        matches!(self, Waddr::Sync | Waddr::Syncb | Waddr::Syncu)
    }

    /// Whether this write address also behaves as a uniform-stream read,
    /// consuming a uniform like an explicit `ldunif`.
    pub fn loads_unif(self) -> bool {
        matches!(
            self,
            Waddr::Vpmu | Waddr::Tlbu | Waddr::Tmuau | Waddr::Syncu
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmu_unifa_aliases_by_version() {
        assert_eq!(Waddr::TmuUnifa.name(33), "tmu");
        assert_eq!(Waddr::TmuUnifa.name(42), "unifa");
    }

    #[test]
    fn quad_rep_alias_from_v71() {
        assert_eq!(Waddr::R5.name(42), "r5");
        assert_eq!(Waddr::R5.name(71), "quad");
        assert_eq!(Waddr::R5rep.name(71), "rep");
    }

    #[test]
    fn tmuhscm_shares_tmuscm_display_name() {
        assert_eq!(Waddr::Tmuscm.name(42), "tmuscm");
        assert_eq!(Waddr::Tmuhscm.name(42), "tmuscm");
        assert_ne!(Waddr::Tmuscm.packed(), Waddr::Tmuhscm.packed());
    }

    #[test]
    fn tmu_range_differs_before_v40() {
        assert!(Waddr::TmuUnifa.is_tmu(33));
        assert!(!Waddr::TmuUnifa.is_tmu(42));
        assert!(Waddr::Tmud.is_tmu(42));
    }

    #[test]
    fn sfu_predicate_matches_all_five() {
        for w in [
            Waddr::Recip,
            Waddr::Rsqrt,
            Waddr::Exp,
            Waddr::Log,
            Waddr::Sin,
            Waddr::Rsqrt2,
        ] {
            assert!(w.is_sfu());
        }
        assert!(!Waddr::Vpm.is_sfu());
    }

    #[test]
    fn round_trips_packed_value() {
        for v in [0u8, 5, 9, 24, 40, 55] {
            assert_eq!(Waddr::from_packed(v).unwrap().packed(), v);
        }
    }
}
