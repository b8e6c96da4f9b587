//! Static validation: a forward pass over a decoded program enforcing the
//! "Summary of Instruction Restrictions" adjacency rules (THRSW/branch delay
//! slots, SFU write spacing, resource exclusivity, thread-end shape, and
//! small-immediate version gating).

use crate::device::DeviceInfo;
use crate::error::{ValidateError, ValidateErrorKind};
use crate::instr::{AddOp, AluRecord, Instruction, MulOp, Mux};
use crate::tables::waddr::Waddr;

/// Running state of the forward pass, one per [`validate`] call.
struct State {
    ip: i64,
    last_sfu_write: i64,
    last_branch_ip: i64,
    last_thrsw_ip: i64,
    last_thrsw_found: bool,
    thrend_found: bool,
    thrsw_count: u32,
}

impl State {
    fn in_branch_delay_slots(&self) -> bool {
        self.ip - self.last_branch_ip < 3
    }

    fn in_thrsw_delay_slots(&self) -> bool {
        self.ip - self.last_thrsw_ip < 3
    }
}

pub fn validate(devinfo: &DeviceInfo, program: &[Instruction]) -> Result<(), ValidateError> {
    tracing::debug!(ver = devinfo.ver, len = program.len(), "validating program");

    if !devinfo.is_recognized_version() {
        tracing::warn!(ver = devinfo.ver, "device version not in the recognized set");
        return Err(ValidateError {
            index: 0,
            kind: ValidateErrorKind::UnrecognizedVersion,
        });
    }

    let mut state = State {
        ip: 0,
        last_sfu_write: -10,
        last_branch_ip: -10,
        last_thrsw_ip: -10,
        last_thrsw_found: false,
        thrend_found: false,
        thrsw_count: 0,
    };

    for (index, instr) in program.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| &program[i]);
        validate_inst(devinfo, &mut state, prev, instr)
            .map_err(|kind| ValidateError { index, kind })?;
        state.ip += 1;
    }

    if state.thrsw_count > 1 && !state.last_thrsw_found {
        return Err(ValidateError {
            index: program.len().saturating_sub(1),
            kind: ValidateErrorKind::NoLastThrswMarked,
        });
    }

    let needs_delay_slots = program.len() < 3
        || program[program.len() - 1].shared().signal.thrsw
        || program[program.len() - 2].shared().signal.thrsw;
    if needs_delay_slots {
        return Err(ValidateError {
            index: program.len().saturating_sub(1),
            kind: ValidateErrorKind::NoProgramEndThrswDelaySlots,
        });
    }

    tracing::debug!("program passed validation");
    Ok(())
}

/// Checks a single instruction against the running state.
///
/// Detection of which instruction first writes the TLB Z component is not
/// carried through the decoded instruction record — the reference
/// implementation never wires this up either (the update site exists in
/// the source but is permanently disabled there) — so the three TLB-Z
/// ordered rules (`ImplicitBranchMsfReadAfterTlbZWrite`,
/// `SetmsfAfterTlbZWrite`, `MsfReadAfterTlbZWrite`) are unreachable in
/// practice; they exist only to keep the error taxonomy complete.
fn validate_inst(
    devinfo: &DeviceInfo,
    state: &mut State,
    prev: Option<&Instruction>,
    instr: &Instruction,
) -> Result<(), ValidateErrorKind> {
    let sig = instr.shared().signal;

    // LDUNIF(A) one instruction after LDVARY races the two-cycle LDVARY
    // r5 write against the one-cycle LDUNIF r5 write.
    if let Some(prev) = prev {
        if prev.shared().signal.ldvary && (sig.ldunif || sig.ldunifa) {
            return Err(ValidateErrorKind::LdunifAfterLdvary);
        }

        // GFXH-1633, fixed from V3D 4.2.14 onward; still enforced for
        // everything strictly older than 4.2.
        if devinfo.ver < 42 {
            let prev_sig = prev.shared().signal;
            let prev_reads_ldunif = prev_sig.ldunif || prev_sig.ldunifrf;
            let prev_reads_ldunifa = prev_sig.ldunifa || prev_sig.ldunifarf;
            let reads_ldunif = sig.ldunif || sig.ldunifrf;
            let reads_ldunifa = sig.ldunifa || sig.ldunifarf;
            if (prev_reads_ldunif && reads_ldunifa) || (prev_reads_ldunifa && reads_ldunif) {
                return Err(ValidateErrorKind::ConsecutiveLdunif);
            }
        }
    }

    let record = match instr {
        Instruction::Alu(r) => Some(r),
        Instruction::Branch(_) => None,
    };

    if let Some(record) = record {
        check_small_imm_gating(devinfo, record)?;
    }

    let (tmu_writes, sfu_writes, vpm_writes, tlb_writes, tsy_writes) = match record {
        Some(record) => resource_writes(devinfo, record),
        None => (0, 0, 0, 0, 0),
    };

    if state.in_thrsw_delay_slots() {
        if sfu_writes > 0 {
            return Err(ValidateErrorKind::SfuWriteDuringThrswDelaySlots);
        }
        if sig.ldvary {
            if devinfo.ver == 42 {
                return Err(ValidateErrorKind::LdvaryDuringThrswDelaySlots);
            }
            if devinfo.ver >= 71 && state.ip - state.last_thrsw_ip == 2 {
                return Err(ValidateErrorKind::LdvaryInSecondThrswDelaySlot);
            }
        }
    }

    if state.ip - state.last_sfu_write < 2 {
        if let Some(record) = record {
            if uses_mux_r4(record) {
                return Err(ValidateErrorKind::R4AccessNearSfuWrite);
            }
            if writes_r4(devinfo, record, &sig) {
                return Err(ValidateErrorKind::R4AccessNearSfuWrite);
            }
        } else if sig.ldtmu {
            return Err(ValidateErrorKind::R4AccessNearSfuWrite);
        }
        if sfu_writes > 0 {
            return Err(ValidateErrorKind::SfuWriteNearSfuWrite);
        }
    }

    let ldtmu_counts_as_resource = if devinfo.ver == 42 { sig.ldtmu as u32 } else { 0 };
    let resource_total = tmu_writes
        + sfu_writes
        + vpm_writes
        + tlb_writes
        + tsy_writes
        + ldtmu_counts_as_resource
        + sig.ldtlb as u32
        + sig.ldvpm as u32
        + sig.ldtlbu as u32;
    if resource_total > 1 {
        return Err(ValidateErrorKind::OnlyOneOfTmuSfuTsyTlbReadVpmAllowed);
    }

    if sfu_writes > 0 {
        state.last_sfu_write = state.ip;
    }

    if sig.thrsw {
        if state.in_branch_delay_slots() {
            return Err(ValidateErrorKind::ThrswInBranchDelaySlot);
        }

        if state.last_thrsw_found {
            state.thrend_found = true;
        }

        if state.last_thrsw_ip == state.ip - 1 {
            // Second THRSW in a row: this is the last-THRSW marker.
            if state.last_thrsw_found {
                return Err(ValidateErrorKind::ThrswAfterLastThrsw);
            }
            state.last_thrsw_found = true;
        } else {
            if state.in_thrsw_delay_slots() {
                return Err(ValidateErrorKind::ThrswInThrswDelaySlot);
            }
            state.thrsw_count += 1;
            state.last_thrsw_ip = state.ip;
        }
    }

    if state.thrend_found && state.last_thrsw_ip - state.ip <= 2 {
        if let Some(record) = record {
            if record.alu.add.op != AddOp::Nop && !record.alu.add.magic_write {
                if devinfo.ver == 42 {
                    return Err(ValidateErrorKind::RfWriteNearThreadEnd);
                } else if devinfo.ver >= 71 {
                    if state.last_thrsw_ip - state.ip == 0 {
                        return Err(ValidateErrorKind::RfWriteAtThreadEnd);
                    }
                    if record.alu.add.waddr == 2 || record.alu.add.waddr == 3 {
                        return Err(ValidateErrorKind::Rf2Rf3WriteNearThreadEnd);
                    }
                }
            }

            if record.alu.mul.op != MulOp::Nop && !record.alu.mul.magic_write {
                if devinfo.ver == 42 {
                    return Err(ValidateErrorKind::RfWriteNearThreadEnd);
                } else if devinfo.ver >= 71 {
                    if state.last_thrsw_ip - state.ip == 0 {
                        return Err(ValidateErrorKind::RfWriteAtThreadEnd);
                    }
                    if record.alu.mul.waddr == 2 || record.alu.mul.waddr == 3 {
                        return Err(ValidateErrorKind::Rf2Rf3WriteNearThreadEnd);
                    }
                }
            }

            if sig.writes_address() && !record.shared.signal_magic {
                if devinfo.ver == 42 {
                    return Err(ValidateErrorKind::RfWriteNearThreadEnd);
                } else if devinfo.ver >= 71
                    && (record.shared.signal_address == 2 || record.shared.signal_address == 3)
                {
                    return Err(ValidateErrorKind::Rf2Rf3WriteNearThreadEnd);
                }
            }

            if state.last_thrsw_ip - state.ip == 2 && record.alu.add.op == AddOp::Tmuwt {
                return Err(ValidateErrorKind::TmuwtInFinalInstruction);
            }
        }
    }

    if matches!(instr, Instruction::Branch(_)) {
        if state.in_branch_delay_slots() {
            return Err(ValidateErrorKind::BranchInBranchDelaySlot);
        }
        if state.in_thrsw_delay_slots() {
            return Err(ValidateErrorKind::BranchInThrswDelaySlot);
        }
        state.last_branch_ip = state.ip;
    }

    Ok(())
}

fn check_small_imm_gating(devinfo: &DeviceInfo, record: &AluRecord) -> Result<(), ValidateErrorKind> {
    let sig = record.shared.signal;
    if devinfo.ver < 71 {
        if sig.small_imm_a || sig.small_imm_c || sig.small_imm_d {
            return Err(ValidateErrorKind::SmallImmBeforeV71);
        }
    } else {
        if (sig.small_imm_a || sig.small_imm_b) && record.alu.add.op == AddOp::Nop {
            return Err(ValidateErrorKind::SmallImmOnAddNop);
        }
        if (sig.small_imm_c || sig.small_imm_d) && record.alu.mul.op == MulOp::Nop {
            return Err(ValidateErrorKind::SmallImmOnMulNop);
        }
        if sig.popcount_small_imm() > 1 {
            return Err(ValidateErrorKind::MultipleSmallImmBits);
        }
    }
    Ok(())
}

fn resource_writes(devinfo: &DeviceInfo, record: &AluRecord) -> (u32, u32, u32, u32, u32) {
    let mut tmu = 0;
    let mut sfu = 0;
    let mut vpm = 0;
    let mut tlb = 0;
    let mut tsy = 0;

    let mut tally = |op_is_nop: bool, magic_write: bool, waddr: u8| {
        if op_is_nop || !magic_write {
            return;
        }
        if let Some(w) = Waddr::from_packed(waddr) {
            if w.is_tmu(devinfo.ver) {
                tmu += 1;
            }
            if w.is_sfu() {
                sfu += 1;
            }
            if w.is_vpm() {
                vpm += 1;
            }
            if w.is_tlb() {
                tlb += 1;
            }
            if w.is_tsy() {
                tsy += 1;
            }
        }
    };

    tally(
        record.alu.add.op == AddOp::Nop,
        record.alu.add.magic_write,
        record.alu.add.waddr,
    );
    tally(
        record.alu.mul.op == MulOp::Nop,
        record.alu.mul.magic_write,
        record.alu.mul.waddr,
    );

    (tmu, sfu, vpm, tlb, tsy)
}

fn uses_mux_r4(record: &AluRecord) -> bool {
    let add_nsrc = record.alu.add.op.num_src();
    let mul_nsrc = record.alu.mul.op.num_src();
    (add_nsrc > 0 && record.alu.add.a.mux == Some(Mux::R4))
        || (add_nsrc > 1 && record.alu.add.b.mux == Some(Mux::R4))
        || (mul_nsrc > 0 && record.alu.mul.a.mux == Some(Mux::R4))
        || (mul_nsrc > 1 && record.alu.mul.b.mux == Some(Mux::R4))
}

fn writes_r4(
    devinfo: &DeviceInfo,
    record: &AluRecord,
    sig: &crate::instr::Signal,
) -> bool {
    if !devinfo.has_accumulators {
        return false;
    }

    let add_r4 = record.alu.add.op != AddOp::Nop
        && record.alu.add.magic_write
        && Waddr::from_packed(record.alu.add.waddr)
            .is_some_and(|w| w == Waddr::R4 || w.is_sfu());
    let mul_r4 = record.alu.mul.op != MulOp::Nop
        && record.alu.mul.magic_write
        && Waddr::from_packed(record.alu.mul.waddr)
            .is_some_and(|w| w == Waddr::R4 || w.is_sfu());
    if add_r4 || mul_r4 {
        return true;
    }

    if sig.writes_address() {
        record.shared.signal_magic && record.shared.signal_address == Waddr::R4 as u8
    } else {
        sig.ldtmu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::{AluHalf, AluInstr, Flags, OutputPack, Signal};

    fn dev(ver: u8) -> DeviceInfo {
        DeviceInfo::new(ver, 0, 1024, 8, ver < 71).unwrap()
    }

    fn nop_nop(signal: Signal) -> Instruction {
        Instruction::Alu(AluRecord {
            shared: crate::instr::SharedFields {
                signal,
                ..Default::default()
            },
            flags: Flags::default(),
            alu: AluInstr {
                add: AluHalf {
                    op: AddOp::Nop,
                    a: Default::default(),
                    b: Default::default(),
                    waddr: 6,
                    magic_write: true,
                    output_pack: OutputPack::None,
                },
                mul: AluHalf {
                    op: MulOp::Nop,
                    a: Default::default(),
                    b: Default::default(),
                    waddr: 6,
                    magic_write: true,
                    output_pack: OutputPack::None,
                },
            },
        })
    }

    #[test]
    fn empty_program_is_valid() {
        assert!(validate(&dev(42), &[]).is_ok());
    }

    #[test]
    fn short_program_without_thrsw_delay_slots_is_rejected() {
        let program = vec![nop_nop(Signal::default())];
        assert_eq!(
            validate(&dev(42), &program).unwrap_err().kind,
            ValidateErrorKind::NoProgramEndThrswDelaySlots
        );
    }

    #[test]
    fn thread_end_thrsw_with_two_delay_slots_is_valid() {
        let mut thrsw_sig = Signal::default();
        thrsw_sig.thrsw = true;
        let program = vec![
            nop_nop(thrsw_sig),
            nop_nop(Signal::default()),
            nop_nop(Signal::default()),
        ];
        assert!(validate(&dev(42), &program).is_ok());
    }

    #[test]
    fn unrecognized_version_is_rejected_up_front() {
        let d = DeviceInfo::new(50, 0, 1024, 8, true).unwrap();
        assert_eq!(
            validate(&d, &[nop_nop(Signal::default())]).unwrap_err().kind,
            ValidateErrorKind::UnrecognizedVersion
        );
    }

    #[test]
    fn small_imm_signal_before_v71_is_rejected() {
        let mut sig = Signal::default();
        sig.small_imm_a = true;
        let program = vec![nop_nop(sig), nop_nop(Signal::default()), nop_nop(Signal::default())];
        assert_eq!(
            validate(&dev(42), &program).unwrap_err().kind,
            ValidateErrorKind::SmallImmBeforeV71
        );
    }

    #[test]
    fn ldunif_immediately_after_ldvary_is_rejected() {
        let mut ldvary = Signal::default();
        ldvary.ldvary = true;
        let mut ldunif = Signal::default();
        ldunif.ldunif = true;
        let mut thrsw = Signal::default();
        thrsw.thrsw = true;
        let program = vec![
            nop_nop(ldvary),
            nop_nop(ldunif),
            nop_nop(thrsw),
            nop_nop(Signal::default()),
            nop_nop(Signal::default()),
        ];
        assert_eq!(
            validate(&dev(42), &program).unwrap_err().kind,
            ValidateErrorKind::LdunifAfterLdvary
        );
    }

    #[test]
    fn two_thrsw_in_a_row_mark_the_thread_end() {
        let mut thrsw = Signal::default();
        thrsw.thrsw = true;
        let program = vec![
            nop_nop(thrsw),
            nop_nop(thrsw),
            nop_nop(Signal::default()),
            nop_nop(Signal::default()),
        ];
        assert!(validate(&dev(42), &program).is_ok());
    }

    #[test]
    fn small_immediate_on_v71_without_an_add_op_is_rejected() {
        let mut sig = Signal::default();
        sig.small_imm_a = true;
        let program = vec![
            nop_nop(sig),
            nop_nop(Signal::default()),
            nop_nop(Signal::default()),
        ];
        assert_eq!(
            validate(&dev(71), &program).unwrap_err().kind,
            ValidateErrorKind::SmallImmOnAddNop
        );
    }
}
