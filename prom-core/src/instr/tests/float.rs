use super::{init_cpu, Prog};
use crate::instr::PromOpcode::*;
use crate::regs::RegisterTag;

#[test]
fn movf_sets_value_and_float_tag() {
    let program = Prog::new()
        .op(MOVF).byte(2).float(2.5)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(2.5, cpu.regs.gpr[2].as_float());
    assert_eq!(RegisterTag::Float, cpu.regs.gpr[2].tag());
}

#[test]
fn fadd_tags_the_result_float() {
    let program = Prog::new()
        .op(MOVF).byte(0).float(1.25)
        .op(MOVF).byte(1).float(2.25)
        .op(FADD).byte(0).byte(1)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(3.5, cpu.regs.gpr[0].as_float());
    assert_eq!(RegisterTag::Float, cpu.regs.gpr[0].tag());
}

#[test]
fn fdiv_and_fmod_by_zero_leave_destination() {
    for op in [FDIV, FMOD] {
        let program = Prog::new()
            .op(MOVF).byte(0).float(9.5)
            .op(MOVF).byte(1).float(0.0)
            .op(op).byte(0).byte(1)
            .op(HLT)
            .build();
        let mut cpu = init_cpu(&program);
        cpu.run().unwrap();

        assert_eq!(9.5, cpu.regs.gpr[0].as_float());
        assert!(!cpu.running());
    }
}

#[test]
fn itof_converts_the_value_not_the_bits() {
    let program = Prog::new()
        .op(LI).byte(0).int(5)
        .op(ITOF).byte(0)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(5.0, cpu.regs.gpr[0].as_float());
    assert_eq!(RegisterTag::Float, cpu.regs.gpr[0].tag());
}

#[test]
fn ftoi_truncates_toward_zero() {
    for (input, expected) in [(3.7, 3), (-3.7, -3), (0.9, 0), (-0.9, 0)] {
        let program = Prog::new()
            .op(MOVF).byte(0).float(input)
            .op(FTOI).byte(0)
            .op(HLT)
            .build();
        let mut cpu = init_cpu(&program);
        cpu.run().unwrap();

        assert_eq!(expected, cpu.regs.gpr[0].as_int(), "FTOI of {}", input);
        assert_eq!(RegisterTag::Integer, cpu.regs.gpr[0].tag());
    }
}

#[test]
fn itof_ftoi_roundtrip_preserves_small_integers() {
    let program = Prog::new()
        .op(LI).byte(0).int(-12345)
        .op(ITOF).byte(0)
        .op(FTOI).byte(0)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(-12345, cpu.regs.gpr[0].as_int());
}
