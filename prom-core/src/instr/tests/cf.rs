use super::{init_cpu, Prog};
use crate::instr::PromOpcode::*;
use crate::regs::CpuFlags;

#[test]
fn cmp_same_register_sets_exactly_equal() {
    let program = Prog::new()
        .op(LI).byte(0).int(11)
        .op(CMP).byte(0).byte(0)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    let flags = cpu.regs.cpu_flags;
    assert!(flags.contains(CpuFlags::EQUAL));
    assert!(!flags.contains(CpuFlags::GREATER));
    assert!(!flags.contains(CpuFlags::LESS));
}

#[test]
fn cmp_greater_sets_greater_only() {
    let program = Prog::new()
        .op(LI).byte(0).int(9)
        .op(LI).byte(1).int(4)
        .op(CMP).byte(0).byte(1)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    let flags = cpu.regs.cpu_flags;
    assert!(flags.contains(CpuFlags::GREATER));
    assert!(!flags.contains(CpuFlags::EQUAL));
    assert!(!flags.contains(CpuFlags::LESS));
    // Plain CMP never completes the composite masks.
    assert!(!flags.contains(CpuFlags::GREATER_OR_EQUAL));
}

#[test]
fn cmpi_also_sets_the_derived_composites() {
    let program = Prog::new()
        .op(LI).byte(0).int(9)
        .op(CMPI).byte(0).int(4)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    // greater -> GREATER | GREATER_OR_EQUAL, which lights EQUAL too since
    // the composite is built from the base bits.
    let flags = cpu.regs.cpu_flags;
    assert!(flags.contains(CpuFlags::GREATER));
    assert!(flags.contains(CpuFlags::GREATER_OR_EQUAL));
    assert!(flags.contains(CpuFlags::EQUAL));
    assert!(!flags.contains(CpuFlags::LESS));
}

#[test]
fn cmpi_equal_lights_both_composites() {
    let program = Prog::new()
        .op(LI).byte(0).int(4)
        .op(CMPI).byte(0).int(4)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    let flags = cpu.regs.cpu_flags;
    assert!(flags.contains(CpuFlags::EQUAL));
    assert!(flags.contains(CpuFlags::GREATER_OR_EQUAL));
    assert!(flags.contains(CpuFlags::LESS_OR_EQUAL));
}

#[test]
fn je_skips_the_untaken_path() {
    // MOV R0 10; CMPI R0 10; JE done; MOV R0 99; done: HLT
    // Layout: 0: MOV(6) 6: CMPI(6) 12: JE(5) 17: MOV(6) 23: HLT
    let program = Prog::new()
        .op(MOV).byte(0).int(10)
        .op(CMPI).byte(0).int(10)
        .op(JE).int(23)
        .op(MOV).byte(0).int(99)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(10, cpu.regs.gpr[0].as_int());
    assert!(!cpu.running());
}

#[test]
fn jnz_follows_a_nonzero_result() {
    // LI 1 R0; ADDI R0 1; JNZ skip; LI 99 R1; skip: HLT
    // Layout: 0: LI(6) 6: ADDI(6) 12: JNZ(5) 17: LI(6) 23: HLT
    let program = Prog::new()
        .op(LI).byte(0).int(1)
        .op(ADDI).byte(0).int(1)
        .op(JNZ).int(23)
        .op(LI).byte(1).int(99)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(0, cpu.regs.gpr[1].as_int());
}

#[test]
fn jg_and_jl_follow_the_comparison() {
    // LI 5 R0; CMPI R0 3; JG take; HLT; take: LI 1 R1; HLT
    // Layout: 0: LI(6) 6: CMPI(6) 12: JG(5) 17: HLT 18: LI(6) 24: HLT
    let program = Prog::new()
        .op(LI).byte(0).int(5)
        .op(CMPI).byte(0).int(3)
        .op(JG).int(18)
        .op(HLT)
        .op(LI).byte(1).int(1)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();
    assert_eq!(1, cpu.regs.gpr[1].as_int());

    // Same shape with JL and a smaller left-hand side.
    let program = Prog::new()
        .op(LI).byte(0).int(2)
        .op(CMPI).byte(0).int(3)
        .op(JL).int(18)
        .op(HLT)
        .op(LI).byte(1).int(1)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();
    assert_eq!(1, cpu.regs.gpr[1].as_int());
}

#[test]
fn jge_is_taken_on_either_base_bit() {
    for value in [3, 4] {
        // LI value R0; CMPI R0 3; JGE take; HLT; take: LI 1 R1; HLT
        let program = Prog::new()
            .op(LI).byte(0).int(value)
            .op(CMPI).byte(0).int(3)
            .op(JGE).int(18)
            .op(HLT)
            .op(LI).byte(1).int(1)
            .op(HLT)
            .build();
        let mut cpu = init_cpu(&program);
        cpu.run().unwrap();
        assert_eq!(1, cpu.regs.gpr[1].as_int(), "JGE not taken for {}", value);
    }
}

#[test]
fn call_saves_the_address_after_its_operand() {
    // CALL sub; HLT; sub: HLT
    // Layout: 0: CALL(5) 5: HLT 6: HLT
    let program = Prog::new()
        .op(CALL).int(6)
        .op(HLT)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);

    cpu.step().unwrap();
    assert_eq!(6, cpu.pc());
    assert_eq!(1, cpu.call_depth());

    cpu.run().unwrap();
    assert!(!cpu.running());
}

#[test]
fn call_and_ret_roundtrip() {
    // CALL sub; LI 1 R0; HLT; sub: LI 2 R1; RET
    // Layout: 0: CALL(5) 5: LI(6) 11: HLT 12: LI(6) 18: RET
    let program = Prog::new()
        .op(CALL).int(12)
        .op(LI).byte(0).int(1)
        .op(HLT)
        .op(LI).byte(1).int(2)
        .op(RET)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(1, cpu.regs.gpr[0].as_int());
    assert_eq!(2, cpu.regs.gpr[1].as_int());
    assert_eq!(0, cpu.call_depth());
}

#[test]
fn ret_on_an_empty_call_stack_halts() {
    let program = Prog::new()
        .op(RET)
        .op(LI).byte(0).int(1)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert!(!cpu.running());
    assert_eq!(0, cpu.regs.gpr[0].as_int());
}

#[test]
fn out_of_range_jump_target_halts() {
    let program = Prog::new()
        .op(JMP).int(0x7FFF)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.step().unwrap();

    assert!(!cpu.running());
}

#[test]
fn negative_jump_target_halts() {
    let program = Prog::new()
        .op(JMP).int(-4)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.step().unwrap();

    assert!(!cpu.running());
}
