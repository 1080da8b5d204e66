use super::{init_cpu, Prog};
use crate::consts::DISPLAY_LIST_MAGIC;
use crate::dlist::{DisplayCommand, DisplayListManager, PrimitiveType};
use crate::instr::PromOpcode::*;
use crate::mem::MemoryDomain;
use crate::regs::RegisterTag;

fn build_triangle(name: &str) -> Prog {
    Prog::new()
        .op(DLSTART).name(name)
        .op(DLPRIMITIVE).byte(PrimitiveType::Triangle as u8)
        .op(DLCOLOR).name("FF0000")
        .op(DLVERTEX).float(0.0).float(1.0).float(0.0)
        .op(DLVERTEX).float(-1.0).float(-1.0).float(0.0)
        .op(DLVERTEX).float(1.0).float(-1.0).float(0.0)
        .op(DLEND)
}

#[test]
fn a_guest_program_records_a_display_list() {
    let program = build_triangle("tri").op(HLT).build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    let list = cpu.dlist.get("tri").expect("list sealed");
    assert_eq!(5, list.commands.len());
    assert_eq!(DisplayCommand::Primitive(PrimitiveType::Triangle), list.commands[0]);
    assert!(matches!(list.commands[2], DisplayCommand::Vertex { y, .. } if y == 1.0));
}

#[test]
fn dlcall_appends_serialized_lists_to_the_dpl_domain() {
    let program = build_triangle("tri")
        .op(DLCALL).name("tri").float(0.0).float(0.0).float(0.0)
        .op(DLCALL).name("tri").float(1.0).float(2.0).float(3.0)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    let first = cpu.dlist.serialize("tri").unwrap();
    assert_eq!(DISPLAY_LIST_MAGIC, cpu.mem.read(MemoryDomain::Dpl, 0).unwrap());
    // Second call landed right after the first; nothing was erased.
    assert_eq!(
        DISPLAY_LIST_MAGIC,
        cpu.mem.read(MemoryDomain::Dpl, first.len()).unwrap()
    );

    // The stored bytes decode back to the recorded command sequence.
    let stored: Vec<u8> = (0..first.len())
        .map(|i| cpu.mem.read(MemoryDomain::Dpl, i).unwrap())
        .collect();
    let decoded = DisplayListManager::deserialize(&stored).unwrap();
    assert_eq!(*cpu.dlist.get("tri").unwrap(), decoded);
}

#[test]
fn dlcall_reaches_an_attached_renderer() {
    let program = build_triangle("tri")
        .op(DLCALL).name("tri").float(4.0).float(5.0).float(6.0)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    let (tx, rx) = crossbeam_channel::unbounded();
    cpu.dlist.attach_renderer(tx);
    cpu.run().unwrap();

    let call = rx.try_recv().unwrap();
    assert_eq!("tri", call.list.name);
    assert_eq!((4.0, 5.0, 6.0), (call.x, call.y, call.z));
}

#[test]
fn storemodel_tags_the_register_and_loadmodel_stages_video() {
    let program = build_triangle("ship")
        .op(STOREMODEL).name("ship").byte(4)
        .op(LOADMODEL).byte(4)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    assert_eq!(RegisterTag::Model, cpu.regs.gpr[4].tag());
    assert_eq!(Some("ship"), cpu.regs.gpr[4].as_model());

    // 3D header at Video offset 0: primitive byte then the vertex count.
    assert_eq!(PrimitiveType::Triangle as u8, cpu.mem.read(MemoryDomain::Video, 0).unwrap());
    assert_eq!(3, cpu.mem.read_int(MemoryDomain::Video, 1).unwrap());
}

#[test]
fn loadmodel_on_a_non_model_register_is_skipped() {
    let program = Prog::new()
        .op(LI).byte(0).int(7)
        .op(LOADMODEL).byte(0)
        .op(LI).byte(1).int(9)
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);
    cpu.run().unwrap();

    // Logged and skipped; execution continued.
    assert_eq!(9, cpu.regs.gpr[1].as_int());
}

#[test]
fn nested_dlstart_propagates_as_a_hard_failure() {
    let program = Prog::new()
        .op(DLSTART).name("a")
        .op(DLSTART).name("b")
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);

    cpu.step().unwrap();
    assert!(cpu.step().is_err());
}

#[test]
fn stray_dlend_propagates_as_a_hard_failure() {
    let mut cpu = init_cpu(&Prog::new().op(DLEND).op(HLT).build());
    assert!(cpu.step().is_err());
}

#[test]
fn malformed_color_in_the_code_stream_propagates() {
    let program = Prog::new()
        .op(DLSTART).name("m")
        .op(DLCOLOR).name("not-a-color")
        .op(HLT)
        .build();
    let mut cpu = init_cpu(&program);

    cpu.step().unwrap();
    assert!(cpu.step().is_err());
}
