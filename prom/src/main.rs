extern crate clap;

use crossbeam_channel::bounded;
use log::{error, info};

use prom_core::cpu::PromCpu;
use prom_core::instr::OPCODE_TABLE;
use prom_core::mem::PromMemory;

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    let about = "PROM is a functional emulator for the PromethiumXS console written entirely in Rust";
    let c = clap::App::new("PromethiumXS Emulator (PROM)")
        .version("0.1")
        .about(about)
        .subcommand(
            clap::SubCommand::with_name("run")
                .help("Assemble a PASM file and run it to halt")
                .arg(clap::Arg::with_name("filename")
                    .index(1)
                    .required(true)
                    .help("PASM source file to assemble and run")
            )
        )
        .subcommand(
            clap::SubCommand::with_name("dump")
                .help("Assemble a PASM file and hex-dump the emitted program")
                .arg(clap::Arg::with_name("filename")
                    .index(1)
                    .required(true)
                    .help("PASM source file to assemble")
            )
        )
        .subcommand(
            clap::SubCommand::with_name("opcodes")
                .help("Print the opcode table")
        );
    let a = c.get_matches();
    a
}

fn assemble(filename: &str) -> Option<Vec<u8>> {
    match prom_pasm::assemble_file(filename) {
        Ok(result) => Some(result.program_bytes),
        Err(x) => {
            error!("unable to assemble {:?}: {}", filename, x);
            None
        }
    }
}

fn run_program(program: &[u8]) {
    // Register a ctrlc handler so a run can be stopped externally; the
    // check happens between steps, never mid-instruction.
    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    let res = ctrlc::set_handler(move || {
        if ctrlc_tx.is_full() == true {
            std::process::exit(-1);
        }
        let _res = ctrlc_tx.send(());
    });

    match res {
        Err(x) => {
            error!("unable to register signal handler. {:?}.", x);
            return;
        }
        _ => {}
    }

    let mut mem = PromMemory::new();
    if let Err(x) = mem.load_program(program) {
        error!("unable to load program: {}", x);
        return;
    }

    let mut cpu = PromCpu::new(mem);
    cpu.reset();

    while cpu.running() {
        if ctrlc_rx.len() > 0 {
            info!("interrupt received; stopping at a step boundary");
            break;
        }
        match cpu.step() {
            Ok(()) => {}
            Err(x) => {
                error!("execution failed at {:#08x}: {}", cpu.pc(), x);
                break;
            }
        }
    }

    info!("stopped at {:#08x} after {} stack frames", cpu.pc(), cpu.call_depth());
    cpu.regs.dump();
}

fn dump_program(program: &[u8]) {
    println!("{} bytes", program.len());
    for (i, chunk) in program.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:08X}: {}", i * 16, hex.join(" "));
    }
}

fn main() {
    env_logger::init();

    let matches = fetch_config();
    match matches.subcommand_name() {
        Some("run") => {
            let sub_matches = matches.subcommand_matches("run").unwrap();
            let filename = sub_matches.value_of("filename").unwrap();
            if let Some(program) = assemble(filename) {
                run_program(&program);
            }
        }
        Some("dump") => {
            let sub_matches = matches.subcommand_matches("dump").unwrap();
            let filename = sub_matches.value_of("filename").unwrap();
            if let Some(program) = assemble(filename) {
                dump_program(&program);
            }
        }
        Some("opcodes") => {
            for op in OPCODE_TABLE {
                let size = match op.fixed_size() {
                    Some(n) => format!("{} bytes", n),
                    None => "variable".to_string(),
                };
                println!("{:#04x}  {:<12} {:?} ({})", op as u8, op.mnemonic(), op.operand_class(), size);
            }
        }
        _ => {
            error!("invalid subcommand. Exiting");
        }
    }
}
