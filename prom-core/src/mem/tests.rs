use super::*;
use crate::consts::{DOMAIN_SIZE, STACK_MAX_DEPTH};

#[test]
fn byte_read_write_roundtrip() {
    let mut mem = PromMemory::new();

    for domain in [MemoryDomain::System, MemoryDomain::Video, MemoryDomain::Scratch] {
        mem.write(domain, 0, 0xAA).unwrap();
        mem.write(domain, DOMAIN_SIZE - 1, 0x55).unwrap();
        assert_eq!(0xAA, mem.read(domain, 0).unwrap());
        assert_eq!(0x55, mem.read(domain, DOMAIN_SIZE - 1).unwrap());
    }
}

#[test]
fn bounds_are_exclusive_at_domain_size() {
    let mut mem = PromMemory::new();

    // The last valid byte succeeds, the first invalid one fails.
    assert!(mem.write(MemoryDomain::Audio, DOMAIN_SIZE - 1, 1).is_ok());
    assert_eq!(
        Err(MemoryError::OutOfRange { domain: MemoryDomain::Audio, addr: DOMAIN_SIZE }),
        mem.write(MemoryDomain::Audio, DOMAIN_SIZE, 1)
    );
    assert_eq!(
        Err(MemoryError::OutOfRange { domain: MemoryDomain::Audio, addr: DOMAIN_SIZE }),
        mem.read(MemoryDomain::Audio, DOMAIN_SIZE).map(|_| ())
    );
}

#[test]
fn int_views_are_little_endian() {
    let mut mem = PromMemory::new();

    mem.write_int(MemoryDomain::Scratch, 0x100, 0x1234_5678).unwrap();
    assert_eq!(0x78, mem.read(MemoryDomain::Scratch, 0x100).unwrap());
    assert_eq!(0x56, mem.read(MemoryDomain::Scratch, 0x101).unwrap());
    assert_eq!(0x34, mem.read(MemoryDomain::Scratch, 0x102).unwrap());
    assert_eq!(0x12, mem.read(MemoryDomain::Scratch, 0x103).unwrap());
    assert_eq!(0x1234_5678, mem.read_int(MemoryDomain::Scratch, 0x100).unwrap());
}

#[test]
fn int_views_check_the_whole_span() {
    let mut mem = PromMemory::new();

    assert!(mem.write_int(MemoryDomain::Cache, DOMAIN_SIZE - 4, -1).is_ok());
    assert!(mem.write_int(MemoryDomain::Cache, DOMAIN_SIZE - 3, -1).is_err());
    assert!(mem.read_int(MemoryDomain::Cache, DOMAIN_SIZE - 3).is_err());
}

#[test]
fn float_views_roundtrip() {
    let mut mem = PromMemory::new();

    mem.write_float(MemoryDomain::Video, 64, 3.25).unwrap();
    assert_eq!(3.25, mem.read_float(MemoryDomain::Video, 64).unwrap());
    assert_eq!(3.25_f32.to_le_bytes()[0], mem.read(MemoryDomain::Video, 64).unwrap());
}

#[test]
fn rom_writes_are_dropped_without_error() {
    let mut mem = PromMemory::new();
    mem.load_cartridge(&[0xC0, 0xFF, 0xEE]).unwrap();

    assert!(mem.write(MemoryDomain::Cartridge, 0, 0x00).is_ok());
    assert!(mem.write_int(MemoryDomain::Cartridge, 0, 0).is_ok());
    assert!(mem
        .copy_block(MemoryDomain::Scratch, 0, MemoryDomain::Cartridge, 0, 16)
        .is_ok());

    assert_eq!(0xC0, mem.read(MemoryDomain::Cartridge, 0).unwrap());
    assert_eq!(0xFF, mem.read(MemoryDomain::Cartridge, 1).unwrap());
    assert_eq!(0xEE, mem.read(MemoryDomain::Cartridge, 2).unwrap());
}

#[test]
fn rom_bounds_violations_are_still_fatal() {
    let mut mem = PromMemory::new();

    assert_eq!(
        Err(MemoryError::OutOfRange { domain: MemoryDomain::Cartridge, addr: DOMAIN_SIZE }),
        mem.write(MemoryDomain::Cartridge, DOMAIN_SIZE, 0)
    );
}

#[test]
fn copy_block_moves_bytes_between_domains() {
    let mut mem = PromMemory::new();

    for i in 0..32usize {
        mem.write(MemoryDomain::System, i, i as u8).unwrap();
    }
    mem.copy_block(MemoryDomain::System, 0, MemoryDomain::Video, 0x200, 32).unwrap();
    for i in 0..32usize {
        assert_eq!(i as u8, mem.read(MemoryDomain::Video, 0x200 + i).unwrap());
    }

    assert!(mem
        .copy_block(MemoryDomain::System, DOMAIN_SIZE - 8, MemoryDomain::Video, 0, 16)
        .is_err());
}

#[test]
fn stack_is_bounded_both_ways() {
    let mut mem = PromMemory::new();

    assert_eq!(Err(MemoryError::StackUnderflow), mem.pop());

    for i in 0..STACK_MAX_DEPTH {
        mem.push(i as i32).unwrap();
    }
    assert_eq!(Err(MemoryError::StackOverflow), mem.push(0));

    // LIFO order on the way back out.
    assert_eq!(Ok(STACK_MAX_DEPTH as i32 - 1), mem.pop());
}

#[test]
fn reset_clears_everything_but_the_cartridge() {
    let mut mem = PromMemory::new();
    mem.load_cartridge(&[0x12, 0x34]).unwrap();
    mem.load_program(&[0x01, 0x02, 0x03]).unwrap();
    mem.write(MemoryDomain::Scratch, 9, 0xEE).unwrap();
    mem.push(7).unwrap();

    mem.reset();

    assert_eq!(0, mem.program_size());
    assert_eq!(0, mem.stack_depth());
    assert_eq!(0, mem.read(MemoryDomain::System, 0).unwrap());
    assert_eq!(0, mem.read(MemoryDomain::Scratch, 9).unwrap());
    assert_eq!(0x12, mem.read(MemoryDomain::Cartridge, 0).unwrap());
    assert_eq!(0x34, mem.read(MemoryDomain::Cartridge, 1).unwrap());
}

#[test]
fn domain_table_matches_discriminants() {
    for (i, domain) in DOMAIN_TABLE.iter().enumerate() {
        assert_eq!(Some(*domain), MemoryDomain::from_u8(i as u8));
    }
    assert_eq!(None, MemoryDomain::from_u8(DOMAIN_COUNT as u8));
}
