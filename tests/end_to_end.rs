use std::io::Write;

use rv32i_sim::console::BufferConsole;
use rv32i_sim::cpu::CpuState;
use rv32i_sim::memory::Memory;
use rv32i_sim::sim_env::{ImageFormat, SimConfig, SimEnv};

const MEMORY_SIZE: usize = 64 * 1024;

fn assemble(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn env_for(image: &[u8], input: &[u8]) -> SimEnv<BufferConsole> {
    let config = SimConfig::new().with_memory_size(MEMORY_SIZE);
    let mut env = SimEnv::with_console(config, BufferConsole::with_input(input))
        .expect("failed to create sim env");
    env.load_image(image, ImageFormat::Bin)
        .expect("failed to load image");
    env
}

#[test]
fn test_exit_after_addi() {
    let image = assemble(&[
        0x00500093, // addi x1, x0, 5
        0x00000893, // addi x17, x0, 0
        0x05D88893, // addi x17, x17, 93
        0x00000073, // ecall
    ]);
    let mut env = env_for(&image, b"");

    let summary = env.run_until_halt().unwrap();
    assert!(summary.halted());
    assert_eq!(summary.executed, 4);
    assert_eq!(env.cpu.read_reg(1), 5);
}

#[test]
fn test_write_hi_to_stdout() {
    let mut image = assemble(&[
        0x04000893, // addi x17, x0, 64
        0x00100513, // addi x10, x0, 1
        0x10000593, // addi x11, x0, 0x100
        0x00200613, // addi x12, x0, 2
        0x00000073, // ecall
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall
    ]);
    image.resize(0x100, 0);
    image.extend_from_slice(b"Hi");
    let mut env = env_for(&image, b"");

    let summary = env.run_until_halt().unwrap();
    assert!(summary.halted());
    assert_eq!(env.console.output(), b"Hi");
    assert_eq!(env.cpu.read_reg(10), 2);
}

#[test]
fn test_echo_through_read_and_write() {
    let image = assemble(&[
        0x03F00893, // addi x17, x0, 63
        0x00000513, // addi x10, x0, 0
        0x20000593, // addi x11, x0, 0x200
        0x00500613, // addi x12, x0, 5
        0x00000073, // ecall            (read)
        0x00050613, // addi x12, x10, 0
        0x04000893, // addi x17, x0, 64
        0x00100513, // addi x10, x0, 1
        0x00000073, // ecall            (write)
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall            (exit)
    ]);

    let mut env = env_for(&image, b"hello world");
    env.run_until_halt().unwrap();
    assert_eq!(env.console.output(), b"hello");
    assert_eq!(env.console.remaining_input(), 6);

    // EOF 之前只读到 3 个字节
    let mut env = env_for(&image, b"abc");
    env.run_until_halt().unwrap();
    assert_eq!(env.console.output(), b"abc");
    assert_eq!(env.cpu.read_reg(10), 3);
}

#[test]
fn test_zero_words_past_image_are_noops() {
    let image = assemble(&[0x00500093]); // addi x1, x0, 5
    let config = SimConfig::new()
        .with_memory_size(MEMORY_SIZE)
        .with_max_instructions(100);
    let mut env = SimEnv::with_console(config, BufferConsole::new()).unwrap();
    env.load_image(&image, ImageFormat::Bin).unwrap();

    let summary = env.run_until_halt().unwrap();
    assert_eq!(summary.state, CpuState::Running);
    assert_eq!(summary.executed, 100);
    assert_eq!(summary.pc, 400);
    assert_eq!(env.cpu.read_reg(1), 5);
}

#[test]
fn test_marker_after_exit_never_runs() {
    let image = assemble(&[
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall
        0x00100093, // addi x1, x0, 1 (marker)
    ]);
    let mut env = env_for(&image, b"");

    let summary = env.run_until_halt().unwrap();
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.pc, 8);
    assert_eq!(env.cpu.read_reg(1), 0);
    // 停机后继续单步也不会取指
    assert_eq!(env.step(), CpuState::Halted);
    assert_eq!(env.cpu.read_reg(1), 0);
}

#[test]
fn test_store_load_round_trip_and_ebreak() {
    let image = assemble(&[
        0x30000113, // addi x2, x0, 0x300
        0xDEADC0B7, // lui x1, 0xdeadc
        0xEEF08093, // addi x1, x1, -0x111
        0x00112223, // sw x1, 4(x2)
        0x00412183, // lw x3, 4(x2)
        0x00100073, // ebreak
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall
    ]);
    let mut env = env_for(&image, b"\n");

    env.run_until_halt().unwrap();
    assert_eq!(env.cpu.read_reg(3), 0xDEAD_BEEF);
    assert_eq!(env.memory.load32(0x304), 0xDEAD_BEEF);
    assert_eq!(env.console.breaks(), 1);
    assert_eq!(env.console.remaining_input(), 0);
}

#[test]
fn test_write_buffer_past_capacity_reads_zero() {
    let mut image = assemble(&[
        0x04000893, // addi x17, x0, 64
        0x00100513, // addi x10, x0, 1
        0x10000593, // addi x11, x0, 0x100
        0x00200613, // addi x12, x0, 2
        0x00000073, // ecall  (0x101 超出容量)
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall
    ]);
    image.resize(0x100, 0);
    image.push(b'H');
    let config = SimConfig::new().with_memory_size(0x101);
    let mut env = SimEnv::with_console(config, BufferConsole::new()).unwrap();
    env.load_image(&image, ImageFormat::Bin).unwrap();

    let summary = env.run_until_halt().unwrap();
    assert!(summary.halted());
    assert_eq!(env.console.output(), b"H\0");
}

#[test]
fn test_load_image_from_file() {
    let image = assemble(&[
        0x00500093, // addi x1, x0, 5
        0x05D00893, // addi x17, x0, 93
        0x00000073, // ecall
    ]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();
    file.flush().unwrap();

    let config = SimConfig::new()
        .with_image_path(file.path())
        .with_memory_size(MEMORY_SIZE);
    let mut env = SimEnv::with_console(config, BufferConsole::new()).unwrap();

    let summary = env.run_until_halt().unwrap();
    assert!(summary.halted());
    assert_eq!(env.cpu.read_reg(1), 5);
    assert_eq!(env.instructions_executed, 3);
}
