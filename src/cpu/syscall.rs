//! 模拟系统调用
//!
//! ECALL 由 a7 选择调用号，参数在 a0..a2 中：
//!
//! | a7 | 调用 | 行为 |
//! |---|---|---|
//! | 63 | read | a0 == 0 时从标准输入读取至多 a2 字节到 a1，a0 = 实际读取数 |
//! | 64 | write | a0 == 1 时把 a1 起的 a2 字节逐字节写到标准输出；a0 = a2 |
//! | 93 | exit | 停机 |
//!
//! 其他调用号被静默忽略。

use super::{CpuCore, CpuState};
use crate::console::Console;
use crate::memory::{MemResult, Memory};

pub const REG_A0: u8 = 10;
pub const REG_A1: u8 = 11;
pub const REG_A2: u8 = 12;
pub const REG_A7: u8 = 17;

const STDIN_FD: u32 = 0;
const STDOUT_FD: u32 = 1;

/// 支持的系统调用号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallCode {
    Read = 63,
    Write = 64,
    Exit = 93,
}

impl SyscallCode {
    pub fn from_a7(code: u32) -> Option<Self> {
        match code {
            63 => Some(SyscallCode::Read),
            64 => Some(SyscallCode::Write),
            93 => Some(SyscallCode::Exit),
            _ => None,
        }
    }
}

/// 处理 ECALL；缓冲区越界时返回错误，此时寄存器保持不变
pub fn handle_ecall(
    cpu: &mut CpuCore,
    mem: &mut dyn Memory,
    console: &mut dyn Console,
) -> MemResult<()> {
    let code = cpu.read_reg(REG_A7);
    let Some(syscall) = SyscallCode::from_a7(code) else {
        tracing::debug!("ignoring unsupported syscall {code}");
        return Ok(());
    };

    match syscall {
        SyscallCode::Read => sys_read(cpu, mem, console),
        SyscallCode::Write => {
            sys_write(cpu, mem, console);
            Ok(())
        }
        SyscallCode::Exit => {
            tracing::debug!("exit syscall at pc=0x{:08x}", cpu.pc());
            cpu.set_state(CpuState::Halted);
            Ok(())
        }
    }
}

/// 处理 EBREAK：阻塞读取一个输入字节后继续执行
pub fn handle_ebreak(console: &mut dyn Console) {
    tracing::debug!("ebreak: waiting for one byte of input");
    console.wait_break();
}

fn sys_read(cpu: &mut CpuCore, mem: &mut dyn Memory, console: &mut dyn Console) -> MemResult<()> {
    let fd = cpu.read_reg(REG_A0);
    if fd != STDIN_FD {
        tracing::debug!("read syscall on unsupported fd {fd} ignored");
        return Ok(());
    }

    let addr = cpu.read_reg(REG_A1);
    let len = cpu.read_reg(REG_A2) as usize;
    // 先校验目标区间，再阻塞等待输入
    mem.ensure_range(addr, len)?;

    let mut buf = vec![0u8; len];
    let n = console.read_input(&mut buf);
    mem.write_bytes(addr, &buf[..n])?;

    cpu.write_reg(REG_A0, n as u32);
    Ok(())
}

/// 源缓冲区只被读取，越界部分按 0 输出而不是报错
fn sys_write(cpu: &mut CpuCore, mem: &dyn Memory, console: &mut dyn Console) {
    let fd = cpu.read_reg(REG_A0);
    let addr = cpu.read_reg(REG_A1);
    let len = cpu.read_reg(REG_A2);

    if fd == STDOUT_FD {
        for i in 0..len {
            console.write_output(mem.read_byte(addr.wrapping_add(i)));
        }
    } else {
        tracing::debug!("write syscall on unsupported fd {fd} ignored");
    }

    cpu.write_reg(REG_A0, len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferConsole;
    use crate::memory::{FlatMemory, MemError};

    fn setup(a7: u32, a0: u32, a1: u32, a2: u32) -> CpuCore {
        let mut cpu = CpuCore::new(0);
        cpu.write_reg(REG_A7, a7);
        cpu.write_reg(REG_A0, a0);
        cpu.write_reg(REG_A1, a1);
        cpu.write_reg(REG_A2, a2);
        cpu
    }

    #[test]
    fn test_read_into_memory() {
        let mut mem = FlatMemory::new(256);
        let mut console = BufferConsole::with_input(b"hello");
        let mut cpu = setup(63, 0, 0x40, 3);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();

        assert_eq!(cpu.read_reg(REG_A0), 3);
        assert_eq!(mem.read_bytes(0x40, 4), b"hel\0");
        assert_eq!(console.remaining_input(), 2);
    }

    #[test]
    fn test_read_stops_at_eof() {
        let mut mem = FlatMemory::new(256);
        let mut console = BufferConsole::with_input(b"ab");
        let mut cpu = setup(63, 0, 0x10, 8);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(cpu.read_reg(REG_A0), 2);
    }

    #[test]
    fn test_read_on_other_fd_is_ignored() {
        let mut mem = FlatMemory::new(256);
        let mut console = BufferConsole::with_input(b"abc");
        let mut cpu = setup(63, 3, 0x10, 2);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(cpu.read_reg(REG_A0), 3);
        assert_eq!(console.remaining_input(), 3);
    }

    #[test]
    fn test_read_out_of_range_faults_before_reading() {
        let mut mem = FlatMemory::new(256);
        let mut console = BufferConsole::with_input(b"abc");
        let mut cpu = setup(63, 0, 250, 10);

        let err = handle_ecall(&mut cpu, &mut mem, &mut console).unwrap_err();
        assert!(matches!(err, MemError::OutOfRange { addr: 250, .. }));
        assert_eq!(console.remaining_input(), 3);
        assert_eq!(cpu.read_reg(REG_A0), 0);
    }

    #[test]
    fn test_write_to_stdout() {
        let mut mem = FlatMemory::new(256);
        mem.write_bytes(0x80, b"Hi!").unwrap();
        let mut console = BufferConsole::new();
        let mut cpu = setup(64, 1, 0x80, 2);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(console.output(), b"Hi");
        assert_eq!(cpu.read_reg(REG_A0), 2);
    }

    #[test]
    fn test_write_past_capacity_reads_zero() {
        let mut mem = FlatMemory::new(256);
        mem.store8(255, b'!').unwrap();
        let mut console = BufferConsole::new();
        let mut cpu = setup(64, 1, 255, 2);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(console.output(), b"!\0");
        assert_eq!(cpu.read_reg(REG_A0), 2);
        assert_eq!(cpu.state(), CpuState::Running);
    }

    #[test]
    fn test_write_other_fd_still_sets_a0() {
        let mut mem = FlatMemory::new(256);
        let mut console = BufferConsole::new();
        let mut cpu = setup(64, 2, 0x80, 5);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert!(console.output().is_empty());
        assert_eq!(cpu.read_reg(REG_A0), 5);
    }

    #[test]
    fn test_exit_halts() {
        let mut mem = FlatMemory::new(16);
        let mut console = BufferConsole::new();
        let mut cpu = setup(93, 0, 0, 0);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(cpu.state(), CpuState::Halted);
    }

    #[test]
    fn test_unknown_syscall_is_noop() {
        let mut mem = FlatMemory::new(16);
        let mut console = BufferConsole::new();
        let mut cpu = setup(1, 7, 8, 9);

        handle_ecall(&mut cpu, &mut mem, &mut console).unwrap();
        assert_eq!(cpu.state(), CpuState::Running);
        assert_eq!(cpu.read_reg(REG_A0), 7);
    }
}
