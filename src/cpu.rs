//! CPU 核心与执行引擎
//!
//! 本模块定义了单 hart RV32I CPU 核心 `CpuCore`，
//! 包含寄存器文件、程序计数器、运行状态以及取指-解码-执行循环。

use std::io::{self, Write};

use crate::console::Console;
use crate::isa;
use crate::memory::{MemError, Memory};

mod exu;
mod status;
pub mod syscall;

pub use status::RegisterFile;
pub use syscall::SyscallCode;

/// CPU 执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    /// 正常运行中
    Running,
    /// 程序通过 exit 系统调用停机
    Halted,
    /// 越界写入（store 或系统调用缓冲区），pc 停在出错指令处
    Fault(MemError),
}

/// 单 hart CPU 核心
///
/// 包含 RV32I 的最小状态：
/// - 32 个 32-bit 通用寄存器 x0..x31（每条指令结束后 x0 被清零）
/// - 32-bit 程序计数器，不要求对齐或落在内存范围内
/// - 运行状态
///
/// 核心状态不依赖全局变量，内存与控制台在每一步以引用方式传入。
pub struct CpuCore {
    regs: RegisterFile,
    pc: u32,
    state: CpuState,
}

impl CpuCore {
    /// 创建一个新的 CPU 核心
    ///
    /// # 示例
    ///
    /// ```
    /// use rv32i_sim::cpu::{CpuCore, CpuState};
    ///
    /// let cpu = CpuCore::new(0x1000);
    /// assert_eq!(cpu.pc(), 0x1000);
    /// assert_eq!(cpu.state(), CpuState::Running);
    /// ```
    pub fn new(entry_pc: u32) -> Self {
        CpuCore {
            regs: RegisterFile::new(),
            pc: entry_pc,
            state: CpuState::Running,
        }
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn set_state(&mut self, state: CpuState) {
        self.state = state;
    }

    pub fn read_reg(&self, reg: u8) -> u32 {
        self.regs.read(reg)
    }

    pub fn write_reg(&mut self, reg: u8, value: u32) {
        self.regs.write(reg, value)
    }

    /// 获取所有寄存器的快照
    pub fn regs(&self) -> &[u32; 32] {
        self.regs.snapshot()
    }

    /// 执行单步指令
    ///
    /// # 流程
    ///
    /// 1. 从 PC 处取指（越界取指得到 0）
    /// 2. 解码并归类
    /// 3. 执行，得到下一条指令地址
    /// 4. 提交 PC，清零 x0
    ///
    /// 非 Running 状态下不做任何事。出错时 PC 保持不变。
    pub fn step(&mut self, mem: &mut dyn Memory, console: &mut dyn Console) -> CpuState {
        if self.state != CpuState::Running {
            return self.state;
        }

        let current_pc = self.pc;
        let inst = isa::decode(mem.load32(current_pc));
        let instr = inst.op();
        tracing::trace!("0x{current_pc:08x}: {:08x}  {instr}", inst.raw);

        match exu::rv32i::execute(self, mem, console, instr, current_pc) {
            Ok(next_pc) => self.pc = next_pc,
            Err(fault) => {
                tracing::debug!("fault at pc=0x{current_pc:08x}: {fault}");
                self.state = CpuState::Fault(fault);
            }
        }

        self.regs.clear_zero();
        self.state
    }

    /// 运行多条指令
    ///
    /// # 返回
    ///
    /// 执行的指令数量和最终 CPU 状态
    ///
    /// # 停止条件
    ///
    /// - 达到最大指令数
    /// - exit 系统调用停机
    /// - 越界写入
    pub fn run(
        &mut self,
        mem: &mut dyn Memory,
        console: &mut dyn Console,
        max_instructions: u64,
    ) -> (u64, CpuState) {
        let mut executed = 0;
        while executed < max_instructions && self.state == CpuState::Running {
            self.step(mem, console);
            executed += 1;
        }
        (executed, self.state)
    }

    /// 打印 PC、状态与全部整数寄存器（用于调试）
    pub fn dump_regs(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "PC: 0x{:08x}  State: {:?}", self.pc, self.state)?;
        for (i, value) in self.regs().iter().enumerate() {
            write!(out, "  x{i:02}: 0x{value:08x}")?;
            if i % 4 == 3 {
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl Default for CpuCore {
    fn default() -> Self {
        Self::new(0)
    }
}
