//! 仿真环境初始化模块
//!
//! 本模块负责：
//! - 读取仿真配置
//! - 解析 ELF 文件或读取原始二进制镜像
//! - 初始化 CPU、内存和控制台
//! - 驱动取指-执行循环直到停机
//!
//! # 示例
//!
//! ```no_run
//! use rv32i_sim::sim_env::{SimConfig, SimEnv};
//!
//! let config = SimConfig::new()
//!     .with_image_path("program.bin")
//!     .with_memory_size(64 * 1024);
//!
//! let mut env = SimEnv::from_config(config)?;
//! let summary = env.run_until_halt()?;
//! println!("executed {} instructions", summary.executed);
//! # Ok::<(), rv32i_sim::error::SimError>(())
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use elf::ElfBytes;
use elf::abi::{EM_RISCV, PF_W, PF_X, PT_LOAD};
use elf::endian::AnyEndian;
use elf::file::Class;

use crate::console::{Console, StdConsole};
use crate::cpu::{CpuCore, CpuState};
use crate::error::{SimError, SimResult};
use crate::memory::{DEFAULT_MEMORY_SIZE, FlatMemory, Memory};

/// 程序镜像格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    /// 原始小端机器码，从地址 0 开始加载
    #[default]
    Bin,
    /// RV32 小端 ELF 可执行文件
    Elf,
}

/// 仿真配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 镜像路径（为空时只创建空内存）
    pub image_path: Option<PathBuf>,
    /// 镜像格式
    pub format: ImageFormat,
    /// 内存容量（字节）
    pub memory_size: usize,
    /// 最大执行指令数（0 表示无限制）
    pub max_instructions: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            format: ImageFormat::Bin,
            memory_size: DEFAULT_MEMORY_SIZE,
            max_instructions: 0,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置镜像路径
    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = size;
        self
    }

    /// 设置最大执行指令数
    pub fn with_max_instructions(mut self, max: u64) -> Self {
        self.max_instructions = max;
        self
    }
}

/// ELF 程序段信息
#[derive(Debug, Clone)]
pub struct ElfSegment {
    pub vaddr: u32,
    /// 文件中的大小
    pub file_size: usize,
    /// 内存中的大小（多出的部分清零）
    pub mem_size: usize,
    /// 段数据
    pub data: Vec<u8>,
    pub executable: bool,
    pub writable: bool,
}

/// ELF 文件解析结果
#[derive(Debug, Clone)]
pub struct ElfInfo {
    /// 入口点地址
    pub entry: u32,
    /// 可加载段（PT_LOAD）
    pub segments: Vec<ElfSegment>,
}

impl ElfInfo {
    /// 解析 ELF 文件
    pub fn parse<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse_bytes(&data)
    }

    /// 从字节数组解析 ELF
    ///
    /// 只接受 32 位、小端、RISC-V 机器类型的镜像。
    pub fn parse_bytes(data: &[u8]) -> SimResult<Self> {
        let elf_file = ElfBytes::<AnyEndian>::minimal_parse(data)?;
        let header = &elf_file.ehdr;

        if header.e_machine != EM_RISCV {
            return Err(SimError::ElfFormat(format!(
                "not a RISC-V ELF (machine type 0x{:x}, expected 0x{:x})",
                header.e_machine, EM_RISCV
            )));
        }
        if header.class != Class::ELF32 {
            return Err(SimError::ElfFormat("only 32-bit ELF is supported".into()));
        }
        if header.endianness != AnyEndian::Little {
            return Err(SimError::ElfFormat("only little-endian ELF is supported".into()));
        }

        let mut segments = Vec::new();
        if let Some(phdrs) = elf_file.segments() {
            for phdr in phdrs.iter().filter(|p| p.p_type == PT_LOAD) {
                let file_size = phdr.p_filesz as usize;
                let mem_size = phdr.p_memsz as usize;
                if file_size > mem_size {
                    return Err(SimError::ElfFormat(format!(
                        "segment at 0x{:08x} has filesz 0x{file_size:x} > memsz 0x{mem_size:x}",
                        phdr.p_vaddr
                    )));
                }

                segments.push(ElfSegment {
                    vaddr: phdr.p_vaddr as u32,
                    file_size,
                    mem_size,
                    data: elf_file.segment_data(&phdr)?.to_vec(),
                    executable: phdr.p_flags & PF_X != 0,
                    writable: phdr.p_flags & PF_W != 0,
                });
            }
        }

        Ok(ElfInfo {
            entry: header.e_entry as u32,
            segments,
        })
    }

    /// 把所有段写入内存，返回入口地址
    ///
    /// 段超出内存容量时整体拒绝，不做截断。
    pub fn load_into(&self, memory: &mut dyn Memory) -> SimResult<u32> {
        for seg in &self.segments {
            memory.ensure_range(seg.vaddr, seg.mem_size)?;
            memory.write_bytes(seg.vaddr, &seg.data)?;

            if seg.mem_size > seg.file_size {
                let bss_start = seg.vaddr.wrapping_add(seg.file_size as u32);
                memory.write_bytes(bss_start, &vec![0; seg.mem_size - seg.file_size])?;
            }

            tracing::debug!(
                "segment vaddr=0x{:08x} size=0x{:x} flags={}{}",
                seg.vaddr,
                seg.mem_size,
                if seg.executable { "X" } else { "-" },
                if seg.writable { "W" } else { "R" },
            );
        }
        Ok(self.entry)
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// 本次执行的指令数
    pub executed: u64,
    /// 结束时的 CPU 状态（Halted，或指令预算耗尽时为 Running）
    pub state: CpuState,
    /// 结束时的 PC
    pub pc: u32,
}

impl RunSummary {
    pub fn halted(&self) -> bool {
        self.state == CpuState::Halted
    }
}

/// 仿真环境
///
/// 封装了 CPU、内存和控制台，提供统一的仿真接口
pub struct SimEnv<C: Console = StdConsole> {
    /// CPU 核心
    pub cpu: CpuCore,
    /// 主内存
    pub memory: FlatMemory,
    /// 宿主控制台
    pub console: C,
    /// 配置
    pub config: SimConfig,
    /// 已执行的指令数
    pub instructions_executed: u64,
}

impl SimEnv<StdConsole> {
    /// 从配置创建仿真环境，使用进程的标准输入输出
    pub fn from_config(config: SimConfig) -> SimResult<Self> {
        Self::with_console(config, StdConsole::new())
    }
}

impl<C: Console> SimEnv<C> {
    /// 从配置创建仿真环境，使用指定的控制台
    pub fn with_console(config: SimConfig, console: C) -> SimResult<Self> {
        let mut env = SimEnv {
            cpu: CpuCore::new(0),
            memory: FlatMemory::new(config.memory_size),
            console,
            config,
            instructions_executed: 0,
        };

        if let Some(path) = env.config.image_path.clone() {
            let format = env.config.format;
            let data = std::fs::read(&path)?;
            tracing::info!("loading {format:?} image {}", path.display());
            env.load_image(&data, format)?;
        }

        Ok(env)
    }

    /// 加载内存中的镜像，并把 PC 设置为入口地址
    pub fn load_image(&mut self, data: &[u8], format: ImageFormat) -> SimResult<u32> {
        let entry = match format {
            ImageFormat::Bin => {
                let copied = self.memory.load_image(data);
                if copied < data.len() {
                    tracing::info!(
                        "image truncated to memory capacity ({copied} of {} bytes)",
                        data.len()
                    );
                }
                tracing::info!("loaded {copied} bytes at 0x00000000");
                0
            }
            ImageFormat::Elf => {
                let elf = ElfInfo::parse_bytes(data)?;
                let entry = elf.load_into(&mut self.memory)?;
                tracing::info!(
                    "loaded ELF with {} segments, entry 0x{entry:08x}",
                    elf.segments.len()
                );
                entry
            }
        };

        self.cpu.set_pc(entry);
        Ok(entry)
    }

    /// 执行单步
    pub fn step(&mut self) -> CpuState {
        let state = self.cpu.step(&mut self.memory, &mut self.console);
        self.instructions_executed += 1;
        state
    }

    /// 运行指定数量的指令
    pub fn run(&mut self, max_instructions: u64) -> (u64, CpuState) {
        let (executed, state) = self
            .cpu
            .run(&mut self.memory, &mut self.console, max_instructions);
        self.instructions_executed += executed;
        (executed, state)
    }

    /// 运行直到停止条件
    ///
    /// 停止条件：
    /// - exit 系统调用停机
    /// - 越界写入，返回 `SimError::Fault`
    /// - 达到配置的最大指令数（0 表示一直运行）
    pub fn run_until_halt(&mut self) -> SimResult<RunSummary> {
        let max = match self.config.max_instructions {
            0 => u64::MAX,
            n => n,
        };

        let (executed, state) = self.run(max);
        self.console.flush();

        match state {
            CpuState::Fault(source) => Err(SimError::Fault {
                pc: self.cpu.pc(),
                source,
            }),
            state => {
                tracing::info!(
                    "stopped after {executed} instructions at pc=0x{:08x} ({state:?})",
                    self.cpu.pc()
                );
                Ok(RunSummary {
                    executed,
                    state,
                    pc: self.cpu.pc(),
                })
            }
        }
    }

    /// 打印仿真状态
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "=== SimEnv Status ===")?;
        writeln!(out, "Instructions executed: {}", self.instructions_executed)?;
        self.cpu.dump_regs(out)
    }
}
