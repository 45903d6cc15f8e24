//! 仿真环境错误类型

use std::io;

use thiserror::Error;

use crate::memory::MemError;

/// 加载或运行仿真时产生的错误
#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ELF parse error: {0}")]
    Elf(#[from] elf::ParseError),

    /// ELF 能解析，但不是可加载的 RV32 小端镜像
    #[error("unsupported ELF image: {0}")]
    ElfFormat(String),

    #[error("memory error: {0}")]
    Memory(#[from] MemError),

    /// 程序运行中发生越界写入
    #[error("memory fault at pc=0x{pc:08x}: {source}")]
    Fault { pc: u32, source: MemError },
}

pub type SimResult<T> = Result<T, SimError>;
