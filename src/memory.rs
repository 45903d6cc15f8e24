//! 内存抽象层
//!
//! 本模块定义了内存访问的统一接口 `Memory` trait，
//! 以及从地址 0 开始的固定容量线性内存 `FlatMemory`。
//!
//! 访存策略：
//! - 读：越界时静默返回 0，不产生错误
//! - 写：越界时拒绝写入并返回 `MemError::OutOfRange`，内存保持不变
//! - 不做任何对齐检查

use thiserror::Error;

/// 默认内存容量：64 MiB
pub const DEFAULT_MEMORY_SIZE: usize = 64 * 1024 * 1024;

/// 访存粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    Byte,
    Half,
    Word,
    /// 批量访问（系统调用缓冲区、镜像加载）
    Block(usize),
}

impl AccessSize {
    pub fn bytes(self) -> usize {
        match self {
            AccessSize::Byte => 1,
            AccessSize::Half => 2,
            AccessSize::Word => 4,
            AccessSize::Block(len) => len,
        }
    }
}

/// 内存访问错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemError {
    /// 地址越界：访问的字节区间没有完整落在内存容量之内
    #[error("out-of-range {access:?} access at 0x{addr:08x} (capacity 0x{capacity:x})")]
    OutOfRange {
        addr: u32,
        access: AccessSize,
        capacity: usize,
    },
}

pub type MemResult<T> = Result<T, MemError>;

/// 内存访问的统一接口
///
/// CPU 与系统调用只通过该接口访问内存，方便替换为其他内存模型。
pub trait Memory {
    /// 内存容量（字节数）
    fn capacity(&self) -> usize;

    /// 读取 32 位数据（小端序）；`addr..addr+4` 不在容量内时返回 0
    fn load32(&self, addr: u32) -> u32;

    /// 读取 16 位数据，取 `load32(addr)` 的低 16 位
    ///
    /// 因此内存最后 3 个字节内的半字读取同样返回 0。
    fn load16(&self, addr: u32) -> u16 {
        self.load32(addr) as u16
    }

    /// 读取 8 位数据，取 `load32(addr)` 的低 8 位
    fn load8(&self, addr: u32) -> u8 {
        self.load32(addr) as u8
    }

    /// 写入 8 位数据
    fn store8(&mut self, addr: u32, value: u8) -> MemResult<()>;

    /// 写入 16 位数据（小端序）
    fn store16(&mut self, addr: u32, value: u16) -> MemResult<()>;

    /// 写入 32 位数据（小端序）
    fn store32(&mut self, addr: u32, value: u32) -> MemResult<()>;

    /// 检查 `addr..addr+len` 是否完整落在内存之内
    fn ensure_range(&self, addr: u32, len: usize) -> MemResult<()>;

    /// 按字节读取，容量之外的字节读为 0
    ///
    /// 与 `load8` 不同，不受 4 字节窗口限制，最后 3 个字节也能读到。
    fn read_byte(&self, addr: u32) -> u8;

    /// 批量读取，地址按 32 位回绕，越界字节读为 0
    fn read_bytes(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read_byte(addr.wrapping_add(i as u32)))
            .collect()
    }

    /// 批量写入；区间越界时返回错误且不写入任何字节
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> MemResult<()>;
}

/// 简单线性内存实现
///
/// 使用 `Vec<u8>` 存储整个地址空间，起始地址固定为 0。
pub struct FlatMemory {
    /// 内存数据存储
    data: Vec<u8>,
}

impl FlatMemory {
    /// 创建一个指定容量、全零初始化的内存区域
    ///
    /// # 示例
    ///
    /// ```
    /// use rv32i_sim::memory::{FlatMemory, Memory};
    ///
    /// let mem = FlatMemory::new(64 * 1024);
    /// assert_eq!(mem.capacity(), 64 * 1024);
    /// assert_eq!(mem.load32(0x100), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        FlatMemory {
            data: vec![0; capacity],
        }
    }

    /// 将镜像从地址 0 开始拷贝进内存
    ///
    /// 超出容量的部分被静默截断，返回实际拷贝的字节数。
    pub fn load_image(&mut self, image: &[u8]) -> usize {
        let len = image.len().min(self.data.len());
        self.data[..len].copy_from_slice(&image[..len]);
        len
    }

    fn bounds_check(&self, addr: u32, access: AccessSize) -> MemResult<usize> {
        let start = addr as usize;
        let fits = start
            .checked_add(access.bytes())
            .is_some_and(|end| end <= self.data.len());

        if fits {
            Ok(start)
        } else {
            Err(MemError::OutOfRange {
                addr,
                access,
                capacity: self.data.len(),
            })
        }
    }
}

impl Memory for FlatMemory {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn load32(&self, addr: u32) -> u32 {
        match self.bounds_check(addr, AccessSize::Word) {
            Ok(idx) => u32::from_le_bytes([
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
                self.data[idx + 3],
            ]),
            Err(_) => 0,
        }
    }

    fn store8(&mut self, addr: u32, value: u8) -> MemResult<()> {
        let idx = self.bounds_check(addr, AccessSize::Byte)?;
        self.data[idx] = value;
        Ok(())
    }

    fn store16(&mut self, addr: u32, value: u16) -> MemResult<()> {
        let idx = self.bounds_check(addr, AccessSize::Half)?;
        self.data[idx..idx + 2].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn store32(&mut self, addr: u32, value: u32) -> MemResult<()> {
        let idx = self.bounds_check(addr, AccessSize::Word)?;
        self.data[idx..idx + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn ensure_range(&self, addr: u32, len: usize) -> MemResult<()> {
        if len == 0 {
            return Ok(());
        }
        self.bounds_check(addr, AccessSize::Block(len)).map(|_| ())
    }

    fn read_byte(&self, addr: u32) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(0)
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> MemResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let start = self.bounds_check(addr, AccessSize::Block(data.len()))?;
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}
