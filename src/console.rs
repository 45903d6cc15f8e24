//! 宿主控制台
//!
//! ECALL read/write 与 EBREAK 通过 `Console` 访问宿主的标准输入输出。
//! 所有调用都是同步阻塞的，模拟循环在这里挂起直到宿主返回。

use std::collections::VecDeque;
use std::io::{self, Read, Stdin, Stdout, Write};

/// 模拟程序与宿主之间的字节通道
pub trait Console {
    /// 读取输入直到 `buf` 填满或遇到 EOF，返回实际读取的字节数
    fn read_input(&mut self, buf: &mut [u8]) -> usize;

    /// 输出一个字节
    fn write_output(&mut self, byte: u8);

    /// 读取并丢弃一个输入字节（EBREAK）
    fn wait_break(&mut self);

    /// 刷新已缓冲的输出
    fn flush(&mut self) {}
}

/// 连接进程标准输入输出的控制台
pub struct StdConsole {
    stdin: Stdin,
    stdout: Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_input(&mut self, buf: &mut [u8]) -> usize {
        // 阻塞前先把提示类输出送出去
        self.flush();

        let mut filled = 0;
        let mut stdin = self.stdin.lock();
        while filled < buf.len() {
            match stdin.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("stdin read failed after {filled} bytes: {e}");
                    break;
                }
            }
        }
        filled
    }

    fn write_output(&mut self, byte: u8) {
        if let Err(e) = self.stdout.lock().write_all(&[byte]) {
            tracing::warn!("stdout write failed: {e}");
        }
    }

    fn wait_break(&mut self) {
        self.flush();
        let mut byte = [0u8; 1];
        if let Err(e) = self.stdin.lock().read(&mut byte) {
            tracing::warn!("stdin read on ebreak failed: {e}");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.stdout.flush() {
            tracing::warn!("stdout flush failed: {e}");
        }
    }
}

/// 内存中的控制台：输入来自预置队列，输出被收集起来
///
/// 用于测试以及把模拟器嵌入到其他程序中。
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    breaks: usize,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// 尚未被读取的输入字节数
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    /// 已执行的 EBREAK 次数
    pub fn breaks(&self) -> usize {
        self.breaks
    }
}

impl Console for BufferConsole {
    fn read_input(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.input.len());
        for (dst, src) in buf.iter_mut().zip(self.input.drain(..n)) {
            *dst = src;
        }
        n
    }

    fn write_output(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn wait_break(&mut self) {
        self.breaks += 1;
        self.input.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_console_short_read() {
        let mut console = BufferConsole::with_input(b"abc");
        let mut buf = [0u8; 5];

        assert_eq!(console.read_input(&mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(console.read_input(&mut buf), 0);
    }

    #[test]
    fn test_buffer_console_break_consumes_one_byte() {
        let mut console = BufferConsole::with_input(b"\nx");
        console.wait_break();

        assert_eq!(console.breaks(), 1);
        assert_eq!(console.remaining_input(), 1);

        console.write_output(b'H');
        console.write_output(b'i');
        assert_eq!(console.output(), b"Hi");
    }
}
