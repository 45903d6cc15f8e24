//! rv32i_sim: 单 hart RV32I 指令集仿真库
//!
//! 把一个原始 RV32I 机器码镜像（或 RV32 ELF）装入 64 MiB 平坦内存，
//! 从 PC 0 开始逐条取指、解码、执行，直到程序通过 exit 系统调用停机。
//! ECALL 模拟 read/write/exit 三个系统调用，EBREAK 阻塞等待一个输入字节。
//!
//! # 模块结构
//!
//! - `isa`: RV32I 字段提取、解码与指令归类
//! - `cpu`: CPU 核心、执行单元与系统调用
//! - `memory`: 内存抽象层
//! - `console`: 宿主标准输入输出边界
//! - `sim_env`: 仿真环境（配置、镜像加载、运行）
//! - `error`: 仿真错误类型

pub mod console;
pub mod cpu;
pub mod error;
pub mod isa;
pub mod memory;
pub mod sim_env;
