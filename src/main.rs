//! rv32i_sim 命令行入口
//!
//! 加载一个镜像并运行到程序调用 exit。模拟程序的输出原样写到标准输出，
//! 日志写到标准错误。
//!
//! 缺少参数或镜像无法读取时只打印错误并以成功状态退出；
//! 只有运行中的越界写入以状态 1 退出。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use rv32i_sim::memory::DEFAULT_MEMORY_SIZE;
use rv32i_sim::sim_env::{ImageFormat, SimConfig, SimEnv};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    /// Program image to run
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Image format
    #[arg(short, long, value_enum, default_value_t = ImageFormat::Bin)]
    format: ImageFormat,

    /// Memory size in bytes
    #[arg(short, long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Stop after this many instructions (0 = run until exit)
    #[arg(long, default_value_t = 0)]
    max_instructions: u64,

    /// Dump registers to stderr when the run ends
    #[arg(long)]
    dump_regs: bool,

    /// Show execution trace
    #[arg(short, long)]
    trace: bool,
}

fn setup_logger(trace: bool) {
    let default = if trace {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };
    setup_logger(opts.trace);

    let config = SimConfig::new()
        .with_image_path(opts.image.clone())
        .with_format(opts.format)
        .with_memory_size(opts.memory_size)
        .with_max_instructions(opts.max_instructions);

    let mut env = match SimEnv::from_config(config) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("error: failed to load {}: {e}", opts.image.display());
            return ExitCode::SUCCESS;
        }
    };

    let result = env.run_until_halt();

    if opts.dump_regs {
        if let Err(e) = env.dump(&mut std::io::stderr()) {
            tracing::warn!("register dump failed: {e}");
        }
    }

    match result {
        Ok(summary) => {
            if !summary.halted() {
                tracing::warn!(
                    "instruction budget of {} exhausted at pc=0x{:08x}",
                    opts.max_instructions,
                    summary.pc
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
