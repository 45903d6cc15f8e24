use super::super::CpuCore;
use super::super::syscall;
use crate::console::Console;
use crate::isa::RvInstr;
use crate::memory::{MemResult, Memory};

/// 整数 ALU 运算，寄存器与立即数两种形式共用
#[derive(Debug, Clone, Copy)]
enum AluOp {
    Add,
    Sub,
    Slt,
    Sltu,
    Xor,
    Or,
    And,
    Sll,
    Srl,
    Sra,
}

impl AluOp {
    /// 移位量由调用方决定是否截断
    fn apply(self, a: u32, b: u32) -> u32 {
        match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Slt => ((a as i32) < (b as i32)) as u32,
            AluOp::Sltu => (a < b) as u32,
            AluOp::Xor => a ^ b,
            AluOp::Or => a | b,
            AluOp::And => a & b,
            AluOp::Sll => a << b,
            AluOp::Srl => a >> b,
            AluOp::Sra => ((a as i32) >> b) as u32,
        }
    }
}

/// Execute one RV32I instruction and return the next pc.
///
/// The match is exhaustive: `Unknown` encodings fall through as no-ops.
/// A store or syscall buffer outside memory returns the fault without
/// touching registers.
pub fn execute(
    cpu: &mut CpuCore,
    mem: &mut dyn Memory,
    console: &mut dyn Console,
    instr: RvInstr,
    current_pc: u32,
) -> MemResult<u32> {
    let link = current_pc.wrapping_add(4);
    let mut next_pc = link;
    let ea = |cpu: &CpuCore, rs1: u8, offset: i32| cpu.read_reg(rs1).wrapping_add(offset as u32);
    let reg = |cpu: &CpuCore, rd: u8, rs1: u8, rs2: u8, op: AluOp| {
        Some((rd, op.apply(cpu.read_reg(rs1), cpu.read_reg(rs2))))
    };
    let imm = |cpu: &CpuCore, rd: u8, rs1: u8, imm: i32, op: AluOp| {
        Some((rd, op.apply(cpu.read_reg(rs1), imm as u32)))
    };
    // register shifts use only the low 5 bits of rs2
    let shift = |cpu: &CpuCore, rd: u8, rs1: u8, rs2: u8, op: AluOp| {
        Some((rd, op.apply(cpu.read_reg(rs1), cpu.read_reg(rs2) & 0x1F)))
    };
    let branch = |cpu: &CpuCore, rs1: u8, rs2: u8, offset: i32, cond: fn(u32, u32) -> bool| {
        if cond(cpu.read_reg(rs1), cpu.read_reg(rs2)) {
            current_pc.wrapping_add(offset as u32)
        } else {
            link
        }
    };

    let writeback: Option<(u8, u32)> = match instr {
        // ========== 寄存器-寄存器 ==========
        RvInstr::Add { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Add),
        RvInstr::Sub { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Sub),
        RvInstr::Slt { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Slt),
        RvInstr::Sltu { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Sltu),
        RvInstr::Xor { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Xor),
        RvInstr::Or { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::Or),
        RvInstr::And { rd, rs1, rs2 } => reg(cpu, rd, rs1, rs2, AluOp::And),
        RvInstr::Sll { rd, rs1, rs2 } => shift(cpu, rd, rs1, rs2, AluOp::Sll),
        RvInstr::Srl { rd, rs1, rs2 } => shift(cpu, rd, rs1, rs2, AluOp::Srl),
        RvInstr::Sra { rd, rs1, rs2 } => shift(cpu, rd, rs1, rs2, AluOp::Sra),

        // ========== 寄存器-立即数 ==========
        RvInstr::Addi { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::Add),
        RvInstr::Slti { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::Slt),
        RvInstr::Sltiu { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::Sltu),
        RvInstr::Xori { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::Xor),
        RvInstr::Ori { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::Or),
        RvInstr::Andi { rd, rs1, imm: i } => imm(cpu, rd, rs1, i, AluOp::And),
        // shamt is the raw 5-bit rs2 field
        RvInstr::Slli { rd, rs1, shamt } => imm(cpu, rd, rs1, shamt.into(), AluOp::Sll),
        RvInstr::Srli { rd, rs1, shamt } => imm(cpu, rd, rs1, shamt.into(), AluOp::Srl),
        RvInstr::Srai { rd, rs1, shamt } => imm(cpu, rd, rs1, shamt.into(), AluOp::Sra),

        // ========== Load：越界读得到 0 ==========
        RvInstr::Lb { rd, rs1, offset } => {
            Some((rd, mem.load8(ea(cpu, rs1, offset)) as i8 as u32))
        }
        RvInstr::Lh { rd, rs1, offset } => {
            Some((rd, mem.load16(ea(cpu, rs1, offset)) as i16 as u32))
        }
        RvInstr::Lw { rd, rs1, offset } => Some((rd, mem.load32(ea(cpu, rs1, offset)))),
        RvInstr::Lbu { rd, rs1, offset } => Some((rd, mem.load8(ea(cpu, rs1, offset)).into())),
        RvInstr::Lhu { rd, rs1, offset } => Some((rd, mem.load16(ea(cpu, rs1, offset)).into())),

        // ========== Store：越界写返回错误 ==========
        RvInstr::Sb { rs1, rs2, offset } => {
            mem.store8(ea(cpu, rs1, offset), cpu.read_reg(rs2) as u8)?;
            None
        }
        RvInstr::Sh { rs1, rs2, offset } => {
            mem.store16(ea(cpu, rs1, offset), cpu.read_reg(rs2) as u16)?;
            None
        }
        RvInstr::Sw { rs1, rs2, offset } => {
            mem.store32(ea(cpu, rs1, offset), cpu.read_reg(rs2))?;
            None
        }

        // ========== 高位立即数 ==========
        RvInstr::Lui { rd, imm } => Some((rd, imm as u32)),
        RvInstr::Auipc { rd, imm } => Some((rd, current_pc.wrapping_add(imm as u32))),

        // ========== 跳转与分支 ==========
        RvInstr::Jal { rd, offset } => {
            next_pc = current_pc.wrapping_add(offset as u32);
            Some((rd, link))
        }
        RvInstr::Jalr { rd, rs1, offset } => {
            next_pc = ea(cpu, rs1, offset) & !1;
            Some((rd, link))
        }
        RvInstr::Beq { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| a == b);
            None
        }
        RvInstr::Bne { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| a != b);
            None
        }
        RvInstr::Blt { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| (a as i32) < (b as i32));
            None
        }
        RvInstr::Bge { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| (a as i32) >= (b as i32));
            None
        }
        RvInstr::Bltu { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| a < b);
            None
        }
        RvInstr::Bgeu { rs1, rs2, offset } => {
            next_pc = branch(cpu, rs1, rs2, offset, |a, b| a >= b);
            None
        }

        // ========== 系统 ==========
        RvInstr::Ecall => {
            syscall::handle_ecall(cpu, mem, console)?;
            None
        }
        RvInstr::Ebreak => {
            syscall::handle_ebreak(console);
            None
        }
        // 单核模型中内存顺序总是满足
        RvInstr::Fence => None,
        RvInstr::Unknown {
            opcode,
            funct3,
            funct7,
        } => {
            tracing::trace!(
                "no-op for unknown encoding at 0x{current_pc:08x} \
                 (opcode=0x{opcode:02x}, funct3={funct3}, funct7=0x{funct7:02x})"
            );
            None
        }
    };

    if let Some((rd, value)) = writeback {
        cpu.write_reg(rd, value);
    }
    Ok(next_pc)
}
