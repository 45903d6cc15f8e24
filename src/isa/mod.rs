//! RISC-V RV32I 指令解码
//!
//! 解码分两步：
//! - `decode`: 纯函数，把 32-bit 指令字拆成字段记录 `Instruction`，
//!   立即数按 opcode 选定的格式完成符号扩展
//! - `Instruction::op`: 通过表驱动的 `InstrDef` 归类为语义枚举 `RvInstr`

mod fields;
mod instr;
mod instr_def;
mod rv32i;

pub use fields::*;
pub use instr::{Instruction, RvInstr};
pub use instr_def::InstrDef;
pub use rv32i::RV32I_INSTRS;

/// 将原始指令字解码为字段记录
///
/// 所有字段总是从固定位置提取；立即数格式由 opcode 决定：
///
/// | opcode | 格式 |
/// |---|---|
/// | 0x13 / 0x03 / 0x67 / 0x73 | I |
/// | 0x23 | S |
/// | 0x63 | B |
/// | 0x37 / 0x17 | U |
/// | 0x6F | J |
/// | 其他 | 无立即数（0） |
///
/// # 示例
///
/// ```
/// use rv32i_sim::isa::{decode, RvInstr};
///
/// let inst = decode(0x00A00093); // addi x1, x0, 10
/// assert_eq!(inst.opcode, 0x13);
/// assert_eq!(inst.imm, 10);
/// assert_eq!(inst.op(), RvInstr::Addi { rd: 1, rs1: 0, imm: 10 });
/// ```
pub fn decode(raw: u32) -> Instruction {
    let op = opcode(raw);
    let imm = match op {
        OP_IMM | OP_LOAD | OP_JALR | OP_SYSTEM => imm_i(raw),
        OP_STORE => imm_s(raw),
        OP_BRANCH => imm_b(raw),
        OP_LUI | OP_AUIPC => imm_u(raw),
        OP_JAL => imm_j(raw),
        _ => 0,
    };

    Instruction {
        raw,
        opcode: op,
        rd: rd(raw),
        rs1: rs1(raw),
        rs2: rs2(raw),
        funct3: funct3(raw),
        funct7: funct7(raw),
        imm,
    }
}

#[cfg(test)]
mod tests;
