//! 定义指令的两种表示：解码阶段的字段记录 `Instruction`
//! 与执行阶段使用的语义枚举 `RvInstr`

use std::fmt;

use super::rv32i::classify;

/// 解码后的指令字段记录
///
/// 所有字段都从固定位置提取，与 opcode 无关；
/// `imm` 按 opcode 选定的格式（I/S/B/U/J）完成符号扩展，
/// 不携带立即数的格式为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// 原始 32-bit 指令编码
    pub raw: u32,
    pub opcode: u32,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub funct3: u32,
    pub funct7: u32,
    pub imm: i32,
}

impl Instruction {
    /// 按 (opcode, funct3, funct7) 归类为语义枚举
    pub fn op(&self) -> RvInstr {
        classify(self)
    }
}

/// RV32I 指令的语义化表示
///
/// 执行单元对该枚举做穷尽匹配，没有默认分支：
/// 无法识别的编码显式落入 `Unknown`，按空操作执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RvInstr {
    // ========== R-type 算术/逻辑指令 ==========
    /// ADD: rd = rs1 + rs2
    Add { rd: u8, rs1: u8, rs2: u8 },
    /// SUB: rd = rs1 - rs2
    Sub { rd: u8, rs1: u8, rs2: u8 },
    /// AND: rd = rs1 & rs2
    And { rd: u8, rs1: u8, rs2: u8 },
    /// OR: rd = rs1 | rs2
    Or { rd: u8, rs1: u8, rs2: u8 },
    /// XOR: rd = rs1 ^ rs2
    Xor { rd: u8, rs1: u8, rs2: u8 },
    /// SLT: rd = (rs1 < rs2) ? 1 : 0 (有符号比较)
    Slt { rd: u8, rs1: u8, rs2: u8 },
    /// SLTU: rd = (rs1 < rs2) ? 1 : 0 (无符号比较)
    Sltu { rd: u8, rs1: u8, rs2: u8 },
    /// SLL: rd = rs1 << rs2[4:0]
    Sll { rd: u8, rs1: u8, rs2: u8 },
    /// SRL: rd = rs1 >> rs2[4:0] (逻辑右移)
    Srl { rd: u8, rs1: u8, rs2: u8 },
    /// SRA: rd = rs1 >> rs2[4:0] (算术右移)
    Sra { rd: u8, rs1: u8, rs2: u8 },

    // ========== I-type 立即数算术/逻辑指令 ==========
    /// ADDI: rd = rs1 + imm
    Addi { rd: u8, rs1: u8, imm: i32 },
    /// ANDI: rd = rs1 & imm
    Andi { rd: u8, rs1: u8, imm: i32 },
    /// ORI: rd = rs1 | imm
    Ori { rd: u8, rs1: u8, imm: i32 },
    /// XORI: rd = rs1 ^ imm
    Xori { rd: u8, rs1: u8, imm: i32 },
    /// SLTI: rd = (rs1 < imm) ? 1 : 0 (有符号比较)
    Slti { rd: u8, rs1: u8, imm: i32 },
    /// SLTIU: rd = (rs1 < imm) ? 1 : 0 (无符号比较)
    Sltiu { rd: u8, rs1: u8, imm: i32 },
    /// SLLI: rd = rs1 << shamt，shamt 取 rs2 字段
    Slli { rd: u8, rs1: u8, shamt: u8 },
    /// SRLI: rd = rs1 >> shamt (逻辑右移)
    Srli { rd: u8, rs1: u8, shamt: u8 },
    /// SRAI: rd = rs1 >> shamt (算术右移)
    Srai { rd: u8, rs1: u8, shamt: u8 },

    // ========== Load 指令 ==========
    /// LB: rd = sign_extend(mem[rs1 + offset])
    Lb { rd: u8, rs1: u8, offset: i32 },
    /// LH: rd = sign_extend(mem[rs1 + offset])
    Lh { rd: u8, rs1: u8, offset: i32 },
    /// LW: rd = mem[rs1 + offset]
    Lw { rd: u8, rs1: u8, offset: i32 },
    /// LBU: rd = zero_extend(mem[rs1 + offset])
    Lbu { rd: u8, rs1: u8, offset: i32 },
    /// LHU: rd = zero_extend(mem[rs1 + offset])
    Lhu { rd: u8, rs1: u8, offset: i32 },

    // ========== Store 指令 ==========
    /// SB: mem[rs1 + offset] = rs2[7:0]
    Sb { rs1: u8, rs2: u8, offset: i32 },
    /// SH: mem[rs1 + offset] = rs2[15:0]
    Sh { rs1: u8, rs2: u8, offset: i32 },
    /// SW: mem[rs1 + offset] = rs2
    Sw { rs1: u8, rs2: u8, offset: i32 },

    // ========== U-type 指令 ==========
    /// LUI: rd = imm（低 12 位为 0）
    Lui { rd: u8, imm: i32 },
    /// AUIPC: rd = pc + imm
    Auipc { rd: u8, imm: i32 },

    // ========== 控制流指令 ==========
    /// JAL: rd = pc + 4; pc = pc + offset
    Jal { rd: u8, offset: i32 },
    /// JALR: rd = pc + 4; pc = (rs1 + offset) & !1
    Jalr { rd: u8, rs1: u8, offset: i32 },
    /// BEQ: if (rs1 == rs2) pc = pc + offset
    Beq { rs1: u8, rs2: u8, offset: i32 },
    /// BNE: if (rs1 != rs2) pc = pc + offset
    Bne { rs1: u8, rs2: u8, offset: i32 },
    /// BLT: if (rs1 < rs2) pc = pc + offset (有符号)
    Blt { rs1: u8, rs2: u8, offset: i32 },
    /// BGE: if (rs1 >= rs2) pc = pc + offset (有符号)
    Bge { rs1: u8, rs2: u8, offset: i32 },
    /// BLTU: if (rs1 < rs2) pc = pc + offset (无符号)
    Bltu { rs1: u8, rs2: u8, offset: i32 },
    /// BGEU: if (rs1 >= rs2) pc = pc + offset (无符号)
    Bgeu { rs1: u8, rs2: u8, offset: i32 },

    // ========== 系统指令 ==========
    /// ECALL: 由 a7 选择的模拟系统调用
    Ecall,
    /// EBREAK: 阻塞读取一个输入字节后继续
    Ebreak,
    /// FENCE: 单核模型中为空操作
    Fence,

    // ========== 特殊 ==========
    /// 无法识别的 opcode/funct 组合，按空操作执行
    Unknown { opcode: u32, funct3: u32, funct7: u32 },
}

impl fmt::Display for RvInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RvInstr::*;

        match *self {
            Add { rd, rs1, rs2 } => write!(f, "add x{rd}, x{rs1}, x{rs2}"),
            Sub { rd, rs1, rs2 } => write!(f, "sub x{rd}, x{rs1}, x{rs2}"),
            And { rd, rs1, rs2 } => write!(f, "and x{rd}, x{rs1}, x{rs2}"),
            Or { rd, rs1, rs2 } => write!(f, "or x{rd}, x{rs1}, x{rs2}"),
            Xor { rd, rs1, rs2 } => write!(f, "xor x{rd}, x{rs1}, x{rs2}"),
            Slt { rd, rs1, rs2 } => write!(f, "slt x{rd}, x{rs1}, x{rs2}"),
            Sltu { rd, rs1, rs2 } => write!(f, "sltu x{rd}, x{rs1}, x{rs2}"),
            Sll { rd, rs1, rs2 } => write!(f, "sll x{rd}, x{rs1}, x{rs2}"),
            Srl { rd, rs1, rs2 } => write!(f, "srl x{rd}, x{rs1}, x{rs2}"),
            Sra { rd, rs1, rs2 } => write!(f, "sra x{rd}, x{rs1}, x{rs2}"),

            Addi { rd, rs1, imm } => write!(f, "addi x{rd}, x{rs1}, {imm}"),
            Andi { rd, rs1, imm } => write!(f, "andi x{rd}, x{rs1}, {imm}"),
            Ori { rd, rs1, imm } => write!(f, "ori x{rd}, x{rs1}, {imm}"),
            Xori { rd, rs1, imm } => write!(f, "xori x{rd}, x{rs1}, {imm}"),
            Slti { rd, rs1, imm } => write!(f, "slti x{rd}, x{rs1}, {imm}"),
            Sltiu { rd, rs1, imm } => write!(f, "sltiu x{rd}, x{rs1}, {imm}"),
            Slli { rd, rs1, shamt } => write!(f, "slli x{rd}, x{rs1}, {shamt}"),
            Srli { rd, rs1, shamt } => write!(f, "srli x{rd}, x{rs1}, {shamt}"),
            Srai { rd, rs1, shamt } => write!(f, "srai x{rd}, x{rs1}, {shamt}"),

            Lb { rd, rs1, offset } => write!(f, "lb x{rd}, {offset}(x{rs1})"),
            Lh { rd, rs1, offset } => write!(f, "lh x{rd}, {offset}(x{rs1})"),
            Lw { rd, rs1, offset } => write!(f, "lw x{rd}, {offset}(x{rs1})"),
            Lbu { rd, rs1, offset } => write!(f, "lbu x{rd}, {offset}(x{rs1})"),
            Lhu { rd, rs1, offset } => write!(f, "lhu x{rd}, {offset}(x{rs1})"),

            Sb { rs1, rs2, offset } => write!(f, "sb x{rs2}, {offset}(x{rs1})"),
            Sh { rs1, rs2, offset } => write!(f, "sh x{rs2}, {offset}(x{rs1})"),
            Sw { rs1, rs2, offset } => write!(f, "sw x{rs2}, {offset}(x{rs1})"),

            Lui { rd, imm } => write!(f, "lui x{rd}, 0x{:x}", (imm as u32) >> 12),
            Auipc { rd, imm } => write!(f, "auipc x{rd}, 0x{:x}", (imm as u32) >> 12),

            Jal { rd, offset } => write!(f, "jal x{rd}, {offset}"),
            Jalr { rd, rs1, offset } => write!(f, "jalr x{rd}, {offset}(x{rs1})"),
            Beq { rs1, rs2, offset } => write!(f, "beq x{rs1}, x{rs2}, {offset}"),
            Bne { rs1, rs2, offset } => write!(f, "bne x{rs1}, x{rs2}, {offset}"),
            Blt { rs1, rs2, offset } => write!(f, "blt x{rs1}, x{rs2}, {offset}"),
            Bge { rs1, rs2, offset } => write!(f, "bge x{rs1}, x{rs2}, {offset}"),
            Bltu { rs1, rs2, offset } => write!(f, "bltu x{rs1}, x{rs2}, {offset}"),
            Bgeu { rs1, rs2, offset } => write!(f, "bgeu x{rs1}, x{rs2}, {offset}"),

            Ecall => f.write_str("ecall"),
            Ebreak => f.write_str("ebreak"),
            Fence => f.write_str("fence"),

            Unknown {
                opcode,
                funct3,
                funct7,
            } => write!(
                f,
                "unknown (opcode=0x{opcode:02x}, funct3={funct3}, funct7=0x{funct7:02x})"
            ),
        }
    }
}
