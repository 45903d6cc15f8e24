//! RV32I 基础指令集归类表
//!
//! 基于表驱动：每条定义用 mask/match 在原始指令字上匹配。
//! 部分指令只检查必要的字段，比完整编码检查更宽松：
//! - JALR、FENCE 只检查 opcode
//! - SLLI 与 SLL/SLT/SLTU/XOR/OR/AND 不检查 funct7
//! - ECALL/EBREAK 只检查 opcode 与 imm[11:0]

use crate::isa::fields::*;
use crate::isa::instr::{Instruction, RvInstr};
use crate::isa::instr_def::{
    FUNCT3_MASK, InstrDef, OPCODE_MASK, R_TYPE_MASK, SYSTEM_IMM_MASK, i_match, r_match,
    system_match,
};

/// RV32I 指令定义表
pub static RV32I_INSTRS: &[InstrDef] = &[
    // ========== U-type ==========
    InstrDef::new("LUI", OPCODE_MASK, OP_LUI, |i| RvInstr::Lui {
        rd: i.rd,
        imm: i.imm,
    }),
    InstrDef::new("AUIPC", OPCODE_MASK, OP_AUIPC, |i| RvInstr::Auipc {
        rd: i.rd,
        imm: i.imm,
    }),

    // ========== 跳转 ==========
    InstrDef::new("JAL", OPCODE_MASK, OP_JAL, |i| RvInstr::Jal {
        rd: i.rd,
        offset: i.imm,
    }),
    InstrDef::new("JALR", OPCODE_MASK, OP_JALR, |i| RvInstr::Jalr {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),

    // ========== B-type ==========
    InstrDef::new("BEQ", FUNCT3_MASK, i_match(0b000, OP_BRANCH), |i| RvInstr::Beq {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("BNE", FUNCT3_MASK, i_match(0b001, OP_BRANCH), |i| RvInstr::Bne {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("BLT", FUNCT3_MASK, i_match(0b100, OP_BRANCH), |i| RvInstr::Blt {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("BGE", FUNCT3_MASK, i_match(0b101, OP_BRANCH), |i| RvInstr::Bge {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("BLTU", FUNCT3_MASK, i_match(0b110, OP_BRANCH), |i| RvInstr::Bltu {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("BGEU", FUNCT3_MASK, i_match(0b111, OP_BRANCH), |i| RvInstr::Bgeu {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),

    // ========== Load ==========
    InstrDef::new("LB", FUNCT3_MASK, i_match(0b000, OP_LOAD), |i| RvInstr::Lb {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),
    InstrDef::new("LH", FUNCT3_MASK, i_match(0b001, OP_LOAD), |i| RvInstr::Lh {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),
    InstrDef::new("LW", FUNCT3_MASK, i_match(0b010, OP_LOAD), |i| RvInstr::Lw {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),
    InstrDef::new("LBU", FUNCT3_MASK, i_match(0b100, OP_LOAD), |i| RvInstr::Lbu {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),
    InstrDef::new("LHU", FUNCT3_MASK, i_match(0b101, OP_LOAD), |i| RvInstr::Lhu {
        rd: i.rd,
        rs1: i.rs1,
        offset: i.imm,
    }),

    // ========== Store ==========
    InstrDef::new("SB", FUNCT3_MASK, i_match(0b000, OP_STORE), |i| RvInstr::Sb {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("SH", FUNCT3_MASK, i_match(0b001, OP_STORE), |i| RvInstr::Sh {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),
    InstrDef::new("SW", FUNCT3_MASK, i_match(0b010, OP_STORE), |i| RvInstr::Sw {
        rs1: i.rs1,
        rs2: i.rs2,
        offset: i.imm,
    }),

    // ========== I-type ALU ==========
    InstrDef::new("ADDI", FUNCT3_MASK, i_match(0b000, OP_IMM), |i| RvInstr::Addi {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),
    InstrDef::new("SLTI", FUNCT3_MASK, i_match(0b010, OP_IMM), |i| RvInstr::Slti {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),
    InstrDef::new("SLTIU", FUNCT3_MASK, i_match(0b011, OP_IMM), |i| RvInstr::Sltiu {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),
    InstrDef::new("XORI", FUNCT3_MASK, i_match(0b100, OP_IMM), |i| RvInstr::Xori {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),
    InstrDef::new("ORI", FUNCT3_MASK, i_match(0b110, OP_IMM), |i| RvInstr::Ori {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),
    InstrDef::new("ANDI", FUNCT3_MASK, i_match(0b111, OP_IMM), |i| RvInstr::Andi {
        rd: i.rd,
        rs1: i.rs1,
        imm: i.imm,
    }),

    // ========== Shift immediate ==========
    InstrDef::new("SLLI", FUNCT3_MASK, i_match(0b001, OP_IMM), |i| RvInstr::Slli {
        rd: i.rd,
        rs1: i.rs1,
        shamt: i.rs2,
    }),
    InstrDef::new("SRLI", R_TYPE_MASK, r_match(0b0000000, 0b101, OP_IMM), |i| RvInstr::Srli {
        rd: i.rd,
        rs1: i.rs1,
        shamt: i.rs2,
    }),
    InstrDef::new("SRAI", R_TYPE_MASK, r_match(0b0100000, 0b101, OP_IMM), |i| RvInstr::Srai {
        rd: i.rd,
        rs1: i.rs1,
        shamt: i.rs2,
    }),

    // ========== R-type ==========
    InstrDef::new("ADD", R_TYPE_MASK, r_match(0b0000000, 0b000, OP_REG), |i| RvInstr::Add {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SUB", R_TYPE_MASK, r_match(0b0100000, 0b000, OP_REG), |i| RvInstr::Sub {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SLL", FUNCT3_MASK, i_match(0b001, OP_REG), |i| RvInstr::Sll {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SLT", FUNCT3_MASK, i_match(0b010, OP_REG), |i| RvInstr::Slt {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SLTU", FUNCT3_MASK, i_match(0b011, OP_REG), |i| RvInstr::Sltu {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("XOR", FUNCT3_MASK, i_match(0b100, OP_REG), |i| RvInstr::Xor {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SRL", R_TYPE_MASK, r_match(0b0000000, 0b101, OP_REG), |i| RvInstr::Srl {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("SRA", R_TYPE_MASK, r_match(0b0100000, 0b101, OP_REG), |i| RvInstr::Sra {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("OR", FUNCT3_MASK, i_match(0b110, OP_REG), |i| RvInstr::Or {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),
    InstrDef::new("AND", FUNCT3_MASK, i_match(0b111, OP_REG), |i| RvInstr::And {
        rd: i.rd,
        rs1: i.rs1,
        rs2: i.rs2,
    }),

    // ========== Fence & 系统 ==========
    InstrDef::new("FENCE", OPCODE_MASK, OP_MISC_MEM, |_| RvInstr::Fence),
    InstrDef::new("ECALL", SYSTEM_IMM_MASK, system_match(0, OP_SYSTEM), |_| RvInstr::Ecall),
    InstrDef::new("EBREAK", SYSTEM_IMM_MASK, system_match(1, OP_SYSTEM), |_| RvInstr::Ebreak),
];

/// 在定义表中查找匹配项；没有匹配时归为 `Unknown`
pub fn classify(inst: &Instruction) -> RvInstr {
    RV32I_INSTRS
        .iter()
        .find(|def| def.matches(inst.raw))
        .map(|def| (def.build)(inst))
        .unwrap_or(RvInstr::Unknown {
            opcode: inst.opcode,
            funct3: inst.funct3,
            funct7: inst.funct7,
        })
}
