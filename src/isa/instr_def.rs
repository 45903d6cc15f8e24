//! 指令定义结构
//!
//! 统一的指令定义，同时用于归类和冲突检测

use super::instr::{Instruction, RvInstr};

/// 指令定义
///
/// 一处定义，两处使用：
/// - 归类：通过 mask/match 匹配后调用 build 函数
/// - 冲突检测：通过 mask/match 判断两条定义是否可能匹配同一指令字
#[derive(Clone)]
pub struct InstrDef {
    /// 指令名称（用于调试和冲突报告）
    pub name: &'static str,
    /// 匹配掩码：哪些位需要检查
    pub mask: u32,
    /// 匹配值：这些位应该是什么
    pub match_val: u32,
    /// 从解码后的字段构造 RvInstr
    pub build: fn(&Instruction) -> RvInstr,
}

impl InstrDef {
    pub const fn new(
        name: &'static str,
        mask: u32,
        match_val: u32,
        build: fn(&Instruction) -> RvInstr,
    ) -> Self {
        Self {
            name,
            mask,
            match_val,
            build,
        }
    }

    /// 检查指令是否匹配此定义
    #[inline]
    pub fn matches(&self, raw: u32) -> bool {
        (raw & self.mask) == self.match_val
    }

    /// 两个定义冲突当且仅当存在某个指令字同时匹配两者
    pub fn conflicts_with(&self, other: &InstrDef) -> bool {
        let common_mask = self.mask & other.mask;
        (self.match_val & common_mask) == (other.match_val & common_mask)
    }
}

impl std::fmt::Debug for InstrDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrDef")
            .field("name", &self.name)
            .field("mask", &format_args!("0x{:08X}", self.mask))
            .field("match_val", &format_args!("0x{:08X}", self.match_val))
            .finish()
    }
}

// ========== 类型掩码常量 ==========

/// 检查 opcode + funct3 + funct7
pub const R_TYPE_MASK: u32 = 0xFE00707F;

/// 检查 opcode + funct3（I/S/B 以及忽略 funct7 的 R-type）
pub const FUNCT3_MASK: u32 = 0x707F;

/// 只检查 opcode
pub const OPCODE_MASK: u32 = 0x7F;

/// 检查 opcode + imm[11:0]（用于 ECALL/EBREAK）
pub const SYSTEM_IMM_MASK: u32 = 0xFFF0007F;

// ========== 辅助函数：构造 match 值 ==========

#[inline]
pub const fn r_match(funct7: u32, funct3: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (funct3 << 12) | opcode
}

#[inline]
pub const fn i_match(funct3: u32, opcode: u32) -> u32 {
    (funct3 << 12) | opcode
}

#[inline]
pub const fn system_match(imm: u32, opcode: u32) -> u32 {
    (imm << 20) | opcode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::rv32i::RV32I_INSTRS;

    #[test]
    fn test_instr_def_matches() {
        let add_def = RV32I_INSTRS.iter().find(|d| d.name == "ADD").unwrap();

        // add x3, x1, x2
        assert!(add_def.matches(0x002081B3));
        // sub x3, x1, x2: funct7=0100000
        assert!(!add_def.matches(0x402081B3));
    }

    #[test]
    fn test_conflict_detection() {
        let def1 = InstrDef::new("TEST1", FUNCT3_MASK, 0x0033, |_| RvInstr::Ecall);
        let def2 = InstrDef::new("TEST2", OPCODE_MASK, 0x0033, |_| RvInstr::Ebreak);
        assert!(def1.conflicts_with(&def2));

        let srli = RV32I_INSTRS.iter().find(|d| d.name == "SRLI").unwrap();
        let srai = RV32I_INSTRS.iter().find(|d| d.name == "SRAI").unwrap();
        assert!(!srli.conflicts_with(srai));
    }

    #[test]
    fn test_rv32i_table_is_conflict_free() {
        for (i, a) in RV32I_INSTRS.iter().enumerate() {
            for b in &RV32I_INSTRS[i + 1..] {
                assert!(!a.conflicts_with(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_rv32i_coverage() {
        // RV32I 基础指令集共 40 条指令
        assert_eq!(RV32I_INSTRS.len(), 40);
    }
}
