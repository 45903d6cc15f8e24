//! RV32I 指令字段
//!
//! 所有字段都在固定的位位置上；立即数按格式重新拼接后做符号扩展。

/// 取出 `raw[hi:lo]`（含两端），结果右对齐
#[inline]
pub const fn bits(raw: u32, hi: u32, lo: u32) -> u32 {
    (raw >> lo) & (u32::MAX >> (31 - (hi - lo)))
}

/// 把低 `width` 位视为补码并扩展到 32 位
#[inline]
pub const fn sign_extend(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

#[inline]
pub fn opcode(raw: u32) -> u32 {
    bits(raw, 6, 0)
}

#[inline]
pub fn rd(raw: u32) -> u8 {
    bits(raw, 11, 7) as u8
}

#[inline]
pub fn funct3(raw: u32) -> u32 {
    bits(raw, 14, 12)
}

#[inline]
pub fn rs1(raw: u32) -> u8 {
    bits(raw, 19, 15) as u8
}

/// 移位立即数指令也把这个字段当作 shamt
#[inline]
pub fn rs2(raw: u32) -> u8 {
    bits(raw, 24, 20) as u8
}

#[inline]
pub fn funct7(raw: u32) -> u32 {
    bits(raw, 31, 25)
}

/// I 型：imm[11:0] = raw[31:20]
#[inline]
pub fn imm_i(raw: u32) -> i32 {
    sign_extend(bits(raw, 31, 20), 12)
}

/// S 型：imm[11:5] = raw[31:25]，imm[4:0] = raw[11:7]
#[inline]
pub fn imm_s(raw: u32) -> i32 {
    sign_extend(bits(raw, 31, 25) << 5 | bits(raw, 11, 7), 12)
}

/// B 型：13 位偏移，最低位恒为 0
#[inline]
pub fn imm_b(raw: u32) -> i32 {
    let value = bits(raw, 31, 31) << 12
        | bits(raw, 7, 7) << 11
        | bits(raw, 30, 25) << 5
        | bits(raw, 11, 8) << 1;
    sign_extend(value, 13)
}

/// U 型：高 20 位原位保留，低 12 位为 0
#[inline]
pub fn imm_u(raw: u32) -> i32 {
    (raw & !0xFFF) as i32
}

/// J 型：21 位偏移，最低位恒为 0
#[inline]
pub fn imm_j(raw: u32) -> i32 {
    let value = bits(raw, 31, 31) << 20
        | bits(raw, 19, 12) << 12
        | bits(raw, 20, 20) << 11
        | bits(raw, 30, 21) << 1;
    sign_extend(value, 21)
}

// ========== Opcode 常量 ==========
pub const OP_LUI: u32 = 0b0110111;
pub const OP_AUIPC: u32 = 0b0010111;
pub const OP_JAL: u32 = 0b1101111;
pub const OP_JALR: u32 = 0b1100111;
pub const OP_BRANCH: u32 = 0b1100011;
pub const OP_LOAD: u32 = 0b0000011;
pub const OP_STORE: u32 = 0b0100011;
pub const OP_MISC_MEM: u32 = 0b0001111;
pub const OP_IMM: u32 = 0b0010011;
pub const OP_REG: u32 = 0b0110011;
pub const OP_SYSTEM: u32 = 0b1110011;
