//! ISA 模块测试

use super::*;

#[test]
fn test_decode_addi_fields() {
    let inst = decode(0x00A00093); // addi x1, x0, 10
    assert_eq!(
        inst,
        Instruction {
            raw: 0x00A00093,
            opcode: 0x13,
            rd: 1,
            rs1: 0,
            rs2: 10,
            funct3: 0,
            funct7: 0,
            imm: 10,
        }
    );
    assert_eq!(inst.op(), RvInstr::Addi { rd: 1, rs1: 0, imm: 10 });
}

#[test]
fn test_decode_addi_negative() {
    let inst = decode(0xFFF00113); // addi x2, x0, -1
    assert_eq!(inst.imm, -1);
    assert_eq!(inst.op(), RvInstr::Addi { rd: 2, rs1: 0, imm: -1 });
}

#[test]
fn test_decode_add_sub() {
    assert_eq!(
        decode(0x002081B3).op(), // add x3, x1, x2
        RvInstr::Add { rd: 3, rs1: 1, rs2: 2 }
    );
    assert_eq!(
        decode(0x402081B3).op(), // sub x3, x1, x2
        RvInstr::Sub { rd: 3, rs1: 1, rs2: 2 }
    );
}

#[test]
fn test_r_type_has_no_immediate() {
    let inst = decode(0x402081B3);
    assert_eq!(inst.funct7, 0x20);
    assert_eq!(inst.imm, 0);
}

#[test]
fn test_decode_lw_sw() {
    assert_eq!(
        decode(0x00412083).op(), // lw x1, 4(x2)
        RvInstr::Lw { rd: 1, rs1: 2, offset: 4 }
    );
    assert_eq!(
        decode(0x00112423).op(), // sw x1, 8(x2)
        RvInstr::Sw { rs1: 2, rs2: 1, offset: 8 }
    );
}

#[test]
fn test_decode_branch_sign_extension() {
    assert_eq!(
        decode(0x00208463).op(), // beq x1, x2, 8
        RvInstr::Beq { rs1: 1, rs2: 2, offset: 8 }
    );

    // 只有 imm[12] 置位：13 位字段 0x1000 的补码为 -4096
    let inst = decode(0x80000063);
    assert_eq!(inst.imm, -4096);

    let inst = decode(0xFE314CE3); // blt x2, x3, -8
    assert_eq!(inst.op(), RvInstr::Blt { rs1: 2, rs2: 3, offset: -8 });
}

#[test]
fn test_decode_jal_lui() {
    assert_eq!(decode(0x000000EF).op(), RvInstr::Jal { rd: 1, offset: 0 });
    assert_eq!(decode(0xFFDFF06F).imm, -4);
    assert_eq!(
        decode(0x123450B7).op(), // lui x1, 0x12345
        RvInstr::Lui { rd: 1, imm: 0x12345000 }
    );
}

#[test]
fn test_decode_system() {
    assert_eq!(decode(0x00000073).op(), RvInstr::Ecall);
    assert_eq!(decode(0x00100073).op(), RvInstr::Ebreak);
    // imm 为 2 的 SYSTEM 指令不是 ECALL/EBREAK
    assert!(matches!(decode(0x00200073).op(), RvInstr::Unknown { opcode: 0x73, .. }));
    // 只看 imm：funct3/rs1/rd 不为 0 仍按 ECALL 处理
    assert_eq!(decode(0x000293F3).op(), RvInstr::Ecall);
}

#[test]
fn test_decode_fence_ignores_operands() {
    assert_eq!(decode(0x0FF0000F).op(), RvInstr::Fence);
    assert_eq!(decode(0x0FF0000F).imm, 0);
}

#[test]
fn test_decode_zero_word_is_unknown() {
    let inst = decode(0x00000000);
    assert_eq!(inst.opcode, 0);
    assert_eq!(inst.imm, 0);
    assert_eq!(
        inst.op(),
        RvInstr::Unknown {
            opcode: 0,
            funct3: 0,
            funct7: 0
        }
    );
}

#[test]
fn test_shift_immediate_funct7_rules() {
    // slli 不检查 funct7
    assert_eq!(
        decode(0x40509113).op(),
        RvInstr::Slli { rd: 2, rs1: 1, shamt: 5 }
    );
    assert_eq!(
        decode(0x4030D113).op(), // srai x2, x1, 3
        RvInstr::Srai { rd: 2, rs1: 1, shamt: 3 }
    );
    // srli/srai 之外的 funct7 归为 Unknown
    assert!(matches!(decode(0x0230D113).op(), RvInstr::Unknown { funct7: 0x01, .. }));
}

#[test]
fn test_register_ops_funct7_rules() {
    // mul x3, x1, x2：funct3=0 且 funct7 既非 0x00 也非 0x20
    assert!(matches!(decode(0x022081B3).op(), RvInstr::Unknown { opcode: 0x33, .. }));
    // mulh 的编码与 sll 只差 funct7，按 sll 执行
    assert_eq!(
        decode(0x022091B3).op(),
        RvInstr::Sll { rd: 3, rs1: 1, rs2: 2 }
    );
}

#[test]
fn test_jalr_ignores_funct3() {
    assert_eq!(
        decode(0x0000B067).op(),
        RvInstr::Jalr { rd: 0, rs1: 1, offset: 0 }
    );
}

#[test]
fn test_display() {
    assert_eq!(decode(0x00A00093).op().to_string(), "addi x1, x0, 10");
    assert_eq!(decode(0x00112423).op().to_string(), "sw x1, 8(x2)");
    assert_eq!(decode(0x123450B7).op().to_string(), "lui x1, 0x12345");
    assert_eq!(decode(0x00000073).op().to_string(), "ecall");
}
