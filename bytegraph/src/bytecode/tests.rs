use super::*;
use anyhow::Result;

#[test]
fn decodes_linear_sequence() -> Result<()> {
    let code = [
        opcodes::ICONST_0,
        opcodes::ISTORE_1,
        opcodes::ILOAD_1,
        opcodes::IRETURN,
    ];
    let out = decode(&code, 0, code.len())?;
    assert_eq!(out.len(), 4);
    let offsets: Vec<u32> = out.iter().map(|i| i.offset).collect();
    assert_eq!(offsets, vec![0, 1, 2, 3]);
    assert_eq!(out[0].mnemonic(), "iconst_0");
    assert_eq!(out[3].mnemonic(), "ireturn");
    assert!(out.iter().all(|i| i.operands == Operands::None));
    Ok(())
}

#[test]
fn offsets_cover_range_exactly() -> Result<()> {
    // bipush 7; sipush 300; iinc 1 by -1; goto -6; return
    let code = [
        opcodes::BIPUSH,
        7,
        opcodes::SIPUSH,
        0x01,
        0x2C,
        opcodes::IINC,
        1,
        0xFF,
        opcodes::GOTO,
        0xFF,
        0xFA,
        opcodes::RETURN,
    ];
    let out = decode(&code, 0, code.len())?;
    for pair in out.windows(2) {
        assert_eq!(pair[0].end_offset(), pair[1].offset);
    }
    assert_eq!(out.last().map(Instruction::end_offset), Some(code.len() as u32));
    Ok(())
}

#[test]
fn decodes_branch_displacement_and_target() -> Result<()> {
    // offset 0: iload_1; offset 1: ifeq +5 -> 6
    let code = [
        opcodes::ILOAD_1,
        opcodes::IFEQ,
        0x00,
        0x05,
        opcodes::ICONST_0,
        opcodes::IRETURN,
        opcodes::ICONST_1,
        opcodes::IRETURN,
    ];
    let out = decode(&code, 0, code.len())?;
    assert_eq!(
        out[1].operands,
        Operands::Branch {
            displacement: 5,
            target: 6
        }
    );
    assert_eq!(out[1].branch_targets().as_slice(), &[6]);
    Ok(())
}

#[test]
fn decodes_goto_w() -> Result<()> {
    let code = [opcodes::GOTO_W, 0x00, 0x00, 0x00, 0x05, opcodes::RETURN];
    let out = decode(&code, 0, code.len())?;
    assert_eq!(out[0].length, 5);
    assert_eq!(
        out[0].operands,
        Operands::Branch {
            displacement: 5,
            target: 5
        }
    );
    Ok(())
}

#[test]
fn decodes_wide_forms() -> Result<()> {
    // wide iload 256; wide iinc 5 by -2; ireturn
    let code = [
        opcodes::WIDE,
        opcodes::ILOAD,
        0x01,
        0x00,
        opcodes::WIDE,
        opcodes::IINC,
        0x00,
        0x05,
        0xFF,
        0xFE,
        opcodes::IRETURN,
    ];
    let out = decode(&code, 0, code.len())?;
    assert_eq!(out.len(), 3);
    assert!(out[0].wide);
    assert_eq!(out[0].opcode, opcodes::ILOAD);
    assert_eq!(out[0].length, 4);
    assert_eq!(
        out[0].operands,
        Operands::Immediate(Immediates::from_slice(&[0x01, 0x00]))
    );
    assert!(out[1].wide);
    assert_eq!(out[1].length, 6);
    assert_eq!(out[2].offset, 10);
    Ok(())
}

#[test]
fn rejects_wide_on_non_widenable_opcode() {
    let code = [opcodes::WIDE, opcodes::IADD];
    assert_eq!(
        decode(&code, 0, code.len()),
        Err(MalformedBytecode::InvalidWideTarget {
            opcode: opcodes::IADD,
            offset: 0
        })
    );
}

#[test]
fn rejects_unknown_and_reserved_opcodes() {
    for byte in [0xCB, opcodes::BREAKPOINT, opcodes::IMPDEP1, opcodes::IMPDEP2] {
        let code = [byte];
        assert_eq!(
            decode(&code, 0, 1),
            Err(MalformedBytecode::UnknownOpcode {
                opcode: byte,
                offset: 0
            })
        );
    }
}

#[test]
fn rejects_truncated_operands() {
    let code = [opcodes::BIPUSH];
    assert_eq!(
        decode(&code, 0, 1),
        Err(MalformedBytecode::TruncatedOperands {
            mnemonic: "bipush",
            offset: 0
        })
    );
}

#[test]
fn rejects_range_past_buffer_end() {
    let code = [opcodes::NOP, opcodes::RETURN];
    assert_eq!(
        decode(&code, 1, 4),
        Err(MalformedBytecode::RangeOutOfBounds {
            start: 1,
            length: 4,
            available: 2
        })
    );
}

fn push_i32(code: &mut Vec<u8>, value: i32) {
    code.extend_from_slice(&value.to_be_bytes());
}

/// A tableswitch at code offset 0: three pad bytes, then default/low/high
/// and `high - low + 1` case displacements.
fn tableswitch_at_zero(low: i32, high: i32, default: i32, cases: &[i32]) -> Vec<u8> {
    let mut code = vec![opcodes::TABLESWITCH, 0, 0, 0];
    push_i32(&mut code, default);
    push_i32(&mut code, low);
    push_i32(&mut code, high);
    for &c in cases {
        push_i32(&mut code, c);
    }
    code
}

#[test]
fn decodes_tableswitch() -> Result<()> {
    let mut code = tableswitch_at_zero(1, 2, 28, &[24, 26]);
    assert_eq!(code.len(), 24);
    code.extend_from_slice(&[
        opcodes::ICONST_0,
        opcodes::IRETURN,
        opcodes::ICONST_1,
        opcodes::IRETURN,
        opcodes::ICONST_2,
        opcodes::IRETURN,
    ]);
    let out = decode(&code, 0, code.len())?;
    assert_eq!(out[0].length, 24);
    match &out[0].operands {
        Operands::TableSwitch {
            low,
            high,
            cases,
            default,
        } => {
            assert_eq!((*low, *high), (1, 2));
            assert_eq!(cases.iter().map(|c| c.target).collect::<Vec<_>>(), vec![24, 26]);
            assert_eq!(default.target, 28);
        }
        other => panic!("expected tableswitch operands, got {other:?}"),
    }
    assert_eq!(out[0].branch_targets().as_slice(), &[24, 26, 28]);
    Ok(())
}

#[test]
fn switch_padding_is_relative_to_code_start() -> Result<()> {
    // The same switch, embedded two bytes into a larger buffer: padding is
    // computed from the code-relative offset, not the buffer index.
    let mut buffer = vec![0xEE, 0xEE];
    let mut code = tableswitch_at_zero(0, 0, 20, &[20]);
    code.push(opcodes::NOP);
    buffer.extend_from_slice(&code);
    let out = decode(&buffer, 2, code.len())?;
    assert_eq!(out[0].offset, 0);
    assert_eq!(out[0].length, 20);
    assert_eq!(out[1].offset, 20);
    Ok(())
}

#[test]
fn rejects_inverted_tableswitch_bounds() {
    let code = tableswitch_at_zero(1, 0, 16, &[]);
    assert_eq!(
        decode(&code, 0, code.len()),
        Err(MalformedBytecode::InvertedSwitchBounds {
            offset: 0,
            low: 1,
            high: 0
        })
    );
}

#[test]
fn rejects_tableswitch_overrunning_range() {
    // Declares 16 cases but carries only one.
    let code = tableswitch_at_zero(0, 15, 99, &[99]);
    assert_eq!(
        decode(&code, 0, code.len()),
        Err(MalformedBytecode::TruncatedOperands {
            mnemonic: "tableswitch",
            offset: 0
        })
    );
}

#[test]
fn decodes_lookupswitch() -> Result<()> {
    let mut code = vec![opcodes::LOOKUPSWITCH, 0, 0, 0];
    push_i32(&mut code, 28); // default
    push_i32(&mut code, 2); // npairs
    push_i32(&mut code, -1);
    push_i32(&mut code, 28);
    push_i32(&mut code, 10);
    push_i32(&mut code, 29);
    code.extend_from_slice(&[opcodes::RETURN, opcodes::RETURN]);
    let out = decode(&code, 0, code.len())?;
    match &out[0].operands {
        Operands::LookupSwitch { pairs, default } => {
            assert_eq!(pairs.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![-1, 10]);
            assert_eq!(pairs[0].1.target, 28);
            assert_eq!(pairs[1].1.target, 29);
            assert_eq!(default.target, 28);
        }
        other => panic!("expected lookupswitch operands, got {other:?}"),
    }
    Ok(())
}

#[test]
fn rejects_negative_lookupswitch_count() {
    let mut code = vec![opcodes::LOOKUPSWITCH, 0, 0, 0];
    push_i32(&mut code, 12);
    push_i32(&mut code, -1);
    assert_eq!(
        decode(&code, 0, code.len()),
        Err(MalformedBytecode::NegativeSwitchCount {
            offset: 0,
            npairs: -1
        })
    );
}
