//! Instruction stream decoding.
//!
//! [`decode`] walks a method's code array and produces one immutable
//! [`Instruction`] record per encoded instruction. Offsets are relative to
//! the start of the range, matching the JVM's branch and switch semantics.
//! The decoder performs no control-flow classification; it only exposes the
//! encoded displacements and the derived absolute targets verbatim.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use super::opcodes;

/// Raw immediate operand bytes kept opaque for the caller (constant-pool
/// indices, local variable indices, array type codes).
pub type Immediates = SmallVec<[u8; 4]>;

/// Decoder-level failure. Unrecoverable for the affected method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBytecode {
    /// The requested code range does not fit in the supplied buffer.
    #[error("code range starting at {start} with length {length} exceeds the {available}-byte buffer")]
    RangeOutOfBounds {
        /// Requested start index.
        start: usize,
        /// Requested range length.
        length: usize,
        /// Buffer size actually available.
        available: usize,
    },
    /// A reserved or unassigned byte value in opcode position.
    #[error("unknown or reserved opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode {
        /// The offending byte.
        opcode: u8,
        /// Code-relative offset of the byte.
        offset: u32,
    },
    /// An instruction's declared operands run past the end of the range.
    #[error("operands of `{mnemonic}` at offset {offset} run past the end of the code")]
    TruncatedOperands {
        /// Mnemonic of the truncated instruction.
        mnemonic: &'static str,
        /// Code-relative offset of the instruction.
        offset: u32,
    },
    /// A `wide` prefix applied to an opcode that has no wide form.
    #[error("wide prefix at offset {offset} applied to non-widenable opcode 0x{opcode:02x}")]
    InvalidWideTarget {
        /// The opcode following the prefix.
        opcode: u8,
        /// Code-relative offset of the prefix.
        offset: u32,
    },
    /// A `tableswitch` whose `low` bound exceeds its `high` bound.
    #[error("tableswitch at offset {offset} declares low {low} greater than high {high}")]
    InvertedSwitchBounds {
        /// Code-relative offset of the instruction.
        offset: u32,
        /// Declared low key.
        low: i32,
        /// Declared high key.
        high: i32,
    },
    /// A `lookupswitch` declaring a negative pair count.
    #[error("lookupswitch at offset {offset} declares negative pair count {npairs}")]
    NegativeSwitchCount {
        /// Code-relative offset of the instruction.
        offset: u32,
        /// Declared pair count.
        npairs: i32,
    },
}

/// One switch destination: the encoded displacement and the derived
/// absolute code-relative target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTarget {
    /// Signed displacement relative to the switch instruction.
    pub displacement: i32,
    /// Absolute code-relative target offset.
    pub target: i64,
}

/// Decoded operand payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    /// No operands.
    None,
    /// Opaque immediate bytes, kept verbatim.
    Immediate(Immediates),
    /// A single branch destination.
    Branch {
        /// Signed displacement relative to this instruction.
        displacement: i32,
        /// Absolute code-relative target offset.
        target: i64,
    },
    /// `tableswitch`: a dense jump table over `low..=high`.
    TableSwitch {
        /// Lowest case key.
        low: i32,
        /// Highest case key.
        high: i32,
        /// One destination per key, in key order.
        cases: Vec<SwitchTarget>,
        /// Destination when no key matches.
        default: SwitchTarget,
    },
    /// `lookupswitch`: sorted `(key, destination)` pairs.
    LookupSwitch {
        /// Match pairs in encoded order.
        pairs: Vec<(i32, SwitchTarget)>,
        /// Destination when no key matches.
        default: SwitchTarget,
    },
}

/// One decoded instruction. Immutable after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Code-relative byte offset of the opcode (of the `wide` prefix for
    /// widened instructions).
    pub offset: u32,
    /// The opcode byte, with any `wide` prefix stripped.
    pub opcode: u8,
    /// Whether the instruction was preceded by the `wide` prefix.
    pub wide: bool,
    /// Total encoded length in bytes, padding and prefix included.
    pub length: u32,
    /// Decoded operand payload.
    pub operands: Operands,
}

impl Instruction {
    /// Mnemonic of the opcode, without the `wide ` prefix.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        opcodes::mnemonic(self.opcode).unwrap_or("<invalid>")
    }

    /// Code-relative offset of the byte just past this instruction.
    #[must_use]
    pub const fn end_offset(&self) -> u32 {
        self.offset + self.length
    }

    /// Absolute code-relative offsets this instruction may branch to, in
    /// encoded order (switch default last).
    #[must_use]
    pub fn branch_targets(&self) -> SmallVec<[i64; 2]> {
        match &self.operands {
            Operands::Branch { target, .. } => SmallVec::from_slice(&[*target]),
            Operands::TableSwitch { cases, default, .. } => cases
                .iter()
                .map(|c| c.target)
                .chain(std::iter::once(default.target))
                .collect(),
            Operands::LookupSwitch { pairs, default } => pairs
                .iter()
                .map(|(_, c)| c.target)
                .chain(std::iter::once(default.target))
                .collect(),
            Operands::None | Operands::Immediate(_) => SmallVec::new(),
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn i16(&mut self) -> Option<i16> {
        self.take(2).map(|b| i16::from_be_bytes([b[0], b[1]]))
    }

    fn i32(&mut self) -> Option<i32> {
        self.take(4).map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Decodes the instruction stream covering `[start, start + length)`.
///
/// Offsets in the returned records are relative to `start`. Fails with
/// [`MalformedBytecode`] when an opcode's declared operand width would read
/// past the end of the range, or when a switch instruction's internal count
/// fields are inconsistent with the remaining length.
pub fn decode(
    bytes: &[u8],
    start: usize,
    length: usize,
) -> Result<Vec<Instruction>, MalformedBytecode> {
    let end = start
        .checked_add(length)
        .filter(|&e| e <= bytes.len())
        .ok_or(MalformedBytecode::RangeOutOfBounds {
            start,
            length,
            available: bytes.len(),
        })?;

    let mut r = Reader {
        buf: &bytes[start..end],
        pos: 0,
    };
    let mut out = Vec::new();

    while r.pos < r.buf.len() {
        #[allow(clippy::cast_possible_truncation)]
        let offset = r.pos as u32;
        let Some(op) = r.u8() else { break };
        let (opcode, wide, operands) = match op {
            opcodes::WIDE => decode_wide(&mut r, offset)?,
            opcodes::TABLESWITCH => (op, false, decode_tableswitch(&mut r, offset)?),
            opcodes::LOOKUPSWITCH => (op, false, decode_lookupswitch(&mut r, offset)?),
            _ => (op, false, decode_fixed(&mut r, op, offset)?),
        };
        #[allow(clippy::cast_possible_truncation)]
        let length = r.pos as u32 - offset;
        out.push(Instruction {
            offset,
            opcode,
            wide,
            length,
            operands,
        });
    }

    debug!(instructions = out.len(), bytes = length, "decoded instruction stream");
    Ok(out)
}

fn truncated(op: u8, offset: u32) -> MalformedBytecode {
    MalformedBytecode::TruncatedOperands {
        mnemonic: opcodes::mnemonic(op).unwrap_or("<invalid>"),
        offset,
    }
}

fn decode_fixed(
    r: &mut Reader<'_>,
    op: u8,
    offset: u32,
) -> Result<Operands, MalformedBytecode> {
    let Some(width) = opcodes::fixed_operand_width(op) else {
        return Err(MalformedBytecode::UnknownOpcode { opcode: op, offset });
    };
    if opcodes::is_conditional_branch(op) || op == opcodes::GOTO || op == opcodes::JSR {
        let displacement = i32::from(r.i16().ok_or_else(|| truncated(op, offset))?);
        return Ok(Operands::Branch {
            displacement,
            target: i64::from(offset) + i64::from(displacement),
        });
    }
    if op == opcodes::GOTO_W || op == opcodes::JSR_W {
        let displacement = r.i32().ok_or_else(|| truncated(op, offset))?;
        return Ok(Operands::Branch {
            displacement,
            target: i64::from(offset) + i64::from(displacement),
        });
    }
    if width == 0 {
        return Ok(Operands::None);
    }
    let raw = r
        .take(usize::from(width))
        .ok_or_else(|| truncated(op, offset))?;
    Ok(Operands::Immediate(Immediates::from_slice(raw)))
}

fn decode_wide(r: &mut Reader<'_>, offset: u32) -> Result<(u8, bool, Operands), MalformedBytecode> {
    let op = r.u8().ok_or_else(|| truncated(opcodes::WIDE, offset))?;
    if !opcodes::is_widenable(op) {
        return Err(MalformedBytecode::InvalidWideTarget { opcode: op, offset });
    }
    // `wide iinc` takes a 16-bit index plus a 16-bit constant; every other
    // widened opcode takes just the 16-bit index.
    let width = if op == opcodes::IINC { 4 } else { 2 };
    let raw = r.take(width).ok_or_else(|| truncated(op, offset))?;
    Ok((op, true, Operands::Immediate(Immediates::from_slice(raw))))
}

fn switch_target(offset: u32, displacement: i32) -> SwitchTarget {
    SwitchTarget {
        displacement,
        target: i64::from(offset) + i64::from(displacement),
    }
}

/// Skips the 0-3 pad bytes aligning a switch body to a 4-byte boundary
/// relative to code start.
fn skip_padding(r: &mut Reader<'_>, op: u8, offset: u32) -> Result<(), MalformedBytecode> {
    let pad = (4 - (offset as usize + 1) % 4) % 4;
    r.take(pad).ok_or_else(|| truncated(op, offset))?;
    Ok(())
}

fn decode_tableswitch(r: &mut Reader<'_>, offset: u32) -> Result<Operands, MalformedBytecode> {
    let op = opcodes::TABLESWITCH;
    skip_padding(r, op, offset)?;
    let default = r.i32().ok_or_else(|| truncated(op, offset))?;
    let low = r.i32().ok_or_else(|| truncated(op, offset))?;
    let high = r.i32().ok_or_else(|| truncated(op, offset))?;
    if low > high {
        return Err(MalformedBytecode::InvertedSwitchBounds { offset, low, high });
    }
    let count = i64::from(high) - i64::from(low) + 1;
    if count > (r.remaining() / 4) as i64 {
        return Err(truncated(op, offset));
    }
    #[allow(clippy::cast_possible_truncation)]
    let mut cases = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let displacement = r.i32().ok_or_else(|| truncated(op, offset))?;
        cases.push(switch_target(offset, displacement));
    }
    Ok(Operands::TableSwitch {
        low,
        high,
        cases,
        default: switch_target(offset, default),
    })
}

fn decode_lookupswitch(r: &mut Reader<'_>, offset: u32) -> Result<Operands, MalformedBytecode> {
    let op = opcodes::LOOKUPSWITCH;
    skip_padding(r, op, offset)?;
    let default = r.i32().ok_or_else(|| truncated(op, offset))?;
    let npairs = r.i32().ok_or_else(|| truncated(op, offset))?;
    if npairs < 0 {
        return Err(MalformedBytecode::NegativeSwitchCount { offset, npairs });
    }
    if i64::from(npairs) > (r.remaining() / 8) as i64 {
        return Err(truncated(op, offset));
    }
    #[allow(clippy::cast_sign_loss)]
    let mut pairs = Vec::with_capacity(npairs as usize);
    for _ in 0..npairs {
        let key = r.i32().ok_or_else(|| truncated(op, offset))?;
        let displacement = r.i32().ok_or_else(|| truncated(op, offset))?;
        pairs.push((key, switch_target(offset, displacement)));
    }
    Ok(Operands::LookupSwitch {
        pairs,
        default: switch_target(offset, default),
    })
}
