//! Opcode constants, mnemonics, operand widths, and category predicates
//! for the standard JVM instruction set.
//!
//! Instructions are variable length (1 to 5 bytes for the fixed forms),
//! with a single opcode byte followed by big-endian operands. The
//! `tableswitch`/`lookupswitch` forms are padded to a 4-byte boundary and
//! carry their own length fields; the `wide` prefix widens the local
//! variable index of the opcode that follows it.

// Constants
/// Do nothing.
pub const NOP: u8 = 0x00;
/// Push null reference.
pub const ACONST_NULL: u8 = 0x01;
/// Push int constant -1.
pub const ICONST_M1: u8 = 0x02;
/// Push int constant 0.
pub const ICONST_0: u8 = 0x03;
/// Push int constant 1.
pub const ICONST_1: u8 = 0x04;
/// Push int constant 2.
pub const ICONST_2: u8 = 0x05;
/// Push int constant 3.
pub const ICONST_3: u8 = 0x06;
/// Push int constant 4.
pub const ICONST_4: u8 = 0x07;
/// Push int constant 5.
pub const ICONST_5: u8 = 0x08;
/// Push long constant 0.
pub const LCONST_0: u8 = 0x09;
/// Push long constant 1.
pub const LCONST_1: u8 = 0x0A;
/// Push float constant 0.0.
pub const FCONST_0: u8 = 0x0B;
/// Push float constant 1.0.
pub const FCONST_1: u8 = 0x0C;
/// Push float constant 2.0.
pub const FCONST_2: u8 = 0x0D;
/// Push double constant 0.0.
pub const DCONST_0: u8 = 0x0E;
/// Push double constant 1.0.
pub const DCONST_1: u8 = 0x0F;
/// Push sign-extended byte.
pub const BIPUSH: u8 = 0x10;
/// Push sign-extended short.
pub const SIPUSH: u8 = 0x11;
/// Push from constant pool (1-byte index).
pub const LDC: u8 = 0x12;
/// Push from constant pool (2-byte index).
pub const LDC_W: u8 = 0x13;
/// Push long or double from constant pool.
pub const LDC2_W: u8 = 0x14;

// Loads
/// Load int from local variable.
pub const ILOAD: u8 = 0x15;
/// Load long from local variable.
pub const LLOAD: u8 = 0x16;
/// Load float from local variable.
pub const FLOAD: u8 = 0x17;
/// Load double from local variable.
pub const DLOAD: u8 = 0x18;
/// Load reference from local variable.
pub const ALOAD: u8 = 0x19;
/// Load int from local 0.
pub const ILOAD_0: u8 = 0x1A;
/// Load int from local 1.
pub const ILOAD_1: u8 = 0x1B;
/// Load int from local 2.
pub const ILOAD_2: u8 = 0x1C;
/// Load int from local 3.
pub const ILOAD_3: u8 = 0x1D;
/// Load long from local 0.
pub const LLOAD_0: u8 = 0x1E;
/// Load long from local 1.
pub const LLOAD_1: u8 = 0x1F;
/// Load long from local 2.
pub const LLOAD_2: u8 = 0x20;
/// Load long from local 3.
pub const LLOAD_3: u8 = 0x21;
/// Load float from local 0.
pub const FLOAD_0: u8 = 0x22;
/// Load float from local 1.
pub const FLOAD_1: u8 = 0x23;
/// Load float from local 2.
pub const FLOAD_2: u8 = 0x24;
/// Load float from local 3.
pub const FLOAD_3: u8 = 0x25;
/// Load double from local 0.
pub const DLOAD_0: u8 = 0x26;
/// Load double from local 1.
pub const DLOAD_1: u8 = 0x27;
/// Load double from local 2.
pub const DLOAD_2: u8 = 0x28;
/// Load double from local 3.
pub const DLOAD_3: u8 = 0x29;
/// Load reference from local 0.
pub const ALOAD_0: u8 = 0x2A;
/// Load reference from local 1.
pub const ALOAD_1: u8 = 0x2B;
/// Load reference from local 2.
pub const ALOAD_2: u8 = 0x2C;
/// Load reference from local 3.
pub const ALOAD_3: u8 = 0x2D;
/// Load int from array.
pub const IALOAD: u8 = 0x2E;
/// Load long from array.
pub const LALOAD: u8 = 0x2F;
/// Load float from array.
pub const FALOAD: u8 = 0x30;
/// Load double from array.
pub const DALOAD: u8 = 0x31;
/// Load reference from array.
pub const AALOAD: u8 = 0x32;
/// Load byte or boolean from array.
pub const BALOAD: u8 = 0x33;
/// Load char from array.
pub const CALOAD: u8 = 0x34;
/// Load short from array.
pub const SALOAD: u8 = 0x35;

// Stores
/// Store int to local variable.
pub const ISTORE: u8 = 0x36;
/// Store long to local variable.
pub const LSTORE: u8 = 0x37;
/// Store float to local variable.
pub const FSTORE: u8 = 0x38;
/// Store double to local variable.
pub const DSTORE: u8 = 0x39;
/// Store reference to local variable.
pub const ASTORE: u8 = 0x3A;
/// Store int to local 0.
pub const ISTORE_0: u8 = 0x3B;
/// Store int to local 1.
pub const ISTORE_1: u8 = 0x3C;
/// Store int to local 2.
pub const ISTORE_2: u8 = 0x3D;
/// Store int to local 3.
pub const ISTORE_3: u8 = 0x3E;
/// Store long to local 0.
pub const LSTORE_0: u8 = 0x3F;
/// Store long to local 1.
pub const LSTORE_1: u8 = 0x40;
/// Store long to local 2.
pub const LSTORE_2: u8 = 0x41;
/// Store long to local 3.
pub const LSTORE_3: u8 = 0x42;
/// Store float to local 0.
pub const FSTORE_0: u8 = 0x43;
/// Store float to local 1.
pub const FSTORE_1: u8 = 0x44;
/// Store float to local 2.
pub const FSTORE_2: u8 = 0x45;
/// Store float to local 3.
pub const FSTORE_3: u8 = 0x46;
/// Store double to local 0.
pub const DSTORE_0: u8 = 0x47;
/// Store double to local 1.
pub const DSTORE_1: u8 = 0x48;
/// Store double to local 2.
pub const DSTORE_2: u8 = 0x49;
/// Store double to local 3.
pub const DSTORE_3: u8 = 0x4A;
/// Store reference to local 0.
pub const ASTORE_0: u8 = 0x4B;
/// Store reference to local 1.
pub const ASTORE_1: u8 = 0x4C;
/// Store reference to local 2.
pub const ASTORE_2: u8 = 0x4D;
/// Store reference to local 3.
pub const ASTORE_3: u8 = 0x4E;
/// Store int to array.
pub const IASTORE: u8 = 0x4F;
/// Store long to array.
pub const LASTORE: u8 = 0x50;
/// Store float to array.
pub const FASTORE: u8 = 0x51;
/// Store double to array.
pub const DASTORE: u8 = 0x52;
/// Store reference to array.
pub const AASTORE: u8 = 0x53;
/// Store byte or boolean to array.
pub const BASTORE: u8 = 0x54;
/// Store char to array.
pub const CASTORE: u8 = 0x55;
/// Store short to array.
pub const SASTORE: u8 = 0x56;

// Stack
/// Pop top stack value.
pub const POP: u8 = 0x57;
/// Pop top two stack values.
pub const POP2: u8 = 0x58;
/// Duplicate top stack value.
pub const DUP: u8 = 0x59;
/// Duplicate top and insert below second.
pub const DUP_X1: u8 = 0x5A;
/// Duplicate top and insert below third.
pub const DUP_X2: u8 = 0x5B;
/// Duplicate top two stack values.
pub const DUP2: u8 = 0x5C;
/// Duplicate top two and insert below third.
pub const DUP2_X1: u8 = 0x5D;
/// Duplicate top two and insert below fourth.
pub const DUP2_X2: u8 = 0x5E;
/// Swap top two stack values.
pub const SWAP: u8 = 0x5F;

// Arithmetic
/// Add int.
pub const IADD: u8 = 0x60;
/// Add long.
pub const LADD: u8 = 0x61;
/// Add float.
pub const FADD: u8 = 0x62;
/// Add double.
pub const DADD: u8 = 0x63;
/// Subtract int.
pub const ISUB: u8 = 0x64;
/// Subtract long.
pub const LSUB: u8 = 0x65;
/// Subtract float.
pub const FSUB: u8 = 0x66;
/// Subtract double.
pub const DSUB: u8 = 0x67;
/// Multiply int.
pub const IMUL: u8 = 0x68;
/// Multiply long.
pub const LMUL: u8 = 0x69;
/// Multiply float.
pub const FMUL: u8 = 0x6A;
/// Multiply double.
pub const DMUL: u8 = 0x6B;
/// Divide int.
pub const IDIV: u8 = 0x6C;
/// Divide long.
pub const LDIV: u8 = 0x6D;
/// Divide float.
pub const FDIV: u8 = 0x6E;
/// Divide double.
pub const DDIV: u8 = 0x6F;
/// Remainder int.
pub const IREM: u8 = 0x70;
/// Remainder long.
pub const LREM: u8 = 0x71;
/// Remainder float.
pub const FREM: u8 = 0x72;
/// Remainder double.
pub const DREM: u8 = 0x73;
/// Negate int.
pub const INEG: u8 = 0x74;
/// Negate long.
pub const LNEG: u8 = 0x75;
/// Negate float.
pub const FNEG: u8 = 0x76;
/// Negate double.
pub const DNEG: u8 = 0x77;
/// Shift left int.
pub const ISHL: u8 = 0x78;
/// Shift left long.
pub const LSHL: u8 = 0x79;
/// Arithmetic shift right int.
pub const ISHR: u8 = 0x7A;
/// Arithmetic shift right long.
pub const LSHR: u8 = 0x7B;
/// Logical shift right int.
pub const IUSHR: u8 = 0x7C;
/// Logical shift right long.
pub const LUSHR: u8 = 0x7D;
/// Bitwise AND int.
pub const IAND: u8 = 0x7E;
/// Bitwise AND long.
pub const LAND: u8 = 0x7F;
/// Bitwise OR int.
pub const IOR: u8 = 0x80;
/// Bitwise OR long.
pub const LOR: u8 = 0x81;
/// Bitwise XOR int.
pub const IXOR: u8 = 0x82;
/// Bitwise XOR long.
pub const LXOR: u8 = 0x83;
/// Increment local variable by constant.
pub const IINC: u8 = 0x84;

// Conversions
/// Convert int to long.
pub const I2L: u8 = 0x85;
/// Convert int to float.
pub const I2F: u8 = 0x86;
/// Convert int to double.
pub const I2D: u8 = 0x87;
/// Convert long to int.
pub const L2I: u8 = 0x88;
/// Convert long to float.
pub const L2F: u8 = 0x89;
/// Convert long to double.
pub const L2D: u8 = 0x8A;
/// Convert float to int.
pub const F2I: u8 = 0x8B;
/// Convert float to long.
pub const F2L: u8 = 0x8C;
/// Convert float to double.
pub const F2D: u8 = 0x8D;
/// Convert double to int.
pub const D2I: u8 = 0x8E;
/// Convert double to long.
pub const D2L: u8 = 0x8F;
/// Convert double to float.
pub const D2F: u8 = 0x90;
/// Convert int to byte.
pub const I2B: u8 = 0x91;
/// Convert int to char.
pub const I2C: u8 = 0x92;
/// Convert int to short.
pub const I2S: u8 = 0x93;

// Comparisons and conditional branches
/// Compare long.
pub const LCMP: u8 = 0x94;
/// Compare float (NaN yields -1).
pub const FCMPL: u8 = 0x95;
/// Compare float (NaN yields 1).
pub const FCMPG: u8 = 0x96;
/// Compare double (NaN yields -1).
pub const DCMPL: u8 = 0x97;
/// Compare double (NaN yields 1).
pub const DCMPG: u8 = 0x98;
/// Branch if int is zero.
pub const IFEQ: u8 = 0x99;
/// Branch if int is not zero.
pub const IFNE: u8 = 0x9A;
/// Branch if int is less than zero.
pub const IFLT: u8 = 0x9B;
/// Branch if int is at least zero.
pub const IFGE: u8 = 0x9C;
/// Branch if int is greater than zero.
pub const IFGT: u8 = 0x9D;
/// Branch if int is at most zero.
pub const IFLE: u8 = 0x9E;
/// Branch if ints are equal.
pub const IF_ICMPEQ: u8 = 0x9F;
/// Branch if ints are not equal.
pub const IF_ICMPNE: u8 = 0xA0;
/// Branch if int less than.
pub const IF_ICMPLT: u8 = 0xA1;
/// Branch if int greater or equal.
pub const IF_ICMPGE: u8 = 0xA2;
/// Branch if int greater than.
pub const IF_ICMPGT: u8 = 0xA3;
/// Branch if int less or equal.
pub const IF_ICMPLE: u8 = 0xA4;
/// Branch if references are equal.
pub const IF_ACMPEQ: u8 = 0xA5;
/// Branch if references are not equal.
pub const IF_ACMPNE: u8 = 0xA6;

// Unconditional control transfer
/// Branch unconditionally.
pub const GOTO: u8 = 0xA7;
/// Jump to subroutine (deprecated).
pub const JSR: u8 = 0xA8;
/// Return from subroutine (deprecated).
pub const RET: u8 = 0xA9;
/// Multi-way branch over a contiguous key range.
pub const TABLESWITCH: u8 = 0xAA;
/// Multi-way branch over sparse keys.
pub const LOOKUPSWITCH: u8 = 0xAB;
/// Return int.
pub const IRETURN: u8 = 0xAC;
/// Return long.
pub const LRETURN: u8 = 0xAD;
/// Return float.
pub const FRETURN: u8 = 0xAE;
/// Return double.
pub const DRETURN: u8 = 0xAF;
/// Return reference.
pub const ARETURN: u8 = 0xB0;
/// Return void.
pub const RETURN: u8 = 0xB1;

// References
/// Get static field.
pub const GETSTATIC: u8 = 0xB2;
/// Put static field.
pub const PUTSTATIC: u8 = 0xB3;
/// Get instance field.
pub const GETFIELD: u8 = 0xB4;
/// Put instance field.
pub const PUTFIELD: u8 = 0xB5;
/// Invoke virtual method.
pub const INVOKEVIRTUAL: u8 = 0xB6;
/// Invoke special method (constructor, super, private).
pub const INVOKESPECIAL: u8 = 0xB7;
/// Invoke static method.
pub const INVOKESTATIC: u8 = 0xB8;
/// Invoke interface method.
pub const INVOKEINTERFACE: u8 = 0xB9;
/// Invoke dynamically-resolved call site.
pub const INVOKEDYNAMIC: u8 = 0xBA;
/// Create new object.
pub const NEW: u8 = 0xBB;
/// Create new primitive array.
pub const NEWARRAY: u8 = 0xBC;
/// Create new reference array.
pub const ANEWARRAY: u8 = 0xBD;
/// Get array length.
pub const ARRAYLENGTH: u8 = 0xBE;
/// Throw exception.
pub const ATHROW: u8 = 0xBF;
/// Check cast.
pub const CHECKCAST: u8 = 0xC0;
/// Test instance of.
pub const INSTANCEOF: u8 = 0xC1;
/// Enter monitor.
pub const MONITORENTER: u8 = 0xC2;
/// Exit monitor.
pub const MONITOREXIT: u8 = 0xC3;

// Extended
/// Widen the local variable index of the following opcode.
pub const WIDE: u8 = 0xC4;
/// Create multidimensional array.
pub const MULTIANEWARRAY: u8 = 0xC5;
/// Branch if reference is null.
pub const IFNULL: u8 = 0xC6;
/// Branch if reference is not null.
pub const IFNONNULL: u8 = 0xC7;
/// Branch unconditionally (32-bit displacement).
pub const GOTO_W: u8 = 0xC8;
/// Jump to subroutine (32-bit displacement, deprecated).
pub const JSR_W: u8 = 0xC9;

// Reserved; never valid inside a class file.
/// Debugger breakpoint (reserved).
pub const BREAKPOINT: u8 = 0xCA;
/// Implementation-dependent opcode 1 (reserved).
pub const IMPDEP1: u8 = 0xFE;
/// Implementation-dependent opcode 2 (reserved).
pub const IMPDEP2: u8 = 0xFF;

/// Mnemonics for the assigned opcode range `0x00..=0xC9`, indexed by opcode.
const MNEMONICS: [&str; 202] = [
    "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3", "iconst_4",
    "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2", "dconst_0", "dconst_1",
    "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload", "fload", "dload", "aload",
    "iload_0", "iload_1", "iload_2", "iload_3", "lload_0", "lload_1", "lload_2", "lload_3",
    "fload_0", "fload_1", "fload_2", "fload_3", "dload_0", "dload_1", "dload_2", "dload_3",
    "aload_0", "aload_1", "aload_2", "aload_3", "iaload", "laload", "faload", "daload", "aaload",
    "baload", "caload", "saload", "istore", "lstore", "fstore", "dstore", "astore", "istore_0",
    "istore_1", "istore_2", "istore_3", "lstore_0", "lstore_1", "lstore_2", "lstore_3", "fstore_0",
    "fstore_1", "fstore_2", "fstore_3", "dstore_0", "dstore_1", "dstore_2", "dstore_3", "astore_0",
    "astore_1", "astore_2", "astore_3", "iastore", "lastore", "fastore", "dastore", "aastore",
    "bastore", "castore", "sastore", "pop", "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1",
    "dup2_x2", "swap", "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub", "imul",
    "lmul", "fmul", "dmul", "idiv", "ldiv", "fdiv", "ddiv", "irem", "lrem", "frem", "drem", "ineg",
    "lneg", "fneg", "dneg", "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land",
    "ior", "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d", "l2i", "l2f", "l2d", "f2i", "f2l",
    "f2d", "d2i", "d2l", "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl", "dcmpg",
    "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq", "if_icmpne", "if_icmplt",
    "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto", "jsr", "ret",
    "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn", "areturn", "return",
    "getstatic", "putstatic", "getfield", "putfield", "invokevirtual", "invokespecial",
    "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray", "anewarray",
    "arraylength", "athrow", "checkcast", "instanceof", "monitorenter", "monitorexit", "wide",
    "multianewarray", "ifnull", "ifnonnull", "goto_w", "jsr_w",
];

/// Mnemonic for an opcode, or `None` for reserved and unassigned byte values.
#[must_use]
pub fn mnemonic(op: u8) -> Option<&'static str> {
    MNEMONICS.get(op as usize).copied()
}

/// Operand byte count for fixed-length instructions.
///
/// Returns `None` for the variable-length forms (`tableswitch`,
/// `lookupswitch`, `wide`) and for reserved or unassigned opcodes.
#[must_use]
pub const fn fixed_operand_width(op: u8) -> Option<u8> {
    match op {
        NOP
        | ACONST_NULL..=DCONST_1
        | ILOAD_0..=SALOAD
        | ISTORE_0..=SASTORE
        | POP..=SWAP
        | IADD..=LXOR
        | I2L..=I2S
        | LCMP..=DCMPG
        | IRETURN..=RETURN
        | ARRAYLENGTH
        | ATHROW
        | MONITORENTER
        | MONITOREXIT => Some(0),
        BIPUSH | LDC | ILOAD..=ALOAD | ISTORE..=ASTORE | RET | NEWARRAY => Some(1),
        SIPUSH
        | LDC_W
        | LDC2_W
        | IINC
        | IFEQ..=IF_ACMPNE
        | GOTO
        | JSR
        | GETSTATIC..=INVOKESTATIC
        | NEW
        | ANEWARRAY
        | CHECKCAST
        | INSTANCEOF
        | IFNULL
        | IFNONNULL => Some(2),
        MULTIANEWARRAY => Some(3),
        INVOKEINTERFACE | INVOKEDYNAMIC | GOTO_W | JSR_W => Some(4),
        _ => None,
    }
}

/// Two-target conditional branch.
#[must_use]
pub const fn is_conditional_branch(op: u8) -> bool {
    matches!(op, IFEQ..=IF_ACMPNE | IFNULL | IFNONNULL)
}

/// Unconditional control transfer (`goto`, `jsr`, `ret` and wide forms).
#[must_use]
pub const fn is_unconditional_jump(op: u8) -> bool {
    matches!(op, GOTO | JSR | RET | GOTO_W | JSR_W)
}

/// Multi-way branch.
#[must_use]
pub const fn is_switch(op: u8) -> bool {
    matches!(op, TABLESWITCH | LOOKUPSWITCH)
}

/// Method invocation.
#[must_use]
pub const fn is_invoke(op: u8) -> bool {
    matches!(op, INVOKEVIRTUAL..=INVOKEDYNAMIC)
}

/// Static or instance field access.
#[must_use]
pub const fn is_field_access(op: u8) -> bool {
    matches!(op, GETSTATIC..=PUTFIELD)
}

/// Method return.
#[must_use]
pub const fn is_return(op: u8) -> bool {
    matches!(op, IRETURN..=RETURN)
}

/// Exception throw.
#[must_use]
pub const fn is_throw(op: u8) -> bool {
    op == ATHROW
}

/// Opcode that may legally follow the `wide` prefix.
#[must_use]
pub const fn is_widenable(op: u8) -> bool {
    matches!(op, ILOAD..=ALOAD | ISTORE..=ASTORE | RET | IINC)
}
