//! Instruction registry interface.
//!
//! The catalog of legal mnemonics lives outside the compiler. Ingestion asks
//! it for def/use counts and the apply emitter asks which mnemonic defines
//! constants. [`GenericInstrTable`] covers the target-independent generic
//! opcodes and can be extended with target instructions.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

bitflags! {
    /// Per-mnemonic properties the compiler cares about.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct InstrFlags: u8 {
        /// The designated constant-defining instruction.
        const CONSTANT = 1 << 0;
        /// Accepts any number of uses at or above `num_uses`.
        const VARIADIC = 1 << 1;
    }
}

/// Operand signature of one mnemonic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InstrDesc {
    pub num_defs: usize,
    pub num_uses: usize,
    pub flags: InstrFlags,
}

impl InstrDesc {
    pub const fn new(num_defs: usize, num_uses: usize) -> Self {
        InstrDesc {
            num_defs,
            num_uses,
            flags: InstrFlags::empty(),
        }
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: InstrFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.flags.contains(InstrFlags::VARIADIC)
    }

    pub fn is_constant(&self) -> bool {
        self.flags.contains(InstrFlags::CONSTANT)
    }

    /// Whether a pattern with `operands` operands fits this signature.
    pub fn accepts(&self, operands: usize) -> bool {
        let fixed = self.num_defs + self.num_uses;
        if self.is_variadic() {
            operands >= fixed
        } else {
            operands == fixed
        }
    }
}

/// Queryable instruction registry.
pub trait InstrInfo {
    /// Signature of `mnemonic`, or `None` if it is not a known instruction.
    fn describe(&self, mnemonic: &str) -> Option<InstrDesc>;

    /// Mnemonic of the designated constant-defining instruction.
    fn constant_opcode(&self) -> &str;
}

/// Table of generic opcodes.
#[derive(Clone, Debug)]
pub struct GenericInstrTable {
    table: FxHashMap<String, InstrDesc>,
    constant: String,
}

impl GenericInstrTable {
    /// Empty table whose constant-defining mnemonic is `constant`.
    pub fn empty(constant: impl Into<String>) -> Self {
        let constant = constant.into();
        let mut table = FxHashMap::default();
        table.insert(
            constant.clone(),
            InstrDesc::new(1, 1).with_flags(InstrFlags::CONSTANT),
        );
        GenericInstrTable { table, constant }
    }

    /// Table with the common generic opcodes.
    pub fn new() -> Self {
        const BINARY: &[&str] = &[
            "G_ADD", "G_SUB", "G_MUL", "G_SDIV", "G_UDIV", "G_SREM", "G_UREM", "G_AND", "G_OR",
            "G_XOR", "G_SHL", "G_LSHR", "G_ASHR", "G_PTR_ADD", "G_SMIN", "G_SMAX", "G_UMIN",
            "G_UMAX", "G_FADD", "G_FSUB", "G_FMUL", "G_FDIV",
        ];
        const UNARY: &[&str] = &[
            "COPY", "G_ZEXT", "G_SEXT", "G_ANYEXT", "G_TRUNC", "G_FREEZE", "G_FNEG", "G_FABS",
            "G_BSWAP", "G_BITREVERSE", "G_CTPOP", "G_ABS", "G_INTTOPTR", "G_PTRTOINT",
            "G_BITCAST", "G_LOAD",
        ];

        let mut this = Self::empty("G_CONSTANT");
        for op in BINARY {
            this.insert(*op, InstrDesc::new(1, 2));
        }
        for op in UNARY {
            this.insert(*op, InstrDesc::new(1, 1));
        }
        this.insert(
            "G_FCONSTANT",
            InstrDesc::new(1, 1).with_flags(InstrFlags::CONSTANT),
        );
        this.insert("G_IMPLICIT_DEF", InstrDesc::new(1, 0));
        this.insert("G_ICMP", InstrDesc::new(1, 3));
        this.insert("G_FCMP", InstrDesc::new(1, 3));
        this.insert("G_SELECT", InstrDesc::new(1, 3));
        this.insert("G_STORE", InstrDesc::new(0, 2));
        this.insert("G_UADDO", InstrDesc::new(2, 2));
        this.insert("G_USUBO", InstrDesc::new(2, 2));
        this.insert(
            "G_BUILD_VECTOR",
            InstrDesc::new(1, 1).with_flags(InstrFlags::VARIADIC),
        );
        this.insert(
            "G_MERGE_VALUES",
            InstrDesc::new(1, 2).with_flags(InstrFlags::VARIADIC),
        );
        this
    }

    /// Add or replace a mnemonic.
    pub fn insert(&mut self, mnemonic: impl Into<String>, desc: InstrDesc) {
        self.table.insert(mnemonic.into(), desc);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for GenericInstrTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrInfo for GenericInstrTable {
    fn describe(&self, mnemonic: &str) -> Option<InstrDesc> {
        self.table.get(mnemonic).copied()
    }

    fn constant_opcode(&self) -> &str {
        &self.constant
    }
}
