//! Executable instruction representation.
//!
//! The assembler resolves every label to an absolute instruction index,
//! so the executable form is a flat vector of these and carries no
//! names. The textual mnemonics live in `asm`.
use std::fmt::{self, Display, Formatter};

/// Register-like reference to a frame slot: the current call frame by
/// default, or the entry (global) frame. Written `[n]` and `[n:g]` in
/// assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub slot: usize,
    pub global: bool,
}

impl Display for SlotRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.global {
            write!(f, "[{}:g]", self.slot)
        } else {
            write!(f, "[{}]", self.slot)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[rustfmt::skip]
pub enum Instr {
    // ------------------------------------------------------------------------
    // Stack
    PushInt(i32),
    PushFloat(f64),
    PushColour(u32),
    /// `push [n]`
    PushSlot(SlotRef),
    /// `push +[n]`: pops an index, pushes `slot + index`.
    PushIndexed(SlotRef),
    /// `pop [n]`
    PopSlot(SlotRef),
    /// `pop +[n]`: pops an index, then the value to store.
    PopIndexed(SlotRef),
    Dup,
    Drop,

    // ------------------------------------------------------------------------
    // Arithmetic, comparison, logic; typed by operand tag.
    Add, Sub, Mul, Div, Mod, Neg,
    Eq, Ne, Lt, Le, Gt, Ge,
    And, Or, Not,

    // ------------------------------------------------------------------------
    // Control
    Jmp(usize),
    /// Pop, jump when zero/false.
    Jz(usize),
    Jnz(usize),
    Call { target: usize, args: usize },
    Ret,
    Halt,

    // ------------------------------------------------------------------------
    // Frames
    /// Open a call frame with `n` local slots, adopting any pending
    /// call arguments into the leading slots.
    OpenFrame(usize),
    CloseFrame,

    // ------------------------------------------------------------------------
    // Conversions
    IntToFloat, FloatToInt, IntToColour, ColourToInt, BoolToInt, IntToBool,

    // ------------------------------------------------------------------------
    // Graphics and IO
    Clear,
    WritePixel,
    WriteBox,
    ReadPixel,
    Width,
    Height,
    Rand,
    Print,
    Delay,
}

impl Display for Instr {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use Instr as I;
        match self {
            I::PushInt(value)        => write!(f, "push {}", value),
            I::PushFloat(value)      => write!(f, "push {:?}", value),
            I::PushColour(value)     => write!(f, "push #{:06X}", value),
            I::PushSlot(slot)        => write!(f, "push {}", slot),
            I::PushIndexed(slot)     => write!(f, "push +{}", slot),
            I::PopSlot(slot)         => write!(f, "pop {}", slot),
            I::PopIndexed(slot)      => write!(f, "pop +{}", slot),
            I::Dup                   => write!(f, "dup"),
            I::Drop                  => write!(f, "drop"),
            I::Add                   => write!(f, "add"),
            I::Sub                   => write!(f, "sub"),
            I::Mul                   => write!(f, "mul"),
            I::Div                   => write!(f, "div"),
            I::Mod                   => write!(f, "mod"),
            I::Neg                   => write!(f, "neg"),
            I::Eq                    => write!(f, "eq"),
            I::Ne                    => write!(f, "ne"),
            I::Lt                    => write!(f, "lt"),
            I::Le                    => write!(f, "le"),
            I::Gt                    => write!(f, "gt"),
            I::Ge                    => write!(f, "ge"),
            I::And                   => write!(f, "and"),
            I::Or                    => write!(f, "or"),
            I::Not                   => write!(f, "not"),
            I::Jmp(target)           => write!(f, "jmp {}", target),
            I::Jz(target)            => write!(f, "jz {}", target),
            I::Jnz(target)           => write!(f, "jnz {}", target),
            I::Call { target, args } => write!(f, "call {}, {}", target, args),
            I::Ret                   => write!(f, "ret"),
            I::Halt                  => write!(f, "halt"),
            I::OpenFrame(slots)      => write!(f, "oframe {}", slots),
            I::CloseFrame            => write!(f, "cframe"),
            I::IntToFloat            => write!(f, "itof"),
            I::FloatToInt            => write!(f, "ftoi"),
            I::IntToColour           => write!(f, "itoc"),
            I::ColourToInt           => write!(f, "ctoi"),
            I::BoolToInt             => write!(f, "btoi"),
            I::IntToBool             => write!(f, "itob"),
            I::Clear                 => write!(f, "clear"),
            I::WritePixel            => write!(f, "write_pixel"),
            I::WriteBox              => write!(f, "write_box"),
            I::ReadPixel             => write!(f, "read_pixel"),
            I::Width                 => write!(f, "width"),
            I::Height                => write!(f, "height"),
            I::Rand                  => write!(f, "rand"),
            I::Print                 => write!(f, "print"),
            I::Delay                 => write!(f, "delay"),
        }
    }
}
