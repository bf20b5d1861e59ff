//! The console's 32-bit data word.
//!
//! Every value that crosses a port (CPU registers, GPU colors, SPU samples,
//! gamepad counters) travels as one 4-byte [`Word`]. The word carries no
//! type tag: the accessor a caller uses decides how the bytes are read.
//! Bytes are stored in the console's little-endian order, so
//! [`Word::to_le_bytes`] / [`Word::from_le_bytes`] are plain copies.

use std::fmt;

/// A 4-byte storage cell shared by every value kind on the console.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word {
    bytes: [u8; 4],
}

impl Word {
    /// All bytes zero (integer 0, float +0.0, black transparent color).
    pub const ZERO: Word = Word { bytes: [0; 4] };

    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self { bytes }
    }

    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.bytes
    }

    pub const fn from_integer(value: i32) -> Self {
        Self {
            bytes: value.to_le_bytes(),
        }
    }

    pub const fn as_integer(self) -> i32 {
        i32::from_le_bytes(self.bytes)
    }

    pub const fn from_binary(value: u32) -> Self {
        Self {
            bytes: value.to_le_bytes(),
        }
    }

    pub const fn as_binary(self) -> u32 {
        u32::from_le_bytes(self.bytes)
    }

    /// Bit-exact: NaN payloads and signed zeros survive the round trip.
    pub fn from_float(value: f32) -> Self {
        Self::from_binary(value.to_bits())
    }

    pub fn as_float(self) -> f32 {
        f32::from_bits(self.as_binary())
    }

    pub fn from_instruction(instruction: Instruction) -> Self {
        Self::from_binary(instruction.encode())
    }

    pub fn as_instruction(self) -> Instruction {
        Instruction::decode(self.as_binary())
    }

    pub const fn from_color(color: Color) -> Self {
        Self {
            bytes: [color.r, color.g, color.b, color.a],
        }
    }

    pub const fn as_color(self) -> Color {
        let [r, g, b, a] = self.bytes;
        Color { r, g, b, a }
    }

    pub const fn from_sample(sample: Sample) -> Self {
        let [l0, l1] = sample.left.to_le_bytes();
        let [r0, r1] = sample.right.to_le_bytes();
        Self {
            bytes: [l0, l1, r0, r1],
        }
    }

    pub const fn as_sample(self) -> Sample {
        let [l0, l1, r0, r1] = self.bytes;
        Sample {
            left: i16::from_le_bytes([l0, l1]),
            right: i16::from_le_bytes([r0, r1]),
        }
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0x{:08X})", self.as_binary())
    }
}

impl From<i32> for Word {
    fn from(value: i32) -> Self {
        Self::from_integer(value)
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Self::from_binary(value)
    }
}

// ---------------------------------------------------------------------------
// Packed CPU instruction
// ---------------------------------------------------------------------------

/// CPU instruction fields packed into one word.
///
/// | Bits  | Field           | Width |
/// |-------|-----------------|-------|
/// | 31-26 | opcode          | 6     |
/// | 25    | uses_immediate  | 1     |
/// | 24-21 | register1       | 4     |
/// | 20-17 | register2       | 4     |
/// | 16-14 | addressing_mode | 3     |
/// | 13-0  | port_number     | 14    |
///
/// Fields wider than their slot are truncated to the slot width on encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: u8,
    pub uses_immediate: bool,
    pub register1: u8,
    pub register2: u8,
    pub addressing_mode: u8,
    pub port_number: u16,
}

const OPCODE_SHIFT: u32 = 26;
const IMMEDIATE_SHIFT: u32 = 25;
const REGISTER1_SHIFT: u32 = 21;
const REGISTER2_SHIFT: u32 = 17;
const ADDRESSING_SHIFT: u32 = 14;

const OPCODE_MASK: u32 = 0x3F;
const REGISTER_MASK: u32 = 0x0F;
const ADDRESSING_MASK: u32 = 0x07;
const PORT_MASK: u32 = 0x3FFF;

impl Instruction {
    pub fn encode(&self) -> u32 {
        ((self.opcode as u32 & OPCODE_MASK) << OPCODE_SHIFT)
            | ((self.uses_immediate as u32) << IMMEDIATE_SHIFT)
            | ((self.register1 as u32 & REGISTER_MASK) << REGISTER1_SHIFT)
            | ((self.register2 as u32 & REGISTER_MASK) << REGISTER2_SHIFT)
            | ((self.addressing_mode as u32 & ADDRESSING_MASK) << ADDRESSING_SHIFT)
            | (self.port_number as u32 & PORT_MASK)
    }

    pub fn decode(bits: u32) -> Self {
        Self {
            opcode: ((bits >> OPCODE_SHIFT) & OPCODE_MASK) as u8,
            uses_immediate: (bits >> IMMEDIATE_SHIFT) & 1 != 0,
            register1: ((bits >> REGISTER1_SHIFT) & REGISTER_MASK) as u8,
            register2: ((bits >> REGISTER2_SHIFT) & REGISTER_MASK) as u8,
            addressing_mode: ((bits >> ADDRESSING_SHIFT) & ADDRESSING_MASK) as u8,
            port_number: (bits & PORT_MASK) as u16,
        }
    }
}

/// GPU color, one byte per channel. Byte 0 is red, byte 3 is alpha
/// (the RGBA order used by PNG and OpenGL).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// SPU stereo sample pair. Left occupies bytes 0-1, right bytes 2-3,
/// each little-endian (16-bit stereo WAV order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Sample {
    pub left: i16,
    pub right: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Word>(), 4);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Word::default(), Word::ZERO);
        assert_eq!(Word::ZERO.as_integer(), 0);
        assert_eq!(Word::ZERO.as_float(), 0.0);
    }

    #[test]
    fn debug_prints_raw_hex() {
        assert_eq!(format!("{:?}", Word::from_integer(-1)), "Word(0xFFFFFFFF)");
    }
}
