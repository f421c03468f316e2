//! Firmware image viewed as a sequence of unsigned 16-bit words.

use serde::{Deserialize, Serialize};

/// Byte order of the 16-bit words in a firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Most significant byte first (Motorola order, the usual ECU layout)
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

impl Endianness {
    fn decode(self, pair: [u8; 2]) -> u16 {
        match self {
            Endianness::Big => u16::from_be_bytes(pair),
            Endianness::Little => u16::from_le_bytes(pair),
        }
    }

    fn encode(self, word: u16) -> [u8; 2] {
        match self {
            Endianness::Big => word.to_be_bytes(),
            Endianness::Little => word.to_le_bytes(),
        }
    }
}

/// Converts an absolute byte offset into the firmware image to a word index.
pub fn word_offset(byte_offset: usize) -> usize {
    byte_offset / 2
}

/// Immutable word view over a firmware image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u16>,
    endianness: Endianness,
}

impl WordBuffer {
    /// Decodes `bytes` two at a time in source order.
    ///
    /// A trailing unpaired byte is dropped without error, so the buffer
    /// always holds `bytes.len() / 2` words.
    pub fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        let words = bytes
            .chunks_exact(2)
            .map(|pair| endianness.decode([pair[0], pair[1]]))
            .collect();

        Self { words, endianness }
    }

    /// Re-encodes the words with the byte order they were decoded with.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|&word| self.endianness.encode(word))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        self.words.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }
}
