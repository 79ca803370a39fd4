use serde::Serialize;

use crate::error::{CodecError, Result};

/// One `(symbol, count)` pair of a frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolFrequency {
    pub symbol: u8,
    pub count: u32,
}

/// Byte frequencies in a fixed iteration order.
///
/// The order of `entries` is significant: the tree builder assigns sequence
/// numbers in this order, and the container header stores entries in it too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<SymbolFrequency>,
}

impl FrequencyTable {
    /// Rebuilds a table from header entries, keeping their order.
    pub fn from_entries(entries: Vec<SymbolFrequency>) -> Result<Self> {
        let mut seen = [false; 256];
        for entry in &entries {
            if entry.count == 0 {
                return Err(CodecError::InvalidFormat(format!(
                    "symbol 0x{:02x} has a zero frequency",
                    entry.symbol
                )));
            }
            if seen[entry.symbol as usize] {
                return Err(CodecError::InvalidFormat(format!(
                    "symbol 0x{:02x} appears twice in the frequency table",
                    entry.symbol
                )));
            }
            seen[entry.symbol as usize] = true;
        }
        Ok(Self { entries })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut analyzer = FrequencyAnalyzer::new();
        analyzer.update(data);
        analyzer.finish()
    }

    pub fn entries(&self) -> &[SymbolFrequency] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, symbol: u8) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.count)
    }

    /// Sum of all counts, i.e. the number of symbols the table describes.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64).sum()
    }
}

/// Counts byte occurrences, possibly across several chunks.
#[derive(Debug, Clone)]
pub struct FrequencyAnalyzer {
    counts: [u64; 256],
    total: u64,
}

impl FrequencyAnalyzer {
    pub fn new() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.counts[byte as usize] += 1;
        }
        self.total += chunk.len() as u64;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Produces the table in ascending symbol order.
    ///
    /// Counts are stored in 4 bytes in the container, so anything past
    /// `u32::MAX` symbols is rejected.
    pub fn finish(self) -> Result<FrequencyTable> {
        if self.total() > u32::MAX as u64 {
            return Err(CodecError::InputTooLarge(self.total() as usize));
        }
        let entries = self
            .counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| SymbolFrequency {
                symbol: symbol as u8,
                count: count as u32,
            })
            .collect();
        Ok(FrequencyTable { entries })
    }
}

impl Default for FrequencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
