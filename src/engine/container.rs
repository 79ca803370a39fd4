//! Self-describing container layout (little-endian):
//!
//! ```text
//! [2] symbol_count  [1] valid_bits_last_byte  [4] original_length
//! [symbol_count x (1 symbol + 4 frequency)]
//! [1] delimiter (0x0A)
//! [N] packed payload
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::frequency::{FrequencyTable, SymbolFrequency};
use crate::error::{CodecError, Result};

pub const DELIMITER: u8 = b'\n';
pub const FIXED_HEADER_SIZE: usize = 2 + 1 + 4;
pub const ENTRY_SIZE: usize = 1 + 4;
/// Smallest possible container: fixed fields plus the delimiter.
pub const MIN_CONTAINER_SIZE: usize = FIXED_HEADER_SIZE + 1;
pub const MAX_SYMBOLS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHeader {
    pub valid_bits_last_byte: u8,
    pub original_length: u32,
    pub frequencies: FrequencyTable,
}

impl ContainerHeader {
    pub fn symbol_count(&self) -> usize {
        self.frequencies.len()
    }

    /// `2 + 1 + 4 + symbol_count * 5 + 1`
    pub fn encoded_len(&self) -> usize {
        header_size(self.symbol_count())
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.symbol_count() as u16).to_le_bytes());
        out.push(self.valid_bits_last_byte);
        out.extend_from_slice(&self.original_length.to_le_bytes());
        for entry in self.frequencies.entries() {
            out.push(entry.symbol);
            out.extend_from_slice(&entry.count.to_le_bytes());
        }
        out.push(DELIMITER);
    }

    /// Parses the header and returns it along with the payload that follows.
    pub fn decode(buf: &[u8]) -> Result<(Self, &[u8])> {
        if buf.len() < MIN_CONTAINER_SIZE {
            warn!("Container too short: {} bytes", buf.len());
            return Err(CodecError::InvalidFormat(format!(
                "container is {} bytes, shorter than the {}-byte minimum header",
                buf.len(),
                MIN_CONTAINER_SIZE
            )));
        }

        let symbol_count = u16::from_le_bytes([buf[0], buf[1]]) as usize;
        let valid_bits_last_byte = buf[2];
        let original_length = u32::from_le_bytes([buf[3], buf[4], buf[5], buf[6]]);

        if symbol_count > MAX_SYMBOLS {
            return Err(CodecError::InvalidFormat(format!(
                "symbol count {} exceeds {}",
                symbol_count, MAX_SYMBOLS
            )));
        }
        if !(1..=8).contains(&valid_bits_last_byte) {
            return Err(CodecError::InvalidFormat(format!(
                "valid bit count {} is outside 1..=8",
                valid_bits_last_byte
            )));
        }

        let header_len = header_size(symbol_count);
        if buf.len() < header_len {
            return Err(CodecError::InvalidFormat(format!(
                "header declares {} symbols ({} bytes) but only {} bytes are available",
                symbol_count,
                header_len,
                buf.len()
            )));
        }

        let entries = buf[FIXED_HEADER_SIZE..header_len - 1]
            .chunks_exact(ENTRY_SIZE)
            .map(|e| SymbolFrequency {
                symbol: e[0],
                count: u32::from_le_bytes([e[1], e[2], e[3], e[4]]),
            })
            .collect();
        let frequencies = FrequencyTable::from_entries(entries)?;

        if buf[header_len - 1] != DELIMITER {
            return Err(CodecError::InvalidFormat(format!(
                "expected delimiter 0x{:02x} at offset {}, found 0x{:02x}",
                DELIMITER,
                header_len - 1,
                buf[header_len - 1]
            )));
        }

        if frequencies.total() != original_length as u64 {
            return Err(CodecError::CorruptContainer(format!(
                "frequencies sum to {} but original length is {}",
                frequencies.total(),
                original_length
            )));
        }

        debug!(
            symbol_count,
            valid_bits_last_byte,
            original_length,
            payload_len = buf.len() - header_len,
            "Decoded container header"
        );

        Ok((
            Self {
                valid_bits_last_byte,
                original_length,
                frequencies,
            },
            &buf[header_len..],
        ))
    }
}

pub fn header_size(symbol_count: usize) -> usize {
    FIXED_HEADER_SIZE + symbol_count * ENTRY_SIZE + 1
}

/// Header and payload joined into the on-disk byte layout.
pub fn write_container(header: &ContainerHeader, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.encoded_len() + payload.len());
    header.encode_into(&mut out);
    out.extend_from_slice(payload);
    out
}
