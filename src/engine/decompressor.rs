use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{
    bits::BitUnpacker,
    container::ContainerHeader,
    huffman::HuffmanTree,
};
use crate::error::{CodecError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct DecompressionReport {
    /// Length declared by the container header.
    pub original_size: usize,
    pub compressed_size: usize,
    pub decompressed_size: usize,
    /// `compressed_size / decompressed_size`
    pub ratio: f64,
    pub saved_fraction: f64,
    #[serde(skip)]
    pub decoded: Vec<u8>,
}

fn corrupt(msg: impl Into<String>) -> CodecError {
    CodecError::CorruptContainer(msg.into())
}

/// Decodes a container back to the original bytes.
///
/// The tree is rebuilt from the header frequencies; the payload must hold
/// exactly the bits for `original_length` symbols.
pub fn decode(container: &[u8]) -> Result<Vec<u8>> {
    decode_with_header(container).map(|(_, out)| out)
}

fn decode_with_header(container: &[u8]) -> Result<(ContainerHeader, Vec<u8>)> {
    let (header, payload) = ContainerHeader::decode(container)?;
    let expected = header.original_length as usize;

    if header.frequencies.is_empty() {
        if !payload.is_empty() {
            return Err(corrupt(format!(
                "empty frequency table but {} payload bytes",
                payload.len()
            )));
        }
        return Ok((header, Vec::new()));
    }

    let tree = HuffmanTree::build(&header.frequencies)?;
    let mut bits = BitUnpacker::new(payload, header.valid_bits_last_byte)?;

    let expected_bits = tree.code_table().encoded_bits(&header.frequencies);
    if bits.total_bits() != expected_bits {
        return Err(corrupt(format!(
            "payload holds {} bits but the frequency table needs {}",
            bits.total_bits(),
            expected_bits
        )));
    }
    debug!(expected, expected_bits, "Decoding payload");

    let root = tree.root();
    let mut out = Vec::with_capacity(expected);
    // Single-symbol tree: every code is one `0` bit.
    let lone_symbol = tree.is_single_leaf().then(|| root.symbol()).flatten();

    while out.len() < expected {
        if let Some(symbol) = lone_symbol {
            match bits.next() {
                Some(false) => out.push(symbol),
                Some(true) => return Err(corrupt("unexpected 1 bit in single-symbol payload")),
                None => break,
            }
            continue;
        }

        let mut node = root;
        loop {
            let Some(bit) = bits.next() else {
                return Err(corrupt(format!(
                    "payload exhausted after {} of {} symbols",
                    out.len(),
                    expected
                )));
            };
            node = node
                .child(bit)
                .ok_or_else(|| corrupt("walked past a leaf"))?;
            if let Some(symbol) = node.symbol() {
                out.push(symbol);
                break;
            }
        }
    }

    if out.len() < expected {
        return Err(corrupt(format!(
            "payload exhausted after {} of {} symbols",
            out.len(),
            expected
        )));
    }
    if bits.remaining() > 0 {
        return Err(corrupt(format!(
            "{} unread bits after the last symbol",
            bits.remaining()
        )));
    }

    Ok((header, out))
}

pub fn decompress(container: &[u8]) -> Result<DecompressionReport> {
    info!("Decompressing {} byte container", container.len());
    let (header, decoded) = decode_with_header(container)?;

    let compressed_size = container.len();
    let decompressed_size = decoded.len();
    let ratio = if decompressed_size > 0 {
        compressed_size as f64 / decompressed_size as f64
    } else {
        0.0
    };

    info!(compressed_size, decompressed_size, "Decompression finished");

    Ok(DecompressionReport {
        original_size: header.original_length as usize,
        compressed_size,
        decompressed_size,
        ratio,
        saved_fraction: 1.0 - ratio,
        decoded,
    })
}
