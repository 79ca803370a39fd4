use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{
    bits::BitPacker,
    container::{write_container, ContainerHeader},
    frequency::FrequencyTable,
    huffman::HuffmanTree,
};
use crate::error::{CodecError, Result};

/// A finished container and the header it was written with.
#[derive(Debug, Clone)]
pub struct EncodedContainer {
    pub header: ContainerHeader,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed_size / original_size`
    pub ratio: f64,
    pub saved_fraction: f64,
    #[serde(skip)]
    pub container: Vec<u8>,
}

/// Encodes `input` into a container with no size policy applied.
///
/// Empty input yields the empty container: no entries, no payload.
pub fn encode(input: &[u8]) -> Result<EncodedContainer> {
    let frequencies = FrequencyTable::from_bytes(input)?;
    let original_length = input.len() as u32;

    if frequencies.is_empty() {
        let header = ContainerHeader {
            valid_bits_last_byte: 8,
            original_length,
            frequencies,
        };
        let bytes = write_container(&header, &[]);
        return Ok(EncodedContainer { header, bytes });
    }

    let tree = HuffmanTree::build(&frequencies)?;
    let codes = tree.code_table();
    let total_bits = codes.encoded_bits(&frequencies);
    debug!(
        symbols = frequencies.len(),
        total_bits, "Built code table"
    );

    let mut packer = BitPacker::with_capacity(total_bits.div_ceil(8) as usize);
    for &byte in input {
        let code = codes.get(byte).ok_or_else(|| {
            CodecError::InvalidFormat(format!("no code assigned to symbol 0x{:02x}", byte))
        })?;
        packer.push_code(code);
    }
    let packed = packer.finish();
    debug_assert_eq!(packed.bit_len(), total_bits);

    let header = ContainerHeader {
        valid_bits_last_byte: packed.valid_bits_last_byte,
        original_length,
        frequencies,
    };
    let bytes = write_container(&header, &packed.bytes);
    Ok(EncodedContainer { header, bytes })
}

/// Compresses `input`, refusing empty input and output that does not shrink.
pub fn compress(input: &[u8]) -> Result<CompressionReport> {
    if input.is_empty() {
        warn!("Refusing to compress empty input");
        return Err(CodecError::EmptyInput);
    }

    info!("Compressing {} bytes", input.len());
    let encoded = encode(input)?;
    let original_size = input.len();
    let compressed_size = encoded.bytes.len();

    if compressed_size >= original_size {
        warn!(
            original_size,
            compressed_size, "Compression did not reduce size"
        );
        return Err(CodecError::IneffectiveCompression {
            original: original_size,
            compressed: compressed_size,
        });
    }

    let ratio = compressed_size as f64 / original_size as f64;
    info!(
        original_size,
        compressed_size,
        symbols = encoded.header.symbol_count(),
        "Compression finished ({:.2}% saved)",
        (1.0 - ratio) * 100.0
    );

    Ok(CompressionReport {
        original_size,
        compressed_size,
        ratio,
        saved_fraction: 1.0 - ratio,
        container: encoded.bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::container::header_size;
    use proptest::prelude::*;

    #[test]
    fn empty_input_encodes_to_bare_header() {
        let encoded = encode(&[]).unwrap();
        assert_eq!(encoded.bytes, vec![0, 0, 8, 0, 0, 0, 0, b'\n']);
    }

    #[test]
    fn single_symbol_uses_one_bit_each() {
        let encoded = encode(b"aaaa").unwrap();
        assert_eq!(encoded.header.valid_bits_last_byte, 4);
        assert_eq!(encoded.header.original_length, 4);
        let payload = &encoded.bytes[header_size(1)..];
        assert_eq!(payload, &[0x00]);
    }

    #[test]
    fn abc_payload_bits() {
        // c = 0, a = 10, b = 11 -> "10 11 0" x3 = 101101011010110
        let encoded = encode(b"abcabcabc").unwrap();
        let payload = &encoded.bytes[header_size(3)..];
        assert_eq!(payload, &[0b1011_0101, 0b1010_1100]);
        assert_eq!(encoded.header.valid_bits_last_byte, 7);
    }

    #[test]
    fn compress_rejects_empty_input() {
        assert!(matches!(compress(&[]), Err(CodecError::EmptyInput)));
    }

    #[test]
    fn compress_rejects_small_inputs_that_grow() {
        match compress(b"aaaa") {
            Err(CodecError::IneffectiveCompression { original, compressed }) => {
                assert_eq!(original, 4);
                assert_eq!(compressed, header_size(1) + 1);
            }
            other => panic!("expected ineffective compression, got {:?}", other),
        }
    }

    #[test]
    fn compress_reports_ratio() {
        let input = b"abracadabra ".repeat(200);
        let report = compress(&input).unwrap();
        assert_eq!(report.original_size, input.len());
        assert_eq!(report.compressed_size, report.container.len());
        assert!(report.compressed_size < report.original_size);
        assert!((report.ratio + report.saved_fraction - 1.0).abs() < 1e-12);
        assert!(report.saved_fraction > 0.5);
    }

    proptest! {
        // Near-uniform bytes need ~8 bits each on top of a full header.
        #[test]
        fn compress_rejects_high_entropy_input(noise in prop::collection::vec(any::<u8>(), 2048..4096)) {
            let result = compress(&noise);
            prop_assert!(
                matches!(result, Err(CodecError::IneffectiveCompression { .. })),
                "unexpected result: {:?}",
                result.map(|r| r.compressed_size)
            );
        }

        #[test]
        fn encoded_size_is_header_plus_payload(data in prop::collection::vec(any::<u8>(), 1..1024)) {
            let encoded = encode(&data).unwrap();
            let table = FrequencyTable::from_bytes(&data).unwrap();
            let bits = HuffmanTree::build(&table).unwrap().code_table().encoded_bits(&table);
            prop_assert_eq!(
                encoded.bytes.len(),
                header_size(table.len()) + bits.div_ceil(8) as usize
            );
            prop_assert_eq!(encoded.header.original_length as usize, data.len());
        }
    }
}
