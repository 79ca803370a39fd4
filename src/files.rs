//! File-level operations: the async read/write bracket around the codec.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::PackConfig;
use crate::engine::{
    self,
    container::ContainerHeader,
    huffman::HuffmanTree,
    visualize::{self, symbol_label, TreeMode, TreeView},
    CompressionReport, DecompressionReport,
};
use crate::error::{CodecError, Result};
use crate::utils::io::{read_chunked, write_atomic};

#[derive(Debug, Serialize)]
pub struct FileOutcome<R> {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub report: R,
}

#[derive(Debug, Serialize)]
pub struct HeaderSummary {
    pub symbol_count: usize,
    pub valid_bits_last_byte: u8,
    pub original_length: u32,
    pub header_size: usize,
    pub payload_size: usize,
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub symbol: u8,
    pub label: String,
    pub count: u32,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub container: PathBuf,
    pub original: PathBuf,
    pub decoded_sha256: String,
    pub original_sha256: String,
    pub hash_match: bool,
}

pub fn is_container_path(path: &Path, config: &PackConfig) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(&config.suffix()))
        .unwrap_or(false)
}

fn place(path: PathBuf, config: &PackConfig) -> PathBuf {
    match (&config.output_directory, path.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => path,
    }
}

/// `notes.txt` becomes `notes.txt.huff`.
pub fn compressed_path(input: &Path, config: &PackConfig) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(config.suffix());
    place(PathBuf::from(name), config)
}

/// `notes.txt.huff` becomes `notes.txt`; anything without the suffix is refused.
pub fn decompressed_path(input: &Path, config: &PackConfig) -> Result<PathBuf> {
    let suffix = config.suffix();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(&suffix) {
        Some(stem) if !stem.is_empty() => Ok(place(input.with_file_name(stem), config)),
        _ => Err(CodecError::InvalidFormat(format!(
            "{} does not end in {}",
            input.display(),
            suffix
        ))),
    }
}

async fn read_input(path: &Path, config: &PackConfig) -> Result<Vec<u8>> {
    read_chunked(path, config.read_chunk_size, config.max_input_size).await
}

pub async fn compress_file(
    input: &Path,
    output: Option<&Path>,
    config: &PackConfig,
) -> Result<FileOutcome<CompressionReport>> {
    let data = read_input(input, config).await?;
    let report = engine::compress(&data)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| compressed_path(input, config));
    write_atomic(&output, &report.container).await?;
    info!("Wrote {:?} ({} bytes)", output, report.compressed_size);

    Ok(FileOutcome {
        input: input.to_path_buf(),
        output,
        report,
    })
}

pub async fn decompress_file(
    input: &Path,
    output: Option<&Path>,
    config: &PackConfig,
) -> Result<FileOutcome<DecompressionReport>> {
    if !is_container_path(input, config) {
        warn!("Rejecting {:?}: missing {} suffix", input, config.suffix());
        return Err(CodecError::InvalidFormat(format!(
            "only {} files can be decompressed",
            config.suffix()
        )));
    }
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => decompressed_path(input, config)?,
    };

    let data = read_input(input, config).await?;
    let report = engine::decompress(&data)?;
    write_atomic(&output, &report.decoded).await?;
    info!("Wrote {:?} ({} bytes)", output, report.decompressed_size);

    Ok(FileOutcome {
        input: input.to_path_buf(),
        output,
        report,
    })
}

pub async fn tree_for_file(path: &Path, mode: TreeMode, config: &PackConfig) -> Result<TreeView> {
    let mode = match mode {
        TreeMode::Auto if is_container_path(path, config) => TreeMode::Container,
        TreeMode::Auto => TreeMode::Source,
        explicit => explicit,
    };
    let data = read_input(path, config).await?;
    visualize::build_visualization_tree(&data, mode)
}

pub async fn inspect_file(path: &Path, config: &PackConfig) -> Result<HeaderSummary> {
    let data = read_input(path, config).await?;
    let (header, payload) = ContainerHeader::decode(&data)?;

    let codes = if header.frequencies.is_empty() {
        None
    } else {
        Some(HuffmanTree::build(&header.frequencies)?.code_table())
    };
    let entries = header
        .frequencies
        .entries()
        .iter()
        .map(|e| EntrySummary {
            symbol: e.symbol,
            label: symbol_label(e.symbol),
            count: e.count,
            code: codes
                .as_ref()
                .and_then(|c| c.code_string(e.symbol))
                .unwrap_or_default(),
        })
        .collect();

    Ok(HeaderSummary {
        symbol_count: header.symbol_count(),
        valid_bits_last_byte: header.valid_bits_last_byte,
        original_length: header.original_length,
        header_size: header.encoded_len(),
        payload_size: payload.len(),
        entries,
    })
}

pub async fn verify_file(container: &Path, original: &Path, config: &PackConfig) -> Result<VerifyReport> {
    let packed = read_input(container, config).await?;
    let reference = read_input(original, config).await?;
    let decoded = engine::decode(&packed)?;

    let decoded_sha256 = hex::encode(Sha256::digest(&decoded));
    let original_sha256 = hex::encode(Sha256::digest(&reference));
    let hash_match = decoded_sha256 == original_sha256;
    if hash_match {
        info!("Verification passed for {:?}", container);
    } else {
        warn!("Verification failed for {:?}: digest mismatch", container);
    }

    Ok(VerifyReport {
        container: container.to_path_buf(),
        original: original.to_path_buf(),
        decoded_sha256,
        original_sha256,
        hash_match,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<u8> {
        b"It was the best of times, it was the worst of times. ".repeat(64)
    }

    #[test]
    fn path_conventions() {
        let config = PackConfig::default();
        let packed = compressed_path(Path::new("dir/notes.txt"), &config);
        assert_eq!(packed, PathBuf::from("dir/notes.txt.huff"));
        assert!(is_container_path(&packed, &config));
        assert_eq!(
            decompressed_path(&packed, &config).unwrap(),
            PathBuf::from("dir/notes.txt")
        );
        assert!(decompressed_path(Path::new("notes.txt"), &config).is_err());
        assert!(decompressed_path(Path::new(".huff"), &config).is_err());
    }

    #[test]
    fn output_directory_redirects_outputs() {
        let config = PackConfig {
            output_directory: Some(PathBuf::from("out")),
            ..PackConfig::default()
        };
        assert_eq!(
            compressed_path(Path::new("src/a.bin"), &config),
            PathBuf::from("out/a.bin.huff")
        );
    }

    #[tokio::test]
    async fn file_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let config = PackConfig::default();
        let input = dir.join("story.txt");
        std::fs::write(&input, sample()).unwrap();

        let packed = compress_file(&input, None, &config).await.unwrap();
        assert_eq!(packed.output, dir.join("story.txt.huff"));
        assert!(packed.report.compressed_size < packed.report.original_size);

        std::fs::remove_file(&input).unwrap();
        let unpacked = decompress_file(&packed.output, None, &config).await.unwrap();
        assert_eq!(unpacked.output, input);
        assert_eq!(std::fs::read(&input).unwrap(), sample());

        let verified = verify_file(&packed.output, &input, &config).await.unwrap();
        assert!(verified.hash_match);
    }

    #[tokio::test]
    async fn decompress_requires_suffix() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let config = PackConfig::default();
        let input = dir.join("plain.bin");
        std::fs::write(&input, engine::encode(b"abcabcabc").unwrap().bytes).unwrap();

        assert!(matches!(
            decompress_file(&input, None, &config).await,
            Err(CodecError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn failed_compression_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let config = PackConfig::default();
        let input = dir.join("tiny.txt");
        std::fs::write(&input, b"abc").unwrap();

        assert!(matches!(
            compress_file(&input, None, &config).await,
            Err(CodecError::IneffectiveCompression { .. })
        ));
        assert!(!dir.join("tiny.txt.huff").exists());
    }

    #[tokio::test]
    async fn corrupt_container_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let config = PackConfig::default();
        let container = dir.join("data.bin.huff");
        let mut bytes = engine::compress(&sample()).unwrap().container;
        bytes.pop();
        std::fs::write(&container, bytes).unwrap();

        assert!(decompress_file(&container, None, &config).await.is_err());
        assert!(!dir.join("data.bin").exists());
    }

    #[tokio::test]
    async fn inspect_and_tree() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        let config = PackConfig::default();
        let container = dir.join("abc.huff");
        std::fs::write(&container, engine::encode(b"abcabcabc").unwrap().bytes).unwrap();

        let summary = inspect_file(&container, &config).await.unwrap();
        assert_eq!(summary.symbol_count, 3);
        assert_eq!(summary.original_length, 9);
        assert_eq!(summary.header_size, 23);
        assert_eq!(summary.payload_size, 2);
        assert_eq!(summary.entries[2].code, "0");

        let view = tree_for_file(&container, TreeMode::Auto, &config).await.unwrap();
        assert_eq!(view.label, "* (9)");
    }
}
