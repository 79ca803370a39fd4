use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{CodecError, Result};

/// Reads a whole file in `chunk_size` pieces, failing once `limit` is passed.
pub async fn read_chunked(path: &Path, chunk_size: usize, limit: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let hint = file.metadata().await.map(|m| m.len()).unwrap_or(0);
    if hint > limit {
        return Err(CodecError::InputTooLarge(hint as usize));
    }

    let mut data = Vec::with_capacity(hint as usize);
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        if data.len() as u64 > limit {
            return Err(CodecError::InputTooLarge(data.len()));
        }
    }
    Ok(data)
}

/// Writes `buf` to a temporary sibling and renames it over `path`, so a
/// failed write never leaves a partial output behind.
pub async fn write_atomic(path: &Path, buf: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    let result = async {
        let mut file = File::create(&tmp).await?;
        file.write_all(buf).await?;
        file.flush().await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(CodecError::Io(e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
