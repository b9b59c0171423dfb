//! Dual-mode access protocols.
//!
//! The backend's read/write capabilities differ by execution context: worker
//! contexts offer synchronous positional sessions, main contexts offer
//! streaming sessions and read snapshots. Each protocol is one strategy
//! behind the [`AccessProtocol`] trait; the facade picks one at construction
//! (from the backend's environment probe) and never re-checks mid-operation.
//!
//! Both protocols must produce the same observable result: a write replaces
//! the file's content with exactly the payload, a read returns the full
//! stored content. The sync protocol therefore truncates to the payload
//! length after its positional write, matching the streaming protocol's
//! replace-on-commit semantics.

use async_trait::async_trait;
use bytes::Bytes;

use originfs_handle_store::{FileHandle, HandleError, SyncSession};

/// One context's way of moving whole file contents in and out.
#[async_trait]
pub(crate) trait AccessProtocol: Send + Sync {
    async fn write_all(&self, file: &dyn FileHandle, data: Bytes) -> Result<(), HandleError>;

    async fn read_all(&self, file: &dyn FileHandle) -> Result<Bytes, HandleError>;
}

/// Combine an operation result with the mandatory close result.
///
/// Close happens exactly once on every path. A close failure after a
/// successful body is the operation's failure; a close failure after a
/// failed body is logged, and the original failure takes precedence.
fn finish<T>(
    result: Result<T, HandleError>,
    close_result: Result<(), HandleError>,
) -> Result<T, HandleError> {
    match (result, close_result) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            log::warn!(
                "session close failed after an earlier failure (close error: {})",
                close_err
            );
            Err(e)
        }
    }
}

/// Worker-context protocol: synchronous positional I/O with explicit
/// flush/close.
pub(crate) struct SyncAccessProtocol;

fn sync_write(session: &mut dyn SyncSession, data: &[u8]) -> Result<(), HandleError> {
    let mut written = 0;
    while written < data.len() {
        let n = session.write_at(&data[written..], written as u64)?;
        if n == 0 {
            return Err(HandleError::message("backend accepted zero bytes"));
        }
        written += n;
    }
    // Positional writes do not shrink the file; cut trailing old bytes so a
    // shorter payload fully replaces the previous content.
    session.truncate(data.len() as u64)?;
    session.flush()?;
    Ok(())
}

fn sync_read(session: &mut dyn SyncSession) -> Result<Bytes, HandleError> {
    let size = session.size()? as usize;
    let mut buf = vec![0u8; size];

    let mut filled = 0;
    while filled < size {
        let n = session.read_at(&mut buf[filled..], filled as u64)?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    buf.truncate(filled);
    Ok(Bytes::from(buf))
}

#[async_trait]
impl AccessProtocol for SyncAccessProtocol {
    async fn write_all(&self, file: &dyn FileHandle, data: Bytes) -> Result<(), HandleError> {
        let mut session = file.open_sync().await?;
        let result = sync_write(session.as_mut(), &data);
        finish(result, session.close())
    }

    async fn read_all(&self, file: &dyn FileHandle) -> Result<Bytes, HandleError> {
        let mut session = file.open_sync().await?;
        let result = sync_read(session.as_mut());
        finish(result, session.close())
    }
}

/// Main-context protocol: streaming writes committed on close, snapshot
/// reads with no session at all.
pub(crate) struct StreamAccessProtocol;

#[async_trait]
impl AccessProtocol for StreamAccessProtocol {
    async fn write_all(&self, file: &dyn FileHandle, data: Bytes) -> Result<(), HandleError> {
        let mut session = file.open_async().await?;
        let result = session.write(data).await;
        finish(result, session.close().await)
    }

    async fn read_all(&self, file: &dyn FileHandle) -> Result<Bytes, HandleError> {
        let snapshot = file.snapshot().await?;
        let expected = snapshot.size() as usize;
        let data = snapshot.read_all().await?;
        if data.len() != expected {
            return Err(HandleError::message(format!(
                "snapshot size mismatch: advertised {} bytes, read {}",
                expected,
                data.len()
            )));
        }
        Ok(data)
    }
}
