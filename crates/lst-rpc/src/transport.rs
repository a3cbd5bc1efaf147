//! Newline-delimited JSON framing over any async byte stream

use crate::codec::CodecRegistry;
use crate::data::RpcBatch;
use crate::error::RpcError;
use crate::session::{RpcReceiver, RpcSender};
use lst_tree::Tree;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Write one batch as a single JSON line
///
/// # Errors
/// Returns error on serialization or write failure
pub async fn write_batch<W>(writer: &mut W, batch: &RpcBatch) -> Result<(), RpcError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(batch)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one batch, or `None` at end of stream
///
/// # Errors
/// Returns error on read failure or a malformed line
pub async fn read_batch<R>(reader: &mut BufReader<R>) -> Result<Option<RpcBatch>, RpcError>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

/// One end of a bidirectional tree channel
pub struct RpcChannel<R, W> {
    reader: BufReader<R>,
    writer: W,
    sender: RpcSender,
    receiver: RpcReceiver,
}

impl<R, W> RpcChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, codecs: Arc<CodecRegistry>) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            sender: RpcSender::new(codecs.clone()),
            receiver: RpcReceiver::new(codecs),
        }
    }

    /// Send a tree, as a delta when the peer already has a version of it
    ///
    /// # Errors
    /// Returns error on encoding or write failure
    pub async fn send_tree(&mut self, tree: &Tree) -> Result<(), RpcError> {
        let batch = self.sender.send(tree)?;
        write_batch(&mut self.writer, &batch).await
    }

    /// Receive the next tree, or `None` once the peer closed the stream
    ///
    /// # Errors
    /// Returns error on read failure or a malformed batch
    pub async fn receive_tree(&mut self) -> Result<Option<Tree>, RpcError> {
        match read_batch(&mut self.reader).await? {
            Some(batch) => Ok(Some(self.receiver.receive(batch)?)),
            None => Ok(None),
        }
    }
}
