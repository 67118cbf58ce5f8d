//! Connection Driver: per-connection glue between the transport and the
//! Protocol Engine.
//!
//! `drive` runs two concurrent halves for the lifetime of one accepted
//! connection: an inbound half that pulls CR LF-terminated lines out of
//! the read side via [`ircrelay_reader::Lines`] and dispatches each into
//! the [`Engine`], and an outbound half that serializes whatever lands on
//! the connection's [`MessageQueue`] onto the write side, in order. Each
//! connection owns its own outbound queue, so fan-out from other
//! connections never interleaves bytes within one of this connection's
//! own lines.

use crate::client::{ConnId, MessageQueueReceiver};
use crate::engine::{Engine, Outcome};
use crate::lines;
use futures::StreamExt;
use ircrelay_reader::Lines;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Drive one accepted connection to completion.
///
/// Returns once the connection has been torn down, either because the
/// Protocol Engine told us to disconnect (an explicit `QUIT`), the peer
/// half-closed or a read error occurred, or the outbound queue could no
/// longer be written to. `id` is detached from the registry by the time
/// this function returns, via [`Engine::disconnect`].
pub async fn drive<R, W>(
    engine: Engine,
    id: ConnId,
    reader: R,
    mut writer: W,
    mut queue: MessageQueueReceiver,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let inbound = async {
        let mut lines = Lines::new(reader);
        loop {
            match lines.next().await {
                Some(Ok(line)) => {
                    if engine.handle_line(id, &line).await == Outcome::Disconnect {
                        return;
                    }
                }
                Some(Err(_)) | None => {
                    engine.disconnect(id, lines::CONNECTION_CLOSED).await;
                    return;
                }
            }
        }
    };

    let outbound = async {
        while let Some(frame) = queue.recv().await {
            if writer.write_all(frame.as_ref()).await.is_err() {
                engine.disconnect(id, lines::CONNECTION_CLOSED).await;
                return;
            }
        }
    };

    tokio::pin!(inbound);
    tokio::pin!(outbound);
    tokio::select! {
        _ = &mut inbound => {}
        _ = &mut outbound => {}
    }
}
