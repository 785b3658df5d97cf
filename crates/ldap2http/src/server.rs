//! LDAP listener and connection handling.

use crate::gateway::Gateway;
use crate::session::{Flow, Session};
use crate::Result;
use futures::{SinkExt, StreamExt};
use ldap2http_core::Error;
use ldap3_proto::proto::LdapMsg;
use ldap3_proto::LdapCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, warn};

/// Bind the LDAP listener.
///
/// # Errors
///
/// Returns [`Error::ListenerError`] if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|err| Error::ListenerError(format!("cannot listen on {addr}: {err}")))
}

/// Accept connections forever, serving each on its own task.
///
/// # Errors
///
/// Returns [`Error::ListenerError`] when accepting fails.
pub async fn serve(listener: TcpListener, gateway: Arc<Gateway>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(|err| {
            error!(error = %err, "accept failed");
            Error::ListenerError(format!("accept failed: {err}"))
        })?;

        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            handle_connection(stream, peer, gateway).await;
        });
    }
}

/// Serve one client until it unbinds, disconnects, or sends something undecodable.
///
/// Responses are written by a dedicated task in the order they are queued, so entries
/// of a running search and replies to later requests never interleave mid-message.
pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, gateway: Arc<Gateway>) {
    debug!(%peer, "connection opened");

    let (reader, writer) = stream.into_split();
    let mut requests = FramedRead::new(reader, LdapCodec::default());
    let mut sink = FramedWrite::new(writer, LdapCodec::default());
    let (tx, mut rx) = mpsc::unbounded_channel::<LdapMsg>();

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(err) = sink.send(msg).await {
                warn!(%peer, error = %err, "failed to write response");
                break;
            }
        }
    });

    let mut session = Session::new(peer, gateway, tx);
    while let Some(frame) = requests.next().await {
        match frame {
            Ok(msg) => {
                if session.handle(msg) == Flow::Close {
                    break;
                }
            }
            Err(err) => {
                warn!(%peer, error = %err, "undecodable request, closing");
                break;
            }
        }
    }

    // Pending searches keep their own senders; the writer stops once all are done.
    drop(session);
    if let Err(err) = writer_task.await {
        warn!(%peer, error = %err, "response writer failed");
    }
    debug!(%peer, "connection closed");
}
