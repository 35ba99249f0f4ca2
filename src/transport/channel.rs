//! Channel seam between caller and host.
//!
//! The caller reaches the host only through a [`Connector`]: a persistent
//! link factory plus an independent one-shot request/response call. The
//! in-process [`PairedConnector`] realizes both over tokio channels; tests
//! wrap it to inject teardown and invalidated-context conditions.

use super::error::ConnectorError;
use super::protocol::Envelope;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Frame buffer of one direction of a persistent link.
const LINK_BUFFER: usize = 32;

/// One end of an established persistent channel.
#[derive(Debug)]
pub struct Link {
    pub tx: mpsc::Sender<Envelope>,
    pub rx: mpsc::Receiver<Envelope>,
}

/// Opens links and issues one-shot calls toward the analysis host.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open the persistent channel.
    async fn connect(&self) -> Result<Link, ConnectorError>;

    /// Independent one-shot request/response call.
    async fn one_shot(&self, envelope: Envelope) -> Result<Envelope, ConnectorError>;
}

/// Host-side endpoint produced by [`pair`]: accepted links and incoming
/// one-shot calls.
pub struct HostEndpoint {
    pub links: mpsc::Receiver<Link>,
    pub one_shots: mpsc::Receiver<(Envelope, oneshot::Sender<Envelope>)>,
}

/// In-process connector joined to a [`HostEndpoint`].
///
/// Dropping the endpoint models a full host teardown: connects fail with
/// `Unavailable` and one-shot replies never arrive.
#[derive(Clone)]
pub struct PairedConnector {
    link_tx: mpsc::Sender<Link>,
    one_shot_tx: mpsc::Sender<(Envelope, oneshot::Sender<Envelope>)>,
}

/// Create a connected caller/host pair.
pub fn pair() -> (PairedConnector, HostEndpoint) {
    let (link_tx, links) = mpsc::channel(8);
    let (one_shot_tx, one_shots) = mpsc::channel(LINK_BUFFER);
    (
        PairedConnector {
            link_tx,
            one_shot_tx,
        },
        HostEndpoint { links, one_shots },
    )
}

#[async_trait]
impl Connector for PairedConnector {
    async fn connect(&self) -> Result<Link, ConnectorError> {
        let (to_host_tx, to_host_rx) = mpsc::channel(LINK_BUFFER);
        let (to_caller_tx, to_caller_rx) = mpsc::channel(LINK_BUFFER);

        let host_side = Link {
            tx: to_caller_tx,
            rx: to_host_rx,
        };
        self.link_tx
            .send(host_side)
            .await
            .map_err(|_| ConnectorError::Unavailable("analysis host is gone".to_string()))?;

        Ok(Link {
            tx: to_host_tx,
            rx: to_caller_rx,
        })
    }

    async fn one_shot(&self, envelope: Envelope) -> Result<Envelope, ConnectorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.one_shot_tx
            .send((envelope, reply_tx))
            .await
            .map_err(|_| ConnectorError::Unavailable("analysis host is gone".to_string()))?;
        // A dropped reply sender means the serving context died mid-call.
        reply_rx
            .await
            .map_err(|_| ConnectorError::ContextInvalidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn connect_delivers_host_side_link() {
        let (connector, mut endpoint) = pair();
        let mut caller = connector.connect().await.unwrap();
        let mut host = endpoint.links.recv().await.unwrap();

        caller
            .tx
            .send(Envelope::Ping {
                correlation_id: Uuid::nil(),
            })
            .await
            .unwrap();
        let received = host.rx.recv().await.unwrap();
        assert_eq!(received.correlation_id(), Uuid::nil());

        host.tx
            .send(Envelope::Pong {
                correlation_id: Uuid::nil(),
            })
            .await
            .unwrap();
        assert!(caller.rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn connect_fails_after_host_teardown() {
        let (connector, endpoint) = pair();
        drop(endpoint);
        let err = connector.connect().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn one_shot_round_trips() {
        let (connector, mut endpoint) = pair();
        let id = Uuid::new_v4();

        let server = tokio::spawn(async move {
            let (envelope, reply) = endpoint.one_shots.recv().await.unwrap();
            let _ = reply.send(Envelope::Pong {
                correlation_id: envelope.correlation_id(),
            });
        });

        let response = connector
            .one_shot(Envelope::Ping { correlation_id: id })
            .await
            .unwrap();
        assert_eq!(response.correlation_id(), id);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_reply_is_context_invalidated() {
        let (connector, mut endpoint) = pair();

        let server = tokio::spawn(async move {
            let (_envelope, reply) = endpoint.one_shots.recv().await.unwrap();
            drop(reply);
        });

        let err = connector
            .one_shot(Envelope::Ping {
                correlation_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ConnectorError::ContextInvalidated);
        server.await.unwrap();
    }
}
