use super::{Qos, Transport};
use crate::error::{LoraSimError, Result};
use async_trait::async_trait;
use flume::{Receiver, Sender};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub qos: Qos,
    pub retain: bool,
    pub payload: Vec<u8>,
}

/// In-process transport: every publish lands on a flume channel.
pub struct MemoryTransport {
    tx: Sender<PublishedMessage>,
    fail_publish: AtomicBool,
    disconnected: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> (Self, Receiver<PublishedMessage>) {
        let (tx, rx) = flume::unbounded();
        let transport = Self {
            tx,
            fail_publish: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
        };
        (transport, rx)
    }

    /// Makes subsequent publishes fail, as a broker rejecting them would.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(
        &self,
        topic: &str,
        qos: Qos,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<()> {
        if self.is_disconnected() {
            return Err(LoraSimError::Other("transport is disconnected".into()));
        }
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(LoraSimError::Other(format!("publish to {} rejected", topic)));
        }
        self.tx
            .send_async(PublishedMessage {
                topic: topic.to_string(),
                qos,
                retain,
                payload,
            })
            .await
            .map_err(|e| LoraSimError::Other(e.to_string()))
    }

    async fn disconnect(&self, _drain_timeout: Duration) -> Result<()> {
        debug!("Memory transport disconnected");
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
