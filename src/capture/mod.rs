//! Network traffic capture over CDP
//!
//! Subscribes to `Network.*` events on the active page and correlates them
//! into [`CapturedPacket`] records. Bodies are not pulled eagerly; they are
//! hydrated on demand via `Network.getResponseBody` when a tool asks for
//! raw content or a summary.

mod packet;
pub mod summary;

pub use packet::{CapturedPacket, FailInfo, PacketBody, ResponseInfo, classify_body};
pub use summary::{
    DEFAULT_MAX_DEPTH, PacketStatus, PacketSummary, summarize_json, summarize_packet,
    summarize_packet_with_depth, summarize_packets, summarize_packets_with_depth,
};

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide_cdp::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventRequestWillBeSent, EventResponseReceived,
    GetResponseBodyParams, RequestId,
};
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capture limit; past this, new requests are ignored until the next
/// capture restart.
pub const MAX_CAPTURED_PACKETS: usize = 500;

#[derive(Default)]
struct CaptureState {
    packets: Vec<CapturedPacket>,
    // request_id -> position in `packets`, so events can be correlated
    // without disturbing capture order.
    index: HashMap<String, usize>,
    overflowed: bool,
}

impl CaptureState {
    fn insert(&mut self, packet: CapturedPacket) {
        if self.packets.len() >= MAX_CAPTURED_PACKETS {
            if !self.overflowed {
                warn!(
                    "Capture buffer full ({MAX_CAPTURED_PACKETS} packets); ignoring further requests"
                );
                self.overflowed = true;
            }
            return;
        }
        self.index.insert(packet.request_id.clone(), self.packets.len());
        self.packets.push(packet);
    }

    fn get_mut(&mut self, request_id: &str) -> Option<&mut CapturedPacket> {
        let position = *self.index.get(request_id)?;
        self.packets.get_mut(position)
    }
}

/// Capture session over the current page.
///
/// `start` resets the buffer, enables the Network domain and spawns one
/// listener task per event kind. Listener tasks end when their event
/// stream closes (page gone) or when capture is restarted/stopped.
pub struct NetworkCapture {
    state: Arc<Mutex<CaptureState>>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for NetworkCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCapture {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState::default())),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Begin capturing traffic on `page`, discarding any previous capture.
    pub async fn start(&self, page: &Page) -> Result<()> {
        self.stop().await;
        *self.state.lock().await = CaptureState::default();

        page.execute(EnableParams::default())
            .await
            .context("Failed to enable the Network domain")?;

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .context("Failed to subscribe to Network.requestWillBeSent")?;
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .context("Failed to subscribe to Network.responseReceived")?;
        let mut failures = page
            .event_listener::<EventLoadingFailed>()
            .await
            .context("Failed to subscribe to Network.loadingFailed")?;

        let state = self.state.clone();
        let on_request = tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                let mut state = state.lock().await;
                state.insert(CapturedPacket {
                    request_id: event.request_id.inner().clone(),
                    url: event.request.url.clone(),
                    method: event.request.method.clone(),
                    response: None,
                    fail_info: None,
                    captured_at: Utc::now(),
                });
            }
            debug!("requestWillBeSent listener ended");
        });

        let state = self.state.clone();
        let on_response = tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                let request_id = event.request_id.inner().clone();
                let mut state = state.lock().await;
                match state.get_mut(&request_id) {
                    Some(packet) => {
                        packet.response = Some(ResponseInfo {
                            status: event.response.status,
                            mime_type: event.response.mime_type.clone(),
                            body: None,
                        });
                    }
                    None => {
                        // Response for a request that predates this capture
                        // session; record it with the method unknown.
                        state.insert(CapturedPacket {
                            request_id,
                            url: event.response.url.clone(),
                            method: "GET".to_string(),
                            response: Some(ResponseInfo {
                                status: event.response.status,
                                mime_type: event.response.mime_type.clone(),
                                body: None,
                            }),
                            fail_info: None,
                            captured_at: Utc::now(),
                        });
                    }
                }
            }
            debug!("responseReceived listener ended");
        });

        let state = self.state.clone();
        let on_failure = tokio::spawn(async move {
            while let Some(event) = failures.next().await {
                let request_id = event.request_id.inner().clone();
                let mut state = state.lock().await;
                if let Some(packet) = state.get_mut(&request_id) {
                    packet.response = None;
                    packet.fail_info = Some(FailInfo {
                        error_text: event.error_text.clone(),
                    });
                }
            }
            debug!("loadingFailed listener ended");
        });

        *self.listeners.lock().await = vec![on_request, on_response, on_failure];
        info!("Network capture started");
        Ok(())
    }

    /// Abort listener tasks. Captured packets stay readable until the next
    /// `start`.
    pub async fn stop(&self) {
        for handle in self.listeners.lock().await.drain(..) {
            handle.abort();
        }
    }

    /// True once `start` has been called for the current session.
    pub async fn is_active(&self) -> bool {
        !self.listeners.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.packets.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clone of all captured packets in capture order.
    pub async fn snapshot(&self) -> Vec<CapturedPacket> {
        self.state.lock().await.packets.clone()
    }

    /// Clone of one captured packet.
    pub async fn get(&self, request_id: &str) -> Option<CapturedPacket> {
        let mut state = self.state.lock().await;
        state.get_mut(request_id).map(|packet| packet.clone())
    }

    /// Fetch and classify the response body for one packet, caching the
    /// result on the stored packet. Returns the hydrated packet.
    ///
    /// Body retrieval is best-effort: Chrome evicts bodies it no longer
    /// holds, in which case the packet is returned without one.
    pub async fn hydrate_body(&self, page: &Page, request_id: &str) -> Result<CapturedPacket> {
        let cached = self
            .get(request_id)
            .await
            .with_context(|| format!("No captured request with id '{request_id}'"))?;

        // Nothing to fetch for failed requests or already-hydrated bodies.
        let needs_fetch = matches!(&cached.response, Some(response) if response.body.is_none());
        if !needs_fetch {
            return Ok(cached);
        }

        let params = GetResponseBodyParams::new(RequestId::new(request_id));
        let body = match page.execute(params).await {
            Ok(returns) => cached.response.as_ref().and_then(|response| {
                classify_body(&returns.body, returns.base64_encoded, &response.mime_type)
            }),
            Err(e) => {
                debug!("Response body unavailable for '{request_id}': {e}");
                None
            }
        };

        let mut state = self.state.lock().await;
        if let Some(packet) = state.get_mut(request_id) {
            if let Some(response) = packet.response.as_mut() {
                response.body = body;
            }
            Ok(packet.clone())
        } else {
            Ok(cached)
        }
    }

    /// Hydrate every captured packet's body in capture order.
    pub async fn hydrate_all(&self, page: &Page) -> Vec<CapturedPacket> {
        let ids: Vec<String> = {
            let state = self.state.lock().await;
            state.packets.iter().map(|p| p.request_id.clone()).collect()
        };

        let mut packets = Vec::with_capacity(ids.len());
        for request_id in ids {
            match self.hydrate_body(page, &request_id).await {
                Ok(packet) => packets.push(packet),
                Err(e) => debug!("Skipping packet '{request_id}': {e}"),
            }
        }
        packets
    }
}

impl Drop for NetworkCapture {
    fn drop(&mut self) {
        // Listener tasks hold only the shared state; abort them so they do
        // not outlive the capture session.
        if let Ok(mut listeners) = self.listeners.try_lock() {
            for handle in listeners.drain(..) {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet(id: &str) -> CapturedPacket {
        CapturedPacket {
            request_id: id.to_string(),
            url: format!("https://api.test.local/{id}"),
            method: "GET".to_string(),
            response: None,
            fail_info: None,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn insert_preserves_capture_order() {
        let mut state = CaptureState::default();
        for id in ["a", "b", "c"] {
            state.insert(sample_packet(id));
        }
        let ids: Vec<&str> = state.packets.iter().map(|p| p.request_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(state.get_mut("b").is_some());
        assert!(state.get_mut("missing").is_none());
    }

    #[test]
    fn insert_stops_at_capacity() {
        let mut state = CaptureState::default();
        for i in 0..(MAX_CAPTURED_PACKETS + 10) {
            state.insert(sample_packet(&format!("req-{i}")));
        }
        assert_eq!(state.packets.len(), MAX_CAPTURED_PACKETS);
        assert!(state.overflowed);
    }

    #[tokio::test]
    async fn snapshot_reflects_correlated_events() {
        let capture = NetworkCapture::new();
        {
            let mut state = capture.state.lock().await;
            state.insert(sample_packet("req-1"));
            state.insert(sample_packet("req-2"));
            if let Some(packet) = state.get_mut("req-1") {
                packet.response = Some(ResponseInfo {
                    status: 200,
                    mime_type: "application/json".to_string(),
                    body: None,
                });
            }
            if let Some(packet) = state.get_mut("req-2") {
                packet.fail_info = Some(FailInfo {
                    error_text: "net::ERR_CONNECTION_RESET".to_string(),
                });
            }
        }

        let packets = capture.snapshot().await;
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].response.as_ref().map(|r| r.status), Some(200));
        assert!(packets[1].response.is_none());
        assert_eq!(
            packets[1].fail_info.as_ref().map(|f| f.error_text.as_str()),
            Some("net::ERR_CONNECTION_RESET")
        );
    }
}
