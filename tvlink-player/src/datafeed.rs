//! Side-channel data demultiplexer
//!
//! The engine delivers teletext, subtitle, HbbTV and DSMCC payloads over a
//! single data callback. One [`DataFeed`] per output splits that stream by
//! [`DataKind`] and hands each kind to its bound [`DataConsumer`].
//!
//! Bindings are write-once: a kind accepts exactly one consumer for the
//! lifetime of the feed, so no payload is ever delivered to a consumer that
//! replaced another mid-stream. Payloads of an unbound kind are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, trace};
use tvlink_common::events::{DataFormat, DataKind};
use tvlink_common::{Error, Result};

use crate::engine::{EngineResult, TeletextLink};
use crate::gateway::{EngineDataObserver, EngineGateway};
use crate::output::OutputId;

/// Receiver of side-channel payloads of one kind.
///
/// Callbacks arrive on the engine thread; implementations must not block.
/// The return code travels back to the native boundary.
pub trait DataConsumer: Send + Sync {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()>;
}

/// Demultiplexer and command surface for the side channels of one output.
pub struct DataFeed {
    // Handle to our own allocation, needed to unregister from the gateway.
    self_ref: Weak<DataFeed>,
    gateway: Arc<EngineGateway>,
    out: OutputId,
    consumers: Mutex<HashMap<DataKind, Arc<dyn DataConsumer>>>,
}

impl DataFeed {
    /// Create the feed for `out` and hook it up to engine data callbacks.
    pub fn new(gateway: Arc<EngineGateway>, out: OutputId) -> Arc<Self> {
        let feed = Arc::new_cyclic(|me| DataFeed {
            self_ref: me.clone(),
            gateway: Arc::clone(&gateway),
            out,
            consumers: Mutex::new(HashMap::new()),
        });
        gateway.register_data_observer(out, Arc::clone(&feed) as Arc<dyn EngineDataObserver>);
        feed
    }

    pub fn output(&self) -> OutputId {
        self.out
    }

    /// Bind `consumer` to payloads of `kind`. Each kind accepts exactly one
    /// consumer; a second bind for the same kind is rejected.
    pub fn bind(&self, kind: DataKind, consumer: Arc<dyn DataConsumer>) -> Result<()> {
        let mut consumers = self.consumers.lock().unwrap();
        if consumers.contains_key(&kind) {
            return Err(Error::InvalidArgument(format!(
                "consumer already bound for {kind} data"
            )));
        }
        consumers.insert(kind, consumer);
        debug!("Output {}: {kind} consumer bound", self.out);
        Ok(())
    }

    pub fn is_bound(&self, kind: DataKind) -> bool {
        self.consumers.lock().unwrap().contains_key(&kind)
    }

    /// Unhook from engine data callbacks and drop all bindings.
    pub fn detach(&self) {
        if let Some(me) = self.self_ref.upgrade() {
            self.gateway
                .unregister_data_observer(self.out, &(me as Arc<dyn EngineDataObserver>));
        }
        self.consumers.lock().unwrap().clear();
    }

    // --- Teletext commands ---

    pub fn set_teletext_enabled(&self, enable: bool) -> Result<()> {
        self.gateway
            .set_teletext_enabled(self.out, enable)
            .map_err(Error::Engine)
    }

    /// Open teletext page `page` (100 to 899), subpage `subpage`.
    pub fn set_teletext_page(&self, page: u16, subpage: u16) -> Result<()> {
        if !(100..=899).contains(&page) {
            return Err(Error::InvalidArgument(format!(
                "teletext page must be 100 to 899, got {page}"
            )));
        }
        self.gateway
            .set_teletext_page(self.out, page, subpage)
            .map_err(Error::Engine)
    }

    /// Current teletext (page, subpage).
    pub fn teletext_page(&self) -> Result<(u16, u16)> {
        self.gateway.teletext_page(self.out).map_err(Error::Engine)
    }

    /// Resolve `link` against the current page and open the result.
    /// Returns the page that was opened.
    pub fn open_linked_page(&self, link: TeletextLink) -> Result<u16> {
        let page = self
            .gateway
            .teletext_linked_page(self.out, link)
            .map_err(Error::Engine)?;
        self.gateway
            .set_teletext_page(self.out, page, 0)
            .map_err(Error::Engine)?;
        Ok(page)
    }

    /// Teletext rendering transparency, 0 (opaque) to 255.
    pub fn set_teletext_transparency(&self, alpha: u8) -> Result<()> {
        self.gateway
            .set_teletext_transparency(self.out, alpha)
            .map_err(Error::Engine)
    }

    // --- Subtitle commands ---

    pub fn set_subtitles_enabled(&self, enable: bool) -> Result<()> {
        self.gateway
            .set_subtitles_enabled(self.out, enable)
            .map_err(Error::Engine)
    }
}

impl EngineDataObserver for DataFeed {
    fn on_data(
        &self,
        out: OutputId,
        kind: DataKind,
        format: DataFormat,
        payload: &[u8],
    ) -> EngineResult<()> {
        if out != self.out {
            return Ok(());
        }
        let consumer = self.consumers.lock().unwrap().get(&kind).cloned();
        match consumer {
            Some(consumer) => consumer.on_data(kind, format, payload),
            None => {
                trace!(
                    "Output {}: {kind} payload dropped, no consumer bound",
                    self.out
                );
                Ok(())
            }
        }
    }
}
