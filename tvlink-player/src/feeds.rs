//! Typed side-channel feeds
//!
//! One feed per [`DataKind`], each a [`DataConsumer`] bound into the
//! output's [`DataFeed`]. A feed holds at most one application listener in
//! a swappable slot; with no listener set, payloads of that kind drop.
//! Payloads reach listeners as delivered by the engine, undecoded.
//!
//! The teletext and subtitle feeds also front the matching engine
//! configuration commands. They hold the data feed weakly: once the feed is
//! detached and dropped, configuration calls fail with `NotFound`.

use std::sync::{Arc, Mutex, Weak};

use tvlink_common::events::{DataFormat, DataKind};
use tvlink_common::{Error, Result};

use crate::datafeed::{DataConsumer, DataFeed};
use crate::engine::{EngineResult, TeletextLink};

/// Receiver of teletext payloads.
pub trait TeletextListener: Send + Sync {
    fn on_teletext(&self, format: DataFormat, payload: &[u8]);
}

/// Receiver of subtitle payloads.
pub trait SubtitlesListener: Send + Sync {
    fn on_subtitles(&self, format: DataFormat, payload: &[u8]);
}

/// Receiver of HbbTV application signalling payloads.
pub trait HbbTvListener: Send + Sync {
    fn on_hbbtv(&self, format: DataFormat, payload: &[u8]);
}

/// Receiver of DSMCC carousel payloads.
pub trait DsmccListener: Send + Sync {
    fn on_dsmcc(&self, format: DataFormat, payload: &[u8]);
}

/// Teletext feed: payload delivery plus page navigation and rendering
/// configuration.
pub struct TeletextFeed {
    feed: Weak<DataFeed>,
    listener: Mutex<Option<Arc<dyn TeletextListener>>>,
}

impl TeletextFeed {
    pub fn new(feed: &Arc<DataFeed>) -> Arc<Self> {
        Arc::new(TeletextFeed {
            feed: Arc::downgrade(feed),
            listener: Mutex::new(None),
        })
    }

    pub fn set_listener(&self, listener: Arc<dyn TeletextListener>) {
        *self.listener.lock().unwrap() = Some(listener);
    }

    pub fn clear_listener(&self) {
        self.listener.lock().unwrap().take();
    }

    pub fn set_enabled(&self, enable: bool) -> Result<()> {
        self.feed()?.set_teletext_enabled(enable)
    }

    /// Open teletext page `page` (100 to 899), subpage `subpage`.
    pub fn set_page(&self, page: u16, subpage: u16) -> Result<()> {
        self.feed()?.set_teletext_page(page, subpage)
    }

    /// Current (page, subpage).
    pub fn page(&self) -> Result<(u16, u16)> {
        self.feed()?.teletext_page()
    }

    /// Resolve `link` against the current page and open the result.
    /// Returns the page that was opened.
    pub fn open_linked_page(&self, link: TeletextLink) -> Result<u16> {
        self.feed()?.open_linked_page(link)
    }

    /// Rendering transparency, 0 (opaque) to 255.
    pub fn set_transparency(&self, alpha: u8) -> Result<()> {
        self.feed()?.set_teletext_transparency(alpha)
    }

    fn feed(&self) -> Result<Arc<DataFeed>> {
        self.feed
            .upgrade()
            .ok_or_else(|| Error::NotFound("data feed no longer attached".to_string()))
    }
}

impl DataConsumer for TeletextFeed {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()> {
        if kind != DataKind::Teletext {
            return Ok(());
        }
        if let Some(listener) = self.listener.lock().unwrap().clone() {
            listener.on_teletext(format, payload);
        }
        Ok(())
    }
}

/// Subtitle feed: payload delivery plus presentation enable/disable.
pub struct SubtitlesFeed {
    feed: Weak<DataFeed>,
    listener: Mutex<Option<Arc<dyn SubtitlesListener>>>,
}

impl SubtitlesFeed {
    pub fn new(feed: &Arc<DataFeed>) -> Arc<Self> {
        Arc::new(SubtitlesFeed {
            feed: Arc::downgrade(feed),
            listener: Mutex::new(None),
        })
    }

    pub fn set_listener(&self, listener: Arc<dyn SubtitlesListener>) {
        *self.listener.lock().unwrap() = Some(listener);
    }

    pub fn clear_listener(&self) {
        self.listener.lock().unwrap().take();
    }

    pub fn set_enabled(&self, enable: bool) -> Result<()> {
        self.feed
            .upgrade()
            .ok_or_else(|| Error::NotFound("data feed no longer attached".to_string()))?
            .set_subtitles_enabled(enable)
    }
}

impl DataConsumer for SubtitlesFeed {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()> {
        if kind != DataKind::Subtitles {
            return Ok(());
        }
        if let Some(listener) = self.listener.lock().unwrap().clone() {
            listener.on_subtitles(format, payload);
        }
        Ok(())
    }
}

/// HbbTV feed: application signalling payload delivery.
pub struct HbbTvFeed {
    listener: Mutex<Option<Arc<dyn HbbTvListener>>>,
}

impl HbbTvFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(HbbTvFeed {
            listener: Mutex::new(None),
        })
    }

    pub fn set_listener(&self, listener: Arc<dyn HbbTvListener>) {
        *self.listener.lock().unwrap() = Some(listener);
    }

    pub fn clear_listener(&self) {
        self.listener.lock().unwrap().take();
    }
}

impl DataConsumer for HbbTvFeed {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()> {
        if kind != DataKind::HbbTv {
            return Ok(());
        }
        if let Some(listener) = self.listener.lock().unwrap().clone() {
            listener.on_hbbtv(format, payload);
        }
        Ok(())
    }
}

/// DSMCC feed: object carousel payload delivery.
pub struct DsmccFeed {
    listener: Mutex<Option<Arc<dyn DsmccListener>>>,
}

impl DsmccFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(DsmccFeed {
            listener: Mutex::new(None),
        })
    }

    pub fn set_listener(&self, listener: Arc<dyn DsmccListener>) {
        *self.listener.lock().unwrap() = Some(listener);
    }

    pub fn clear_listener(&self) {
        self.listener.lock().unwrap().take();
    }
}

impl DataConsumer for DsmccFeed {
    fn on_data(&self, kind: DataKind, format: DataFormat, payload: &[u8]) -> EngineResult<()> {
        if kind != DataKind::Dsmcc {
            return Ok(());
        }
        if let Some(listener) = self.listener.lock().unwrap().clone() {
            listener.on_dsmcc(format, payload);
        }
        Ok(())
    }
}
