//! Live network access for swcache, built on [`reqwest`].
//!
//! [`ReqwestFetch`] implements [`swcache_core::Fetch`]: it forwards an
//! intercepted request to the network and buffers the whole response into a
//! [`ResponseSnapshot`](swcache_core::ResponseSnapshot).
//!
//! ```no_run
//! use std::time::Duration;
//! use swcache_reqwest::ReqwestFetch;
//!
//! let fetch = ReqwestFetch::new(reqwest::Client::new())
//!     .with_timeout(Duration::from_secs(10));
//! ```

mod fetch;

pub use fetch::ReqwestFetch;

/// Re-export of the reqwest client for convenience in type annotations.
pub use reqwest::Client as ReqwestClient;
