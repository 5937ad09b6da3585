//! Scripted network for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;
use swcache::{Fetch, FetchError, InterceptedRequest, ResponseSnapshot};
use tokio::sync::Notify;

#[derive(Clone)]
enum Reply {
    Respond(ResponseSnapshot),
    Fail,
}

#[derive(Default)]
struct State {
    replies: HashMap<String, Reply>,
    gates: HashMap<String, Arc<Notify>>,
    calls: HashMap<String, usize>,
}

/// A [`Fetch`] answering from a script.
///
/// Unscripted URLs answer 404. Clones share the script and the call log.
#[derive(Clone, Default)]
pub struct MockFetch {
    state: Arc<Mutex<State>>,
    offline: Arc<AtomicBool>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `snapshot` from now on.
    pub fn respond(&self, url: &str, snapshot: ResponseSnapshot) {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(url.to_owned(), Reply::Respond(snapshot));
    }

    /// Fail every fetch of `url` with a network error.
    pub fn fail(&self, url: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(url.to_owned(), Reply::Fail);
    }

    /// Hold fetches of `url` until the returned gate is notified.
    ///
    /// Each `notify_one` releases one fetch.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(url.to_owned(), Arc::clone(&gate));
        gate
    }

    /// Fail every fetch with a network error while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of fetches of `url` so far.
    pub fn calls(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        let url = request.url().as_str().to_owned();
        let (reply, gate) = {
            let mut state = self.state.lock().unwrap();
            *state.calls.entry(url.clone()).or_default() += 1;
            (state.replies.get(&url).cloned(), state.gates.get(&url).cloned())
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::offline("offline"));
        }
        match reply {
            Some(Reply::Respond(snapshot)) => Ok(snapshot),
            Some(Reply::Fail) => Err(FetchError::offline(format!("{url} unreachable"))),
            None => Ok(ResponseSnapshot::builder(StatusCode::NOT_FOUND).build()),
        }
    }
}
