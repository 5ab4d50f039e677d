//! The hot reload event stream.
//!
//! Browsers connect with an `EventSource` and receive the state of the dev compiler: `building`
//! when a rebuild starts, `built` when it completed, and `sync` right after connecting. A
//! heartbeat keeps idle connections open.

use crate::compiler::Stats;
use crate::serve;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::{IntervalStream, WatchStream};

/// The route of the event stream.
pub const HMR_PATH: &str = "/__webpack_hmr";
/// Interval of the heartbeat.
pub const HEARTBEAT: Duration = Duration::from_secs(10);
const HEARTBEAT_DATA: &str = "\u{1f493}";

/// State of the dev compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HmrState {
    /// Nothing compiled yet.
    #[default]
    Idle,
    Building,
    Built(Stats),
}

/// (outgoing) messages of the event stream
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    Building,
    Built(BuildSummary),
    Sync(BuildSummary),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildSummary {
    pub name: String,
    pub time: u64,
    pub hash: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Module ids to names, not tracked.
    pub modules: Map<String, Value>,
}

impl From<&Stats> for BuildSummary {
    fn from(stats: &Stats) -> Self {
        Self {
            name: String::new(),
            time: stats.time.unwrap_or_default(),
            hash: stats.hash.clone().unwrap_or_default(),
            warnings: stats.warnings.clone(),
            errors: stats.errors.clone(),
            modules: Map::new(),
        }
    }
}

/// The message announcing a state. With `first`, a completed build is a `sync` instead.
pub fn message(state: &HmrState, first: bool) -> Option<ClientMessage> {
    match state {
        HmrState::Idle => None,
        HmrState::Building => Some(ClientMessage::Building),
        HmrState::Built(stats) if first => Some(ClientMessage::Sync(stats.into())),
        HmrState::Built(stats) => Some(ClientMessage::Built(stats.into())),
    }
}

/// The messages for a stream of states.
pub fn messages(
    states: impl Stream<Item = HmrState>,
) -> impl Stream<Item = ClientMessage> {
    states
        .scan(true, |first, state| {
            let msg = message(&state, *first);
            *first = false;
            futures_util::future::ready(Some(msg))
        })
        .filter_map(futures_util::future::ready)
}

pub(crate) async fn handle_sse(
    State(state): State<Arc<serve::State>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("hot reload client connected");

    let updates = messages(WatchStream::new(state.hmr.clone())).filter_map(|msg| async move {
        match serde_json::to_string(&msg) {
            Ok(data) => Some(Event::default().data(data)),
            Err(err) => {
                tracing::debug!("unable to encode hot reload message: {err}");
                None
            }
        }
    });

    let mut heartbeat = tokio::time::interval(HEARTBEAT);
    heartbeat.reset();
    let heartbeats = IntervalStream::new(heartbeat).map(|_| Event::default().data(HEARTBEAT_DATA));

    let events = stream::select(updates, heartbeats).map(Ok);
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn built() -> HmrState {
        HmrState::Built(Stats {
            hash: Some("4f1c".into()),
            time: Some(120),
            warnings: vec!["big".into()],
            ..Default::default()
        })
    }

    #[test]
    fn messages_follow_the_hot_middleware_shape() {
        let msg = message(&built(), false).expect("message");
        assert_eq!(
            serde_json::to_value(msg).expect("serialize"),
            json!({
                "action": "built",
                "name": "",
                "time": 120,
                "hash": "4f1c",
                "warnings": ["big"],
                "errors": [],
                "modules": {},
            })
        );
        assert_eq!(
            serde_json::to_value(ClientMessage::Building).expect("serialize"),
            json!({"action": "building"})
        );
    }

    #[tokio::test]
    async fn first_completed_build_is_a_sync() {
        let states = stream::iter([HmrState::Idle, HmrState::Building, built(), built()]);
        let sent: Vec<_> = messages(states).collect().await;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], ClientMessage::Building);
        assert!(matches!(sent[1], ClientMessage::Built(_)));

        let states = stream::iter([built(), HmrState::Building]);
        let sent: Vec<_> = messages(states).collect().await;
        assert!(matches!(sent[0], ClientMessage::Sync(_)));
        assert_eq!(sent[1], ClientMessage::Building);
    }
}
