//! Search state machine: Idle -> Loading -> Success / Failure.
//!
//! Every search gets a fresh [`RequestId`]. A response is only applied while the state is
//! still loading that same request, so a slow answer can never overwrite a newer one.
use serde::Serialize;
use tracing::{error, info};

use crate::converter::ConversionResult;
use crate::error::ResolutionError;
use crate::resolver::{Resolution, StopResolver};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(u64);

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Loading {
        request_id: RequestId,
        stop_id: String,
    },
    Success(ConversionResult),
    Failure {
        message: String,
    },
}

impl SearchState {
    /// Starting a search drops whatever result or error was shown before.
    pub fn begin(self, request_id: RequestId, stop_id: String) -> SearchState {
        SearchState::Loading {
            request_id,
            stop_id,
        }
    }

    /// Whether a response for `request_id` would still be applied.
    pub fn accepts(&self, request_id: RequestId) -> bool {
        matches!(self, SearchState::Loading { request_id: current, .. } if *current == request_id)
    }

    /// Applies a response. Stale responses leave the state untouched.
    pub fn complete(
        self,
        request_id: RequestId,
        outcome: Result<Resolution, ResolutionError>,
    ) -> SearchState {
        if !self.accepts(request_id) {
            return self;
        }

        match outcome {
            Ok(resolution) => SearchState::Success(resolution.into()),
            Err(err) => SearchState::Failure {
                message: err.to_string(),
            },
        }
    }
}

pub struct Session<R> {
    resolver: R,
    state: SearchState,
    last_request: u64,
}

impl<R: StopResolver> Session<R> {
    pub fn new(resolver: R) -> Self {
        Session {
            resolver,
            state: SearchState::Idle,
            last_request: 0,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Moves to loading and hands out the request's ID. Blank input is ignored.
    pub fn begin_search(&mut self, stop_id: &str) -> Option<(RequestId, String)> {
        let stop_id = stop_id.trim();
        if stop_id.is_empty() {
            return None;
        }

        self.last_request += 1;
        let request_id = RequestId(self.last_request);

        let state = std::mem::replace(&mut self.state, SearchState::Idle);
        self.state = state.begin(request_id, stop_id.to_string());

        Some((request_id, stop_id.to_string()))
    }

    /// Returns false when the response was stale and got dropped.
    pub fn finish_search(
        &mut self,
        request_id: RequestId,
        outcome: Result<Resolution, ResolutionError>,
    ) -> bool {
        if !self.state.accepts(request_id) {
            info!("Discarding stale response for request {:?}", request_id);
            return false;
        }

        if let Err(err) = &outcome {
            error!("Stop lookup failed: {err:?}");
        }

        let state = std::mem::replace(&mut self.state, SearchState::Idle);
        self.state = state.complete(request_id, outcome);

        true
    }

    /// Asks the resolver without touching the state. Pair with `begin_search`/`finish_search`.
    pub async fn resolve(&self, stop_id: &str) -> Result<Resolution, ResolutionError> {
        self.resolver.resolve(stop_id).await
    }

    /// Resolves the stop, converts it and stores the outcome.
    ///
    /// Returns `None` without touching the resolver when `stop_id` is blank.
    #[tracing::instrument(skip(self))]
    pub async fn submit_search(&mut self, stop_id: &str) -> Option<&SearchState> {
        let (request_id, stop_id) = self.begin_search(stop_id)?;

        let outcome = self.resolve(&stop_id).await;
        self.finish_search(request_id, outcome);

        Some(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SEOUL_STATION, StopRecord};
    use crate::resolver::mock::MockResolver;

    fn resolution(name: &str) -> Resolution {
        Resolution {
            stop: StopRecord::new("1", name, SEOUL_STATION.latitude, SEOUL_STATION.longitude, None, None)
                .unwrap(),
            sources: vec![],
        }
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut session = Session::new(MockResolver::default());

        assert!(session.submit_search("").await.is_none());
        assert!(session.submit_search("   \t").await.is_none());

        assert_eq!(session.state(), &SearchState::Idle);
        assert!(session.resolver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success() {
        let mut session = Session::new(MockResolver::default());

        let state = session.submit_search("  01141 ").await.cloned();

        match state {
            Some(SearchState::Success(result)) => {
                assert_eq!(result.stop.id(), "01141");
                assert_eq!((result.coords.x, result.coords.y, result.coords.z), (88, 64, 0));
                assert_eq!(result.teleport_command, "/tp @s 88 64 0");
                assert_eq!(result.sources.len(), 1);
            }
            other => panic!("expected success, got {other:?}"),
        }

        assert_eq!(session.resolver.calls(), vec!["01141".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_replaces_previous_result() {
        let mut session = Session::new(MockResolver::default());

        session.submit_search("01141").await;
        let state = session.submit_search("99999").await.cloned();

        assert_eq!(
            state,
            Some(SearchState::Failure {
                message: "No stop was found for this ID. Please check the ID.".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_timeout_message() {
        let mut session = Session::new(MockResolver::default());

        match session.submit_search("timeout").await {
            Some(SearchState::Failure { message }) => assert!(message.contains("30 seconds")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = Session::new(MockResolver::default());

        let (first, _) = session.begin_search("111").unwrap();
        let (second, stop_id) = session.begin_search("222").unwrap();

        assert!(first < second);
        assert_eq!(stop_id, "222");

        assert!(!session.finish_search(first, Ok(resolution("old"))));
        assert_eq!(
            session.state(),
            &SearchState::Loading {
                request_id: second,
                stop_id: "222".to_string()
            }
        );

        assert!(session.finish_search(second, Ok(resolution("new"))));
        match session.state() {
            SearchState::Success(result) => assert_eq!(result.stop.name(), "new"),
            other => panic!("expected success, got {other:?}"),
        }

        // too late, already settled
        assert!(!session.finish_search(second, Err(ResolutionError::EmptyResponse)));
        assert!(matches!(session.state(), SearchState::Success(_)));
    }

    #[test]
    fn test_transitions() {
        let id = RequestId(7);

        let state = SearchState::Idle.begin(id, "1".to_string());
        assert!(matches!(state, SearchState::Loading { .. }));
        assert!(state.accepts(id));
        assert!(!state.accepts(RequestId(6)));

        let state = state.complete(id, Err(ResolutionError::EmptyResponse));
        assert!(matches!(state, SearchState::Failure { .. }));
        assert!(!state.accepts(id));

        let state = state.clone().complete(id, Ok(resolution("ignored")));
        assert!(matches!(state, SearchState::Failure { .. }));
    }
}
