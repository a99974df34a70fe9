//! Nickname autocompletion
//!
//! Suggestion lists always start with the text the user typed, so the
//! exact input stays selectable even when the service proposes nothing
//! or cannot be reached.

use crate::service::SearchService;
use std::sync::Arc;
use tracing::debug;

/// Produces nickname suggestions for partial input.
pub struct NickCompleter {
    service: Arc<dyn SearchService>,
}

impl NickCompleter {
    pub fn new(service: Arc<dyn SearchService>) -> Self {
        Self { service }
    }

    /// Suggest completions for a partial nickname. The typed text is
    /// always the first entry; service suggestions follow in service
    /// order. A service failure degrades to the echo alone.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        debug!("Start searching for autocomplete with nick: {}", partial);
        let mut suggestions = vec![partial.to_string()];

        match self.service.autocomplete(partial).await {
            Ok(more) => suggestions.extend(more),
            Err(err) => debug!("Autocomplete unavailable: {}", err),
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::service::{AggregateParams, Bucket, FindParams, SearchResults};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    struct ScriptedAutocomplete {
        responses: StdMutex<VecDeque<Result<Vec<String>, ServiceError>>>,
        calls: StdMutex<Vec<String>>,
    }

    impl ScriptedAutocomplete {
        fn new(responses: Vec<Result<Vec<String>, ServiceError>>) -> Self {
            Self {
                responses: StdMutex::new(responses.into()),
                calls: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchService for ScriptedAutocomplete {
        async fn find(&self, _params: &FindParams) -> Result<SearchResults, ServiceError> {
            Ok(SearchResults::default())
        }

        async fn autocomplete(&self, nick: &str) -> Result<Vec<String>, ServiceError> {
            self.calls.lock().unwrap().push(nick.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted autocomplete call")
        }

        async fn aggregate(&self, _params: &AggregateParams) -> Result<Vec<Bucket>, ServiceError> {
            Ok(Vec::new())
        }
    }

    fn completer(
        responses: Vec<Result<Vec<String>, ServiceError>>,
    ) -> (NickCompleter, Arc<ScriptedAutocomplete>) {
        let service = Arc::new(ScriptedAutocomplete::new(responses));
        (NickCompleter::new(service.clone()), service)
    }

    #[tokio::test]
    async fn test_typed_text_comes_first() {
        let (completer, service) = completer(vec![Ok(vec![
            "anna".to_string(),
            "annabelle".to_string(),
        ])]);

        let suggestions = completer.suggest("ann").await;
        assert_eq!(suggestions, vec!["ann", "anna", "annabelle"]);
        assert_eq!(*service.calls.lock().unwrap(), vec!["ann".to_string()]);
    }

    #[tokio::test]
    async fn test_echo_is_kept_even_when_the_service_repeats_it() {
        let (completer, _) = completer(vec![Ok(vec!["ann".to_string(), "anna".to_string()])]);

        let suggestions = completer.suggest("ann").await;
        assert_eq!(suggestions, vec!["ann", "ann", "anna"]);
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_the_echo() {
        let (completer, _) = completer(vec![Err(ServiceError::Api {
            status: 502,
            body: String::new(),
        })]);

        let suggestions = completer.suggest("ann").await;
        assert_eq!(suggestions, vec!["ann"]);
    }

    #[tokio::test]
    async fn test_no_service_suggestions_still_echoes() {
        let (completer, _) = completer(vec![Ok(Vec::new())]);

        let suggestions = completer.suggest("zzz").await;
        assert_eq!(suggestions, vec!["zzz"]);
    }
}
