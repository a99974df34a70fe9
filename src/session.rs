//! Interactive session
//!
//! Line-oriented shell over stdio. Each input line is one command that
//! updates the criteria, runs a search, or inspects the current state.

use crate::autocomplete::NickCompleter;
use crate::controller::{ResultState, SearchController};
use crate::facets::FacetAggregator;
use crate::notify::Notifier;
use crate::query::UserQuery;
use crate::service::{Bucket, SearchService};
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use tracing::info;

const BANNER: &str = "userlens interactive session. Type \"help\" for commands.\n";

const HELP: &str = "\
Commands:
  find                   run a search with the current criteria
  page <n>               jump to page n (triggers a search)
  text [words]           set the free text, or clear it with no argument
  wildcard on|off|clear  control wildcard matching
  click <lat> <lon>      set the point of interest
  distance [km]          set the geo radius, or clear it with no argument
  field [name]           restrict matching to one field, or clear it
  suggest <partial>      nickname suggestions for a partial input
  facets                 facet buckets for the current criteria
  show                   print the latest results again
  query                  print the current criteria
  quit                   leave the session";

enum Outcome {
    Reply(String),
    Quit,
}

/// Interactive shell wiring the controller, completer and aggregator
/// over one shared service.
pub struct Session {
    controller: Arc<SearchController>,
    completer: NickCompleter,
    aggregator: FacetAggregator,
}

impl Session {
    pub fn new(service: Arc<dyn SearchService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            controller: Arc::new(SearchController::new(service.clone(), notifier)),
            completer: NickCompleter::new(service.clone()),
            aggregator: FacetAggregator::new(service),
        }
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run(&self) -> Result<()> {
        info!("Starting interactive session");

        // Establish the starting page. The first binding never
        // searches, so the session opens quietly.
        self.controller.set_page(1).await;

        let stdin = tokio::io::stdin();
        let mut reader = AsyncBufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        stdout.write_all(BANNER.as_bytes()).await?;
        loop {
            stdout.write_all(b"userlens> ").await?;
            stdout.flush().await?;

            let Some(line) = reader.next_line().await? else {
                break;
            };

            match self.dispatch(line.trim()).await {
                Outcome::Reply(reply) => {
                    if !reply.is_empty() {
                        stdout.write_all(reply.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                }
                Outcome::Quit => break,
            }
        }

        Ok(())
    }

    async fn dispatch(&self, line: &str) -> Outcome {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => Outcome::Reply(String::new()),

            "find" => {
                self.controller.search().await;
                Outcome::Reply(self.render_results().await)
            }

            "page" => match rest.parse::<u64>() {
                Ok(page) => {
                    self.controller.set_page(page).await;
                    Outcome::Reply(self.render_results().await)
                }
                Err(_) => Outcome::Reply("usage: page <number>".to_string()),
            },

            "text" => {
                if rest.is_empty() {
                    self.controller.set_free_text(None).await;
                    Outcome::Reply("free text cleared".to_string())
                } else {
                    self.controller.set_free_text(Some(rest.to_string())).await;
                    Outcome::Reply(format!("free text = {:?}", rest))
                }
            }

            "wildcard" => match rest {
                "on" => {
                    self.controller.set_wildcard(Some(true)).await;
                    Outcome::Reply("wildcard = on".to_string())
                }
                "off" => {
                    self.controller.set_wildcard(Some(false)).await;
                    Outcome::Reply("wildcard = off".to_string())
                }
                "clear" => {
                    self.controller.set_wildcard(None).await;
                    Outcome::Reply("wildcard cleared".to_string())
                }
                _ => Outcome::Reply("usage: wildcard on|off|clear".to_string()),
            },

            "click" => {
                let mut parts = rest.split_whitespace();
                let lat = parts.next().and_then(|v| v.parse::<f64>().ok());
                let lon = parts.next().and_then(|v| v.parse::<f64>().ok());
                match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        self.controller.map_click(lat, lon).await;
                        Outcome::Reply(format!("point of interest = {}, {}", lat, lon))
                    }
                    _ => Outcome::Reply("usage: click <lat> <lon>".to_string()),
                }
            }

            "distance" => {
                if rest.is_empty() {
                    self.controller.set_distance(None).await;
                    Outcome::Reply("distance cleared".to_string())
                } else {
                    self.controller.set_distance(Some(rest.to_string())).await;
                    Outcome::Reply(format!("distance = {}", rest))
                }
            }

            "field" => {
                if rest.is_empty() {
                    self.controller.set_field(None).await;
                    Outcome::Reply("field cleared".to_string())
                } else {
                    self.controller.set_field(Some(rest.to_string())).await;
                    Outcome::Reply(format!("field = {}", rest))
                }
            }

            "suggest" => {
                if rest.is_empty() {
                    Outcome::Reply("usage: suggest <partial>".to_string())
                } else {
                    Outcome::Reply(self.completer.suggest(rest).await.join("\n"))
                }
            }

            "facets" => {
                let query = self.controller.query().await;
                self.aggregator.refresh(&query).await;
                Outcome::Reply(render_buckets_text(&self.aggregator.buckets().await))
            }

            "show" => Outcome::Reply(self.render_results().await),

            "query" => Outcome::Reply(render_query(&self.controller.query().await)),

            "help" => Outcome::Reply(HELP.to_string()),

            "quit" | "exit" => Outcome::Quit,

            other => Outcome::Reply(format!("Unknown command: {} (try \"help\")", other)),
        }
    }

    async fn render_results(&self) -> String {
        render_results_text(
            &self.controller.results().await,
            self.controller.current_page().await,
            self.controller.items_per_page(),
        )
    }
}

/// Render the latest results for terminal output.
pub fn render_results_text(state: &ResultState, page: u64, per_page: u64) -> String {
    if !state.has_searched {
        return "No search has run yet. Set criteria and use \"find\".".to_string();
    }

    let pages = ((state.total + per_page - 1) / per_page).max(1);
    let mut out = format!("Page {} of {} ({} users total)\n", page, pages, state.total);

    for user in &state.users {
        out.push_str("  ");
        out.push_str(&serde_json::to_string(user).unwrap_or_default());
        out.push('\n');
    }

    match &state.markers {
        None => out.push_str("Markers: (cleared)\n"),
        Some(markers) => {
            out.push_str(&format!("Markers: {}\n", markers.len()));
            for marker in markers {
                out.push_str(&format!("  [{:.4}, {:.4}]\n", marker.lat, marker.lng));
            }
        }
    }

    out.trim_end().to_string()
}

/// Render facet buckets, one per line.
pub fn render_buckets_text(buckets: &[Bucket]) -> String {
    if buckets.is_empty() {
        return "No facet buckets.".to_string();
    }

    let mut out = String::new();
    for bucket in buckets {
        let key = match &bucket.key {
            Value::String(key) => key.clone(),
            other => other.to_string(),
        };
        out.push_str(&format!("  {:<24} {}\n", key, bucket.count));
    }
    out.trim_end().to_string()
}

fn render_query(query: &UserQuery) -> String {
    fn opt(value: Option<&str>) -> String {
        value.map_or_else(|| "(unset)".to_string(), |v| format!("{:?}", v))
    }

    let click = query
        .click()
        .map_or_else(|| "(unset)".to_string(), |c| format!("{}, {}", c.lat, c.lon));
    let wildcard = query
        .wildcard()
        .map_or_else(|| "(unset)".to_string(), |w| w.to_string());

    format!(
        "  text     = {}\n  wildcard = {}\n  click    = {}\n  distance = {}\n  field    = {}\n  page     = {}",
        opt(query.free_text()),
        wildcard,
        click,
        opt(query.distance()),
        opt(query.field()),
        query.page_index()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::notify::RecordingNotifier;
    use crate::service::{AggregateParams, FindParams, SearchResults};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    struct StubService {
        find_responses: StdMutex<VecDeque<Result<SearchResults, ServiceError>>>,
        find_calls: StdMutex<Vec<FindParams>>,
        suggestions: Vec<String>,
        buckets: Vec<Bucket>,
    }

    impl StubService {
        fn new(find_responses: Vec<Result<SearchResults, ServiceError>>) -> Self {
            Self {
                find_responses: StdMutex::new(find_responses.into()),
                find_calls: StdMutex::new(Vec::new()),
                suggestions: Vec::new(),
                buckets: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl SearchService for StubService {
        async fn find(&self, params: &FindParams) -> Result<SearchResults, ServiceError> {
            self.find_calls.lock().unwrap().push(params.clone());
            self.find_responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted find call")
        }

        async fn autocomplete(&self, _nick: &str) -> Result<Vec<String>, ServiceError> {
            Ok(self.suggestions.clone())
        }

        async fn aggregate(&self, _params: &AggregateParams) -> Result<Vec<Bucket>, ServiceError> {
            Ok(self.buckets.clone())
        }
    }

    fn session(service: StubService) -> (Session, Arc<StubService>) {
        let service = Arc::new(service);
        let notifier = Arc::new(RecordingNotifier::new());
        (Session::new(service.clone(), notifier), service)
    }

    fn one_user_page() -> SearchResults {
        SearchResults {
            users: vec![json!({
                "email": "anna@example.com",
                "location": {"lat": 54.35, "lon": 18.65}
            })],
            total: 1,
        }
    }

    async fn reply(session: &Session, line: &str) -> String {
        match session.dispatch(line).await {
            Outcome::Reply(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_criteria_commands_update_the_query() {
        let (session, _) = session(StubService::new(vec![]));

        reply(&session, "text Ann").await;
        reply(&session, "wildcard on").await;
        reply(&session, "click 54.35 18.65").await;
        reply(&session, "distance 25").await;
        reply(&session, "field name").await;

        let query = session.controller.query().await;
        assert_eq!(query.free_text(), Some("Ann"));
        assert_eq!(query.wildcard(), Some(true));
        assert_eq!(query.click().map(|c| (c.lat, c.lon)), Some((54.35, 18.65)));
        assert_eq!(query.distance(), Some("25"));
        assert_eq!(query.field(), Some("name"));
    }

    #[tokio::test]
    async fn test_find_runs_a_search_and_renders_the_page() {
        let (session, service) = session(StubService::new(vec![Ok(one_user_page())]));

        let text = reply(&session, "find").await;

        assert_eq!(service.find_calls.lock().unwrap().len(), 1);
        assert!(text.contains("Page 1 of 1 (1 users total)"));
        assert!(text.contains("anna@example.com"));
        assert!(text.contains("Markers: 1"));
    }

    #[tokio::test]
    async fn test_initial_page_binding_then_change_searches_once() {
        let (session, service) = session(StubService::new(vec![Ok(one_user_page())]));

        reply(&session, "page 1").await;
        assert!(service.find_calls.lock().unwrap().is_empty());

        let text = reply(&session, "page 2").await;
        assert_eq!(service.find_calls.lock().unwrap().len(), 1);
        assert!(text.contains("Page 2"));
    }

    #[tokio::test]
    async fn test_suggest_renders_the_echo_first() {
        let mut service = StubService::new(vec![]);
        service.suggestions = vec!["anna".to_string(), "annabelle".to_string()];
        let (session, _) = session(service);

        let text = reply(&session, "suggest ann").await;
        assert_eq!(text, "ann\nanna\nannabelle");
    }

    #[tokio::test]
    async fn test_facets_render_after_a_refresh() {
        let mut service = StubService::new(vec![]);
        service.buckets = vec![Bucket {
            key: json!("pomorskie"),
            count: 120,
        }];
        let (session, _) = session(service);

        let text = reply(&session, "facets").await;
        assert!(text.contains("pomorskie"));
        assert!(text.contains("120"));
    }

    #[tokio::test]
    async fn test_wildcard_rejects_an_unknown_argument() {
        let (session, _) = session(StubService::new(vec![]));

        let text = reply(&session, "wildcard maybe").await;
        assert!(text.starts_with("usage:"));
        assert_eq!(session.controller.query().await.wildcard(), None);
    }

    #[tokio::test]
    async fn test_unknown_command_points_at_help() {
        let (session, _) = session(StubService::new(vec![]));

        let text = reply(&session, "frobnicate now").await;
        assert!(text.contains("Unknown command: frobnicate"));
    }

    #[tokio::test]
    async fn test_quit_and_exit_end_the_session() {
        let (session, _) = session(StubService::new(vec![]));

        assert!(matches!(session.dispatch("quit").await, Outcome::Quit));
        assert!(matches!(session.dispatch("exit").await, Outcome::Quit));
    }

    #[test]
    fn test_render_before_any_search_explains_itself() {
        let text = render_results_text(&ResultState::default(), 1, 100);
        assert!(text.contains("No search has run yet"));
    }

    #[test]
    fn test_render_distinguishes_cleared_markers() {
        let state = ResultState {
            users: Vec::new(),
            markers: None,
            total: 0,
            has_searched: true,
        };

        let text = render_results_text(&state, 1, 100);
        assert!(text.contains("Page 1 of 1 (0 users total)"));
        assert!(text.contains("Markers: (cleared)"));
    }
}
