// Conversation controller: owns the transcript and the single in-flight request
//
// The UI thread calls `submit` when the user sends a query and `poll` once per
// frame. The agent runs on the tokio runtime and reports back through a typed
// event channel, so the UI never blocks on the network.
//
// Every started request ends with exactly one assistant entry: the answer, the
// agent's error, a cancellation notice, or a notice that the worker vanished.

use crate::agent::{AgentExecutor, AgentRequest};
use crate::events::{AgentEvent, EventSink};
use crate::logger::EventLogger;
use crate::transcript::{EntryKind, Transcript};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;

const NO_RESPONSE_TEXT: &str = "🤖 No response received.";
const WORKER_LOST_MESSAGE: &str = "Agent task ended without a response.";
const CANCELLED_MESSAGE: &str = "Request cancelled.";

/// What happened to a submitted query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Query was empty after trimming; nothing recorded
    Ignored,
    /// Another request is still running; nothing recorded
    Busy,
    /// User entry appended and the agent started
    Started,
}

/// State for the request currently being answered
struct InFlightRequest {
    logger: EventLogger,
    events: mpsc::UnboundedReceiver<AgentEvent>,
    task: JoinHandle<()>,
}

pub struct ConversationController {
    agent: Arc<dyn AgentExecutor>,
    runtime: Arc<Runtime>,
    transcript: Transcript,
    in_flight: Option<InFlightRequest>,
}

impl ConversationController {
    pub fn new(agent: Arc<dyn AgentExecutor>, runtime: Arc<Runtime>) -> Self {
        Self {
            agent,
            runtime,
            transcript: Transcript::new(),
            in_flight: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Mutable access for the UI to consume scroll requests
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start answering `query`
    ///
    /// The user entry is appended before this returns; the answer arrives
    /// later through `poll` or `wait`.
    pub fn submit(&mut self, query: &str) -> SubmitOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.is_busy() {
            tracing::warn!("Rejected query while a request is in flight: {:?}", query);
            return SubmitOutcome::Busy;
        }

        self.transcript.append(EntryKind::User, format!("👤 {}", query));
        tracing::info!("Starting request: {:?}", query);

        let (sink, events) = EventSink::channel();
        let task = self.runtime.spawn(run_agent(
            Arc::clone(&self.agent),
            AgentRequest::new(query),
            sink,
        ));

        self.in_flight = Some(InFlightRequest {
            logger: EventLogger::new(),
            events,
            task,
        });

        SubmitOutcome::Started
    }

    /// Apply every event that has already arrived, without blocking
    ///
    /// Returns true when the transcript changed.
    pub fn poll(&mut self) -> bool {
        let before = self.transcript.len();

        while let Some(request) = self.in_flight.as_mut() {
            match request.events.try_recv() {
                Ok(event) => self.dispatch(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.worker_lost(),
            }
        }

        self.transcript.len() != before
    }

    /// Block the calling thread until the in-flight request finishes
    ///
    /// Must not be called from inside the tokio runtime.
    pub fn wait(&mut self) {
        while let Some(request) = self.in_flight.as_mut() {
            match self.runtime.block_on(request.events.recv()) {
                Some(event) => self.dispatch(event),
                None => self.worker_lost(),
            }
        }
    }

    /// Submit and wait for the answer; for scripts and tests
    pub fn submit_blocking(&mut self, query: &str) -> SubmitOutcome {
        let outcome = self.submit(query);
        if outcome == SubmitOutcome::Started {
            self.wait();
        }
        outcome
    }

    /// Abort the in-flight request, if any
    pub fn cancel(&mut self) {
        if let Some(request) = self.in_flight.take() {
            request.task.abort();
            tracing::info!("Request cancelled by user");
            self.transcript
                .append(EntryKind::Assistant, format!("🤖 Error: {}", CANCELLED_MESSAGE));
        }
    }

    fn dispatch(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::Complete { output } => {
                let text = match output {
                    Some(output) => format!("🤖 {}", output),
                    None => NO_RESPONSE_TEXT.to_string(),
                };
                self.finish(text);
            }
            AgentEvent::Failed { message } => {
                self.finish(format!("🤖 Error: {}", message));
            }
            event => {
                if let Some(request) = self.in_flight.as_mut() {
                    request.logger.handle(&mut self.transcript, &event);
                }
            }
        }
    }

    fn worker_lost(&mut self) {
        tracing::error!("Agent task exited without a terminal event");
        self.finish(format!("🤖 Error: {}", WORKER_LOST_MESSAGE));
    }

    fn finish(&mut self, text: String) {
        if self.in_flight.take().is_some() {
            self.transcript.append(EntryKind::Assistant, text);
            tracing::info!("Request finished");
        }
    }
}

/// Worker body: run the agent and report how it ended
async fn run_agent(agent: Arc<dyn AgentExecutor>, request: AgentRequest, events: EventSink) {
    let terminal = match agent.invoke(request, events.clone()).await {
        Ok(response) => AgentEvent::Complete {
            output: response.output,
        },
        Err(e) => {
            tracing::error!("Agent invocation failed: {}", e);
            AgentEvent::Failed {
                message: e.to_string(),
            }
        }
    };

    if events.publish(terminal).is_err() {
        tracing::debug!("Request was abandoned before it finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentResponse;
    use crate::error::{CinebotError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    enum Outcome {
        Answer(Option<&'static str>),
        Fail(&'static str),
        Hang,
        Panic,
    }

    /// Agent that replays fixed events, then ends as scripted
    struct ScriptedAgent {
        events: Vec<AgentEvent>,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl ScriptedAgent {
        fn new(events: Vec<AgentEvent>, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                events,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentExecutor for ScriptedAgent {
        async fn invoke(&self, _request: AgentRequest, events: EventSink) -> Result<AgentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for event in &self.events {
                let _ = events.publish(event.clone());
            }
            match self.outcome {
                Outcome::Answer(output) => Ok(AgentResponse {
                    output: output.map(str::to_string),
                }),
                Outcome::Fail(message) => Err(CinebotError::AgentError(message.to_string())),
                Outcome::Hang => std::future::pending().await,
                Outcome::Panic => panic!("agent crashed"),
            }
        }
    }

    fn controller(agent: Arc<ScriptedAgent>) -> ConversationController {
        let runtime = Arc::new(Runtime::new().unwrap());
        ConversationController::new(agent, runtime)
    }

    fn texts(controller: &ConversationController) -> Vec<String> {
        controller
            .transcript()
            .entries()
            .iter()
            .map(|e| e.text().to_string())
            .collect()
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let agent = ScriptedAgent::new(vec![], Outcome::Answer(Some("unused")));
        let mut controller = controller(agent.clone());

        assert_eq!(controller.submit(""), SubmitOutcome::Ignored);
        assert_eq!(controller.submit("   \t "), SubmitOutcome::Ignored);

        assert!(controller.transcript().is_empty());
        assert!(!controller.is_busy());
        assert_eq!(agent.calls(), 0);
    }

    #[test]
    fn test_user_entry_appended_before_agent_returns() {
        let agent = ScriptedAgent::new(vec![], Outcome::Hang);
        let mut controller = controller(agent);

        assert_eq!(controller.submit("  Inception  "), SubmitOutcome::Started);

        assert_eq!(texts(&controller), vec!["👤 Inception"]);
        assert_eq!(controller.transcript().entries()[0].tag(), "user");
        assert!(controller.is_busy());
    }

    #[test]
    fn test_busy_submission_is_rejected() {
        let agent = ScriptedAgent::new(vec![], Outcome::Hang);
        let mut controller = controller(agent);

        controller.submit("Heat");
        assert_eq!(controller.submit("Ronin"), SubmitOutcome::Busy);
        assert_eq!(controller.transcript().len(), 1);

        controller.cancel();
        assert!(!controller.is_busy());
        assert_eq!(texts(&controller), vec!["👤 Heat", "🤖 Error: Request cancelled."]);

        // Idle cancel is a no-op
        controller.cancel();
        assert_eq!(controller.transcript().len(), 2);
    }

    #[test]
    fn test_tool_events_then_answer() {
        let agent = ScriptedAgent::new(
            vec![
                AgentEvent::tool_call("youtube_search", "Inception"),
                AgentEvent::tool_result("🎬 Found trailer: https://www.youtube.com/watch?v=abc123"),
                AgentEvent::tool_result("🎬 Found trailer: https://www.youtube.com/watch?v=abc123"),
            ],
            Outcome::Answer(Some("Here is the trailer.")),
        );
        let mut controller = controller(agent);

        assert_eq!(controller.submit_blocking("Inception trailer"), SubmitOutcome::Started);

        assert_eq!(
            texts(&controller),
            vec![
                "👤 Inception trailer",
                "Calling youtube_search: \"Inception\"",
                "RESULTS: 🎬 Found trailer: https://www.youtube.com/watch?v=abc123",
                "🤖 Here is the trailer.",
            ]
        );
        let tags: Vec<&str> = controller.transcript().entries().iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec!["user", "tool_call", "result", "ai"]);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_failure_renders_error_verbatim() {
        let agent = ScriptedAgent::new(vec![], Outcome::Fail("timeout"));
        let mut controller = controller(agent);

        controller.submit_blocking("Heat");

        assert_eq!(
            controller.transcript().last().unwrap().text(),
            "🤖 Error: timeout"
        );
    }

    #[test]
    fn test_missing_output_renders_placeholder() {
        let agent = ScriptedAgent::new(vec![], Outcome::Answer(None));
        let mut controller = controller(agent);

        controller.submit_blocking("Heat");

        assert_eq!(
            controller.transcript().last().unwrap().text(),
            "🤖 No response received."
        );
    }

    #[test]
    fn test_crashed_worker_still_ends_request() {
        let agent = ScriptedAgent::new(
            vec![AgentEvent::tool_call("duckduckgo_search", "Heat")],
            Outcome::Panic,
        );
        let mut controller = controller(agent);

        controller.submit_blocking("Heat");

        assert_eq!(
            texts(&controller),
            vec![
                "👤 Heat",
                "Calling duckduckgo_search: \"Heat\"",
                "🤖 Error: Agent task ended without a response.",
            ]
        );
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_poll_drains_without_blocking() {
        let agent = ScriptedAgent::new(
            vec![AgentEvent::tool_call("duckduckgo_search", "Heat 1995")],
            Outcome::Answer(Some("Heat (1995), directed by Michael Mann.")),
        );
        let mut controller = controller(agent.clone());

        controller.submit("Heat");

        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.is_busy() && Instant::now() < deadline {
            controller.poll();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(!controller.is_busy());
        assert!(!controller.poll());
        assert_eq!(controller.transcript().len(), 3);
        assert_eq!(
            controller.transcript().last().unwrap().text(),
            "🤖 Heat (1995), directed by Michael Mann."
        );

        // A new request gets a fresh logger and runs again
        controller.submit_blocking("Heat again");
        assert_eq!(agent.calls(), 2);
        assert_eq!(controller.transcript().len(), 6);
    }
}
