// Desktop UI for Cinebot
//
// CinebotApp owns the conversation controller. Each frame drains agent events
// through `poll`, then draws the header, input bar and transcript.

pub mod theme;
mod views;

use crate::controller::{ConversationController, SubmitOutcome};
use eframe::egui;
use std::time::Duration;

/// Repaint cadence while a request is in flight, so events show up promptly
const BUSY_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct CinebotApp {
    controller: ConversationController,
    input: String,
}

impl CinebotApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: ConversationController) -> Self {
        theme::apply(&cc.egui_ctx);
        Self::with_controller(controller)
    }

    pub fn with_controller(controller: ConversationController) -> Self {
        Self {
            controller,
            input: String::new(),
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Submit the current input; the field is cleared only once the request starts
    fn send_input(&mut self) -> SubmitOutcome {
        let outcome = self.controller.submit(&self.input);
        if outcome == SubmitOutcome::Started {
            self.input.clear();
        }
        outcome
    }

    /// Draw one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        self.controller.poll();

        self.render_header(ctx);
        self.render_input_bar(ctx);
        self.render_transcript(ctx);

        if self.controller.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT_INTERVAL);
        }
    }
}

impl eframe::App for CinebotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentExecutor, AgentRequest, AgentResponse};
    use crate::error::Result;
    use crate::events::{AgentEvent, EventSink};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct TrailerAgent;

    #[async_trait]
    impl AgentExecutor for TrailerAgent {
        async fn invoke(&self, request: AgentRequest, events: EventSink) -> Result<AgentResponse> {
            let _ = events.publish(AgentEvent::tool_call("youtube_search", request.input));
            let _ = events.publish(AgentEvent::tool_result(
                "🎬 Found trailer: https://www.youtube.com/watch?v=YoHD9XEInc0",
            ));
            Ok(AgentResponse::answer(
                "Watch it here: https://www.youtube.com/watch?v=YoHD9XEInc0",
            ))
        }
    }

    fn app() -> CinebotApp {
        let runtime = Arc::new(tokio::runtime::Runtime::new().unwrap());
        CinebotApp::with_controller(ConversationController::new(Arc::new(TrailerAgent), runtime))
    }

    #[test]
    fn test_send_clears_input_only_when_started() {
        let mut app = app();

        app.input = "   ".to_string();
        assert_eq!(app.send_input(), SubmitOutcome::Ignored);
        assert_eq!(app.input, "   ");

        app.input = "Inception".to_string();
        assert_eq!(app.send_input(), SubmitOutcome::Started);
        assert!(app.input.is_empty());

        app.input = "Heat".to_string();
        assert_eq!(app.send_input(), SubmitOutcome::Busy);
        assert_eq!(app.input, "Heat");
    }

    #[test]
    fn test_frames_render_headless() {
        let mut app = app();
        app.input = "Inception".to_string();
        app.send_input();
        app.controller.wait();

        let ctx = egui::Context::default();
        theme::apply(&ctx);
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| app.show(ctx));
        }

        assert_eq!(app.controller().transcript().len(), 4);
        assert!(!app.controller().is_busy());
    }
}
