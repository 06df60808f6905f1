// View rendering for the chat window: header, transcript and input bar

use super::theme::{self, EntryStyle};
use crate::controller::SubmitOutcome;
use crate::transcript::{split_trailer_links, TextSpan, TranscriptEntry};
use eframe::egui;

impl super::CinebotApp {
    pub(super) fn render_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(theme::HEADER_FILL)
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(crate::version::APP_NAME)
                        .size(18.0)
                        .strong()
                        .color(theme::HEADER_TEXT),
                );
            });
    }

    /// Single-line entry, Send button, and the busy indicator
    pub(super) fn render_input_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("input_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme::PANEL_FILL)
                    .inner_margin(egui::Margin::symmetric(10, 8)),
            )
            .show(ctx, |ui| {
                let busy = self.controller.is_busy();

                ui.horizontal(|ui| {
                    let controls_width = if busy { 150.0 } else { 70.0 };
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.input)
                            .hint_text("Ask about a movie or series...")
                            .desired_width(ui.available_width() - controls_width),
                    );

                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    let send = ui.add_enabled(!busy, egui::Button::new("Send")).clicked();

                    if busy {
                        ui.add(egui::Spinner::new());
                        if ui.button("Cancel").clicked() {
                            self.controller.cancel();
                        }
                    }

                    if (enter || send) && self.send_input() == SubmitOutcome::Started {
                        response.request_focus();
                    }
                });
            });
    }

    pub(super) fn render_transcript(&mut self, ctx: &egui::Context) {
        let scroll_to_end = self.controller.transcript_mut().take_scroll_request();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for entry in self.controller.transcript().entries() {
                        render_entry(ui, entry);
                        ui.add_space(6.0);
                    }

                    if scroll_to_end {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });
    }
}

/// One transcript entry; trailer URLs become clickable links
fn render_entry(ui: &mut egui::Ui, entry: &TranscriptEntry) {
    let style = EntryStyle::for_kind(entry.kind());

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in split_trailer_links(entry.text()) {
            match span {
                TextSpan::Plain(text) => {
                    ui.label(style.rich_text(text));
                }
                TextSpan::Link(url) => {
                    let link_color = ui.visuals().hyperlink_color;
                    ui.hyperlink_to(style.rich_text(url).color(link_color).underline(), url);
                }
            }
        }
    })
    .response
    .on_hover_text(entry.timestamp().format("%H:%M:%S").to_string());
}
