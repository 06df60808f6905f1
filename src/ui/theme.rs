// Colours and per-tag text styles for the chat window

use crate::transcript::EntryKind;
use eframe::egui::{self, Color32, RichText};

pub const PANEL_FILL: Color32 = Color32::from_rgb(0xEA, 0xEA, 0xEA);
pub const HEADER_FILL: Color32 = Color32::from_rgb(0x19, 0x76, 0xD2);
pub const HEADER_TEXT: Color32 = Color32::WHITE;

const USER_TEXT: Color32 = Color32::from_rgb(0x00, 0x80, 0x00);
const TOOL_CALL_BG: Color32 = Color32::from_rgb(0xFF, 0xFF, 0xC5);
const RESULT_BG: Color32 = Color32::from_rgb(0xCB, 0xC3, 0xE3);

/// Light visuals with the grey panel background
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = PANEL_FILL;
    visuals.extreme_bg_color = Color32::WHITE;
    visuals.hyperlink_color = HEADER_FILL;
    ctx.set_visuals(visuals);
}

/// How one transcript tag is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryStyle {
    pub color: Color32,
    pub background: Option<Color32>,
    pub italics: bool,
}

impl EntryStyle {
    pub fn for_kind(kind: EntryKind) -> Self {
        match kind {
            EntryKind::User => Self {
                color: USER_TEXT,
                background: None,
                italics: false,
            },
            EntryKind::Assistant => Self {
                color: Color32::BLACK,
                background: None,
                italics: false,
            },
            EntryKind::ToolCall => Self {
                color: Color32::BLACK,
                background: Some(TOOL_CALL_BG),
                italics: true,
            },
            EntryKind::ToolResult => Self {
                color: Color32::BLACK,
                background: Some(RESULT_BG),
                italics: false,
            },
        }
    }

    /// Styled text; every tag is bold
    pub fn rich_text(&self, text: &str) -> RichText {
        let mut rich = RichText::new(text).strong().color(self.color);
        if self.italics {
            rich = rich.italics();
        }
        if let Some(background) = self.background {
            rich = rich.background_color(background);
        }
        rich
    }
}
