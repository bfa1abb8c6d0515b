//! Self-contained HTML summary with an embedded PNG card

use super::ExportFile;
use crate::model::{CompletionState, Group, total_points};
use crate::raster::{Canvas, Rgb};

pub const SUMMARY_FILENAME: &str = "checklist.html";

/// Card size in pixels
pub const CARD_WIDTH: u32 = 300;
pub const CARD_HEIGHT: u32 = 150;

/// Characters of the note shown on the card
pub const NOTE_PREVIEW_CHARS: usize = 20;

const CARD_TITLE: &str = "Carrot Summary";
const TEXT_X: i32 = 10;
/// Font pixel size; 7 rows at 2x is close to a 16px line
const TEXT_SCALE: u32 = 2;

/// What the summary card shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub total_points: u64,
    pub note_preview: String,
}

impl SummaryCard {
    pub fn new(groups: &[Group], state: &CompletionState, note: &str) -> Self {
        Self {
            total_points: total_points(groups, state),
            note_preview: note.chars().take(NOTE_PREVIEW_CHARS).collect(),
        }
    }

    /// The three card lines, top to bottom
    pub fn lines(&self) -> [String; 3] {
        [
            CARD_TITLE.to_string(),
            format!("Points: {}", self.total_points),
            format!("Notes: {}", self.note_preview),
        ]
    }

    /// Draw the card: white background, black text at baselines 30, 60, 90
    pub fn render(&self) -> Canvas {
        let mut canvas = Canvas::new(CARD_WIDTH, CARD_HEIGHT);
        canvas.clear(Rgb::WHITE);
        for (i, line) in self.lines().iter().enumerate() {
            let baseline = 30 * (i as i32 + 1);
            canvas.fill_text(line, TEXT_X, baseline, TEXT_SCALE, Rgb::BLACK);
        }
        canvas
    }
}

/// Build `checklist.html`
///
/// The page carries the card as a PNG data URI and redraws it onto an inline
/// canvas, so it renders offline with no external assets.
pub fn export_summary_document(
    groups: &[Group],
    state: &CompletionState,
    note: &str,
) -> std::io::Result<ExportFile> {
    let card = SummaryCard::new(groups, state, note);
    let data_url = card.render().to_data_url()?;

    Ok(ExportFile {
        filename: SUMMARY_FILENAME,
        mime: "text/html",
        content: summary_html(&data_url),
    })
}

fn summary_html(data_url: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body><h1>Checklist Summary</h1>\
         <canvas id=\"c\" width=\"{w}\" height=\"{h}\"></canvas>\
         <script>const img=new Image();\
         img.onload=()=>document.getElementById('c').getContext('2d').drawImage(img,0,0);\
         img.src='{data_url}';</script></body></html>",
        w = CARD_WIDTH,
        h = CARD_HEIGHT,
    )
}
