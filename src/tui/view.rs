//! Pure rendering: prompt state → framed text layout → ratatui widgets.
//!
//! `layout_frame` computes every row of the bordered box from the prompt
//! request and the current input buffer. Its plain-text form is byte-stable
//! (same inputs, same bytes), which is what makes immediate-mode redraw on
//! every keystroke safe. `render` turns a layout into styled lines; the
//! only effect is Frame::render_widget().

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::state::PromptRequest;
use super::theme;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Outer size of the kiosk frame in character cells, borders included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

/// The kiosk's fixed frame.
pub const KIOSK_FRAME: FrameGeometry = FrameGeometry {
    width: 59,
    height: 18,
};

impl FrameGeometry {
    /// Columns between the two side borders.
    pub fn inner_width(self) -> usize {
        self.width.saturating_sub(2)
    }

    /// Longest input the live line accepts when a prompt sets no cap.
    pub fn input_limit(self) -> usize {
        self.width.saturating_sub(4)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// One row of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// `/-----\`
    Top,
    /// `\-----/`
    Bottom,
    /// `|     |`
    Blank,
    /// Static text, already centered to the inner width.
    Text(String),
    /// The live input line.
    Input {
        lead: usize,
        text: String,
        caret: char,
        trail: usize,
    },
}

/// A fully computed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub geometry: FrameGeometry,
    pub rows: Vec<Row>,
}

/// Caret drawn after the typed text.
pub const CARET: char = '|';

/// Compute the frame for `request` with `input` typed so far.
///
/// Vertical placement: with `half = height/2 - 1`, the pre-text block gets
/// `half - pre_lines + offset - even_correction` blank rows above it and the
/// post-text block `half - post_lines - offset` below. Negative counts pad
/// nothing. For a full frame the row count equals the geometry height.
pub fn layout_frame(
    geometry: FrameGeometry,
    request: &PromptRequest,
    input: &str,
    show_caret: bool,
) -> FrameLayout {
    let inner = geometry.inner_width();
    let pre_lines: Vec<&str> = request.pre_text.split('\n').collect();
    let post_lines: Vec<&str> = request.post_text.split('\n').collect();

    let half = (geometry.height / 2) as i64 - 1;
    let even_correction = 1 - (geometry.height % 2) as i64;
    let offset = i64::from(request.vertical_offset);
    let pad_above = half - pre_lines.len() as i64 + offset - even_correction;
    let pad_below = half - post_lines.len() as i64 - offset;

    let mut rows = Vec::with_capacity(geometry.height);
    rows.push(Row::Top);
    rows.extend(blank_rows(pad_above));
    rows.extend(pre_lines.iter().map(|line| Row::Text(center_line(line, inner))));
    rows.push(input_row(input, show_caret, inner));
    rows.extend(post_lines.iter().map(|line| Row::Text(center_line(line, inner))));
    rows.extend(blank_rows(pad_below));
    rows.push(Row::Bottom);

    FrameLayout { geometry, rows }
}

fn blank_rows(count: i64) -> impl Iterator<Item = Row> {
    std::iter::repeat_n(Row::Blank, count.max(0) as usize)
}

/// Live line: typed text plus caret, centered with any odd space on the right.
fn input_row(input: &str, show_caret: bool, inner: usize) -> Row {
    let used = input.chars().count() + 1;
    let free = inner.saturating_sub(used);
    let lead = free / 2;

    Row::Input {
        lead,
        text: input.to_string(),
        caret: if show_caret { CARET } else { ' ' },
        trail: free - lead,
    }
}

/// Center `text` in `width` columns.
///
/// When the margin is odd and the width is odd the extra column goes on
/// the left, otherwise on the right. Text wider than `width` is returned
/// unchanged.
pub fn center_line(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }

    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

impl Row {
    /// Plain-text form of the row, borders included.
    pub fn to_plain(&self, inner: usize) -> String {
        match self {
            Row::Top => format!("/{}\\", "-".repeat(inner)),
            Row::Bottom => format!("\\{}/", "-".repeat(inner)),
            Row::Blank => format!("|{}|", " ".repeat(inner)),
            Row::Text(text) => format!("|{}|", text),
            Row::Input {
                lead,
                text,
                caret,
                trail,
            } => format!("|{}{}{}{}|", " ".repeat(*lead), text, caret, " ".repeat(*trail)),
        }
    }
}

impl FrameLayout {
    /// Rows joined by '\n', no trailing newline.
    pub fn to_text(&self) -> String {
        let inner = self.geometry.inner_width();
        self.rows
            .iter()
            .map(|row| row.to_plain(inner))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// DRAWING
// ============================================================================

/// Draw the layout in the top-left corner of the terminal frame.
pub fn render(layout: &FrameLayout, frame: &mut Frame) {
    let lines: Vec<Line> = layout
        .rows
        .iter()
        .map(|row| styled_row(row, layout.geometry.inner_width()))
        .collect();

    let wanted = Rect::new(
        0,
        0,
        layout.geometry.width as u16,
        layout.rows.len() as u16,
    );
    let area = wanted.intersection(frame.area());

    frame.render_widget(Paragraph::new(lines), area);
}

fn styled_row(row: &Row, inner: usize) -> Line<'static> {
    match row {
        Row::Input {
            lead,
            text,
            caret,
            trail,
        } => Line::from(vec![
            Span::styled(format!("|{}", " ".repeat(*lead)), theme::STYLE_FRAME),
            Span::styled(text.clone(), theme::STYLE_INPUT),
            Span::styled(caret.to_string(), theme::STYLE_CARET),
            Span::styled(format!("{}|", " ".repeat(*trail)), theme::STYLE_FRAME),
        ]),
        Row::Text(text) => Line::from(vec![
            Span::styled("|", theme::STYLE_FRAME),
            Span::styled(text.clone(), theme::STYLE_TEXT),
            Span::styled("|", theme::STYLE_FRAME),
        ]),
        border => Line::from(Span::styled(border.to_plain(inner), theme::STYLE_FRAME)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
