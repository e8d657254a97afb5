//! Single-line text label.

use std::any::Any;

use crate::layout::{MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::tree::WidgetId;
use crate::widget::Widget;

/// Displays a line of text, optionally wrapping onto multiple lines.
pub struct Label {
    text: String,
    wrap: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            wrap: false,
        }
    }

    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Number of lines needed at `width` pixels, greedily breaking at
    /// spaces.
    fn line_count(&self, ctx: &MeasureCtx<'_>, font_size: f64, width: i32) -> i32 {
        if !self.wrap || width <= 0 {
            return 1;
        }
        let mut lines = 1;
        let mut current = String::new();
        for word in self.text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if ctx.fonts.text_width(&candidate, font_size) > width && !current.is_empty() {
                lines += 1;
                current = word.to_owned();
            } else {
                current = candidate;
            }
        }
        lines
    }

    fn longest_word_width(&self, ctx: &MeasureCtx<'_>, font_size: f64) -> i32 {
        self.text
            .split_whitespace()
            .map(|w| ctx.fonts.text_width(w, font_size))
            .max()
            .unwrap_or(0)
    }
}

impl Widget for Label {
    fn element(&self) -> &str {
        "label"
    }

    fn request_mode(&self) -> SizeRequestMode {
        if self.wrap {
            SizeRequestMode::HeightForWidth
        } else {
            SizeRequestMode::ConstantSize
        }
    }

    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement {
        let font_size = ctx.font_size(id);
        match orientation {
            Orientation::Horizontal => {
                let natural = ctx.fonts.text_width(&self.text, font_size);
                let minimum = if self.wrap {
                    self.longest_word_width(ctx, font_size)
                } else {
                    natural
                };
                Measurement::new(minimum, natural)
            }
            Orientation::Vertical => {
                let lines = self.line_count(ctx, font_size, for_size);
                let line_height = ctx.fonts.line_height(font_size);
                let ascent = ctx.fonts.ascent(font_size);
                Measurement::new(lines * line_height, lines * line_height)
                    .with_baselines(ascent, ascent)
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
