//! Floating probability tooltip
//!
//! One tooltip is shared by every token element. Showing it overwrites the
//! content and position; hiding it only flips visibility, so the last content
//! stays in place until the next `show`.

use crate::annotation::{Alternative, TokenRecord};
use crate::surface::TooltipSurface;
use std::fmt;

/// Distance in pixels between the pointer and the tooltip's top-left corner
pub const TOOLTIP_OFFSET: f64 = 10.0;

/// Format a probability the way the tooltip shows it
pub fn format_probability(p: f64) -> String {
    format!("{:.4}", p)
}

/// Rendered tooltip body for one token
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    /// The token's probability, 4 decimal places
    pub probability: String,
    /// (token, probability) pairs in the order received
    pub alternatives: Vec<(String, String)>,
}

impl TooltipContent {
    pub fn new(probability: f64, alternatives: &[Alternative]) -> Self {
        Self {
            probability: format_probability(probability),
            alternatives: alternatives
                .iter()
                .map(|alt| (alt.token.clone(), format_probability(alt.probability)))
                .collect(),
        }
    }

    pub fn for_record(record: &TokenRecord) -> Self {
        Self::new(record.probability, &record.alternatives)
    }

    /// Heading line, e.g. `Probability: 0.9000`
    pub fn probability_line(&self) -> String {
        format!("Probability: {}", self.probability)
    }

    /// One `token: probability` line per alternative
    pub fn alternative_lines(&self) -> Vec<String> {
        self.alternatives
            .iter()
            .map(|(token, prob)| format!("{}: {}", token, prob))
            .collect()
    }

    /// HTML markup for a DOM tooltip; token text is escaped
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<strong>Probability:</strong> {}<br><strong>Top 5 Alternatives:</strong><ul>",
            self.probability
        );
        for (token, prob) in &self.alternatives {
            html.push_str(&format!("<li>{}: {}</li>", html_escape(token), prob));
        }
        html.push_str("</ul>");
        html
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.probability_line())?;
        write!(f, "Top 5 Alternatives:")?;
        for line in self.alternative_lines() {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Owner of the shared tooltip surface
pub struct TooltipController<T: TooltipSurface> {
    surface: T,
    visible: bool,
    position: Option<(f64, f64)>,
}

impl<T: TooltipSurface> TooltipController<T> {
    /// Wrap a surface; the tooltip starts hidden
    pub fn new(mut surface: T) -> Self {
        surface.set_visible(false);
        Self {
            surface,
            visible: false,
            position: None,
        }
    }

    /// Show `probability` and `alternatives` next to the pointer at
    /// (`origin_x`, `origin_y`)
    pub fn show(
        &mut self,
        origin_x: f64,
        origin_y: f64,
        probability: f64,
        alternatives: &[Alternative],
    ) {
        let content = TooltipContent::new(probability, alternatives);
        let x = origin_x + TOOLTIP_OFFSET;
        let y = origin_y + TOOLTIP_OFFSET;

        self.surface.set_content(&content);
        self.surface.move_to(x, y);
        self.surface.set_visible(true);

        self.visible = true;
        self.position = Some((x, y));
    }

    /// Hide the tooltip. Content is left as is.
    pub fn hide(&mut self) {
        self.surface.set_visible(false);
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Top-left corner from the most recent `show`
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    pub fn surface(&self) -> &T {
        &self.surface
    }
}
