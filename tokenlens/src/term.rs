//! Terminal front end
//!
//! Tokens are printed inline and colored by how confident the model was.
//! Hovering is simulated by the caller; the tooltip prints its content to a
//! writer every time it is shown.

use crate::surface::{MemorySurface, NoticeKind, OutputNode, OutputSurface, TooltipSurface};
use crate::tooltip::TooltipContent;
use colored::Colorize;
use std::io::{self, Write};
use tracing::warn;

/// Coarse confidence bucket used for coloring tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    pub fn from_probability(p: f64) -> Self {
        if p > 0.5 {
            ConfidenceBand::High
        } else if p > 0.2 {
            ConfidenceBand::Medium
        } else if p > 0.05 {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::VeryLow
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            ConfidenceBand::High => text.green().to_string(),
            ConfidenceBand::Medium => text.cyan().to_string(),
            ConfidenceBand::Low => text.yellow().to_string(),
            ConfidenceBand::VeryLow => text.red().bold().to_string(),
        }
    }
}

/// Make whitespace and control characters in a token visible
pub fn visible_token(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\t' => "\\t".to_string(),
            '\r' => "\\r".to_string(),
            ' ' => '\u{2423}'.to_string(),
            c if c.is_control() => format!("\\x{:02x}", c as u32),
            c => c.to_string(),
        })
        .collect()
}

/// Output surface that buffers nodes and prints them on demand
#[derive(Debug, Default)]
pub struct TerminalSurface {
    inner: MemorySurface,
    styled: bool,
    progress: bool,
}

impl TerminalSurface {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            inner: MemorySurface::with_prompt(prompt),
            styled: true,
            progress: false,
        }
    }

    /// Emit ANSI colors when rendering
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Print a progress line to stderr while a request is pending
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn nodes(&self) -> &[OutputNode] {
        &self.inner.output
    }

    pub fn alerts(&self) -> &[String] {
        &self.inner.alerts
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading
    }

    /// Render the output container as terminal text
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut inline = false;

        for node in &self.inner.output {
            match node {
                OutputNode::Token(token) => {
                    let text = token.text();
                    if self.styled {
                        let band = ConfidenceBand::from_probability(token.record.probability);
                        out.push_str(&band.paint(text));
                    } else {
                        out.push_str(text);
                    }
                    inline = true;
                }
                OutputNode::Text(text) => {
                    if inline {
                        out.push('\n');
                    }
                    out.push_str(text);
                    out.push('\n');
                    inline = false;
                }
                OutputNode::Notice { kind, message } => {
                    if inline {
                        out.push('\n');
                    }
                    out.push_str(&self.notice(*kind, message));
                    out.push('\n');
                    inline = false;
                }
            }
        }

        if inline {
            out.push('\n');
        }
        out
    }

    fn notice(&self, kind: NoticeKind, message: &str) -> String {
        if !self.styled {
            return message.to_string();
        }
        match kind {
            NoticeKind::ProbabilitiesUnavailable => {
                format!("\u{26a0} {}", message).as_str().yellow().to_string()
            }
            NoticeKind::NoData => message.red().to_string(),
            NoticeKind::Error => message.red().bold().to_string(),
        }
    }
}

impl OutputSurface for TerminalSurface {
    fn prompt_text(&self) -> String {
        self.inner.prompt_text()
    }

    fn alert(&mut self, message: &str) {
        self.inner.alert(message);
    }

    fn set_loading(&mut self, visible: bool) {
        if self.progress && visible && !self.inner.loading {
            eprintln!("{}", "Generating...".dimmed());
        }
        self.inner.set_loading(visible);
    }

    fn clear_output(&mut self) {
        self.inner.clear_output();
    }

    fn append(&mut self, node: OutputNode) {
        self.inner.append(node);
    }
}

/// Tooltip that writes its content out each time it becomes visible
pub struct TerminalTooltip<W: Write> {
    out: W,
    content: Option<TooltipContent>,
    /// Set after the first failed write so the warning is logged once
    write_failed: bool,
}

impl<W: Write> TerminalTooltip<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            content: None,
            write_failed: false,
        }
    }

    fn print(&mut self) {
        let Some(content) = &self.content else {
            return;
        };
        if let Err(err) = write_content(&mut self.out, content) {
            if !self.write_failed {
                warn!(error = %err, "Failed to print tooltip");
                self.write_failed = true;
            }
        }
    }
}

fn write_content(out: &mut impl Write, content: &TooltipContent) -> io::Result<()> {
    writeln!(out, "  {} {}", "Probability:".bold(), content.probability)?;
    writeln!(out, "  {}", "Top 5 Alternatives:".bold())?;
    for (token, prob) in &content.alternatives {
        writeln!(out, "    {}: {}", visible_token(token), prob)?;
    }
    Ok(())
}

impl<W: Write> TooltipSurface for TerminalTooltip<W> {
    fn set_content(&mut self, content: &TooltipContent) {
        self.content = Some(content.clone());
    }

    // Output is line-based, there is nowhere to move to.
    fn move_to(&mut self, _x: f64, _y: f64) {}

    fn set_visible(&mut self, visible: bool) {
        if visible {
            self.print();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::TokenRecord;
    use crate::surface::RenderedToken;
    use crate::tooltip::TooltipController;

    fn token(index: usize, text: &str, p: f64) -> OutputNode {
        OutputNode::Token(RenderedToken {
            index,
            record: TokenRecord::new(text, p),
        })
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_probability(0.9), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_probability(0.3), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_probability(0.1), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_probability(0.01), ConfidenceBand::VeryLow);
        assert_eq!(ConfidenceBand::from_probability(0.5), ConfidenceBand::Medium);
    }

    #[test]
    fn test_visible_token() {
        assert_eq!(visible_token(" sky"), "\u{2423}sky");
        assert_eq!(visible_token("\n"), "\\n");
        assert_eq!(visible_token("a\u{7}"), "a\\x07");
        assert_eq!(visible_token("plain"), "plain");
    }

    #[test]
    fn test_render_tokens_inline() {
        let mut surface = TerminalSurface::new("p").styled(false);
        surface.append(token(0, "The", 0.9));
        surface.append(token(1, " sky", 0.7));
        assert_eq!(surface.render(), "The sky\n");
    }

    #[test]
    fn test_render_plain_and_notice() {
        let mut surface = TerminalSurface::new("p").styled(false);
        surface.append(OutputNode::Text("hello".to_string()));
        surface.append(OutputNode::notice(
            NoticeKind::ProbabilitiesUnavailable,
            "no probabilities",
        ));
        assert_eq!(surface.render(), "hello\nno probabilities\n");
    }

    #[test]
    fn test_surface_delegates_state() {
        let mut surface = TerminalSurface::new("prompt").styled(false);
        assert_eq!(surface.prompt_text(), "prompt");
        surface.set_loading(true);
        assert!(surface.is_loading());
        surface.alert("careful");
        assert_eq!(surface.alerts(), ["careful".to_string()]);
        surface.append(token(0, "x", 0.2));
        surface.clear_output();
        assert!(surface.nodes().is_empty());
    }

    #[test]
    fn test_tooltip_prints_on_show_only() {
        let alternatives = TokenRecord::new("The", 0.9)
            .with_alternative(" The", 0.9)
            .alternatives;
        let mut tooltip = TooltipController::new(TerminalTooltip::new(Vec::new()));
        tooltip.show(0.0, 0.0, 0.9, &alternatives);
        tooltip.hide();

        let printed = String::from_utf8(tooltip.surface().out.clone()).unwrap();
        assert!(printed.contains("0.9000"));
        assert!(printed.contains("\u{2423}The: 0.9000"));
        assert_eq!(printed.matches("0.9000").count(), 2);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tooltip_write_failure_is_recorded() {
        let mut tooltip = TooltipController::new(TerminalTooltip::new(ClosedPipe));
        assert!(!tooltip.surface().write_failed);

        tooltip.show(0.0, 0.0, 0.5, &[]);
        assert!(tooltip.surface().write_failed);

        // Later shows keep going without panicking
        tooltip.show(1.0, 1.0, 0.25, &[]);
        assert!(tooltip.is_visible());
    }
}
