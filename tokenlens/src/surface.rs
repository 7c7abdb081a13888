//! Presentation surface abstraction
//!
//! The controller never touches a real display. It reads the prompt, toggles
//! the loading indicator and appends [`OutputNode`]s through [`OutputSurface`],
//! and drives the floating tooltip through [`TooltipSurface`]. Front ends
//! (terminal, HTML export, tests) implement these.

use crate::annotation::TokenRecord;
use crate::tooltip::TooltipContent;

/// A token element in the output container, carrying its source record
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedToken {
    /// Position in the response (0-based)
    pub index: usize,
    pub record: TokenRecord,
}

impl RenderedToken {
    pub fn text(&self) -> &str {
        &self.record.token
    }
}

/// Kind of inline notice shown in the output container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Plain response: text shown without probability data
    ProbabilitiesUnavailable,
    /// Response carried neither tokens nor text
    NoData,
    /// The request failed
    Error,
}

/// One child of the output container
#[derive(Debug, Clone, PartialEq)]
pub enum OutputNode {
    /// Interactive token element
    Token(RenderedToken),
    /// Plain paragraph of generated text
    Text(String),
    /// Inline notice
    Notice { kind: NoticeKind, message: String },
}

impl OutputNode {
    pub fn notice(kind: NoticeKind, message: impl Into<String>) -> Self {
        OutputNode::Notice {
            kind,
            message: message.into(),
        }
    }
}

/// The page regions the response controller needs
pub trait OutputSurface {
    /// Current contents of the prompt input
    fn prompt_text(&self) -> String;

    /// Raise a blocking, user-facing notice
    fn alert(&mut self, message: &str);

    /// Show or hide the loading indicator
    fn set_loading(&mut self, visible: bool);

    /// Remove every child of the output container
    fn clear_output(&mut self);

    /// Append a child to the output container
    fn append(&mut self, node: OutputNode);
}

/// The single floating tooltip
pub trait TooltipSurface {
    fn set_content(&mut self, content: &TooltipContent);

    /// Move the tooltip's top-left corner to page coordinates
    fn move_to(&mut self, x: f64, y: f64);

    fn set_visible(&mut self, visible: bool);
}

/// Surface that keeps everything in memory
///
/// Used by tests and as the backing store for the export front ends.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub prompt: String,
    pub loading: bool,
    pub output: Vec<OutputNode>,
    pub alerts: Vec<String>,
}

impl MemorySurface {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Token elements currently in the output, in order
    pub fn tokens(&self) -> Vec<&RenderedToken> {
        self.output
            .iter()
            .filter_map(|node| match node {
                OutputNode::Token(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    /// Notices of the given kind currently in the output
    pub fn notices(&self, kind: NoticeKind) -> Vec<&str> {
        self.output
            .iter()
            .filter_map(|node| match node {
                OutputNode::Notice { kind: k, message } if *k == kind => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl OutputSurface for MemorySurface {
    fn prompt_text(&self) -> String {
        self.prompt.clone()
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn set_loading(&mut self, visible: bool) {
        self.loading = visible;
    }

    fn clear_output(&mut self) {
        self.output.clear();
    }

    fn append(&mut self, node: OutputNode) {
        self.output.push(node);
    }
}

/// Tooltip that records its state in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTooltip {
    pub content: Option<TooltipContent>,
    pub position: (f64, f64),
    pub visible: bool,
    /// Number of content writes, for checking that hide leaves content alone
    pub writes: usize,
}

impl TooltipSurface for MemoryTooltip {
    fn set_content(&mut self, content: &TooltipContent) {
        self.content = Some(content.clone());
        self.writes += 1;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
