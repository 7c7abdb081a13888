//! Request lifecycle and token rendering
//!
//! `Idle -> Submitting -> {Rendered | Failed}`, and back to `Submitting` on the
//! next submission. A submission is split into [`ResponseController::begin`]
//! and [`ResponseController::finish`] so an event loop can keep several
//! requests in flight; only the most recent one is allowed to render.

use crate::annotation::{Annotation, GenerationResponse};
use crate::client::{ClientError, GenerationClient, GenerationRequest};
use crate::surface::{NoticeKind, OutputNode, OutputSurface, RenderedToken, TooltipSurface};
use crate::tooltip::TooltipController;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Notice shown next to text that came back without probabilities
pub const PROBABILITIES_UNAVAILABLE: &str =
    "Note: Token probabilities not available for this response.";

/// Notice shown when a response has neither tokens nor text
pub const NO_DATA: &str = "No response data received.";

/// Submission was refused before reaching the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a prompt.")]
    EmptyPrompt,
}

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Submitting,
    Rendered,
    Failed,
}

/// A request that has been started and not yet finished
#[derive(Debug)]
pub struct Submission {
    generation: u64,
    request: GenerationRequest,
}

impl Submission {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl RenderedToken {
    /// Pointer moved over this token
    pub fn on_pointer_move<T: TooltipSurface>(
        &self,
        tooltip: &mut TooltipController<T>,
        x: f64,
        y: f64,
    ) {
        tooltip.show(x, y, self.record.probability, &self.record.alternatives);
    }

    /// Pointer left this token
    pub fn on_pointer_out<T: TooltipSurface>(&self, tooltip: &mut TooltipController<T>) {
        tooltip.hide();
    }
}

/// Drives one output region and its tooltip through the request lifecycle
pub struct ResponseController<S: OutputSurface, T: TooltipSurface> {
    surface: S,
    tooltip: TooltipController<T>,
    state: ControllerState,
    /// Token elements of the current render, in response order
    elements: Vec<RenderedToken>,
    /// Number of the latest submission
    generation: u64,
}

impl<S: OutputSurface, T: TooltipSurface> ResponseController<S, T> {
    pub fn new(surface: S, tooltip: T) -> Self {
        Self {
            surface,
            tooltip: TooltipController::new(tooltip),
            state: ControllerState::Idle,
            elements: Vec::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tooltip(&self) -> &TooltipController<T> {
        &self.tooltip
    }

    /// Token elements currently rendered
    pub fn elements(&self) -> &[RenderedToken] {
        &self.elements
    }

    /// Submit the current prompt through `client` and render the outcome.
    ///
    /// Only validation failures are returned; request failures are rendered
    /// and reported through the resulting state.
    pub async fn submit<C>(&mut self, client: &C) -> Result<ControllerState, ValidationError>
    where
        C: GenerationClient + ?Sized,
    {
        let submission = self.begin()?;

        info!(
            client = client.name(),
            generation = submission.generation,
            prompt_len = submission.request.prompt.len(),
            "Submitting prompt"
        );

        let result = client.generate(submission.request()).await;
        Ok(self.finish(submission, result).unwrap_or(self.state))
    }

    /// Start a submission: validate the prompt, show the loading indicator
    /// and clear the previous output.
    ///
    /// An empty prompt raises an alert and leaves everything else untouched.
    pub fn begin(&mut self) -> Result<Submission, ValidationError> {
        let prompt = self.surface.prompt_text();
        if prompt.is_empty() {
            let err = ValidationError::EmptyPrompt;
            self.surface.alert(&err.to_string());
            return Err(err);
        }

        self.generation += 1;
        self.state = ControllerState::Submitting;

        self.surface.set_loading(true);
        self.clear();

        Ok(Submission {
            generation: self.generation,
            request: GenerationRequest::new(prompt),
        })
    }

    /// Settle a submission with its result.
    ///
    /// Returns the new state, or `None` when a newer submission has been
    /// started since; such results are dropped without touching the surface.
    pub fn finish(
        &mut self,
        submission: Submission,
        result: Result<GenerationResponse, ClientError>,
    ) -> Option<ControllerState> {
        if submission.generation != self.generation {
            debug!(
                stale = submission.generation,
                current = self.generation,
                "Discarding superseded response"
            );
            return None;
        }

        // Hidden before rendering so every exit from Submitting clears it.
        self.surface.set_loading(false);

        self.state = match result {
            Ok(response) => {
                debug!(records = response.record_count(), "Received response");
                self.render(response.classify());
                ControllerState::Rendered
            }
            Err(err) => {
                warn!(error = %err, "Generation request failed");
                self.render_error(err.user_message());
                ControllerState::Failed
            }
        };

        Some(self.state)
    }

    /// Forward a pointer-move on token `index` to the tooltip.
    ///
    /// Returns false when no such token is rendered.
    pub fn pointer_move(&mut self, index: usize, x: f64, y: f64) -> bool {
        match self.elements.get(index) {
            Some(element) => {
                element.on_pointer_move(&mut self.tooltip, x, y);
                true
            }
            None => false,
        }
    }

    /// Forward a pointer-out on token `index` to the tooltip
    pub fn pointer_out(&mut self, index: usize) -> bool {
        match self.elements.get(index) {
            Some(element) => {
                element.on_pointer_out(&mut self.tooltip);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.surface.clear_output();
        // The hovered element (if any) is gone, so nothing will send its pointer-out.
        self.tooltip.hide();
    }

    fn render(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Annotated { tokens, .. } => {
                debug!(tokens = tokens.len(), "Rendering annotated response");
                for (index, record) in tokens.into_iter().enumerate() {
                    let element = RenderedToken { index, record };
                    self.surface.append(OutputNode::Token(element.clone()));
                    self.elements.push(element);
                }
            }
            Annotation::Plain(text) => {
                warn!("Response has no token probabilities, showing text only");
                self.surface.append(OutputNode::Text(text));
                self.surface.append(OutputNode::notice(
                    NoticeKind::ProbabilitiesUnavailable,
                    PROBABILITIES_UNAVAILABLE,
                ));
            }
            Annotation::Empty => {
                warn!("Response has neither tokens nor text");
                self.surface
                    .append(OutputNode::notice(NoticeKind::NoData, NO_DATA));
            }
        }
    }

    fn render_error(&mut self, message: &str) {
        self.surface.append(OutputNode::notice(
            NoticeKind::Error,
            format!("Error: {}", message),
        ));
    }
}
