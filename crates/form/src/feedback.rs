//! Feedback overlays: loading, success and error.
//!
//! Exactly one [`FeedbackState`] is visible at a time. Loading can only be
//! left through [`FeedbackController::finish_loading`]; success and error
//! overlays are closed by a [`DismissTrigger`]. Errors raised while loading
//! is shown are queued and open together once loading ends.

/// What the user currently sees on top of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackState {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// User actions that close a success or error overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseButton,
    Backdrop,
    EscapeKey,
}

#[derive(Debug)]
pub struct FeedbackController {
    state: FeedbackState,
    /// Error messages raised while loading was shown, oldest first.
    pending_errors: Vec<String>,
    loading_shown: usize,
    loading_hidden: usize,
}

impl Default for FeedbackController {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackController {
    pub fn new() -> Self {
        Self {
            state: FeedbackState::Idle,
            pending_errors: Vec::new(),
            loading_shown: 0,
            loading_hidden: 0,
        }
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    /// Background scrolling is suppressed while any overlay is open.
    pub fn scroll_locked(&self) -> bool {
        self.state != FeedbackState::Idle
    }

    /// Message of the open error overlay, if any.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            FeedbackState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// How many times the loading overlay was shown and hidden.
    pub fn loading_transitions(&self) -> (usize, usize) {
        (self.loading_shown, self.loading_hidden)
    }

    /// Show the loading overlay, replacing any open success/error overlay.
    ///
    /// Returns `false` if loading is already shown.
    pub fn begin_loading(&mut self) -> bool {
        if self.state == FeedbackState::Loading {
            return false;
        }
        self.state = FeedbackState::Loading;
        self.loading_shown += 1;
        true
    }

    /// Hide the loading overlay. No-op unless loading is shown.
    pub fn end_loading(&mut self) {
        self.finish_loading(None);
    }

    /// Hide the loading overlay and open `outcome` in its place.
    ///
    /// Errors queued during loading take precedence over a success outcome;
    /// with an error outcome as well, all messages are shown together.
    pub fn finish_loading(&mut self, outcome: Option<FeedbackState>) {
        if self.state != FeedbackState::Loading {
            tracing::warn!(state = ?self.state, "finish_loading called without an open loading overlay");
            return;
        }
        self.loading_hidden += 1;

        let mut messages = std::mem::take(&mut self.pending_errors);
        if let Some(FeedbackState::Error(message)) = &outcome {
            messages.push(message.clone());
        }

        self.state = if !messages.is_empty() {
            if outcome == Some(FeedbackState::Success) {
                tracing::info!("Submission succeeded but earlier errors are shown instead");
            }
            FeedbackState::Error(messages.join("\n"))
        } else {
            match outcome {
                Some(FeedbackState::Success) => FeedbackState::Success,
                _ => FeedbackState::Idle,
            }
        };
    }

    /// Open the success overlay. Refused while loading is shown.
    pub fn show_success(&mut self) -> bool {
        if self.state == FeedbackState::Loading {
            tracing::warn!("Success overlay refused while loading");
            return false;
        }
        self.state = FeedbackState::Success;
        true
    }

    /// Open the error overlay. Returns whether it opened now; while loading
    /// is shown the message is queued for [`Self::finish_loading`].
    pub fn show_error(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.state == FeedbackState::Loading {
            tracing::debug!(%message, "Error queued until loading ends");
            self.pending_errors.push(message);
            return false;
        }
        self.state = FeedbackState::Error(message);
        true
    }

    /// Close a success or error overlay. Returns whether anything closed.
    pub fn dismiss(&mut self, trigger: DismissTrigger) -> bool {
        match self.state {
            FeedbackState::Success | FeedbackState::Error(_) => {
                tracing::debug!(?trigger, "Feedback overlay dismissed");
                self.state = FeedbackState::Idle;
                true
            }
            FeedbackState::Idle | FeedbackState::Loading => false,
        }
    }
}
