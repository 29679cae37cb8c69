//! Observed editing state.
//!
//! [`EditSession`] holds the uploaded source, the current settings and the
//! last generated result. Every change is announced to subscribers, and a
//! new source always discards the previous result.
//!
//! Generation can run out of band: [`EditSession::begin_generate`] hands out
//! a [`GenerateRequest`] with a snapshot of the inputs, and
//! [`EditSession::complete`] only accepts its result if nothing newer was
//! requested and the source is still the same.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::composite::{CompositeResult, Compositor};
use crate::decode::{decode_image, DecodeError, SourceImage};
use crate::error::CompositeError;
use crate::label::LabelStyle;
use crate::transform::{CropRect, CropShape};

/// User-chosen inputs for one composite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSettings {
    /// Crop in source-pixel coordinates; `None` until the user crops.
    pub crop: Option<CropRect>,
    pub rotation_degrees: f64,
    pub shape: CropShape,
    /// Date to stamp; `None` until picked.
    pub date: Option<NaiveDate>,
}

/// Change notifications delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SourceChanged,
    SettingsChanged,
    ResultReady,
    ResultCleared,
}

impl SessionEvent {
    pub fn name(self) -> &'static str {
        match self {
            SessionEvent::SourceChanged => "source-changed",
            SessionEvent::SettingsChanged => "settings-changed",
            SessionEvent::ResultReady => "result-ready",
            SessionEvent::ResultCleared => "result-cleared",
        }
    }
}

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

/// A composite waiting to run against a snapshot of the session.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub ticket: u64,
    source_generation: u64,
    pub source: Option<Arc<SourceImage>>,
    pub settings: EditSettings,
}

impl GenerateRequest {
    /// Run the composite for this snapshot.
    pub fn run(&self, compositor: &Compositor) -> Result<CompositeResult, CompositeError> {
        let source = self.source.as_deref().ok_or(DecodeError::Empty)?;
        let crop = self
            .settings
            .crop
            .ok_or_else(|| CompositeError::invalid_crop("no crop selected"))?;
        compositor.composite_photo(
            source,
            &crop,
            self.settings.rotation_degrees,
            self.settings.shape,
            self.settings.date,
        )
    }
}

/// Editing state shared by the UI bindings and native callers.
#[derive(Default)]
pub struct EditSession {
    source: Option<Arc<SourceImage>>,
    source_generation: u64,
    settings: EditSettings,
    result: Option<CompositeResult>,
    compositor: Compositor,
    next_ticket: u64,
    subscribers: Vec<Subscriber>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: LabelStyle) -> Self {
        Self {
            compositor: Compositor::new(style),
            ..Self::default()
        }
    }

    /// Register a callback for every [`SessionEvent`].
    pub fn subscribe(&mut self, subscriber: impl FnMut(&SessionEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&mut self, event: SessionEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    /// Decode and install a new source image.
    ///
    /// On failure the current source and result are kept.
    pub fn load_source(&mut self, bytes: &[u8]) -> Result<(), CompositeError> {
        match decode_image(bytes) {
            Ok(image) => self.set_source(image),
            Err(err) => {
                tracing::warn!(error = %err, "rejected uploaded image");
                Err(err.into())
            }
        }
    }

    /// Install an already-decoded source image, discarding any result.
    ///
    /// An empty or malformed image is rejected and the current source and
    /// result are kept.
    pub fn set_source(&mut self, image: SourceImage) -> Result<(), CompositeError> {
        if let Err(err) = image.validate() {
            tracing::warn!(error = %err, "rejected source image");
            return Err(err.into());
        }
        tracing::debug!(width = image.width, height = image.height, "source replaced");
        self.source = Some(Arc::new(image));
        self.source_generation += 1;
        self.settings.crop = None;
        self.notify(SessionEvent::SourceChanged);
        self.clear_result();
        Ok(())
    }

    fn clear_result(&mut self) {
        if self.result.take().is_some() {
            self.notify(SessionEvent::ResultCleared);
        }
    }

    fn update_settings(&mut self, update: impl FnOnce(&mut EditSettings)) {
        let before = self.settings.clone();
        update(&mut self.settings);
        if self.settings != before {
            self.notify(SessionEvent::SettingsChanged);
        }
    }

    pub fn set_crop(&mut self, crop: CropRect) {
        self.update_settings(|s| s.crop = Some(crop));
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.update_settings(|s| s.rotation_degrees = degrees);
    }

    pub fn set_shape(&mut self, shape: CropShape) {
        self.update_settings(|s| s.shape = shape);
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.update_settings(|s| s.date = date);
    }

    pub fn set_style(&mut self, style: LabelStyle) {
        self.compositor = Compositor::new(style);
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_deref()
    }

    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Latest successful composite, if it is still current.
    pub fn result(&self) -> Option<&CompositeResult> {
        self.result.as_ref()
    }

    /// Snapshot the current inputs for an out-of-band composite.
    pub fn begin_generate(&mut self) -> GenerateRequest {
        self.next_ticket += 1;
        GenerateRequest {
            ticket: self.next_ticket,
            source_generation: self.source_generation,
            source: self.source.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Hand back the outcome of `request`.
    ///
    /// Returns `false` when the request was superseded by a newer one or by
    /// a new source; its outcome is then dropped. Errors never replace the
    /// current result.
    pub fn complete(
        &mut self,
        request: &GenerateRequest,
        outcome: Result<CompositeResult, CompositeError>,
    ) -> bool {
        if request.ticket != self.next_ticket || request.source_generation != self.source_generation {
            tracing::warn!(
                ticket = request.ticket,
                latest = self.next_ticket,
                "dropping stale composite"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.notify(SessionEvent::ResultReady);
            }
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "composite failed");
            }
        }
        true
    }

    /// Composite the current inputs and store the result.
    pub fn generate(&mut self) -> Result<&CompositeResult, CompositeError> {
        let request = self.begin_generate();
        let outcome = request.run(&self.compositor);
        let failure = outcome.as_ref().err().cloned();
        self.complete(&request, outcome);
        match (failure, self.result.as_ref()) {
            (Some(err), _) => Err(err),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(DecodeError::Empty.into()),
        }
    }
}
