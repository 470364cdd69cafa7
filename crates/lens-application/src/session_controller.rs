use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use lens_core::clock::Clock;
use lens_core::concept::{ConceptGenerator, GenerationRequest, assign_concept_ids};
use lens_core::config::AppConfig;
use lens_core::error::{LensError, Result};
use lens_core::history::{HistoryStore, SavedProject, WriteOutcome};
use lens_core::product::{DEFAULT_MAX_IMAGE_BYTES, EncodedImage, ProductDescriptor, check_size};
use lens_core::session::Session;
use tokio::sync::{Mutex, RwLock};

const MISSING_SUBJECT_MESSAGE: &str =
    "Please provide at least a product name, URL, or image to begin.";
const MISSING_REFINEMENT_MESSAGE: &str = "Please describe how the concepts should change.";

/// Tunables the controller needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Largest accepted product image, in bytes.
    pub max_image_bytes: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_image_bytes: config.image.max_bytes,
        }
    }
}

/// Coordinates the working session, the history store and the generator.
///
/// `SessionController` is responsible for:
/// - Editing the product descriptor of the current session
/// - Running generation and refinement requests, one at a time
/// - Saving, loading and deleting history entries
///
/// History operations take the history lock only for their own duration.
/// Generation is the single suspension point; the session lock is never held
/// across it, so edits made while a request is outstanding are kept and the
/// results are applied on top of them. Starting a new project or loading a
/// saved one begins a new session epoch, and results requested under an
/// older epoch are dropped.
pub struct SessionController {
    /// Working session
    session: RwLock<Session>,
    /// Saved projects
    history: Mutex<HistoryStore>,
    /// Remote concept generator
    generator: Arc<dyn ConceptGenerator>,
    /// Time source for concept ids
    clock: Arc<dyn Clock>,
    /// Set while a generation request is outstanding
    generating: AtomicBool,
    /// Bumped whenever the working session is replaced
    epoch: AtomicU64,
    settings: ControllerSettings,
}

impl SessionController {
    /// Creates a controller with an empty session.
    pub fn new(
        history: HistoryStore,
        generator: Arc<dyn ConceptGenerator>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            session: RwLock::new(Session::new()),
            history: Mutex::new(history),
            generator,
            clock,
            generating: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            settings,
        }
    }

    /// Returns a snapshot of the working session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Returns the saved projects, newest first.
    pub async fn history(&self) -> Vec<SavedProject> {
        self.history.lock().await.list().to_vec()
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    /// Applies `edit` to the product descriptor of the working session.
    pub async fn edit_product<F>(&self, edit: F)
    where
        F: FnOnce(&mut ProductDescriptor),
    {
        let mut session = self.session.write().await;
        edit(&mut session.product);
    }

    /// Encodes and attaches a product image.
    ///
    /// # Errors
    ///
    /// Returns `LensError::SizeExceeded` when the image is over the configured
    /// limit. The session is left untouched in that case.
    pub async fn attach_image(&self, bytes: &[u8], mime_type: &str) -> Result<()> {
        let image = EncodedImage::encode(bytes, mime_type, self.settings.max_image_bytes)
            .inspect_err(|e| tracing::warn!("[Session] Rejected product image: {}", e))?;
        self.session.write().await.product.product_image = Some(image);
        Ok(())
    }

    /// Attaches an image that was already encoded, e.g. loaded from disk.
    ///
    /// The decoded size is still checked against the configured limit.
    pub async fn attach_encoded_image(&self, image: EncodedImage) -> Result<()> {
        check_size(image.decoded_len(), self.settings.max_image_bytes)?;
        self.session.write().await.product.product_image = Some(image);
        Ok(())
    }

    pub async fn clear_image(&self) {
        self.session.write().await.product.product_image = None;
    }

    /// Stores feedback for the next [`refine`](Self::refine) call.
    pub async fn set_refinement(&self, text: impl Into<String>) {
        self.session.write().await.refinement = text.into();
    }

    /// Generates a fresh batch of concepts for the current descriptor.
    ///
    /// On success the session's concepts and grounding sources are replaced and
    /// the number of concepts is returned.
    ///
    /// # Errors
    ///
    /// - `LensError::Validation` when name, URL and image are all blank. The
    ///   generator is not called.
    /// - `LensError::GenerationInProgress` when another request is outstanding.
    /// - `LensError::GenerationFailed` when the generator fails; the cause is
    ///   logged and the session is unchanged.
    ///
    /// Returns `Ok(0)` without touching the session when it was replaced by
    /// [`new_project`](Self::new_project) or
    /// [`load_project`](Self::load_project) while the request was outstanding.
    pub async fn generate(&self) -> Result<usize> {
        self.run_generation(None).await
    }

    /// Generates a new batch using the pending refinement text.
    ///
    /// Behaves like [`generate`](Self::generate). Once the new concepts are
    /// applied the refinement text is cleared, unless it was edited while the
    /// request was outstanding.
    pub async fn refine(&self) -> Result<usize> {
        let refinement = self.session.read().await.refinement.clone();
        if refinement.trim().is_empty() {
            return Err(LensError::validation(MISSING_REFINEMENT_MESSAGE));
        }
        self.run_generation(Some(refinement)).await
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    async fn run_generation(&self, refinement: Option<String>) -> Result<usize> {
        let (product, epoch) = {
            let session = self.session.read().await;
            (session.product.clone(), self.epoch.load(Ordering::Acquire))
        };
        if !product.has_subject() {
            return Err(LensError::validation(MISSING_SUBJECT_MESSAGE));
        }

        let _guard = GenerationGuard::acquire(&self.generating)?;
        let refining = refinement.is_some();
        let mut request = GenerationRequest::new(product);
        if let Some(text) = &refinement {
            request = request.with_refinement(text.clone());
        }

        tracing::info!(
            "[Session] Requesting concepts for '{}' (refinement: {})",
            request.product.name,
            refining
        );
        let generated = match self.generator.generate(&request).await {
            Ok(generated) => generated,
            Err(e) => {
                tracing::error!("[Session] Concept generation failed: {}", e);
                return Err(LensError::GenerationFailed);
            }
        };

        let concepts = assign_concept_ids(generated.drafts, self.clock.now_ms());
        let count = concepts.len();

        let mut session = self.session.write().await;
        if self.epoch.load(Ordering::Acquire) != epoch {
            tracing::debug!(
                "[Session] Dropping {} concept(s) for a replaced session",
                count
            );
            return Ok(0);
        }
        session.apply_results(concepts, generated.sources);
        if refinement.is_some_and(|sent| session.refinement == sent) {
            session.refinement.clear();
        }
        tracing::info!("[Session] Applied {} concept(s)", count);
        Ok(count)
    }

    /// Saves the working session as a new history entry.
    ///
    /// # Errors
    ///
    /// Returns `LensError::EmptySession` when there are no concepts to save.
    /// A storage failure is not an error: it is reported on the outcome while
    /// the entry stays in the in-memory history.
    pub async fn save_project(&self) -> Result<WriteOutcome<SavedProject>> {
        let session = self.session.read().await.clone();
        let outcome = self.history.lock().await.save(&session)?;
        if let Some(e) = outcome.persistence_error() {
            tracing::warn!(
                "[Session] Project {} kept in memory only: {}",
                outcome.value.id,
                e
            );
        }
        Ok(outcome)
    }

    /// Restores a saved project into the working session.
    ///
    /// # Errors
    ///
    /// Returns `LensError::NotFound` for an unknown id; the session is unchanged.
    pub async fn load_project(&self, id: &str) -> Result<SavedProject> {
        let project = self.history.lock().await.load(id)?;
        let mut session = self.session.write().await;
        session.restore(&project);
        self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("[Session] Loaded project {}", id);
        Ok(project)
    }

    /// Removes a project from history. Unknown ids are a no-op.
    pub async fn delete_project(&self, id: &str) -> WriteOutcome<Option<SavedProject>> {
        self.history.lock().await.delete(id)
    }

    /// Resets the working session to empty defaults.
    pub async fn new_project(&self) {
        let mut session = self.session.write().await;
        session.reset();
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

/// Holds the in-flight flag for the lifetime of one generation request.
///
/// Dropping the guard, including when the request future is dropped, clears
/// the flag.
struct GenerationGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> GenerationGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LensError::GenerationInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = GenerationGuard::acquire(&flag).unwrap();
        assert!(matches!(
            GenerationGuard::acquire(&flag),
            Err(LensError::GenerationInProgress)
        ));
        drop(guard);
        assert!(GenerationGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = AppConfig::default();
        config.image.max_bytes = 10;
        assert_eq!(ControllerSettings::from_config(&config).max_image_bytes, 10);
        assert_eq!(
            ControllerSettings::default().max_image_bytes,
            DEFAULT_MAX_IMAGE_BYTES
        );
    }
}
