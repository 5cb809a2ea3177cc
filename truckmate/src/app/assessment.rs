use super::*;

/// Assessment screen: one upload and its result.
#[derive(Debug, Clone, Default)]
pub struct AssessmentState {
    /// Image chosen on the services screen
    pub upload: Option<ImageUpload>,
    pub result: Option<DamageAssessment>,
    pub error: Option<String>,
    /// Scroll offset for the report
    pub scroll: u16,
    /// Where the annotated image was last saved
    pub saved_to: Option<PathBuf>,
    /// Upload already sent for this visit
    requested: bool,
}

impl AssessmentState {
    pub fn for_upload(upload: ImageUpload) -> Self {
        Self {
            upload: Some(upload),
            ..Self::default()
        }
    }
}

impl App {
    // ========== Assessment Methods ==========

    /// Upload once per navigation to the assessment screen.
    pub(super) fn open_assessment(&mut self) {
        self.assessment.scroll = 0;
        match self.assessment.upload.clone() {
            Some(upload) if !self.assessment.requested => {
                self.assessment.requested = true;
                self.assessment.error = None;
                self.assessment.result = None;
                self.assessment.saved_to = None;
                self.queue(PendingAction::Assess(upload));
            }
            Some(_) => {}
            None => {
                self.assessment.error =
                    Some("No image selected. Choose one on the Services screen.".to_string());
            }
        }
    }

    /// Handle keyboard input on the assessment screen.
    pub(super) fn handle_assessment_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.assessment.scroll = self.assessment.scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.assessment.scroll = self.assessment.scroll.saturating_sub(1);
            }
            KeyCode::PageDown | KeyCode::Char('d') => {
                self.assessment.scroll = self.assessment.scroll.saturating_add(10);
            }
            KeyCode::PageUp | KeyCode::Char('u') => {
                self.assessment.scroll = self.assessment.scroll.saturating_sub(10);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.assessment.scroll = 0;
            }
            KeyCode::Char('s') => self.save_assessment_image(),
            KeyCode::Char('n') | KeyCode::Backspace => {
                self.services.image_path.clear();
                self.navigate(Route::Services);
            }
            _ => {}
        }
    }

    pub(super) fn finish_assess(&mut self, upload: &ImageUpload) {
        match self.backend.assess_damage(upload) {
            Ok(result) => {
                tracing::info!(
                    file = %upload.file_name,
                    damages = result.damages.len(),
                    "Assessment received"
                );
                self.assessment.result = Some(result);
                self.assessment.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assessment failed");
                self.assessment.error = Some(format!(
                    "Error processing image: {}",
                    describe_error(&e)
                ));
            }
        }
    }

    fn save_assessment_image(&mut self) {
        let Some(result) = &self.assessment.result else {
            return;
        };
        let stem = self
            .assessment
            .upload
            .as_ref()
            .and_then(|u| std::path::Path::new(&u.file_name).file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assessment".to_string());
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = self
            .images_dir
            .join(format!("{stem}-assessed-{stamp}.jpg"));

        match result.save_image(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Saved annotated image");
                self.notice = Some(format!("Saved annotated image to {}", path.display()));
                self.assessment.saved_to = Some(path);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save annotated image");
                self.assessment.error = Some(format!("Could not save image: {e}"));
            }
        }
    }
}
