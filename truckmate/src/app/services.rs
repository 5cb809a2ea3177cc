use std::path::Path;

use super::*;

/// Service offered on the services screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceCard {
    /// Upload a photo for damage assessment
    #[default]
    Assessment,
    /// Chat with the repair assistant
    Recommendation,
}

/// Services screen: pick a photo to assess or open the assistant.
#[derive(Debug, Clone, Default)]
pub struct ServicesState {
    pub selected: ServiceCard,
    pub image_path: TextInput,
    pub error: Option<String>,
}

impl App {
    /// Handle keyboard input on the services screen.
    pub(super) fn handle_services_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.services.selected = match self.services.selected {
                    ServiceCard::Assessment => ServiceCard::Recommendation,
                    ServiceCard::Recommendation => ServiceCard::Assessment,
                };
                self.services.error = None;
            }
            KeyCode::Enter => match self.services.selected {
                ServiceCard::Assessment => self.submit_image(),
                ServiceCard::Recommendation => self.navigate(Route::Recommendation),
            },
            _ if self.services.selected == ServiceCard::Assessment => {
                self.services.image_path.handle_key(key);
            }
            _ => {}
        }
    }

    fn submit_image(&mut self) {
        let raw = self.services.image_path.value().trim();
        if raw.is_empty() {
            self.services.error = Some("Please choose an image to upload.".to_string());
            return;
        }

        match ImageUpload::from_path(Path::new(raw)) {
            Ok(upload) => {
                tracing::debug!(
                    file = %upload.file_name,
                    bytes = upload.bytes.len(),
                    "Image selected"
                );
                self.services.error = None;
                self.assessment = AssessmentState::for_upload(upload);
                self.navigate(Route::Assessment);
            }
            Err(e) => {
                self.services.error = Some(match e {
                    Error::Io(io) => format!("Could not read {raw}: {io}"),
                    other => describe_error(&other),
                });
            }
        }
    }
}
