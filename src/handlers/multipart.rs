//! Multipart form helpers

use std::collections::HashMap;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use crate::models::GeoPoint;
use crate::services::UploadedFile;
use crate::utils::errors::{KarmaHubError, Result};

/// Body-limit failures keep their 413 status; everything else is bad input
fn multipart_error(e: MultipartError, context: &str) -> KarmaHubError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        KarmaHubError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        KarmaHubError::InvalidInput(format!("{}: {}", context, e.body_text()))
    }
}

/// Fields of a multipart form, split into files and text values
#[derive(Debug, Default)]
pub struct MultipartForm {
    files: HashMap<String, UploadedFile>,
    texts: HashMap<String, String>,
}

impl MultipartForm {
    /// Read every field of the form into memory
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, "Malformed multipart body"))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, &format!("Failed to read field '{}'", name)))?;

            match filename {
                Some(filename) if !filename.is_empty() => {
                    form.files.insert(name, UploadedFile::new(filename, bytes.to_vec()));
                }
                Some(_) => {}
                None => {
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|_| KarmaHubError::InvalidInput(format!("Field '{}' is not valid UTF-8", name)))?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    pub fn number(&self, name: &str) -> Result<Option<f64>> {
        self.text(name)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| KarmaHubError::InvalidInput(format!("Field '{}' must be a number", name)))
            })
            .transpose()
    }

    /// Optional `latitude`/`longitude` pair
    pub fn position(&self) -> Result<Option<GeoPoint>> {
        match (self.number("latitude")?, self.number("longitude")?) {
            (Some(latitude), Some(longitude)) => Ok(Some(GeoPoint { latitude, longitude })),
            (None, None) => Ok(None),
            _ => Err(KarmaHubError::InvalidInput(
                "Latitude and longitude must be sent together".to_string(),
            )),
        }
    }
}
