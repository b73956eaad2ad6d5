//! Multipart profile forms.
//!
//! Registration and edit arrive as `multipart/form-data`: plain text fields, an
//! optional `image` file, and `socialLinks` / `projects` as embedded JSON
//! strings. Empty text fields count as absent.

use super::{NewProfile, ProfileDetails, ProfileEdit, Project, SocialLinks};
use crate::error::{AppError, AppResult};
use crate::media::ImageUpload;

use axum::extract::Multipart;
use std::collections::HashMap;

pub const IMAGE_FIELD: &str = "image";

/// Upper bound for a whole profile form body, image included.
pub const MAX_FORM_BYTES: usize = 10 * 1024 * 1024;

#[derive(Default)]
#[cfg_attr(test, derive(Debug))]
pub struct ProfileForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl ProfileForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;

                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes,
                        file_name,
                        content_type,
                    });
                }
            } else {
                let value = field.text().await.map_err(malformed)?;
                form.set(name, value);
            }
        }

        Ok(form)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    pub fn into_new_profile(mut self) -> AppResult<NewProfile> {
        let details = self.details()?;

        Ok(NewProfile {
            name: self.take("name").unwrap_or_default(),
            password: self.take("password").unwrap_or_default().into(),
            details,
            image: self.image,
        })
    }

    pub fn into_edit(mut self) -> AppResult<ProfileEdit> {
        Ok(ProfileEdit {
            details: self.details()?,
            image: self.image,
        })
    }

    fn details(&mut self) -> AppResult<ProfileDetails> {
        Ok(ProfileDetails {
            bio: self.take("bio"),
            skills: self.take("skills").map(|skills| parse_skills(&skills)),
            social_links: self
                .take("socialLinks")
                .map(|json| parse_social_links(&json))
                .transpose()?,
            location: self.take("location"),
            projects: self
                .take("projects")
                .map(|json| parse_projects(&json))
                .transpose()?,
        })
    }

    fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name).filter(|value| !value.is_empty())
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            limit_mib: MAX_FORM_BYTES / (1024 * 1024),
        };
    }

    AppError::invalid_input(format!("Malformed form data: {}", err.body_text()))
}

/// Comma separated tags, trimmed, blanks dropped.
fn parse_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_social_links(json: &str) -> AppResult<SocialLinks> {
    serde_json::from_str(json)
        .map_err(|e| AppError::invalid_input(format!("Invalid socialLinks: {e}")))
}

fn parse_projects(json: &str) -> AppResult<Vec<Project>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| AppError::invalid_input(format!("Invalid projects: {e}")))?;

    if !value.is_array() {
        return Err(AppError::invalid_input("Projects must be an array"));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::invalid_input(format!("Invalid projects: {e}")))
}
