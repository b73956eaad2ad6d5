pub mod auth;
pub mod form;
pub mod password;
pub mod repo;

use crate::error::{AppError, AppResult};
use crate::media::ImageUpload;
use crate::timestamp::Timestamptz;
use password::CleartextPassword;

use entrait::entrait;
use uuid::Uuid;

/// Avatar stored for profiles registered without an image.
pub const DEFAULT_IMAGE_URL: &str = "https://img.freepik.com/premium-vector/vector-flat-illustration-grayscale-avatar-user-profile-person-icon-gender-neutral-silhouette-profile-picture-suitable-social-media-profiles-icons-screensavers-as-templatex9xa_719432-2210.jpg?semt=ais_hybrid";

/// Upper bound for list and search results.
pub const PAGE_LIMIT: i64 = 50;

pub const MAX_BIO_LENGTH: usize = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub Uuid);

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ProfileId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AppError::InvalidProfileId)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A profile as shown to anyone. There is deliberately no password field.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: ProfileId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub social_links: SocialLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub image_url: String,
    pub projects: Vec<Project>,
    pub views: i64,
    pub created_at: Timestamptz,
    pub updated_at: Timestamptz,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct SignedProfile {
    pub profile: Profile,
    pub token: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProfile {
    pub user_id: ProfileId,
    pub name: String,
    pub image_url: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct EditedProfile {
    pub message: String,
    pub profile: Profile,
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
#[cfg_attr(test, derive(Debug))]
#[serde(default)]
pub struct LoginProfile {
    pub name: String,
    pub password: CleartextPassword,
}

/// Optional profile fields shared by registration and edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social_links: Option<SocialLinks>,
    pub location: Option<String>,
    pub projects: Option<Vec<Project>>,
}

impl ProfileDetails {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(AppError::invalid_input(format!(
                    "Bio must be at most {MAX_BIO_LENGTH} characters"
                )));
            }
        }

        if let Some(projects) = &self.projects {
            if projects.iter().any(|project| project.title.trim().is_empty()) {
                return Err(AppError::invalid_input("Project title is required"));
            }
        }

        Ok(())
    }
}

#[cfg_attr(test, derive(Debug))]
pub struct NewProfile {
    pub name: String,
    pub password: CleartextPassword,
    pub details: ProfileDetails,
    pub image: Option<ImageUpload>,
}

#[derive(Default)]
#[cfg_attr(test, derive(Debug))]
pub struct ProfileEdit {
    pub details: ProfileDetails,
    pub image: Option<ImageUpload>,
}

#[entrait(pub ProfileApi, mock_api=ProfileApiMock)]
pub mod api {
    use super::auth::{Authenticate, SignToken, Token};
    use super::password::{HashPassword, VerifyPassword};
    use super::repo::{self, ProfileRepo};
    use super::form::ProfileForm;
    use super::*;
    use crate::media::UploadImage;

    pub async fn create_profile(
        deps: &(impl HashPassword + UploadImage + ProfileRepo + SignToken),
        new_profile: NewProfile,
    ) -> AppResult<SignedProfile> {
        let NewProfile {
            name,
            password,
            details,
            image,
        } = new_profile;

        if name.trim().is_empty() || password.is_empty() {
            return Err(AppError::MissingCredentials);
        }
        details.validate()?;

        if deps.find_credentials_by_name(&name).await?.is_some() {
            return Err(AppError::NameTaken);
        }

        let password_hash = deps.hash_password(password).await?;
        let image_url = match image {
            Some(image) => deps.upload_image(image).await?,
            None => DEFAULT_IMAGE_URL.to_string(),
        };
        let social_links = details.social_links.unwrap_or_default();

        let profile = deps
            .insert_profile(repo::NewProfileRecord {
                name: &name,
                password_hash,
                bio: details.bio.as_deref(),
                skills: details.skills.as_deref().unwrap_or_default(),
                social_links: &social_links,
                location: details.location.as_deref(),
                image_url: &image_url,
                projects: details.projects.as_deref().unwrap_or_default(),
            })
            .await?;

        tracing::info!(profile_id = %profile.id, "created profile");

        Ok(SignedProfile {
            token: deps.sign_token(profile.id, &profile.name),
            profile,
        })
    }

    pub async fn login(
        deps: &(impl ProfileRepo + VerifyPassword + SignToken),
        login: LoginProfile,
    ) -> AppResult<SignedProfile> {
        if login.name.is_empty() || login.password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let (profile, password_hash) = deps
            .find_credentials_by_name(&login.name)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        deps.verify_password(login.password, password_hash).await?;

        Ok(SignedProfile {
            token: deps.sign_token(profile.id, &profile.name),
            profile,
        })
    }

    pub async fn fetch_current(
        deps: &(impl Authenticate + ProfileRepo),
        token: Token,
    ) -> AppResult<CurrentProfile> {
        let profile = authenticated_profile(deps, token).await?;

        Ok(CurrentProfile {
            user_id: profile.id,
            name: profile.name,
            image_url: profile.image_url,
        })
    }

    pub async fn edit_profile(
        deps: &(impl Authenticate + ProfileRepo + UploadImage),
        token: Token,
        profile_id: &str,
        form: ProfileForm,
    ) -> AppResult<EditedProfile> {
        let current = authenticated_profile(deps, token).await?;

        // A malformed path id can never name the caller's own profile.
        if profile_id.parse::<ProfileId>().ok() != Some(current.id) {
            return Err(AppError::Forbidden);
        }

        let ProfileEdit { details, image } = form.into_edit()?;
        details.validate()?;

        let image_url = match image {
            Some(image) => Some(deps.upload_image(image).await?),
            None => None,
        };

        let profile = deps
            .update_profile(
                current.id,
                repo::ProfileUpdate {
                    bio: details.bio.as_deref(),
                    skills: details.skills.as_deref(),
                    social_links: details.social_links.as_ref(),
                    location: details.location.as_deref(),
                    image_url: image_url.as_deref(),
                    projects: details.projects.as_deref(),
                },
            )
            .await?;

        tracing::info!(profile_id = %profile.id, "edited profile");

        Ok(EditedProfile {
            message: "Profile updated successfully".to_string(),
            profile,
        })
    }

    pub async fn fetch_profile(deps: &impl ProfileRepo, profile_id: &str) -> AppResult<Profile> {
        let profile_id: ProfileId = profile_id.parse()?;

        deps.record_profile_view(profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    pub async fn list_profiles(deps: &impl ProfileRepo) -> AppResult<Vec<Profile>> {
        deps.select_most_viewed(PAGE_LIMIT).await
    }

    pub async fn search_profiles(deps: &impl ProfileRepo, query: &str) -> AppResult<Vec<Profile>> {
        if query.is_empty() {
            return Err(AppError::EmptySearchQuery);
        }

        deps.select_matching(query, PAGE_LIMIT).await
    }

    async fn authenticated_profile(
        deps: &(impl Authenticate + ProfileRepo),
        token: Token,
    ) -> AppResult<Profile> {
        let identity = deps.authenticate(token)?;

        deps.find_profile_by_identity(identity.profile_id, &identity.name)
            .await?
            .ok_or(AppError::TokenProfileMissing)
    }
}
