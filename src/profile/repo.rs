use crate::error::AppResult;
use crate::profile::password::PasswordHash;
use crate::profile::{Profile, ProfileId, Project, SocialLinks};

use entrait::entrait;

/// Everything needed to store a freshly registered profile.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct NewProfileRecord<'a> {
    pub name: &'a str,
    pub password_hash: PasswordHash,
    pub bio: Option<&'a str>,
    pub skills: &'a [String],
    pub social_links: &'a SocialLinks,
    pub location: Option<&'a str>,
    pub image_url: &'a str,
    pub projects: &'a [Project],
}

/// `None` keeps the stored value.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug))]
pub struct ProfileUpdate<'a> {
    pub bio: Option<&'a str>,
    pub skills: Option<&'a [String]>,
    pub social_links: Option<&'a SocialLinks>,
    pub location: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub projects: Option<&'a [Project]>,
}

#[entrait(ProfileRepoImpl, delegate_by = DelegateProfileRepo, mock_api = ProfileRepoMock)]
pub trait ProfileRepo {
    async fn insert_profile(&self, record: NewProfileRecord<'_>) -> AppResult<Profile>;

    async fn find_credentials_by_name(
        &self,
        name: &str,
    ) -> AppResult<Option<(Profile, PasswordHash)>>;

    async fn find_profile_by_identity(
        &self,
        profile_id: ProfileId,
        name: &str,
    ) -> AppResult<Option<Profile>>;

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        update: ProfileUpdate<'_>,
    ) -> AppResult<Profile>;

    /// Bumps the view counter and returns the profile as it is afterwards.
    async fn record_profile_view(&self, profile_id: ProfileId) -> AppResult<Option<Profile>>;

    async fn select_most_viewed(&self, limit: i64) -> AppResult<Vec<Profile>>;

    /// Case-insensitive substring match over name, skills and location.
    async fn select_matching(&self, needle: &str, limit: i64) -> AppResult<Vec<Profile>>;
}
