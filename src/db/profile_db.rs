use crate::db::{profile_write_error, GetDb};
use crate::error::{AppError, AppResult};
use crate::profile::password::PasswordHash;
use crate::profile::repo::*;
use crate::profile::{Profile, ProfileId, Project, SocialLinks};

use entrait::*;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

pub struct PgProfileRepo;

const PROFILE_COLUMNS: &str = r#"
    profile_id, name, password_hash, bio, skills, social_links, location,
    image_url, projects, views, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    profile_id: Uuid,
    name: String,
    password_hash: String,
    bio: Option<String>,
    skills: Vec<String>,
    social_links: Json<SocialLinks>,
    location: Option<String>,
    image_url: String,
    projects: Json<Vec<Project>>,
    views: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl ProfileRow {
    fn into_credentials(self) -> (Profile, PasswordHash) {
        let password_hash = PasswordHash(self.password_hash);
        let profile = Profile {
            id: ProfileId(self.profile_id),
            name: self.name,
            bio: self.bio,
            skills: self.skills,
            social_links: self.social_links.0,
            location: self.location,
            image_url: self.image_url,
            projects: self.projects.0,
            views: self.views,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        };

        (profile, password_hash)
    }

    fn into_profile(self) -> Profile {
        self.into_credentials().0
    }
}

#[entrait]
impl ProfileRepoImpl for PgProfileRepo {
    pub async fn insert_profile(
        deps: &impl GetDb,
        record: NewProfileRecord<'_>,
    ) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO app.profile
                (name, password_hash, bio, skills, social_links, location, image_url, projects)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(record.name)
        .bind(record.password_hash.0)
        .bind(record.bio)
        .bind(record.skills)
        .bind(Json(record.social_links))
        .bind(record.location)
        .bind(record.image_url)
        .bind(Json(record.projects))
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .map_err(profile_write_error)?;

        Ok(row.into_profile())
    }

    pub async fn find_credentials_by_name(
        deps: &impl GetDb,
        name: &str,
    ) -> AppResult<Option<(Profile, PasswordHash)>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"SELECT {PROFILE_COLUMNS} FROM app.profile WHERE name = $1"#
        ))
        .bind(name)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(ProfileRow::into_credentials))
    }

    pub async fn find_profile_by_identity(
        deps: &impl GetDb,
        ProfileId(profile_id): ProfileId,
        name: &str,
    ) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"SELECT {PROFILE_COLUMNS} FROM app.profile WHERE profile_id = $1 AND name = $2"#
        ))
        .bind(profile_id)
        .bind(name)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    pub async fn update_profile(
        deps: &impl GetDb,
        ProfileId(profile_id): ProfileId,
        update: ProfileUpdate<'_>,
    ) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            // language=PostgreSQL
            r#"
            UPDATE app.profile SET
                bio = COALESCE($2, bio),
                skills = COALESCE($3, skills),
                social_links = COALESCE($4, social_links),
                location = COALESCE($5, location),
                image_url = COALESCE($6, image_url),
                projects = COALESCE($7, projects),
                updated_at = now()
            WHERE profile_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .bind(update.bio)
        .bind(update.skills)
        .bind(update.social_links.map(Json))
        .bind(update.location)
        .bind(update.image_url)
        .bind(update.projects.map(Json))
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .map_err(profile_write_error)?;

        row.map(ProfileRow::into_profile)
            .ok_or(AppError::ProfileNotFound)
    }

    pub async fn record_profile_view(
        deps: &impl GetDb,
        ProfileId(profile_id): ProfileId,
    ) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE app.profile SET views = views + 1
            WHERE profile_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    pub async fn select_most_viewed(deps: &impl GetDb, limit: i64) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM app.profile
            ORDER BY views DESC, created_at
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows.into_iter().map(ProfileRow::into_profile).collect())
    }

    pub async fn select_matching(
        deps: &impl GetDb,
        needle: &str,
        limit: i64,
    ) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM app.profile
            WHERE name ILIKE $1
                OR location ILIKE $1
                OR EXISTS(SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE $1)
            ORDER BY created_at
            LIMIT $2
            "#
        ))
        .bind(format!("%{}%", escape_like(needle)))
        .bind(limit)
        .fetch_all(&deps.get_db().pg_pool)
        .await?;

        Ok(rows.into_iter().map(ProfileRow::into_profile).collect())
    }
}

/// Makes `needle` match literally inside a LIKE pattern (default escape character `\`).
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
