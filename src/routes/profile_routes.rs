use crate::error::{AppError, AppResult};
use crate::profile::auth::Token;
use crate::profile::form::{ProfileForm, MAX_FORM_BYTES};
use crate::profile::{self, CurrentProfile, EditedProfile, LoginProfile, Profile, SignedProfile};

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Extension, Multipart, Path, Query};
use axum::routing::{get, post, put};
use axum::Json;

#[derive(serde::Deserialize, Default)]
#[serde(default)]
struct SearchQuery {
    q: Option<String>,
}

pub struct ProfileRoutes<A>(std::marker::PhantomData<A>);

impl<A> ProfileRoutes<A>
where
    A: profile::ProfileApi + Sized + Clone + Send + Sync + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/profiles", get(Self::list))
            .route("/profiles/", get(Self::list))
            .route(
                "/profiles/add",
                post(Self::create).layer(DefaultBodyLimit::max(MAX_FORM_BYTES)),
            )
            .route("/profiles/login", post(Self::login))
            .route("/profiles/me", get(Self::current_profile))
            .route(
                "/profiles/edit/:id",
                put(Self::edit).layer(DefaultBodyLimit::max(MAX_FORM_BYTES)),
            )
            .route("/profiles/search", get(Self::search))
            .route("/profiles/:id", get(Self::fetch))
    }

    async fn create(
        Extension(app): Extension<A>,
        multipart: Multipart,
    ) -> AppResult<Json<SignedProfile>> {
        let new_profile = ProfileForm::from_multipart(multipart)
            .await?
            .into_new_profile()?;

        Ok(Json(app.create_profile(new_profile).await?))
    }

    async fn login(
        Extension(app): Extension<A>,
        body: Result<Json<LoginProfile>, JsonRejection>,
    ) -> AppResult<Json<SignedProfile>> {
        let Json(login) = body.map_err(|rejection| AppError::invalid_input(rejection.body_text()))?;

        Ok(Json(app.login(login).await?))
    }

    async fn current_profile(
        Extension(app): Extension<A>,
        token: Token,
    ) -> AppResult<Json<CurrentProfile>> {
        Ok(Json(app.fetch_current(token).await?))
    }

    async fn edit(
        Extension(app): Extension<A>,
        token: Token,
        Path(profile_id): Path<String>,
        multipart: Multipart,
    ) -> AppResult<Json<EditedProfile>> {
        let form = ProfileForm::from_multipart(multipart).await?;

        Ok(Json(app.edit_profile(token, &profile_id, form).await?))
    }

    async fn fetch(
        Extension(app): Extension<A>,
        Path(profile_id): Path<String>,
    ) -> AppResult<Json<Profile>> {
        Ok(Json(app.fetch_profile(&profile_id).await?))
    }

    async fn list(Extension(app): Extension<A>) -> AppResult<Json<Vec<Profile>>> {
        Ok(Json(app.list_profiles().await?))
    }

    async fn search(
        Extension(app): Extension<A>,
        Query(query): Query<SearchQuery>,
    ) -> AppResult<Json<Vec<Profile>>> {
        Ok(Json(
            app.search_profiles(query.q.as_deref().unwrap_or_default())
                .await?,
        ))
    }
}
