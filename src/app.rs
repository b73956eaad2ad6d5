use crate::config::{Config, ImageHostConfig, SearchApiConfig};
use crate::db::{profile_db::PgProfileRepo, Db, GetDb};
use crate::profile::repo::DelegateProfileRepo;
use crate::{GetConfig, GetHttpClient, System};

use std::sync::Arc;
use time::OffsetDateTime;

/// Everything a request handler can reach, created once at startup.
#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: Db,
    pub http_client: reqwest::Client,
}

impl System for App {
    fn get_current_time(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl GetConfig for App {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384> {
        &self.config.jwt_secret.0
    }

    fn get_image_host_config(&self) -> &ImageHostConfig {
        &self.config.image_host
    }

    fn get_search_api_config(&self) -> &SearchApiConfig {
        &self.config.search_api
    }
}

impl GetHttpClient for App {
    fn get_http_client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

impl GetDb for App {
    fn get_db(&self) -> &Db {
        &self.db
    }
}

impl DelegateProfileRepo<Self> for App {
    type Target = PgProfileRepo;
}
