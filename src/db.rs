use crate::error::AppError;
use crate::profile::repo::DelegateProfileRepo;

use anyhow::Context;
use sqlx::PgPool;

pub mod profile_db;

#[derive(Clone)]
pub struct Db {
    pub pg_pool: PgPool,
}

impl Db {
    pub async fn init(url: &str) -> anyhow::Result<Self> {
        let pg_pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(50)
            .connect(url)
            .await
            .context("could not connect to database_url")?;

        sqlx::migrate!().run(&pg_pool).await?;
        tracing::info!("database migrated");

        Ok(Db { pg_pool })
    }
}

pub trait GetDb {
    fn get_db(&self) -> &Db;
}

impl GetDb for Db {
    fn get_db(&self) -> &Db {
        self
    }
}

impl<T: GetDb> GetDb for entrait::Impl<T> {
    fn get_db(&self) -> &Db {
        (**self).get_db()
    }
}

impl DelegateProfileRepo<Self> for Db {
    type Target = profile_db::PgProfileRepo;
}

/// Named constraints in `app.profile` that map onto a client error.
const PROFILE_CONSTRAINTS: &[(&str, fn() -> AppError)] = &[
    ("profile_name_key", || AppError::NameTaken),
    ("profile_bio_length", || {
        AppError::invalid_input("Bio must be at most 500 characters")
    }),
];

fn constraint_error(constraint: &str) -> Option<AppError> {
    PROFILE_CONSTRAINTS
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, error)| error())
}

/// Turns a violated profile constraint into its domain error, anything else into `AppError::Sqlx`.
pub(crate) fn profile_write_error(err: sqlx::Error) -> AppError {
    let mapped = match &err {
        sqlx::Error::Database(db_error) => db_error.constraint().and_then(constraint_error),
        _ => None,
    };

    mapped.unwrap_or(AppError::Sqlx(err))
}

/// One throwaway database per test thread, migrated from scratch.
#[cfg(test)]
async fn create_test_db() -> anyhow::Result<entrait::Impl<Db>> {
    use sqlx::Connection;

    let thread = std::thread::current();
    let db_name = test_db_name(thread.name().unwrap_or("unnamed"));

    let mut url = database_server_url()?;
    let mut admin = sqlx::PgConnection::connect(url.as_str())
        .await
        .context("could not connect to the database server")?;

    for statement in [
        format!(r#"DROP DATABASE IF EXISTS "{db_name}""#),
        format!(r#"CREATE DATABASE "{db_name}""#),
    ] {
        sqlx::query(&statement)
            .execute(&mut admin)
            .await
            .with_context(|| format!("{statement} failed"))?;
    }

    url.set_path(&db_name);

    Ok(entrait::Impl::new(Db::init(url.as_str()).await?))
}

#[cfg(test)]
fn test_db_name(label: &str) -> String {
    use sha2::Digest;

    let digest = hex::encode(sha2::Sha256::digest(label.as_bytes()));
    format!("profile_hub_test_{}", &digest[..16])
}

/// `DATABASE_URL` with the database name stripped, for creating test databases.
#[cfg(test)]
fn database_server_url() -> anyhow::Result<url::Url> {
    dotenv::dotenv().ok();

    let mut url: url::Url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to run database tests")?
        .parse()
        .context("malformed DATABASE_URL")?;
    url.set_path("");

    Ok(url)
}
