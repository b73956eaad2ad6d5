#[derive(clap::Parser)]
#[command(about = "Profile hosting backend")]
pub struct Config {
    #[arg(long, env)]
    pub database_url: String,

    /// Secret used to sign bearer tokens.
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: JwtSigningKey,

    #[arg(long, env, default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub image_host: ImageHostConfig,

    #[command(flatten)]
    pub search_api: SearchApiConfig,
}

#[derive(Clone)]
pub struct JwtSigningKey(pub hmac::Hmac<sha2::Sha384>);

impl std::str::FromStr for JwtSigningKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use hmac::Mac;

        Ok(Self(
            hmac::Hmac::<sha2::Sha384>::new_from_slice(s.as_bytes())
                .map_err(|e| format!("Failed to parse hmac: {e:?}"))?,
        ))
    }
}

/// Cloudinary-compatible image upload endpoint.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ImageHostConfig {
    #[arg(
        id = "cloudinary_base_url",
        long = "cloudinary-base-url",
        env = "CLOUDINARY_BASE_URL",
        default_value = "https://api.cloudinary.com"
    )]
    pub base_url: String,

    #[arg(id = "cloudinary_name", long = "cloudinary-name", env = "CLOUDINARY_NAME")]
    pub cloud_name: Option<String>,

    #[arg(id = "cloudinary_api_key", long = "cloudinary-api-key", env = "CLOUDINARY_API_KEY")]
    pub api_key: Option<String>,

    #[arg(
        id = "cloudinary_api_secret",
        long = "cloudinary-api-secret",
        env = "CLOUDINARY_API_SECRET"
    )]
    pub api_secret: Option<String>,
}

pub struct ImageHostCredentials<'a> {
    pub cloud_name: &'a str,
    pub api_key: &'a str,
    pub api_secret: &'a str,
}

impl ImageHostConfig {
    pub fn credentials(&self) -> Option<ImageHostCredentials<'_>> {
        Some(ImageHostCredentials {
            cloud_name: self.cloud_name.as_deref()?,
            api_key: self.api_key.as_deref()?,
            api_secret: self.api_secret.as_deref()?,
        })
    }
}

/// SerpAPI-compatible search provider.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct SearchApiConfig {
    #[arg(
        id = "serpapi_base_url",
        long = "serpapi-base-url",
        env = "SERPAPI_BASE_URL",
        default_value = "https://serpapi.com"
    )]
    pub base_url: String,

    #[arg(id = "serpapi_api_key", long = "serpapi-key", env = "SERPAPI_KEY")]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn should_parse_required_settings_and_defaults() {
        let config = Config::try_parse_from([
            "profile-hub",
            "--database-url",
            "postgres://localhost/profiles",
            "--jwt-secret",
            "s3cr3t",
        ])
        .unwrap();

        assert_eq!("postgres://localhost/profiles", config.database_url);
        assert_eq!("https://api.cloudinary.com", config.image_host.base_url);
        assert_eq!("https://serpapi.com", config.search_api.base_url);
    }

    #[test]
    fn command_definition_should_be_consistent() {
        use clap::CommandFactory;

        Config::command().debug_assert();
    }

    #[test]
    fn image_host_and_search_api_settings_should_not_collide() {
        let config = Config::try_parse_from([
            "profile-hub",
            "--database-url",
            "postgres://localhost/profiles",
            "--jwt-secret",
            "s3cr3t",
            "--cloudinary-base-url",
            "http://images.local",
            "--cloudinary-api-key",
            "CLOUD_KEY",
            "--serpapi-base-url",
            "http://search.local",
            "--serpapi-key",
            "SERP_KEY",
        ])
        .unwrap();

        assert_eq!("http://images.local", config.image_host.base_url);
        assert_eq!(Some("CLOUD_KEY"), config.image_host.api_key.as_deref());
        assert_eq!("http://search.local", config.search_api.base_url);
        assert_eq!(Some("SERP_KEY"), config.search_api.api_key.as_deref());
    }

    #[test]
    fn image_host_credentials_require_every_part() {
        let mut config = ImageHostConfig {
            cloud_name: Some("demo".to_string()),
            api_key: Some("key".to_string()),
            ..ImageHostConfig::default()
        };
        assert!(config.credentials().is_none());

        config.api_secret = Some("secret".to_string());
        let credentials = config.credentials().unwrap();
        assert_eq!("demo", credentials.cloud_name);
        assert_eq!("secret", credentials.api_secret);
    }
}
