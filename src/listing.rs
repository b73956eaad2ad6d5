use crate::error::{AppError, AppResult};
use crate::{GetConfig, GetHttpClient, System};

use entrait::entrait;
use serde_json::Value;

/// How many provider results make it into one response.
pub const MAX_LISTINGS: usize = 10;

pub const DEFAULT_LOCATION: &str = "India";

const FALLBACK_LINK: &str = "https://www.google.co.in";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    Jobs,
    Internships,
    Bootcamps,
    Hackathons,
    Mentorship,
    Remote,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Jobs,
        Category::Internships,
        Category::Bootcamps,
        Category::Hackathons,
        Category::Mentorship,
        Category::Remote,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Internships => "internships",
            Self::Bootcamps => "bootcamps",
            Self::Hackathons => "hackathons",
            Self::Mentorship => "mentorship",
            Self::Remote => "remote",
        }
    }

    pub fn default_query(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Internships => "Internship",
            Self::Bootcamps => "coding bootcamps",
            Self::Hackathons => "Hackathons",
            Self::Mentorship => "Mentorship programs",
            Self::Remote => "Remote work",
        }
    }
}

#[derive(serde::Deserialize, Default)]
#[cfg_attr(test, derive(Debug))]
#[serde(default)]
pub struct OpportunityQuery {
    pub q: Option<String>,
    pub location: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
}

/// Raw provider search. `Ok` carries whatever JSON the provider answered with.
#[entrait(pub FetchSearchResults, mock_api=FetchSearchResultsMock)]
async fn fetch_search_results(
    deps: &(impl GetConfig + GetHttpClient),
    query: &str,
    location: &str,
) -> anyhow::Result<Value> {
    let config = deps.get_search_api_config();
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("SERPAPI_KEY is not configured"))?;

    let url = reqwest::Url::parse_with_params(
        &format!("{}/search.json", config.base_url.trim_end_matches('/')),
        &[
            ("api_key", api_key),
            ("engine", "google"),
            ("q", query),
            ("location", location),
            ("google_domain", "google.co.in"),
            ("gl", "in"),
            ("hl", "hi"),
        ],
    )?;

    let json = deps
        .get_http_client()
        .get(url)
        .send()
        .await?
        .json::<Value>()
        .await?;

    Ok(json)
}

#[entrait(pub ListingApi, mock_api=ListingApiMock)]
pub mod api {
    use super::*;

    pub async fn list_opportunities(
        deps: &(impl FetchSearchResults + System),
        category: Category,
        query: OpportunityQuery,
    ) -> AppResult<Vec<Listing>> {
        let q = non_empty(query.q).unwrap_or_else(|| category.default_query().to_string());
        let location = non_empty(query.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let upstream_error = |details: String| {
            tracing::error!(category = category.slug(), %details, "search provider error");
            AppError::Upstream {
                message: format!("Failed to fetch {} from SerpAPI", category.slug()),
                details,
            }
        };

        let json = deps
            .fetch_search_results(&q, &location)
            .await
            .map_err(|e| upstream_error(e.to_string()))?;

        match json.get("error") {
            Some(Value::Null) | None => {}
            Some(Value::String(error)) => return Err(upstream_error(error.clone())),
            Some(error) => return Err(upstream_error(error.to_string())),
        }

        Ok(format_results(
            category,
            &json,
            deps.get_current_time().unix_timestamp_nanos() / 1_000_000,
        ))
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|value| !value.is_empty())
    }
}

/// Maps the first result array found in a provider response into listings.
pub fn format_results(category: Category, json: &Value, now_millis: i128) -> Vec<Listing> {
    let results = ["jobs_results", "events_results", "organic_results"]
        .into_iter()
        .find_map(|key| json.get(key).and_then(Value::as_array));

    let Some(results) = results else {
        return vec![];
    };

    results
        .iter()
        .take(MAX_LISTINGS)
        .enumerate()
        .map(|(index, result)| format_result(category, index, result, now_millis))
        .collect()
}

fn format_result(category: Category, index: usize, result: &Value, now_millis: i128) -> Listing {
    let slug = category.slug();

    let mut listing = Listing {
        id: text(result, "job_id")
            .or_else(|| text(result, "event_id"))
            .unwrap_or_else(|| format!("{index}-{now_millis}")),
        title: text(result, "title").unwrap_or_else(|| format!("Untitled {slug}")),
        company: text(result, "via")
            .or_else(|| text(result, "source"))
            .or_else(|| text(result, "organizer"))
            .unwrap_or_else(|| "Unknown".to_string()),
        location: text(result, "location").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        description: text(result, "snippet")
            .or_else(|| text(result, "description"))
            .unwrap_or_else(|| format!("No description available for this {slug}")),
        link: text(result, "link").unwrap_or_else(|| FALLBACK_LINK.to_string()),
        salary: None,
        duration: None,
        cost: None,
        date: None,
        prize: None,
        mentor: None,
        remote: None,
    };

    match category {
        Category::Jobs => {
            listing.salary = extra(result, "salary");
        }
        Category::Internships => {
            listing.duration = Some(Value::from("3-6 months"));
        }
        Category::Bootcamps => {
            listing.duration = extra(result, "duration");
            listing.cost = extra(result, "price");
        }
        Category::Hackathons => {
            listing.date = extra(result, "date");
            listing.prize = extra(result, "prize");
        }
        Category::Mentorship => {
            listing.mentor = extra(result, "mentor");
            listing.duration = Some(Value::from("3 months"));
        }
        Category::Remote => {
            listing.remote = Some(true);
        }
    }

    listing
}

/// A present, non-empty scalar field rendered as text.
fn text(result: &Value, key: &str) -> Option<String> {
    match result.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn extra(result: &Value, key: &str) -> Option<Value> {
    result.get(key).filter(|value| !value.is_null()).cloned()
}
