use crate::error::AppResult;
use crate::listing::{self, Category, Listing, OpportunityQuery};

use axum::extract::{Extension, Query};
use axum::routing::get;
use axum::Json;

pub struct ListingRoutes<A>(std::marker::PhantomData<A>);

impl<A> ListingRoutes<A>
where
    A: listing::ListingApi + Sized + Clone + Send + Sync + 'static,
{
    /// One `/google-<category>` route per listing category.
    pub fn router() -> axum::Router {
        Category::ALL
            .into_iter()
            .fold(axum::Router::new(), |router, category| {
                router.route(
                    &format!("/google-{}", category.slug()),
                    get(
                        move |Extension(app): Extension<A>,
                              Query(query): Query<OpportunityQuery>| async move {
                            Self::list(app, category, query).await
                        },
                    ),
                )
            })
    }

    async fn list(
        app: A,
        category: Category,
        query: OpportunityQuery,
    ) -> AppResult<Json<Vec<Listing>>> {
        Ok(Json(app.list_opportunities(category, query).await?))
    }
}
