use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::provider::{self, CatalogQuery, SortKey};
use crate::templates_structs::{PageContext, ProviderDetailTemplate, ProviderListTemplate};

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
}

/// GET /providers
/// Roster list with filter and sort query parameters. No matches renders
/// the list page with its empty state, never an error.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    params: web::Query<CatalogParams>,
) -> Result<HttpResponse, AppError> {
    let query = CatalogQuery {
        specialization: params.specialization.clone().unwrap_or_default(),
        location: params.location.clone().unwrap_or_default(),
        sort: SortKey::parse(params.sort.as_deref().unwrap_or("")),
    };

    let conn = pool.get()?;
    let roster = provider::find_all(&conn)?;
    let providers = provider::filter_and_sort(roster, &query);

    let ctx = PageContext::build(&session)?;
    let tmpl = ProviderListTemplate {
        ctx,
        providers,
        specialization: query.specialization,
        location: query.location,
        sort: query.sort.as_str().to_string(),
    };
    render(tmpl)
}

/// GET /providers/{id}
pub async fn detail(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    match provider::find_by_id(&conn, path.into_inner())? {
        Some(p) => {
            let ctx = PageContext::build(&session)?;
            render(ProviderDetailTemplate { ctx, provider: p })
        }
        None => Err(AppError::NotFound),
    }
}
