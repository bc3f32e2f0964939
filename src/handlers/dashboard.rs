use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::{UserType, get_user_id, get_user_type};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::{booking, user};
use crate::templates_structs::{PageContext, PatientDashboardTemplate, ProviderDashboardTemplate};

/// GET /dashboard
/// Role dispatch happens here, on the closed UserType enum.
pub async fn index(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id =
        get_user_id(&session).ok_or_else(|| AppError::Session("User not logged in".to_string()))?;
    let user_type = get_user_type(&session).map_err(AppError::Session)?;

    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    match user_type {
        UserType::Patient => {
            let bookings = booking::find_by_patient(&conn, user_id)?;
            render(PatientDashboardTemplate { ctx, bookings })
        }
        UserType::Provider => {
            let account = user::find_by_id(&conn, user_id)?.ok_or(AppError::NotFound)?;
            let (bookings, has_roster) = match account.provider_id {
                Some(pid) => (booking::find_by_provider(&conn, pid)?, true),
                None => (vec![], false),
            };
            render(ProviderDashboardTemplate { ctx, bookings, has_roster })
        }
    }
}
