use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::auth::session::UserType;

/// Gate in front of everything behind the login wall. A request passes
/// only when the session carries both a user id and a role that still
/// parses as patient or provider; anything else lands on /login. A
/// session whose stored role no longer parses is purged rather than
/// trusted.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let user_id = session.get::<i64>("user_id").unwrap_or(None);
    let role = session
        .get::<String>("user_type")
        .unwrap_or(None)
        .and_then(|s| UserType::parse(&s));

    match (user_id, role) {
        (Some(_), Some(_)) => next.call(req).await.map(|res| res.map_into_left_body()),
        (user_id, _) => {
            // Signed in but with an unrecognizable role: stale session.
            if user_id.is_some() {
                session.purge();
            }
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
