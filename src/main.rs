use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use carelink::handlers::profile_handlers::UploadDir;
use carelink::{auth, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/app.db".to_string());
    let upload_dir = std::path::PathBuf::from(
        std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string()),
    );
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    if let Some(parent) = std::path::Path::new(&database_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }
    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");

    let pool = db::init_pool(&database_path);
    db::run_migrations(&pool);
    db::seed_providers(&pool);

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{bind_addr}");

    let uploads_fs_dir = upload_dir.clone();
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(UploadDir(upload_dir.clone())))
            // Uploaded documents are addressed by their public URL
            .service(actix_files::Files::new("/uploads", uploads_fs_dir.clone()))
            // Public routes
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            .route("/signup", web::get().to(handlers::auth_handlers::signup_page))
            .route("/signup", web::post().to(handlers::auth_handlers::signup_submit))
            // Root redirect
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/dashboard", web::get().to(handlers::dashboard::index))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Provider catalog
                    .route("/providers", web::get().to(handlers::catalog_handlers::list))
                    .route("/providers/{id}", web::get().to(handlers::catalog_handlers::detail))
                    // Booking wizard, forward order only
                    .route("/book/{provider_id}/duration", web::get().to(handlers::booking_handlers::duration_form))
                    .route("/book/{provider_id}/duration", web::post().to(handlers::booking_handlers::duration_submit))
                    .route("/book/package", web::get().to(handlers::booking_handlers::package_form))
                    .route("/book/package", web::post().to(handlers::booking_handlers::package_submit))
                    .route("/book/confirm", web::get().to(handlers::booking_handlers::confirm_form))
                    .route("/book/confirm", web::post().to(handlers::booking_handlers::confirm_submit))
                    // Emergency profile
                    .route("/profile", web::get().to(handlers::profile_handlers::index))
                    .route("/profile/contacts", web::post().to(handlers::profile_handlers::add_contact))
                    .route("/profile/contacts/{id}/delete", web::post().to(handlers::profile_handlers::delete_contact))
                    .route("/profile/allergies", web::post().to(handlers::profile_handlers::add_allergy))
                    .route("/profile/allergies/{id}/delete", web::post().to(handlers::profile_handlers::delete_allergy))
                    .route("/profile/medications", web::post().to(handlers::profile_handlers::add_medication))
                    .route("/profile/medications/{id}/delete", web::post().to(handlers::profile_handlers::delete_medication))
                    .route("/profile/conditions", web::post().to(handlers::profile_handlers::add_condition))
                    .route("/profile/conditions/{id}/delete", web::post().to(handlers::profile_handlers::delete_condition))
                    .route("/profile/blood-type", web::post().to(handlers::profile_handlers::update_blood_type))
                    .route("/profile/documents", web::post().to(handlers::profile_handlers::upload_document))
                    .route("/profile/documents/{id}/delete", web::post().to(handlers::profile_handlers::delete_document))
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
