use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Deserialize;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

const PROVIDER_SEED: &str = include_str!("../data/seed/providers.json");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// One provider record in the bundled roster seed.
#[derive(Debug, Deserialize)]
struct ProviderSeed {
    name: String,
    specialization: String,
    rating: f64,
    review_count: i64,
    address: String,
    distance: String,
    consultation_fee: i64,
    years_experience: i64,
}

/// Insert the bundled roster into an empty providers table.
/// Idempotent: a non-empty table is left untouched.
pub fn seed_providers(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM providers", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Provider roster already seeded ({count} providers), skipping");
        return;
    }

    let seed: Vec<ProviderSeed> = serde_json::from_str(PROVIDER_SEED)
        .unwrap_or_else(|e| panic!("Bad provider seed JSON: {e}"));

    let mut created = 0usize;
    for p in &seed {
        let result = conn.execute(
            "INSERT INTO providers (name, specialization, rating, review_count, address, distance, consultation_fee, years_experience) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.name,
                p.specialization,
                p.rating,
                p.review_count,
                p.address,
                p.distance,
                p.consultation_fee,
                p.years_experience
            ],
        );
        match result {
            Ok(_) => created += 1,
            Err(e) => log::warn!("Seed provider '{}' failed: {e}", p.name),
        }
    }
    log::info!("Provider roster seed complete: created={created}");
}
