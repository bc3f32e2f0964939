use rusqlite::{Connection, params};

/// A care provider in the catalog. Immutable once seeded.
#[derive(Debug, Clone)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub rating: f64,
    pub review_count: i64,
    pub address: String,
    pub distance: String,
    pub consultation_fee: i64,
    pub years_experience: i64,
}

fn row_to_provider(row: &rusqlite::Row) -> rusqlite::Result<Provider> {
    Ok(Provider {
        id: row.get("id")?,
        name: row.get("name")?,
        specialization: row.get("specialization")?,
        rating: row.get("rating")?,
        review_count: row.get("review_count")?,
        address: row.get("address")?,
        distance: row.get("distance")?,
        consultation_fee: row.get("consultation_fee")?,
        years_experience: row.get("years_experience")?,
    })
}

const SELECT_PROVIDER: &str = "\
    SELECT id, name, specialization, rating, review_count, address, distance, \
           consultation_fee, years_experience \
    FROM providers";

/// Load the full roster in insertion order.
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Provider>> {
    let mut stmt = conn.prepare(&format!("{SELECT_PROVIDER} ORDER BY id"))?;
    let providers = stmt
        .query_map([], row_to_provider)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(providers)
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Provider>> {
    let mut stmt = conn.prepare(&format!("{SELECT_PROVIDER} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_provider)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Insert a roster entry for a freshly signed-up provider account.
pub fn create_basic(conn: &Connection, name: &str, specialization: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO providers (name, specialization) VALUES (?1, ?2)",
        params![name, specialization],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Catalog sort keys. Closed set; unknown query values fall back to Default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Default,
    Rating,
    Distance,
    Price,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s {
            "rating" => SortKey::Rating,
            "distance" => SortKey::Distance,
            "price" => SortKey::Price,
            _ => SortKey::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Default => "default",
            SortKey::Rating => "rating",
            SortKey::Distance => "distance",
            SortKey::Price => "price",
        }
    }
}

/// Filter criteria for the catalog page. Empty strings match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub specialization: String,
    pub location: String,
    pub sort: SortKey,
}

/// Parse the numeric prefix of a distance string like "2.5 km".
/// Returns None when no leading number is present.
pub fn parse_distance(distance: &str) -> Option<f64> {
    let prefix: String = distance
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if prefix.is_empty() {
        return None;
    }
    prefix.parse::<f64>().ok()
}

/// Apply filter criteria and sort order to a loaded roster.
/// The result is always a subset of the input; with empty criteria and
/// Default sort the input comes back unchanged.
pub fn filter_and_sort(providers: Vec<Provider>, query: &CatalogQuery) -> Vec<Provider> {
    let spec = query.specialization.trim().to_lowercase();
    let loc = query.location.trim().to_lowercase();

    let mut result: Vec<Provider> = providers
        .into_iter()
        .filter(|p| spec.is_empty() || p.specialization.to_lowercase().contains(&spec))
        .filter(|p| loc.is_empty() || p.address.to_lowercase().contains(&loc))
        .collect();

    match query.sort {
        SortKey::Default => {}
        SortKey::Rating => {
            result.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortKey::Distance => {
            // Unparsable distance strings sort last
            result.sort_by(|a, b| {
                match (parse_distance(&a.distance), parse_distance(&b.distance)) {
                    (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            });
        }
        SortKey::Price => {
            result.sort_by_key(|p| p.consultation_fee);
        }
    }

    result
}
