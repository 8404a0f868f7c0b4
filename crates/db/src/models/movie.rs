//! Movie model and its nested document types.
//!
//! Credits and resources are stored as JSONB documents rather than
//! normalized tables; they are purely descriptive and only ever read or
//! written whole.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use filmclub_core::patch::{self, PatchError, PatchOperation, Patchable};

/// A row from the `movies` table. Doubles as the create/replace request
/// body: the id is caller-supplied and every descriptive attribute is
/// optional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: String,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub runtime: Option<i32>,
    pub genres: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub collection: Option<Json<Collection>>,
    pub producers: Option<Json<Vec<Producer>>>,
    pub crew: Option<Json<Vec<Crew>>>,
    #[serde(rename = "cast")]
    pub cast_members: Option<Json<Vec<CastMember>>>,
    pub resources: Option<Json<Vec<Resource>>>,
}

/// A named franchise a movie belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub country: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crew {
    pub name: String,
    pub job: Option<String>,
    pub picture: Option<String>,
    pub biography: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub picture: Option<String>,
    pub biography: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub country: Option<String>,
}

/// A poster, trailer, backdrop, or similar linked asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Optional listing filters. `genres` and `keywords` are repeatable.
#[derive(Debug, Default, Deserialize)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Patchable for Movie {
    const PROTECTED: &'static [&'static str] = &["/id"];

    fn apply_op(&mut self, op: &PatchOperation) -> Result<(), PatchError> {
        let parsed = patch::parse_path(&op.path)?;
        match (parsed.field, parsed.index) {
            ("title", None) => patch::apply_scalar(&mut self.title, op),
            ("overview", None) => patch::apply_scalar(&mut self.overview, op),
            ("tagline", None) => patch::apply_scalar(&mut self.tagline, op),
            ("status", None) => patch::apply_scalar(&mut self.status, op),
            ("release_date", None) => patch::apply_scalar(&mut self.release_date, op),
            ("budget", None) => patch::apply_scalar(&mut self.budget, op),
            ("revenue", None) => patch::apply_scalar(&mut self.revenue, op),
            ("runtime", None) => patch::apply_scalar(&mut self.runtime, op),
            ("genres", index) => patch::apply_list(&mut self.genres, op, index),
            ("keywords", index) => patch::apply_list(&mut self.keywords, op, index),
            // Nested documents are only read or written whole.
            ("collection", None) => patch::apply_scalar(&mut self.collection, op),
            ("producers", None) => patch::apply_scalar(&mut self.producers, op),
            ("crew", None) => patch::apply_scalar(&mut self.crew, op),
            ("cast", None) => patch::apply_scalar(&mut self.cast_members, op),
            ("resources", None) => patch::apply_scalar(&mut self.resources, op),
            _ => Err(PatchError::BadPath {
                path: op.path.clone(),
            }),
        }
    }
}
