use serde::{Deserialize, Serialize};

// ----------------- Category Request -----------------
/// Body of both `POST /category` and `PUT /category/:id`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryRequest {
    #[serde(alias = "category_name")]
    pub name: String,
}

// ----------------- Article Request -----------------
/// Body of both `POST /article` and `PUT /article/:id`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ArticleRequest {
    pub title: String,
    pub category_id: i64,
    pub content: String,
}
