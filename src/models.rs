// Records written to the store. Store-owned columns (id, timestamps) are
// never part of these; they only show up on the response side.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub slug: String,
    pub category_id: i64,
    pub content: String,
}
