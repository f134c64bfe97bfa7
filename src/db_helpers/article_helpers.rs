use crate::data_formats::ArticleResponse;
use crate::models::Article;

use super::{Filterable, Resource, SqliteQuery};

// Inner join on purpose: an article whose category row is gone drops out of
// every read, lookups by id included.
const ARTICLE_QUERY: &str = r#"
            SELECT r.id          AS "id",
                   r.title       AS "title",
                   r.slug        AS "slug",
                   c.id          AS "category_id",
                   c.name        AS "category_name",
                   c.slug        AS "category_slug",
                   r.content     AS "content",
                   r.created_at  AS "created_at",
                   r.updated_at  AS "updated_at",
                   r.deleted_at  AS "deleted_at"
            FROM   articles AS r
                   INNER JOIN categories AS c
                           ON r.category_id = c.id
"#;

pub struct ArticleResource;

impl Resource for ArticleResource {
    type Entity = Article;
    type Response = ArticleResponse;

    const NAME: &'static str = "article";
    const TABLE: &'static str = "articles";
    const SELECT: &'static str = ARTICLE_QUERY;
    const COLUMNS: &'static [&'static str] = &["title", "slug", "category_id", "content"];

    fn bind_entity<'q>(
        Article {
            title,
            slug,
            category_id,
            content,
        }: Article,
        query: SqliteQuery<'q>,
    ) -> SqliteQuery<'q> {
        query.bind(title).bind(slug).bind(category_id).bind(content)
    }
}

impl Filterable for ArticleResource {
    const FILTER_COLUMN: &'static str = "r.title";
}
