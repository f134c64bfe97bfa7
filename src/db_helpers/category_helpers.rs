use crate::data_formats::CategoryResponse;
use crate::models::Category;

use super::{Resource, SqliteQuery};

const CATEGORY_QUERY: &str = r#"
            SELECT r.id         AS "id",
                   r.name       AS "name",
                   r.slug       AS "slug",
                   r.created_at AS "created_at",
                   r.updated_at AS "updated_at",
                   r.deleted_at AS "deleted_at"
            FROM   categories AS r
"#;

pub struct CategoryResource;

impl Resource for CategoryResource {
    type Entity = Category;
    type Response = CategoryResponse;

    const NAME: &'static str = "category";
    const TABLE: &'static str = "categories";
    const SELECT: &'static str = CATEGORY_QUERY;
    const COLUMNS: &'static [&'static str] = &["name", "slug"];

    fn bind_entity<'q>(Category { name, slug }: Category, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(name).bind(slug)
    }
}
