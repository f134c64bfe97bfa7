use serde::de::DeserializeOwned;

use crate::data_formats::{ArticleRequest, CategoryRequest};
use crate::db_helpers::{ArticleResource, CategoryResource, Filterable, Resource, SoftDeleteRepository};
use crate::errors::RequestError;
use crate::models::{Article, Category};
use crate::slugify;

/// A resource that can be written from an incoming request body.
pub trait Writable: Resource {
    type Request: DeserializeOwned + Send + 'static;

    /// Capitalised name used in confirmation messages, e.g. `Article`.
    const LABEL: &'static str;

    /// Builds the stored record, deriving the slug afresh every time.
    fn to_entity(request: Self::Request) -> Self::Entity;
}

impl Writable for CategoryResource {
    type Request = CategoryRequest;
    const LABEL: &'static str = "Category";

    fn to_entity(CategoryRequest { name }: CategoryRequest) -> Category {
        Category {
            slug: slugify(&name),
            name,
        }
    }
}

impl Writable for ArticleResource {
    type Request = ArticleRequest;
    const LABEL: &'static str = "Article";

    fn to_entity(
        ArticleRequest {
            title,
            category_id,
            content,
        }: ArticleRequest,
    ) -> Article {
        Article {
            slug: slugify(&title),
            title,
            category_id,
            content,
        }
    }
}

pub fn parse_id(id: &str) -> Result<i64, RequestError> {
    id.parse::<i64>()
        .map_err(|e| RequestError::Validation(format!("invalid id \"{}\": {}", id, e)))
}

pub struct ResourceService<R> {
    repository: SoftDeleteRepository<R>,
}

impl<R: Writable> ResourceService<R> {
    pub fn new(repository: SoftDeleteRepository<R>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: R::Request) -> Result<(), RequestError> {
        self.repository.insert(R::to_entity(request)).await
    }

    pub async fn list(&self) -> Result<Vec<R::Response>, RequestError> {
        self.repository.find_all().await
    }

    pub async fn list_soft_deleted(&self) -> Result<Vec<R::Response>, RequestError> {
        self.repository.find_all_soft_deleted().await
    }

    pub async fn find_one(&self, id: &str) -> Result<Option<R::Response>, RequestError> {
        let id = parse_id(id)?;
        self.repository.find_by_id(id).await
    }

    pub async fn update(&self, id: &str, request: R::Request) -> Result<(), RequestError> {
        let id = parse_id(id)?;
        self.repository.update(id, R::to_entity(request)).await
    }

    pub async fn soft_delete(&self, id: &str) -> Result<(), RequestError> {
        let id = parse_id(id)?;
        self.repository.soft_delete(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), RequestError> {
        let id = parse_id(id)?;
        self.repository.delete(id).await
    }
}

impl<R: Writable + Filterable> ResourceService<R> {
    pub async fn list_by_filter(&self, pattern: &str) -> Result<Vec<R::Response>, RequestError> {
        self.repository.find_all_by_filter(pattern).await
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::db_helpers::test_support::memory_pool;

    fn services(pool: &SqlitePool) -> (ResourceService<CategoryResource>, ResourceService<ArticleResource>) {
        (
            ResourceService::new(SoftDeleteRepository::new(pool.clone())),
            ResourceService::new(SoftDeleteRepository::new(pool.clone())),
        )
    }

    #[test]
    fn parses_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-3").unwrap(), -3);
        assert!(matches!(parse_id("abc"), Err(RequestError::Validation(_))));
        assert!(matches!(parse_id(""), Err(RequestError::Validation(_))));
        assert!(matches!(parse_id("4.5"), Err(RequestError::Validation(_))));
    }

    #[test]
    fn slugs_lowercase_and_hyphenate() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("Tech News"), "tech-news");
        assert_eq!(slugify("  --Rust,  Tokio & Axum!!  "), "rust-tokio-axum");
        assert_eq!(slugify("a___b...c"), "a-b-c");
        assert_eq!(slugify("Top 10 Crates of 2023"), "top-10-crates-of-2023");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugs_are_transliterated_to_ascii() {
        assert_eq!(slugify("Über Café"), "uber-cafe");
        for input in ["Über Café 日本", "Ελληνικά", "naïve / résumé", "Hello World!"] {
            let slug = slugify(input);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "not URL-safe: {:?}",
                slug
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert_eq!(slugify(&slug), slug);
        }
    }

    #[test]
    fn entities_get_derived_slugs() {
        let category = CategoryResource::to_entity(CategoryRequest {
            name: "Tech News".to_owned(),
        });
        assert_eq!(category.slug, "tech-news");

        let article = ArticleResource::to_entity(ArticleRequest {
            title: "Hello World!".to_owned(),
            category_id: 1,
            content: "body".to_owned(),
        });
        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.title, "Hello World!");

        let category = CategoryResource::to_entity(CategoryRequest {
            name: "Café Culture".to_owned(),
        });
        assert_eq!(category.slug, "cafe-culture");
    }

    #[tokio::test]
    async fn bad_ids_never_reach_the_store() {
        let (categories, _) = services(&memory_pool(true).await);
        let request = CategoryRequest {
            name: "x".to_owned(),
        };
        assert!(matches!(categories.find_one("one").await, Err(RequestError::Validation(_))));
        assert!(matches!(
            categories.update("one", request).await,
            Err(RequestError::Validation(_))
        ));
        assert!(matches!(categories.soft_delete("1x").await, Err(RequestError::Validation(_))));
        assert!(matches!(categories.delete("").await, Err(RequestError::Validation(_))));
    }

    #[tokio::test]
    async fn update_rederives_slug_from_unchanged_name() {
        let pool = memory_pool(true).await;
        let (categories, _) = services(&pool);
        categories
            .create(CategoryRequest {
                name: "Tech News".to_owned(),
            })
            .await
            .unwrap();
        let id = categories.list().await.unwrap()[0].id;

        sqlx::query("UPDATE categories SET slug = 'stale' WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();

        categories
            .update(
                &id.to_string(),
                CategoryRequest {
                    name: "Tech News".to_owned(),
                },
            )
            .await
            .unwrap();

        let found = categories.find_one(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(found.slug, "tech-news");
        assert!(found.updated_at.is_some());
    }

    #[tokio::test]
    async fn article_lifecycle() {
        let pool = memory_pool(true).await;
        let (categories, articles) = services(&pool);

        categories
            .create(CategoryRequest {
                name: "Tech News".to_owned(),
            })
            .await
            .unwrap();
        let category = categories.list().await.unwrap().remove(0);
        assert_eq!(category.slug, "tech-news");

        articles
            .create(ArticleRequest {
                title: "Go Basics".to_owned(),
                category_id: category.id,
                content: "Goroutines and channels.".to_owned(),
            })
            .await
            .unwrap();

        let active = articles.list().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].slug, "go-basics");
        assert_eq!(active[0].category_name, "Tech News");
        let id = active[0].id.to_string();

        articles.soft_delete(&id).await.unwrap();
        assert!(articles.list().await.unwrap().is_empty());
        assert!(articles.list_by_filter("Go").await.unwrap().is_empty());
        let deleted = articles.list_soft_deleted().await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].content, "Goroutines and channels.");

        articles.delete(&id).await.unwrap();
        assert!(articles.find_one(&id).await.unwrap().is_none());
        assert!(matches!(articles.delete(&id).await, Err(RequestError::Persistence(_))));
    }
}
