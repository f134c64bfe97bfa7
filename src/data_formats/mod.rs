mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ArticleQueryParams {
    #[serde(default)]
    pub title: Option<String>,
}

impl ArticleQueryParams {
    /// The title pattern to filter on, if one was given. `?title=` counts as
    /// no filter at all.
    pub fn title_filter(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}
