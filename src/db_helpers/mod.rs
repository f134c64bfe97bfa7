mod article_helpers;
mod category_helpers;
mod resource;

pub use article_helpers::*;
pub use category_helpers::*;
pub use resource::*;
