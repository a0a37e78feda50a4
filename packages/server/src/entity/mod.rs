pub mod category;
pub mod post;
pub mod post_category;
pub mod post_revision;
