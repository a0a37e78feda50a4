pub mod category;
pub mod error;
pub mod locale;
pub mod placement;
pub mod post;
pub mod revision;
pub mod slug;
pub mod tree;

pub use category::{Category, Visibility};
pub use error::{DomainError, DomainResult};
pub use locale::{Locale, LocalizedText};
pub use placement::{DropPosition, MoveRequest, Placement, ReorderDirection};
pub use post::{BlogPost, LocalizedContent, PostContent, PostStatus, SeoMeta};
pub use revision::{MAX_REVISIONS, Revision, RevisionLog};
pub use tree::{CategoryNode, CategoryTree, build_tree};
