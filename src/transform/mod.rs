//! URL transformation engine and its helpers

mod content;
pub mod engine;
pub mod relative;
pub mod sitemap;
pub mod structured;

pub use engine::PermalinkTransformer;
pub use relative::{make_all_relative, make_relative};
pub use sitemap::SitemapEntry;
pub use structured::{HostReplacer, transform_structured};
