//! Which link filters to wire for a site
//!
//! Content-type selection never reaches the engine's per-URL decision. It only
//! decides which link-generation filters the host registers. Output filters
//! (content, pagination, sitemaps, REST, SEO metadata) are always wired.

use serde::Serialize;

use crate::store::{ContentType, ContentTypeSelection};

/// Engine entry point a filter calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    Url,
    ContentBlock,
    PaginationLinks,
    SitemapEntry,
    SeoPayload,
}

/// One filter registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HookBinding {
    pub filter: &'static str,
    pub entry_point: EntryPoint,
    /// Content type that gates this filter; `None` for output filters
    pub content_type: Option<ContentType>,
}

const fn link(filter: &'static str, content_type: ContentType) -> HookBinding {
    HookBinding {
        filter,
        entry_point: EntryPoint::Url,
        content_type: Some(content_type),
    }
}

const fn output(filter: &'static str, entry_point: EntryPoint) -> HookBinding {
    HookBinding {
        filter,
        entry_point,
        content_type: None,
    }
}

const LINK_FILTERS: &[HookBinding] = &[
    link("post_link", ContentType::Post),
    link("post_type_link", ContentType::Post),
    link("page_link", ContentType::Page),
    link("category_link", ContentType::Category),
    link("term_link", ContentType::Category),
    link("tag_link", ContentType::Tag),
    link("author_link", ContentType::Author),
    link("attachment_link", ContentType::Attachment),
    link("wp_get_attachment_url", ContentType::Attachment),
    link("year_link", ContentType::Archive),
    link("month_link", ContentType::Archive),
    link("day_link", ContentType::Archive),
    link("post_type_archive_link", ContentType::Archive),
    link("feed_link", ContentType::Feed),
    link("category_feed_link", ContentType::Feed),
    link("author_feed_link", ContentType::Feed),
    link("post_comments_feed_link", ContentType::Feed),
    link("search_link", ContentType::Search),
    link("search_feed_link", ContentType::Search),
];

const OUTPUT_FILTERS: &[HookBinding] = &[
    output("the_content", EntryPoint::ContentBlock),
    output("widget_text", EntryPoint::ContentBlock),
    output("paginate_links_output", EntryPoint::PaginationLinks),
    output("get_pagenum_link", EntryPoint::Url),
    output("rest_url", EntryPoint::Url),
    output("wp_sitemaps_index_entry", EntryPoint::SitemapEntry),
    output("wp_sitemaps_posts_entry", EntryPoint::SitemapEntry),
    output("wp_sitemaps_taxonomies_entry", EntryPoint::SitemapEntry),
    output("wp_sitemaps_users_entry", EntryPoint::SitemapEntry),
    output("seo_head_payload", EntryPoint::SeoPayload),
    output("seo_schema_graph", EntryPoint::SeoPayload),
];

/// Filters to register for one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookPlan {
    bindings: Vec<HookBinding>,
}

impl HookPlan {
    #[must_use]
    pub fn from_selection(selection: &ContentTypeSelection) -> Self {
        let bindings = LINK_FILTERS
            .iter()
            .filter(|b| b.content_type.is_none_or(|ct| selection.is_enabled(ct)))
            .chain(OUTPUT_FILTERS.iter())
            .copied()
            .collect();
        Self { bindings }
    }

    #[must_use]
    pub fn bindings(&self) -> &[HookBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn contains(&self, filter: &str) -> bool {
        self.bindings.iter().any(|b| b.filter == filter)
    }

    pub fn filters(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.iter().map(|b| b.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_wires_everything() {
        let plan = HookPlan::from_selection(&ContentTypeSelection::default());
        assert_eq!(plan.bindings().len(), LINK_FILTERS.len() + OUTPUT_FILTERS.len());
    }

    #[test]
    fn test_disabled_types_drop_their_filters_only() {
        let selection = ContentTypeSelection::default()
            .with(ContentType::Page, false)
            .with(ContentType::Feed, false);
        let plan = HookPlan::from_selection(&selection);

        assert!(!plan.contains("page_link"));
        assert!(!plan.contains("feed_link"));
        assert!(!plan.contains("author_feed_link"));
        assert!(plan.contains("post_link"));
        assert!(plan.contains("the_content"));
        assert!(plan.contains("wp_sitemaps_posts_entry"));
    }

    #[test]
    fn test_every_content_type_gates_something() {
        for ct in ContentType::ALL {
            assert!(
                LINK_FILTERS.iter().any(|b| b.content_type == Some(ct)),
                "{ct} has no filter"
            );
        }
    }
}
