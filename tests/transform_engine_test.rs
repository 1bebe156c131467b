//! End-to-end behavior of the permalink transformation entry points

use std::sync::Arc;

use permalink_domain::{
    EngineConfig, MemoryBackend, RequestSignals, Site, SitemapEntry,
};
use serde_json::json;

mod common;
use common::{admin_request, cdn_site, memory_site, public_request};

#[test]
fn test_domain_substitution() {
    let site = cdn_site(false);
    let t = public_request(&site);

    assert_eq!(
        t.transform_url("https://old.test/2024/post/", false),
        "https://cdn.test/2024/post/"
    );
    assert_eq!(t.transform_url("https://old.test", false), "https://cdn.test");
    assert_eq!(
        t.transform_url("https://old.test/?p=12#comments", false),
        "https://cdn.test/?p=12#comments"
    );
    // foreign URLs and look-alike hosts are left alone
    assert_eq!(
        t.transform_url("https://other.test/2024/post/", false),
        "https://other.test/2024/post/"
    );
    assert_eq!(
        t.transform_url("https://old.testing.example/a", false),
        "https://old.testing.example/a"
    );
}

#[test]
fn test_substitution_then_relative() {
    let site = cdn_site(true);
    let t = public_request(&site);

    assert_eq!(t.transform_url("https://old.test/2024/post/", false), "//cdn.test/2024/post/");
    // relative conversion applies to foreign absolute URLs handed to the engine too
    assert_eq!(t.transform_url("http://other.test/x", false), "//other.test/x");
    assert_eq!(t.transform_url("/already/relative", false), "/already/relative");
}

#[test]
fn test_no_domain_only_relative() {
    let site = memory_site(false);
    let t = public_request(&site);
    assert_eq!(t.transform_url("https://old.test/a/", false), "https://old.test/a/");

    site.settings().set_relative_urls(true).unwrap();
    let t = public_request(&site);
    assert_eq!(t.transform_url("https://old.test/a/", false), "//old.test/a/");
}

#[test]
fn test_admin_short_circuit_and_bypass() {
    let site = cdn_site(true);
    let t = admin_request(&site);

    assert_eq!(t.transform_url("https://old.test/a/", false), "https://old.test/a/");
    assert_eq!(t.transform_for_testing("https://old.test/a/"), "//cdn.test/a/");
    assert_eq!(t.transform_for_indexing("https://old.test/a/"), "//cdn.test/a/");

    for signals in [
        RequestSignals::public().ajax(true),
        RequestSignals::public().cron(true),
        RequestSignals::public()
            .rest(true)
            .referer("https://old.test/wp-admin/post.php?post=4&action=edit"),
    ] {
        let t = site.begin_request(signals);
        assert_eq!(t.transform_url("https://old.test/a/", false), "https://old.test/a/");
    }
}

#[test]
fn test_public_api_call_is_rewritten() {
    let site = cdn_site(false);
    let t = site.begin_request(
        RequestSignals::public()
            .rest(true)
            .referer("https://old.test/some-page/"),
    );
    assert_eq!(
        t.transform_url("https://old.test/wp-json/wp/v2/posts/1", false),
        "https://cdn.test/wp-json/wp/v2/posts/1"
    );
}

#[test]
fn test_protected_paths_survive_bypass() {
    let site = cdn_site(true);
    let t = public_request(&site);

    for url in [
        "https://old.test/wp-admin/",
        "https://old.test/wp-admin/options-general.php",
        "https://old.test/wp-login.php?action=logout",
        "https://old.test/wp-includes/js/jquery/jquery.min.js",
        "https://old.test/xmlrpc.php",
        "https://old.test/?redirect_to=https://old.test/wp-admin/",
    ] {
        assert_eq!(t.transform_url(url, false), url);
        assert_eq!(t.transform_for_testing(url), url);
        assert_eq!(t.transform_for_indexing(url), url);
    }
}

#[test]
fn test_extra_protected_path() {
    let config = EngineConfig::builder()
        .site_url("old.test/")
        .protect_path("/members-only/")
        .build()
        .unwrap();
    assert_eq!(config.site_url(), "https://old.test");

    let site = Site::new(config, Arc::new(MemoryBackend::new()));
    site.settings().set_site_domain("cdn.test").unwrap();
    let t = public_request(&site);

    assert_eq!(
        t.transform_url("https://old.test/members-only/page", false),
        "https://old.test/members-only/page"
    );
    assert_eq!(t.transform_url("https://old.test/public", false), "https://cdn.test/public");
}

#[test]
fn test_domain_nested_under_site_url_does_not_grow() {
    let site = memory_site(false);
    site.settings().set_site_domain("https://old.test/mirror").unwrap();
    let t = public_request(&site);

    let once = t.transform_url("https://old.test/a/", false);
    assert_eq!(once, "https://old.test/mirror/a/");
    assert_eq!(t.transform_url(&once, false), once);
}

#[test]
fn test_nested_domain_with_redirect_target() {
    let site = memory_site(false);
    site.settings().set_site_domain("https://old.test/mirror").unwrap();
    let t = public_request(&site);

    let once = t.transform_url("https://old.test/a?r=https://old.test/mirror/b", false);
    assert_eq!(once, "https://old.test/mirror/a?r=https://old.test/mirror/b");
    assert_eq!(t.transform_url(&once, false), once);

    assert_eq!(
        t.transform_url("https://old.test/mirror/a?r=https://old.test/b", false),
        "https://old.test/mirror/a?r=https://old.test/mirror/b"
    );

    let html = r#"<a href="https://old.test/mirror/x">x</a>"#;
    assert_eq!(t.transform_content_block(html), html);
}

#[test]
fn test_uppercase_scheme_made_relative() {
    let site = cdn_site(true);
    let t = public_request(&site);

    assert_eq!(t.transform_url("HTTPS://other.test/x", false), "//other.test/x");
    assert_eq!(
        t.transform_content_block(r#"<a href="HTTP://other.test/x">x</a>"#),
        r#"<a href="//other.test/x">x</a>"#
    );
}

#[test]
fn test_content_block() {
    let site = cdn_site(false);
    let t = public_request(&site);

    let html = r#"<p>Read <a href="https://old.test/about/">about</a> or <a href="https://other.test/">elsewhere</a>.</p><img src="https://old.test/wp-content/uploads/a.jpg" alt=""><a href="https://old.test/wp-login.php">log in</a> Text mention https://old.test/x stays."#;
    let out = t.transform_content_block(html);

    assert!(out.contains(r#"href="https://cdn.test/about/""#));
    assert!(out.contains(r#"src="https://cdn.test/wp-content/uploads/a.jpg""#));
    assert!(out.contains(r#"href="https://other.test/""#));
    assert!(out.contains(r#"href="https://old.test/wp-login.php""#));
    assert!(out.contains("Text mention https://old.test/x stays."));
}

#[test]
fn test_content_block_relative_is_global() {
    let site = cdn_site(true);
    let t = public_request(&site);

    let html = r#"<a href="https://old.test/a">a</a> <a href="http://other.test/b">b</a> plain https://third.test/c"#;
    let out = t.transform_content_block(html);

    assert_eq!(
        out,
        r#"<a href="//cdn.test/a">a</a> <a href="//other.test/b">b</a> plain //third.test/c"#
    );
}

#[test]
fn test_content_block_relative_without_domain() {
    let site = memory_site(false);
    site.settings().set_relative_urls(true).unwrap();
    let t = public_request(&site);

    assert_eq!(
        t.transform_content_block(r#"<img src="https://old.test/a.png">"#),
        r#"<img src="//old.test/a.png">"#
    );
}

#[test]
fn test_content_block_untouched_in_admin() {
    let site = cdn_site(true);
    let t = admin_request(&site);
    let html = r#"<a href="https://old.test/a">a</a>"#;
    assert_eq!(t.transform_content_block(html), html);
}

#[test]
fn test_pagination_links() {
    let site = cdn_site(false);
    let t = public_request(&site);

    let html = r#"<a class="page-numbers" href="https://old.test/page/2/">2</a><span aria-current="page" class="page-numbers current">3</span><a class="next page-numbers" href='https://old.test/page/4/'>Next</a>"#;
    let out = t.transform_pagination_links(html);

    assert!(out.contains(r#"href="https://cdn.test/page/2/""#));
    assert!(out.contains("https://cdn.test/page/4/"));
    assert!(out.contains(r#"<span aria-current="page" class="page-numbers current">3</span>"#));

    let admin = admin_request(&site);
    assert_eq!(admin.transform_pagination_links(html), html);
}

#[test]
fn test_structured_preserves_shape() {
    let site = cdn_site(false);
    let t = public_request(&site);

    let out = t.transform_structured(
        json!({"a": "https://old.test/x", "b": [1, "https://old.test/y", null]}),
        "old.test",
        "cdn.test",
    );
    assert_eq!(out, json!({"a": "https://cdn.test/x", "b": [1, "https://cdn.test/y", null]}));
}

#[test]
fn test_seo_payload() {
    let site = cdn_site(false);
    let t = public_request(&site);

    let payload = json!({
        "canonical": "https://old.test/post/",
        "og:url": "https://old.test/post/",
        "schema": r##"{"@id":"https:\/\/old.test\/post\/#webpage"}"##,
        "robots": {"index": true, "follow": true}
    });
    let out = t.transform_seo_payload(payload);

    assert_eq!(out["canonical"], "https://cdn.test/post/");
    assert_eq!(out["og:url"], "https://cdn.test/post/");
    assert_eq!(out["schema"], r##"{"@id":"https:\/\/cdn.test\/post\/#webpage"}"##);
    assert_eq!(out["robots"], json!({"index": true, "follow": true}));

    let untouched = json!({"canonical": "https://old.test/post/"});
    assert_eq!(admin_request(&site).transform_seo_payload(untouched.clone()), untouched);
    assert_eq!(public_request(&memory_site(false)).transform_seo_payload(untouched.clone()), untouched);
}

#[test]
fn test_sitemap_entry_only_loc_changes() {
    let site = cdn_site(false);
    // sitemaps are generated in whatever context asks for them
    let t = admin_request(&site);

    let entry = SitemapEntry::new("https://old.test/p")
        .with_field("lastmod", "2024-01-01")
        .with_field("image", "https://old.test/i.png");
    let out = t.transform_sitemap_entry(entry.clone());

    assert_eq!(out.loc, "https://cdn.test/p");
    assert_eq!(out.extra, entry.extra);

    let as_json = serde_json::to_value(&out).unwrap();
    assert_eq!(
        as_json,
        json!({"loc": "https://cdn.test/p", "lastmod": "2024-01-01", "image": "https://old.test/i.png"})
    );
}

#[test]
fn test_network_override_domain() {
    let site = memory_site(true);
    let store = site.settings();
    store.set_site_domain("site-cdn.test").unwrap();
    store.set_network_settings(true, "net-cdn.test", true).unwrap();

    let t = public_request(&site);
    assert_eq!(t.transform_url("https://old.test/a", false), "https://net-cdn.test/a");

    store.set_network_settings(true, "net-cdn.test", false).unwrap();
    let t = public_request(&site);
    assert_eq!(t.transform_url("https://old.test/a", false), "https://site-cdn.test/a");
}
