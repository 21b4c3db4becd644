use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "layouts/default.html", "<html>{{> nav}}<main>{{> body}}</main></html>");
    write(root, "layouts/wide.html", "<wide>{{> body}}</wide>");
    write(root, "partials/nav.html", "<nav>{{site.name}}</nav>");
    write(root, "partials/blocks/card.html", "<div class=\"card\">{{title}}</div>");
    write(root, "data/site.json", r#"{"name": "Acme"}"#);
    write(root, "data/menu.yml", "items:\n  - home\n  - about\n");
    dir
}

#[test]
fn test_is_template_only() {
    assert!(is_template_only(Path::new("layouts/default.html")));
    assert!(is_template_only(Path::new("partials/blocks/card.html")));
    assert!(is_template_only(Path::new("data/site.json")));
    assert!(!is_template_only(Path::new("pages/index.html")));
    assert!(!is_template_only(Path::new("pages/data/index.html")));
}

#[test]
fn test_page_name_and_root() {
    let page = Page::new(Path::new("index.html"), "");
    assert_eq!(page.name, "index");
    assert_eq!(page.root, "");

    let page = Page::new(Path::new("blog/2024/post.html"), "");
    assert_eq!(page.name, "blog/2024/post");
    assert_eq!(page.root, "../../");
}

#[test]
fn test_refresh_stats() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let stats = cache.refresh().unwrap();
    assert_eq!(
        stats,
        TemplateStats {
            layouts: 2,
            partials: 2,
            data: 2
        }
    );
}

#[test]
fn test_refresh_missing_root() {
    let dir = TempDir::new().unwrap();
    let cache = TemplateCache::new(dir.path().join("nope"));
    assert_eq!(cache.refresh().unwrap(), TemplateStats::default());
}

#[test]
fn test_render_default_layout() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let page = Page::new(Path::new("index.html"), "<h1>{{page}}</h1>");
    let html = cache.render(&page).unwrap();
    assert_eq!(html, "<html><nav>Acme</nav><main><h1>index</h1></main></html>");
}

#[test]
fn test_render_front_matter() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let source = "---\nlayout: wide\ntitle: Hello\n---\n{{> blocks/card}}<a href=\"{{root}}x\">{{#each menu.items}}{{this}}{{/each}}</a>";
    let page = Page::new(Path::new("docs/intro.html"), source);
    let html = cache.render(&page).unwrap();
    assert_eq!(
        html,
        "<wide><div class=\"card\">Hello</div><a href=\"../x\">homeabout</a></wide>"
    );
}

#[test]
fn test_front_matter_overrides_data() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let source = "---\nsite:\n  name: Override\n---\n";
    let html = cache.render(&Page::new(Path::new("a.html"), source)).unwrap();
    assert!(html.contains("<nav>Override</nav>"), "{html}");
}

#[test]
fn test_ifpage_uses_page_name() {
    let dir = fixture();
    write(
        dir.path(),
        "partials/nav.html",
        "{{#ifpage 'about'}}here{{else}}away{{/ifpage}}",
    );
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let about = cache.render(&Page::new(Path::new("about.html"), "")).unwrap();
    let index = cache.render(&Page::new(Path::new("index.html"), "")).unwrap();
    assert!(about.contains("here"));
    assert!(index.contains("away"));
}

#[test]
fn test_missing_layout() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let page = Page::new(Path::new("a.html"), "---\nlayout: nope\n---\nx");
    let err = cache.render(&page).unwrap_err().to_string();
    assert!(err.contains("layout `nope` not found"), "{err}");
}

#[test]
fn test_refresh_picks_up_changes() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    let page = Page::new(Path::new("a.html"), "");
    assert!(cache.render(&page).unwrap().contains("Acme"));

    write(dir.path(), "data/site.json", r#"{"name": "Globex"}"#);
    assert!(cache.render(&page).unwrap().contains("Acme"));
    cache.refresh().unwrap();
    assert!(cache.render(&page).unwrap().contains("Globex"));
}

#[test]
fn test_refresh_error_keeps_previous_state() {
    let dir = fixture();
    let cache = TemplateCache::new(dir.path().to_path_buf());
    cache.refresh().unwrap();

    write(dir.path(), "data/site.json", "{ broken");
    assert!(cache.refresh().is_err());
    let html = cache.render(&Page::new(Path::new("a.html"), "")).unwrap();
    assert!(html.contains("Acme"));
}
