use super::*;
use crate::config::test_config_at;
use crate::manifest::Manifest;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

const LAYOUT: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>{{title}}</title>\n<link rel=\"stylesheet\" href=\"{{root}}css/main.css\" />\n</head>\n<body>\n{{> body}}\n<script src=\"{{root}}js/all.js\"></script>\n</body>\n</html>\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn icon(root: &Path, name: &str, color: [u8; 4]) {
    let dir = root.join("src/icons");
    fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(8, 8, image::Rgba(color))
        .save(dir.join(name))
        .unwrap();
}

fn project() -> (TempDir, Arc<Config>) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/sass/main.scss", "$brand: #c00;\n\n.a {\n  color: $brand;\n}\n");
    write(root, "src/sass/_vars.scss", "$brand: #c00;\n");
    write(root, "src/js/index.js", "import { greet } from './greet.js';\ngreet('home');\n");
    write(root, "src/js/greet.js", "export const greet = (name) => console.log(name);\n");
    write(root, "src/html/layouts/default.html", LAYOUT);
    write(root, "src/html/partials/note.html", "<p>note</p>");
    write(root, "src/html/pages/index.html", "---\ntitle: Home\n---\n{{> note}}\n");
    write(root, "src/fonts/inter.woff2", "wOF2");
    write(root, "src/resources/robots.txt", "User-agent: *\n");
    icon(root, "home.png", [255, 0, 0, 255]);
    let config = Arc::new(test_config_at(root, ""));
    (dir, config)
}

fn context(config: &Arc<Config>, mode: BuildMode) -> Context {
    Context::new(Arc::clone(config), mode).unwrap()
}

fn zip_names(archive: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut names: Vec<_> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_clear_removes_stale_output() {
    let (dir, config) = project();
    write(dir.path(), "dist/old.html", "stale");
    write(dir.path(), "dist/css/old.css", "stale");

    let ctx = context(&config, BuildMode::Distribution);
    assert!(build(&ctx).unwrap().is_empty());

    assert!(!dir.path().join("dist/old.html").exists());
    assert!(!dir.path().join("dist/css/old.css").exists());
    assert!(dir.path().join("dist/index.html").is_file());
    assert!(!config.temp_root().exists());
}

#[test]
fn test_manifest_keeps_styles_and_scripts() {
    let (_dir, config) = project();
    let ctx = context(&config, BuildMode::Distribution);
    build(&ctx).unwrap();

    let manifest = Manifest::load(&ctx.target.manifest_path()).unwrap();
    assert!(manifest.get("css/main.css").is_some());
    assert!(manifest.get("js/all.js").is_some());
    assert!(manifest.get("css/icons.css").is_some());
}

#[test]
fn test_development_writes_no_manifest() {
    let (dir, config) = project();
    let ctx = context(&config, BuildMode::Development);
    assert!(build(&ctx).unwrap().is_empty());

    assert!(!ctx.target.manifest_path().exists());
    let index = fs::read_to_string(dir.path().join("dev/index.html")).unwrap();
    assert!(index.contains("href=\"css/main.css\""), "{index}");
    assert!(index.contains("src=\"js/all.js\""), "{index}");
    assert!(dir.path().join("dev/css/main.css").is_file());
    assert!(dir.path().join("dev/fonts/inter.woff2").is_file());
    assert!(dir.path().join("dev/resources/robots.txt").is_file());
}

#[test]
fn test_production_hashes_and_archives() {
    let (dir, config) = project();
    run(Arc::clone(&config), BuildMode::Production).unwrap();

    let base = dir.path().join("build");
    let manifest = Manifest::load(&base.join("manifest.json")).unwrap();
    let css = manifest.get("css/main.css").unwrap().to_string();
    let js = manifest.get("js/all.js").unwrap().to_string();
    assert_ne!(css, "css/main.css");
    assert!(base.join(&css).is_file());
    assert!(!base.join("css/main.css").exists());

    let index = fs::read_to_string(base.join("index.html")).unwrap();
    assert!(index.contains(&css), "{index}");
    assert!(index.contains(&js), "{index}");

    let names = zip_names(&base.join("build.zip"));
    assert!(names.contains(&"index.html".to_string()));
    assert!(names.contains(&css));
    assert!(names.contains(&js));
    assert!(names.contains(&"manifest.json".to_string()));
    assert!(!names.iter().any(|n| n.ends_with(".zip")));
}

#[test]
fn test_template_only_files_never_pages() {
    let (dir, config) = project();
    for mode in [BuildMode::Development, BuildMode::Production] {
        let ctx = context(&config, mode);
        build(&ctx).unwrap();
        let base = &ctx.target.paths.base;
        assert!(base.join("index.html").is_file());
        for name in ["note.html", "default.html", "partials", "layouts"] {
            assert!(!base.join(name).exists(), "{mode}: {name}");
        }
    }
    assert!(dir.path().join("src/html/partials/note.html").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(test_config_at(dir.path(), ""));

    run(Arc::clone(&config), BuildMode::Init).unwrap();
    let folders: Vec<_> = config
        .folders
        .iter()
        .map(|f| dir.path().join(f))
        .collect();
    assert!(folders.iter().all(|f| f.is_dir()));

    write(dir.path(), "src/sass/main.scss", ".a {\n  color: red;\n}\n");
    run(Arc::clone(&config), BuildMode::Init).unwrap();
    assert!(folders.iter().all(|f| f.is_dir()));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/sass/main.scss")).unwrap(),
        ".a {\n  color: red;\n}\n"
    );
    assert!(dir.path().join("dev/css/main.css").is_file());
}

#[test]
fn test_one_shot_stops_at_first_failure() {
    let (dir, config) = project();
    write(dir.path(), "src/js/index.js", "import './missing.js';\n");

    let err = run(Arc::clone(&config), BuildMode::Production).unwrap_err();
    assert!(err.to_string().starts_with("JS:"), "{err}");
    assert!(dir.path().join("build/css").exists());
    assert!(!dir.path().join("build/index.html").exists());
    assert!(!dir.path().join("build/build.zip").exists());
}

#[test]
fn test_development_continues_after_failure() {
    let (dir, config) = project();
    write(dir.path(), "src/js/index.js", "import './missing.js';\n");

    let ctx = context(&config, BuildMode::Development);
    let failures = build(&ctx).unwrap();
    assert_eq!(failures.len(), 1);
    assert!(dir.path().join("dev/index.html").is_file());
}

#[test]
fn test_icon_change_leaves_other_css_alone() {
    let (dir, config) = project();
    let ctx = context(&config, BuildMode::Development);
    build(&ctx).unwrap();

    let main_css = dir.path().join("dev/css/main.css");
    let before = fs::metadata(&main_css).unwrap().modified().unwrap();
    let sprite = dir.path().join("dev/img/icons-sprite.png");
    let sprite_before = fs::read(&sprite).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    icon(dir.path(), "home.png", [0, 0, 255, 255]);
    Pipeline::Sprite.run(&ctx).unwrap();

    assert_ne!(fs::read(&sprite).unwrap(), sprite_before);
    assert_eq!(fs::metadata(&main_css).unwrap().modified().unwrap(), before);
}
