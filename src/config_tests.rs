use super::{
    default_config, load_config, resolve_config, validate_config, validate_output_location,
    SitePaths, CONFIG_FILE_NAME,
};
use std::path::Path;

#[test]
fn default_config_is_valid() {
    validate_config(&default_config()).expect("defaults validate");
}

#[test]
fn partial_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"{"api_url": "http://127.0.0.1:9/cars", "upload": {"bucket": "test-bucket"}}"#,
    )
    .expect("write config");

    let config = load_config(&path).expect("load config");
    assert_eq!(config.api_url, "http://127.0.0.1:9/cars");
    assert_eq!(config.upload.bucket, "test-bucket");
    assert_eq!(config.upload.globs, vec!["assets/*", "setup/*"]);
    assert_eq!(config.listing_page, default_config().listing_page);
}

#[test]
fn resolve_prefers_source_root_config_over_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(
        resolve_config(dir.path(), None).expect("defaults"),
        default_config()
    );

    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"site_url": "https://autos.test"}"#,
    )
    .expect("write config");
    let config = resolve_config(dir.path(), None).expect("resolve");
    assert_eq!(config.site_url, "https://autos.test");
}

#[test]
fn resolve_reports_malformed_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{not json").expect("write config");
    let err = resolve_config(dir.path(), Some(&path)).expect_err("malformed config");
    assert!(format!("{err:#}").contains("parse site config JSON"));
}

#[test]
fn validate_rejects_escaping_paths() {
    let mut config = default_config();
    config.static_dirs.push("../secrets".to_string());
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.template_dir = "/etc".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn validate_rejects_output_dir_that_would_wipe_the_source() {
    for bad in [
        "",
        ".",
        "./",
        "./.",
        ".//.",
        "/",
        "../site",
        "templates",
        "./templates",
        "assets",
        "assets/site",
        "css/",
        "index.html",
        "robots.txt",
    ] {
        let mut config = default_config();
        config.output_dir = bad.to_string();
        assert!(validate_config(&config).is_err(), "accepted {bad:?}");
    }

    for good in ["site", "./public", "build/site", "/tmp/showroom-site"] {
        let mut config = default_config();
        config.output_dir = good.to_string();
        validate_config(&config).unwrap_or_else(|err| panic!("rejected {good:?}: {err:#}"));
    }
}

#[test]
fn output_location_is_checked_against_the_source_root() {
    let source = tempfile::tempdir().expect("tempdir");
    let root = source.path();

    let mut config = default_config();
    validate_output_location(&config, root).expect("default output dir");

    for bad in [
        root.to_path_buf(),
        root.join("."),
        root.parent().expect("parent").to_path_buf(),
        root.join("templates"),
        root.join("assets/site"),
    ] {
        config.output_dir = bad.display().to_string();
        assert!(
            validate_output_location(&config, root).is_err(),
            "accepted {}",
            bad.display()
        );
    }

    config.output_dir = root.join("public").display().to_string();
    validate_output_location(&config, root).expect("absolute dir inside the source");
}

#[test]
fn validate_rejects_unknown_schema_version() {
    let mut config = default_config();
    config.schema_version = 99;
    let err = validate_config(&config).expect_err("schema mismatch");
    assert!(err.to_string().contains("schema_version"));
}

#[test]
fn site_paths_follow_config() {
    let config = default_config();
    let paths = SitePaths::new(Path::new("/srv/site-src"), &config);
    assert_eq!(paths.output_root(), Path::new("/srv/site-src/site"));
    assert_eq!(
        paths.detail_dir(&config),
        Path::new("/srv/site-src/site/occasions")
    );
    assert_eq!(
        paths.sitemap_path(),
        Path::new("/srv/site-src/site/sitemap.xml")
    );
    assert_eq!(
        paths.template_dir(&config),
        Path::new("/srv/site-src/templates")
    );
}
