use super::*;
use crate::config::AppContext;
use serde_json::{Value, json};

const PACKAGE: &str = r#"{
  "name": "app",
  "scripts": {
    "start": "app-time start",
    "build": "NODE_ENV=production app-time build",
    "eject": "app-time eject"
  }
}"#;

async fn app() -> (tempfile::TempDir, AppContext) {
    let dir = tempfile::tempdir().expect("tempdir");
    tokio::fs::write(dir.path().join("package.json"), PACKAGE)
        .await
        .expect("write package.json");
    let ctx = AppContext::new_test(dir.path());
    (dir, ctx)
}

async fn read(path: impl AsRef<Path>) -> String {
    tokio::fs::read_to_string(path).await.expect("read")
}

#[tokio::test]
async fn writes_every_destination() {
    let (dir, ctx) = app().await;
    let ejector = Ejector::new(&ctx, false);

    let written = ejector.run().await.expect("eject");
    assert_eq!(written.len(), entries().len() + 1);

    for entry in entries() {
        let content = read(ejector.destination(&entry)).await;
        assert!(!content.contains("@remove-on-eject"), "{:?}", entry.path);
        assert!(content.ends_with('\n') && !content.ends_with("\n\n"));
    }

    let compile = read(dir.path().join("apptime/utils/compile.js")).await;
    assert!(!compile.contains("@@apptime:"));

    let config: Value =
        serde_json::from_str(&read(dir.path().join("apptime/config/webpack.config.prod.json")).await)
            .expect("generated config");
    assert!(config["plugins"].is_array());

    let package: Value =
        serde_json::from_str(&read(dir.path().join("package.json")).await).expect("package.json");
    assert_eq!(
        package["scripts"],
        json!({
            "start": "node apptime/scripts/start.js",
            "build": "NODE_ENV=production node apptime/scripts/build.js",
        })
    );
    assert_eq!(package["devDependencies"]["webpack"], "^2.2.1");
}

#[tokio::test]
async fn conflicts_write_nothing() {
    let (dir, ctx) = app().await;
    let ejector = Ejector::new(&ctx, false);
    let taken = [
        dir.path().join("apptime/scripts/start.js"),
        dir.path().join("apptime/config/webpack.config.dev.json"),
    ];
    for path in &taken {
        tokio::fs::create_dir_all(path.parent().expect("parent"))
            .await
            .expect("create dir");
        tokio::fs::write(path, "mine").await.expect("write");
    }

    let err = ejector.run().await.expect_err("must fail");
    let EjectError::Conflicts(conflicts) = &err else {
        panic!("expected conflicts, got {err}");
    };
    assert_eq!(conflicts.len(), 2);
    for path in &taken {
        assert!(conflicts.contains(path));
        assert_eq!(read(path).await, "mine");
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    assert!(!dir.path().join("apptime/scripts/build.js").exists());
    assert_eq!(read(dir.path().join("package.json")).await, PACKAGE);
}

#[tokio::test]
async fn dry_run_changes_nothing() {
    let (dir, ctx) = app().await;
    let ejector = Ejector::new(&ctx, true);

    let written = ejector.run().await.expect("eject");
    for entry in entries() {
        assert!(written.contains(&ejector.destination(&entry)));
    }
    assert!(written.contains(&dir.path().join("package.json")));

    assert!(!dir.path().join(OUT_DIR).exists());
    assert_eq!(read(dir.path().join("package.json")).await, PACKAGE);
}

#[tokio::test]
async fn missing_package_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = AppContext::new_test(dir.path());

    let err = Ejector::new(&ctx, false).run().await.expect_err("must fail");
    assert!(matches!(err, EjectError::Package { .. }));
    assert!(!dir.path().join(OUT_DIR).exists());
}

#[tokio::test]
async fn broken_override_writes_nothing() {
    let (dir, ctx) = app().await;
    tokio::fs::write(dir.path().join("apptime.config.prod.json"), "{ broken")
        .await
        .expect("write override");

    let err = Ejector::new(&ctx, false).run().await.expect_err("must fail");
    let EjectError::Render { path, .. } = &err else {
        panic!("expected a render error, got {err}");
    };
    assert_eq!(path, Path::new("config/webpack.config.prod.json"));
    assert!(!dir.path().join(OUT_DIR).exists());
    assert_eq!(read(dir.path().join("package.json")).await, PACKAGE);
}
