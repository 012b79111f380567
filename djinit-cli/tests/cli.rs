//! Binary-level tests for every `djinit` subcommand.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn djinit() -> Command {
    let mut cmd = Command::cargo_bin("djinit").expect("djinit binary");
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

// ---------------------------------------------------------------------------
// setup
// ---------------------------------------------------------------------------

#[test]
fn setup_creates_project_and_prints_marks() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let dir = tmp.child("shop");

    djinit()
        .arg("setup")
        .arg(dir.path())
        .args(["--project", "shop", "--module", "config"])
        .args(["--app", "users,orders", "--nested-dir", "apps"])
        .args(["--database", "mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 'shop' ready"))
        .stdout(predicate::str::contains("✎"))
        .stdout(predicate::str::contains("Next steps:"));

    dir.child("manage.py").assert(predicate::path::is_file());
    dir.child("apps/orders/apps.py")
        .assert(predicate::str::contains("class OrdersConfig(AppConfig):"));
    dir.child("config/settings/base.py")
        .assert(predicate::str::contains("\"apps.users.apps.UsersConfig\","));
    dir.child("requirements.txt")
        .assert(predicate::str::contains("mysqlclient"));
}

#[test]
fn setup_dry_run_touches_nothing() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let dir = tmp.child("blog");

    djinit()
        .arg("setup")
        .arg(dir.path())
        .args(["--project", "blog", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[dry-run]"))
        .stdout(predicate::str::contains("~"))
        .stdout(predicate::str::contains("Next steps:").not());

    dir.assert(predicate::path::missing());
}

#[test]
fn setup_rejects_keyword_project_name() {
    let tmp = assert_fs::TempDir::new().unwrap();
    djinit()
        .arg("setup")
        .arg(tmp.path().join("x"))
        .args(["--project", "class"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Python keyword"));
}

#[test]
fn setup_rejects_unknown_database() {
    let tmp = assert_fs::TempDir::new().unwrap();
    djinit()
        .arg("setup")
        .arg(tmp.path().join("x"))
        .args(["--project", "shop", "--database", "oracle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported database type"));
}

// ---------------------------------------------------------------------------
// app
// ---------------------------------------------------------------------------

#[test]
fn app_adds_each_name_in_order() {
    let tmp = assert_fs::TempDir::new().unwrap();
    djinit()
        .arg("setup")
        .arg(tmp.path())
        .args(["--project", "shop"])
        .assert()
        .success();

    djinit()
        .current_dir(tmp.path())
        .args(["app", "blog,pages", "news"])
        .assert()
        .success()
        .stdout(predicate::str::contains("App 'blog' created as blog"))
        .stdout(predicate::str::contains("registered news.apps.NewsConfig"));

    for app in ["blog", "pages", "news"] {
        tmp.child(format!("{app}/apps.py")).assert(predicate::path::is_file());
    }
    tmp.child("shop/settings/base.py")
        .assert(predicate::str::contains("\"pages.apps.PagesConfig\","));
}

#[test]
fn app_dry_run_prints_settings_diff() {
    let tmp = assert_fs::TempDir::new().unwrap();
    djinit()
        .arg("setup")
        .arg(tmp.path())
        .args(["--project", "shop"])
        .assert()
        .success();

    djinit()
        .current_dir(tmp.path())
        .args(["app", "blog", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ b/shop/settings/base.py"))
        .stdout(predicate::str::contains("+    \"blog.apps.BlogConfig\","));

    tmp.child("blog").assert(predicate::path::missing());
}

#[test]
fn app_outside_project_fails() {
    let tmp = assert_fs::TempDir::new().unwrap();
    djinit()
        .current_dir(tmp.path())
        .args(["app", "blog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a Django project"));
}

#[test]
fn app_invalid_name_fails_before_writing() {
    let tmp = assert_fs::TempDir::new().unwrap();
    tmp.child("manage.py").touch().unwrap();
    djinit()
        .current_dir(tmp.path())
        .args(["app", "good_app", "9bad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("App name must start with a letter"));

    tmp.child("good_app").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// secret
// ---------------------------------------------------------------------------

#[test]
fn secret_prints_requested_keys() {
    djinit()
        .args(["secret", "--count", "2", "--length", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SECRET_KEY"))
        .stdout(predicate::str::contains("│ 2 "))
        .stdout(predicate::str::contains("│ 3 ").not());
}

#[test]
fn secret_rejects_zero_length() {
    djinit()
        .args(["secret", "--length", "0"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_uses_context_file_and_overrides() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let template = tmp.child("greeting.txt");
    template
        .write_str(
            "Hello [[ name ]]\n# @IF debug\nDEBUG\n# @ENDIF\n# @LOOP a in apps\n- [[ a ]]\n# @ENDLOOP",
        )
        .unwrap();
    let context = tmp.child("ctx.yaml");
    context.write_str("name: shop\ndebug: false\napps: [users, orders]\n").unwrap();

    djinit()
        .arg("render")
        .arg(template.path())
        .arg("--context")
        .arg(context.path())
        .args(["--set", "debug=true"])
        .assert()
        .success()
        .stdout("Hello shop\nDEBUG\n- users\n- orders\n");
}

#[test]
fn render_json_context_must_be_a_mapping() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let template = tmp.child("t.txt");
    template.write_str("[[ x ]]").unwrap();
    let context = tmp.child("ctx.json");
    context.write_str("[1, 2]").unwrap();

    djinit()
        .arg("render")
        .arg(template.path())
        .arg("--context")
        .arg(context.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must hold a mapping"));
}

#[test]
fn render_leaves_unknown_names_in_place() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let template = tmp.child("t.txt");
    template.write_str("[[ known ]] [[ missing ]]").unwrap();

    djinit()
        .arg("render")
        .arg(template.path())
        .args(["--set", "known=1"])
        .assert()
        .success()
        .stdout("1 [[ missing ]]\n");
}
