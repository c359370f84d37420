use anyhow::Result;
use assert_cmd::Command;
use ng_expander::test_utils::TemplateTree;
use predicates::prelude::*;

fn ngexpand() -> Command {
    let mut cmd = Command::cargo_bin("ngexpand").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_writes_expansion_to_stdout() -> Result<()> {
    let tree = TemplateTree::new()?
        .with_file("site/index.html", "<h1>{{title}}</h1><p>{{subtitle}}</p>")?
        .with_file("scope.json", r#"{"title": "Hello"}"#)?;

    ngexpand()
        .arg("index.html")
        .arg("--src-dir")
        .arg(tree.path().join("site"))
        .arg("--scope")
        .arg(tree.path().join("scope.json"))
        .assert()
        .success()
        .stdout("<h1>Hello</h1><p>{{subtitle}}</p>");
    Ok(())
}

#[test]
fn test_cli_uses_config_file() -> Result<()> {
    let tree = TemplateTree::new()?
        .with_file("site/index.html", "<ng-view></ng-view>")?
        .with_file("site/views/home.html", "<p ng-bind=\"greeting\"></p>")?
        .with_file(
            "ngexpand.toml",
            "template = \"index.html\"\nsrc_dir = \"site\"\nview_template = \"views/home.html\"\n\n[scope]\ngreeting = \"Hi\"\n",
        )?;
    let output = tree.path().join("dist/index.html");

    ngexpand()
        .arg("--config")
        .arg(tree.path().join("ngexpand.toml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(std::fs::read_to_string(output)?, "<ng-view><p>Hi</p></ng-view>");
    Ok(())
}

#[test]
fn test_cli_reports_missing_template() -> Result<()> {
    let tree = TemplateTree::new()?.with_file("site/index.html", "<ng-include src=\"'gone.html'\"></ng-include>")?;

    ngexpand()
        .arg("index.html")
        .arg("--src-dir")
        .arg(tree.path().join("site"))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Template not found: gone.html"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_cli_rejects_non_object_scope() -> Result<()> {
    let tree = TemplateTree::new()?
        .with_file("site/index.html", "<p></p>")?
        .with_file("scope.json", "[1, 2, 3]")?;

    ngexpand()
        .arg("index.html")
        .arg("--src-dir")
        .arg(tree.path().join("site"))
        .arg("--scope")
        .arg(tree.path().join("scope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("scope"));
    Ok(())
}

#[test]
fn test_cli_requires_a_template() {
    ngexpand()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template to expand"));
}

#[test]
fn test_cli_verbose_conflicts_with_quiet() {
    ngexpand()
        .args(["--verbose", "--quiet", "index.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
