use anyhow::Result;
use ng_expander::test_utils::MemoryLoader;
use ng_expander::{ExpandOptions, Expander};
use serde_json::json;

fn options(scope: serde_json::Value) -> ExpandOptions {
    ExpandOptions::default().with_scope(scope)
}

#[tokio::test]
async fn test_interpolation_uses_scope_value() -> Result<()> {
    let loader = MemoryLoader::new().with_template("index.html", "<title>{{title}}</title><h1>{{ title }}</h1>");
    let output = Expander::new(loader, options(json!({"title": "Hi"})))?.expand("index.html").await?;

    assert_eq!(output, "<title>Hi</title><h1>Hi</h1>");
    Ok(())
}

#[tokio::test]
async fn test_repeat_over_literal_array() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ul><li ng-repeat=\"item in [10,20]\">{{item}}</li></ul>");
    let output = Expander::new(loader, options(json!({})))?.expand("index.html").await?;

    assert_eq!(
        output,
        concat!(
            "<ul>",
            "<li><span style=\"display: none\">{{i = 0; item = [10,20][i]; $index = 0 ;\"\"}}</span>10</li>",
            "<li><span style=\"display: none\">{{i = 1; item = [10,20][i]; $index = 1 ;\"\"}}</span>20</li>",
            "</ul>"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_include_rejects_the_whole_expansion() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<h1>{{title}}</h1><ng-include src=\"'missing.html'\"></ng-include>");
    let result = Expander::new(loader, options(json!({"title": "Hi"})))?.expand("index.html").await;

    let err = result.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    assert!(err.to_string().contains("missing.html"));
    Ok(())
}

#[tokio::test]
async fn test_unresolved_bind_is_left_untouched() -> Result<()> {
    let markup = "<p ng-bind=\"user.name\" class=\"name\">Guest</p>";
    let loader = MemoryLoader::new().with_template("index.html", markup);
    let output = Expander::new(loader, options(json!({})))?.expand("index.html").await?;

    assert_eq!(output, markup);
    Ok(())
}

#[tokio::test]
async fn test_view_placeholder_receives_instantiated_view() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<main><ng-view></ng-view></main>")
        .with_template("views/home.html", "<h2>{{title}}</h2><p ng-bind=\"intro\"></p>");
    let scope = json!({"title": "Home", "intro": "Welcome"});
    let expander = Expander::new(loader, options(scope).with_view_template("views/home.html"))?;

    let output = expander.expand("index.html").await?;
    assert_eq!(output, "<main><ng-view><h2>Home</h2><p>Welcome</p></ng-view></main>");

    let view = expander.expand("views/home.html").await?;
    assert_eq!(output, format!("<main><ng-view>{view}</ng-view></main>"));
    Ok(())
}

#[tokio::test]
async fn test_view_placeholder_without_view_template_is_kept() -> Result<()> {
    let markup = "<main><ng-view></ng-view></main>";
    let loader = MemoryLoader::new().with_template("index.html", markup);
    let output = Expander::new(loader, options(json!({})))?.expand("index.html").await?;

    assert_eq!(output, markup);
    Ok(())
}

#[tokio::test]
async fn test_unresolved_interpolation_is_kept_byte_for_byte() -> Result<()> {
    let markup = "<p>{{ user.name | uppercase }}</p><p>{{count}}</p><p>{{ missing }}</p>";
    let loader = MemoryLoader::new().with_template("index.html", markup);
    let output = Expander::new(loader, options(json!({"count": 0})))?.expand("index.html").await?;

    assert_eq!(output, markup);
    Ok(())
}
