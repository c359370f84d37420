use anyhow::Result;
use ng_expander::test_utils::MemoryLoader;
use ng_expander::{ExpandOptions, Expander};
use serde_json::json;

async fn expand_with(loader: MemoryLoader, scope: serde_json::Value) -> Result<String> {
    let expander = Expander::new(loader, ExpandOptions::default().with_scope(scope))?;
    Ok(expander.expand("index.html").await?)
}

#[tokio::test]
async fn test_include_element_becomes_noop_wrapper() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<body><ng-include src=\"'header.html'\" ng-show=\"loggedIn\"></ng-include></body>")
        .with_template("header.html", "<header>{{site}}</header>");

    let output = expand_with(loader, json!({"site": "Docs"})).await?;
    assert_eq!(output, "<body><noop ng-show=\"loggedIn\"><header>Docs</header></noop></body>");
    Ok(())
}

#[tokio::test]
async fn test_include_source_is_an_expression() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ng-include src=\"partials + '/nav.html?v=3'\"></ng-include>")
        .with_template("shared/nav.html", "<nav></nav>");
    let expander = Expander::new(
        loader,
        ExpandOptions::default().with_scope(json!({"partials": "shared"})),
    )?;

    let output = expander.expand("index.html").await?;
    assert_eq!(output, "<noop><nav></nav></noop>");
    assert_eq!(expander.loader().requests(), vec!["index.html", "shared/nav.html"]);
    Ok(())
}

#[tokio::test]
async fn test_include_with_unknown_source_is_left_for_the_client() -> Result<()> {
    let markup = "<ng-include src=\"page.url\"></ng-include><div ng-include=\"''\"></div>";
    let loader = MemoryLoader::new().with_template("index.html", markup);

    let output = expand_with(loader, json!({})).await?;
    assert_eq!(output, markup);
    Ok(())
}

#[tokio::test]
async fn test_include_attribute_fills_element_content() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<aside class=\"side\" ng-include=\"'menu.html'\" id=\"m\">old</aside>")
        .with_template("menu.html", "<a href=\"/\">{{label}}</a>");

    let output = expand_with(loader, json!({"label": "Home"})).await?;
    assert_eq!(output, "<aside class=\"side\" id=\"m\"><a href=\"/\">Home</a></aside>");
    Ok(())
}

#[tokio::test]
async fn test_nested_includes_share_the_outer_scope() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ng-include src=\"'a.html'\"></ng-include>")
        .with_template("a.html", "<section>{{name}}<ng-include src=\"'b.html'\"></ng-include></section>")
        .with_template("b.html", "<em>{{name}}!</em>");

    let output = expand_with(loader, json!({"name": "Ada"})).await?;
    assert_eq!(output, "<noop><section>Ada<noop><em>Ada!</em></noop></section></noop>");
    Ok(())
}

#[tokio::test]
async fn test_error_in_nested_include_propagates() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ng-include src=\"'a.html'\"></ng-include>")
        .with_template("a.html", "<div ng-include=\"'gone.html'\"></div>");
    let expander = Expander::new(loader, ExpandOptions::default())?;

    let err = expander.expand("index.html").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("gone.html"));
    Ok(())
}

#[tokio::test]
async fn test_bind_html_renders_markup() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<div ng-bind-html=\"body\">loading</div><span ng-bind=\"empty\">x</span>");

    let output = expand_with(loader, json!({"body": "<em>rich</em> text", "empty": null})).await?;
    assert_eq!(output, "<div><em>rich</em> text</div><span></span>");
    Ok(())
}

#[tokio::test]
async fn test_repeat_over_object_and_partial_data() -> Result<()> {
    let loader = MemoryLoader::new().with_template(
        "index.html",
        "<dl><dt ng-repeat=\"(key, user) in users\">{{key}}: {{user.name}} {{user.email}}</dt></dl>",
    );
    let scope = json!({"users": {"ada": {"name": "Ada"}, "alan": {"name": "Alan"}}});

    let output = expand_with(loader, scope).await?;
    assert_eq!(
        output,
        concat!(
            "<dl>",
            "<dt><span style=\"display: none\">{{key = \"ada\"; user = users[key]; $index = 0 ;\"\"}}</span>ada: Ada {{user.email}}</dt>",
            "<dt><span style=\"display: none\">{{key = \"alan\"; user = users[key]; $index = 1 ;\"\"}}</span>alan: Alan {{user.email}}</dt>",
            "</dl>"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_repeat_with_unknown_collection_is_left_for_the_client() -> Result<()> {
    let markup = "<ul><li ng-repeat=\"item in items track by item.id\">{{item.name}}</li></ul>";
    let loader = MemoryLoader::new().with_template("index.html", markup);

    let output = expand_with(loader, json!({})).await?;
    assert_eq!(output, markup);
    Ok(())
}

#[tokio::test]
async fn test_repeat_over_empty_collection_removes_the_element() -> Result<()> {
    let loader = MemoryLoader::new().with_template("index.html", "<ul><li ng-repeat=\"x in xs\">{{x}}</li></ul>");

    let output = expand_with(loader, json!({"xs": []})).await?;
    assert_eq!(output, "<ul></ul>");
    Ok(())
}

#[tokio::test]
async fn test_repeat_with_includes_inside_items() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<div ng-repeat=\"card in cards\"><ng-include src=\"card.tpl\"></ng-include></div>")
        .with_template("a.html", "<b>A</b>")
        .with_template("b.html", "<i>B</i>");
    let scope = json!({"cards": [{"tpl": "a.html"}, {"tpl": "b.html"}]});

    let output = expand_with(loader, scope).await?;
    assert_eq!(
        output,
        concat!(
            "<div><span style=\"display: none\">{{i = 0; card = cards[i]; $index = 0 ;\"\"}}</span><noop><b>A</b></noop></div>",
            "<div><span style=\"display: none\">{{i = 1; card = cards[i]; $index = 1 ;\"\"}}</span><noop><i>B</i></noop></div>"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_unparsable_repeat_is_skipped_and_others_expand() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ul><li ng-repeat=\"items\">a</li><li ng-repeat=\"x in xs\">{{x}}</li></ul>");

    let output = expand_with(loader, json!({"xs": [1, 2]})).await?;
    assert_eq!(
        output,
        "<ul><li ng-repeat=\"items\">a</li>\
         <li><span style=\"display: none\">{{i = 0; x = xs[i]; $index = 0 ;\"\"}}</span>1</li>\
         <li><span style=\"display: none\">{{i = 1; x = xs[i]; $index = 1 ;\"\"}}</span>2</li></ul>"
    );
    Ok(())
}
