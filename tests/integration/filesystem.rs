use anyhow::Result;
use ng_expander::test_utils::TemplateTree;
use ng_expander::{ExpandError, ExpandOptions, expand};
use serde_json::json;

fn site() -> Result<TemplateTree> {
    TemplateTree::new()?
        .with_file(
            "index.html",
            "<!DOCTYPE html>\n<html><head><title>{{title}}</title></head>\n<body><ng-include src=\"'partials/header.html'\"></ng-include><ng-view></ng-view></body></html>\n",
        )?
        .with_file("partials/header.html", "<header><a href=\"/\">{{title}}</a></header>")?
        .with_file("views/home.html", "<p ng-repeat=\"n in news\">{{n}}</p>")
}

#[tokio::test]
async fn test_expand_from_source_directory() -> Result<()> {
    let tree = site()?;
    let options = ExpandOptions::default()
        .with_src_dir(tree.path())
        .with_view_template("views/home.html")
        .with_scope(json!({"title": "Site", "news": ["one"]}));

    let output = expand("index.html", options).await?;

    assert_eq!(
        output,
        concat!(
            "<!DOCTYPE html>\n<html><head><title>Site</title></head>\n<body>",
            "<noop><header><a href=\"/\">Site</a></header></noop>",
            "<ng-view><p><span style=\"display: none\">{{i = 0; n = news[i]; $index = 0 ;\"\"}}</span>one</p></ng-view>",
            "</body></html>\n"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_references_are_normalized_against_source_directory() -> Result<()> {
    let tree = TemplateTree::new()?
        .with_file("pages/index.html", "<ng-include src=\"'./pages/../shared//footer.html'\"></ng-include>")?
        .with_file("shared/footer.html", "<footer></footer>")?;
    let options = ExpandOptions::default().with_src_dir(tree.path());

    let output = expand("pages/index.html", options).await?;
    assert_eq!(output, "<noop><footer></footer></noop>");
    Ok(())
}

#[tokio::test]
async fn test_missing_main_template() -> Result<()> {
    let tree = TemplateTree::new()?;
    let options = ExpandOptions::default().with_src_dir(tree.path());

    let err = expand("nowhere.html", options).await.unwrap_err();
    match err {
        ExpandError::NotFound {
            reference,
            location,
        } => {
            assert_eq!(reference, "nowhere.html");
            assert!(location.ends_with("nowhere.html"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_scope_is_rejected_before_loading() -> Result<()> {
    let options = ExpandOptions::default().with_scope(json!(["not", "an", "object"]));

    let err = expand("index.html", options).await.unwrap_err();
    assert!(matches!(err, ExpandError::InvalidScope { .. }));
    Ok(())
}
