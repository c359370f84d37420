use anyhow::Result;
use ng_expander::test_utils::MemoryLoader;
use ng_expander::{ExpandOptions, Expander};
use serde_json::json;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_repeat_order_is_stable_when_later_items_finish_first() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ol><li ng-repeat=\"page in pages\"><ng-include src=\"page\"></ng-include></li></ol>")
        .with_template("slow.html", "slow")
        .with_template("medium.html", "medium")
        .with_template("fast.html", "fast")
        .with_delay("slow.html", Duration::from_millis(60))
        .with_delay("medium.html", Duration::from_millis(30));
    let scope = json!({"pages": ["slow.html", "medium.html", "fast.html"]});
    let expander = Expander::new(loader, ExpandOptions::default().with_scope(scope))?;

    let output = expander.expand("index.html").await?;

    let slow = output.find("<noop>slow</noop>").expect("slow fragment");
    let medium = output.find("<noop>medium</noop>").expect("medium fragment");
    let fast = output.find("<noop>fast</noop>").expect("fast fragment");
    assert!(slow < medium && medium < fast, "fragments out of order: {output}");
    assert_eq!(output.matches("<li>").count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_includes_are_fetched_concurrently() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template(
            "index.html",
            "<ng-include src=\"'a.html'\"></ng-include><ng-include src=\"'b.html'\"></ng-include><div ng-include=\"'c.html'\"></div>",
        )
        .with_template("a.html", "A")
        .with_template("b.html", "B")
        .with_template("c.html", "C")
        .with_delay("a.html", Duration::from_millis(100))
        .with_delay("b.html", Duration::from_millis(100))
        .with_delay("c.html", Duration::from_millis(100));
    let expander = Expander::new(loader, ExpandOptions::default())?;

    let start = Instant::now();
    let output = expander.expand("index.html").await?;
    let elapsed = start.elapsed();

    assert_eq!(output, "<noop>A</noop><noop>B</noop><div>C</div>");
    assert!(elapsed < Duration::from_millis(250), "includes ran sequentially: {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn test_first_failure_wins_over_slow_siblings() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("index.html", "<ng-include src=\"'slow.html'\"></ng-include><ng-include src=\"'nope.html'\"></ng-include>")
        .with_template("slow.html", "slow")
        .with_delay("slow.html", Duration::from_secs(5));
    let expander = Expander::new(loader, ExpandOptions::default())?;

    let start = Instant::now();
    let err = expander.expand("index.html").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(start.elapsed() < Duration::from_secs(5));
    Ok(())
}
