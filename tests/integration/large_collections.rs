use anyhow::Result;
use ng_expander::test_utils::MemoryLoader;
use ng_expander::{ExpandOptions, Expander};
use serde_json::json;
use std::time::{Duration, Instant};

async fn expand_list(len: usize) -> Result<(String, Duration)> {
    let loader = MemoryLoader::new().with_template("index.html", "<ul><li ng-repeat=\"x in xs\">{{x}}</li></ul>");
    let xs: Vec<usize> = (1..=len).collect();
    let expander = Expander::new(loader, ExpandOptions::default().with_scope(json!({"xs": xs})))?;

    let start = Instant::now();
    let output = expander.expand("index.html").await?;
    Ok((output, start.elapsed()))
}

async fn fastest_of(runs: usize, len: usize) -> Result<Duration> {
    let mut best = Duration::MAX;
    for _ in 0..runs {
        best = best.min(expand_list(len).await?.1);
    }
    Ok(best)
}

#[tokio::test]
async fn test_repeat_over_thousands_of_items() -> Result<()> {
    let (output, _) = expand_list(4000).await?;

    assert_eq!(output.matches("<li>").count(), 4000);
    assert!(output.starts_with(
        "<ul><li><span style=\"display: none\">{{i = 0; x = xs[i]; $index = 0 ;\"\"}}</span>1</li>"
    ));
    assert!(output.ends_with(
        "<li><span style=\"display: none\">{{i = 3999; x = xs[i]; $index = 3999 ;\"\"}}</span>4000</li></ul>"
    ));
    Ok(())
}

#[tokio::test]
async fn test_repeat_cost_grows_linearly_with_collection_size() -> Result<()> {
    expand_list(100).await?;

    let small = fastest_of(3, 500).await?;
    let large = fastest_of(2, 4000).await?;

    // 8x the items; per-item copies of the whole collection would push this
    // well past 40x.
    let ratio = large.as_secs_f64() / small.as_secs_f64().max(1e-6);
    assert!(ratio < 24.0, "500 items took {small:?}, 4000 took {large:?} ({ratio:.1}x)");
    Ok(())
}
