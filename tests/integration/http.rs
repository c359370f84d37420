use anyhow::Result;
use ng_expander::{ExpandError, ExpandOptions, expand};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serve `pages` on a loopback port; unknown paths answer 404 and `/boom.html`
/// answers 500. Returns the base URL.
async fn serve(pages: &[(&str, &str)]) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let pages: Arc<HashMap<String, String>> =
        Arc::new(pages.iter().map(|(path, body)| (path.to_string(), body.to_string())).collect());

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let pages = Arc::clone(&pages);
            tokio::spawn(async move {
                let _ = respond(stream, &pages).await;
            });
        }
    });

    Ok(format!("http://{addr}"))
}

async fn respond(mut stream: TcpStream, pages: &HashMap<String, String>) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match pages.get(path) {
        Some(body) => ("200 OK", body.as_str()),
        None if path == "/boom.html" => ("500 Internal Server Error", "boom"),
        None => ("404 Not Found", "not found"),
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

#[tokio::test]
async fn test_expand_over_http() -> Result<()> {
    let base_url = serve(&[
        ("/index.html", "<h1>{{title}}</h1><ng-include src=\"'/partials/nav.html'\"></ng-include>"),
        ("/partials/nav.html", "<nav>{{title}}</nav>"),
    ])
    .await?;
    let options = ExpandOptions::default()
        .with_base_url(base_url)
        .with_src_dir("ignored-when-base-url-is-set")
        .with_scope(json!({"title": "Remote"}));

    let output = expand("/index.html", options).await?;
    assert_eq!(output, "<h1>Remote</h1><noop><nav>Remote</nav></noop>");
    Ok(())
}

#[tokio::test]
async fn test_http_404_is_not_found() -> Result<()> {
    let base_url = serve(&[("/index.html", "<div ng-include=\"'missing.html'\"></div>")]).await?;
    let options = ExpandOptions::default().with_base_url(base_url.clone());

    let err = expand("index.html", options).await.unwrap_err();
    match err {
        ExpandError::NotFound {
            reference,
            location,
        } => {
            assert_eq!(reference, "missing.html");
            assert_eq!(location, format!("{base_url}/missing.html"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_http_server_error_is_network_error() -> Result<()> {
    let base_url = serve(&[]).await?;
    let options = ExpandOptions::default().with_base_url(base_url);

    let err = expand("boom.html", options).await.unwrap_err();
    match err {
        ExpandError::Network {
            reason,
            ..
        } => assert!(reason.contains("500"), "unexpected reason: {reason}"),
        other => panic!("expected Network, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let options = ExpandOptions::default().with_base_url(format!("http://{addr}"));

    let err = expand("index.html", options).await.unwrap_err();
    assert!(matches!(err, ExpandError::Network { .. }), "got {err:?}");
    Ok(())
}
