use crate::filter::FilterRules;
use crate::types::{Finding, ProbeOutcome};
use reqwest::Client;

/// Issues a GET against a candidate URL and classifies the response through
/// the filter rules. Only the status line and Content-Length header are
/// inspected; the body is never read. Transport errors are coarsely tagged
/// for the stats channel and otherwise behave like misses.
pub async fn check_url(client: &Client, url: &str, rules: &FilterRules) -> ProbeOutcome {
    let url = ensure_scheme(url);

    match client.get(url.as_ref()).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let size = response.content_length().map(|v| v as i64).unwrap_or(-1);

            if rules.accepts(status, size) {
                ProbeOutcome::Found(Finding::Page {
                    url: url.into_owned(),
                    status,
                    size,
                })
            } else {
                ProbeOutcome::Miss
            }
        }
        Err(e) if e.is_timeout() => ProbeOutcome::Failed { reason: "timeout" },
        Err(e) if e.is_connect() => ProbeOutcome::Failed { reason: "connect" },
        Err(_) => ProbeOutcome::Failed {
            reason: "transport",
        },
    }
}

fn ensure_scheme(url: &str) -> std::borrow::Cow<'_, str> {
    if url.starts_with("http") {
        std::borrow::Cow::Borrowed(url)
    } else {
        std::borrow::Cow::Owned(format!("http://{}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::create_http_pool;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve(raw_response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(raw_response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        port
    }

    fn test_client() -> Client {
        create_http_pool(Duration::from_secs(5), 4)
    }

    #[tokio::test]
    async fn matching_response_becomes_a_page_finding() {
        let port = serve("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
        let rules = FilterRules::default();

        let outcome = check_url(&test_client(), &format!("http://127.0.0.1:{}/admin", port), &rules).await;
        match outcome {
            ProbeOutcome::Found(Finding::Page { url, status, size }) => {
                assert_eq!(url, format!("http://127.0.0.1:{}/admin", port));
                assert_eq!(status, 200);
                assert_eq!(size, 5);
            }
            other => panic!("expected a page finding, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_content_length_reads_as_unknown_size() {
        let port = serve("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await;
        let rules = FilterRules::default();

        let outcome = check_url(&test_client(), &format!("127.0.0.1:{}/x", port), &rules).await;
        match outcome {
            ProbeOutcome::Found(Finding::Page { url, status, size }) => {
                // The scheme default is applied before the request goes out.
                assert!(url.starts_with("http://"));
                assert_eq!(status, 204);
                assert_eq!(size, -1);
            }
            other => panic!("expected a page finding, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_matching_status_is_a_miss() {
        let port = serve("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let rules = FilterRules::default();

        let outcome = check_url(&test_client(), &format!("http://127.0.0.1:{}/nope", port), &rules).await;
        assert_eq!(outcome, ProbeOutcome::Miss);
    }

    #[tokio::test]
    async fn filtered_size_is_a_miss() {
        let port = serve("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let rules = FilterRules::new(vec![200], Vec::new(), vec![0]).unwrap();

        let outcome = check_url(&test_client(), &format!("http://127.0.0.1:{}/soft404", port), &rules).await;
        assert_eq!(outcome, ProbeOutcome::Miss);
    }

    #[tokio::test]
    async fn refused_connection_is_a_tagged_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = check_url(
            &test_client(),
            &format!("http://127.0.0.1:{}/gone", port),
            &FilterRules::default(),
        )
        .await;
        assert!(outcome.is_failed(), "got {:?}", outcome);
    }
}
