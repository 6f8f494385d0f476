use std::future::Future;
use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
///
/// Draining is bounded by `drain_timeout`; connections still open after that
/// are abandoned and the call returns.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, mut draining_rx) = watch::channel(false);

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = draining_tx.send(true);
        })
        .into_future();

    let deadline = async move {
        if draining_rx.changed().await.is_err() {
            // Server finished without a shutdown request
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result,
        _ = deadline => {
            tracing::warn!(
                timeout_ms = drain_timeout.as_millis(),
                "Graceful shutdown timed out, abandoning open connections"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new().route("/", get(|| async { "ok" }));
        let (trigger, signal) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(
            listener,
            router,
            async move {
                let _ = signal.await;
            },
            Duration::from_secs(10),
        ));

        trigger.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn test_drain_is_bounded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/stuck",
            get(|| async { std::future::pending::<()>().await }),
        );
        let (trigger, signal) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(
            listener,
            router,
            async move {
                let _ = signal.await;
            },
            Duration::from_millis(200),
        ));

        let stuck_request = tokio::spawn(async move {
            reqwest::get(format!("http://{}/stuck", address)).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        trigger.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));

        stuck_request.abort();
    }
}
