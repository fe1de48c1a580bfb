//! Landing route

use axum::{routing::get, Router};

const WELCOME: &str = "Welcome to the HomePage!";

/// GET /
async fn home() -> &'static str {
    tracing::debug!("endpoint hit: home");
    WELCOME
}

/// Home routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn home_returns_welcome_text() {
        let body = home().await;
        assert_eq!(body, WELCOME);
    }
}
