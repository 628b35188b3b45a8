use crate::{
    app,
    app::redirect::RedirectPolicy,
    provider::{AuthProvider, http::HttpAuthProvider, memory::MemoryAuthProvider},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub base_url: String,
    pub provider_url: Option<String>,
    pub allowed_redirects: Vec<String>,
    pub session_ttl_seconds: i64,
    pub magic_link_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider adapter cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let policy = RedirectPolicy::new(args.allowed_redirects);

    let provider: Arc<dyn AuthProvider> = if let Some(url) = args.provider_url {
        Arc::new(
            HttpAuthProvider::new(&url).with_context(|| format!("Invalid provider URL: {url}"))?,
        )
    } else {
        let memory = MemoryAuthProvider::new(&args.base_url)
            .with_session_ttl_seconds(args.session_ttl_seconds)
            .with_magic_link_ttl_seconds(args.magic_link_ttl_seconds);

        // Demo operator account so role-gated pages are reachable out of the box.
        let password = memory.seed_admin("Admin", "admin@example.com").await?;
        info!("In-memory provider: admin@example.com / {password}");

        Arc::new(memory)
    };

    app::new(args.port, provider, Arc::new(policy)).await
}
