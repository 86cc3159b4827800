use std::path::{Path, PathBuf};

use crate::{
    Res,
    config,
    error::Error,
    oauth::Token,
    transport::BoxFuture,
};

/// On-disk cache of the serialized token, owned by the command-line client.
///
/// The client core reaches it only through the token updater hook handed
/// to [`Transport::with_token_updater`](crate::transport::Transport::with_token_updater).
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl Default for TokenCache {
    fn default() -> Self {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        Self { path }
    }
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Res<Token> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", self.path.display())))?;
        Token::from_json(&content)
    }

    pub async fn save(&self, token: &Token) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Config(format!("cannot create {}: {e}", parent.display())))?;
        }

        async_fs::write(&self.path, token.to_json()?)
            .await
            .map_err(|e| Error::Config(format!("cannot write {}: {e}", self.path.display())))
    }

    /// Token updater hook that writes every refreshed token back to this
    /// cache.
    pub fn updater(&self) -> impl Fn(Token) -> BoxFuture<'static, Res<()>> + Send + Sync + 'static {
        let cache = self.clone();
        move |token: Token| -> BoxFuture<'static, Res<()>> {
            let cache = cache.clone();
            Box::pin(async move { cache.save(&token).await })
        }
    }
}
