use std::{io::BufRead, time::Duration};

use crate::{
    config, error,
    management::TokenCache,
    oauth::{self, OAuth},
    server::CallbackServer,
    success, warning,
};

const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the authorization-code flow and caches the resulting token.
///
/// The redirect is caught by a local listener unless `manual` is set, in
/// which case the user pastes the URL the browser was sent to.
/// `force` makes the provider show the consent dialog again.
pub async fn auth(force: bool, manual: bool) {
    let credentials = match config::credentials() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };
    let scopes = match config::scopes() {
        Ok(s) => s,
        Err(e) => error!("{}", e),
    };

    let oauth = OAuth::new();
    let state = oauth::generate_state();
    let auth_url = match oauth.authorization_url(
        &credentials.client_id,
        &credentials.redirect_uri,
        Some(&state),
        &scopes,
        force,
    ) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let callback_url = if manual {
        read_callback_url(&auth_url)
    } else {
        let server = match CallbackServer::start(&config::server_addr(), &credentials.redirect_uri).await {
            Ok(s) => s,
            Err(e) => error!("Failed to start callback server: {}", e),
        };

        if webbrowser::open(&auth_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            )
        }

        match server.wait(AUTH_TIMEOUT).await {
            Some(url) => url,
            None => error!("Authorization timed out."),
        }
    };

    let callback = match oauth::parse_callback(&callback_url) {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };
    if let Err(e) = callback.verify_state(&state) {
        error!("{}", e);
    }

    let token = match oauth
        .request_access_token(
            &callback.code,
            &credentials.redirect_uri,
            &credentials.client_id,
            &credentials.client_secret,
        )
        .await
    {
        Ok(t) => t,
        Err(e) => error!("{}", e),
    };

    let cache = TokenCache::default();
    if let Err(e) = cache.save(&token).await {
        error!("Failed to save token to cache: {}", e);
    }

    success!("Authentication successful! Granted scopes: {}", token.scope());
}

fn read_callback_url(auth_url: &str) -> String {
    println!("Please go to {auth_url} and authorize access.");
    println!("Enter the full callback URL:");

    let mut line = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
        error!("Failed to read callback URL: {}", e);
    }
    line.trim().to_string()
}
