use crate::{
    Res,
    scope::{RequiredScopes, Scope},
    spotify::required,
    transport::Transport,
    types::{PrivateUser, PublicUser},
};

const CURRENT_USER: RequiredScopes =
    RequiredScopes::new("Users::current_user", &[Scope::UserReadPrivate, Scope::UserReadEmail]);

/// Profiles of the current user and of other users.
pub struct Users<'a> {
    transport: &'a Transport,
}

impl<'a> Users<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn current_user(&self) -> Res<PrivateUser> {
        CURRENT_USER
            .guard(async { required(self.transport.get("me", &[]).await?, "me") })
            .await
    }

    pub async fn user(&self, id: &str) -> Res<PublicUser> {
        let url = format!("users/{id}");
        required(self.transport.get(&url, &[]).await?, &url)
    }
}
