use spotifyapi::{
    Error,
    scope::{RequiredScopes, Scope, join_scopes, parse_scopes, with_required_scopes},
};

#[test]
fn test_scope_names() {
    assert_eq!(Scope::UserLibraryRead.as_str(), "user-library-read");
    assert_eq!(Scope::UgcImageUpload.to_string(), "ugc-image-upload");
    assert_eq!(Scope::ALL.len(), 18);

    for scope in Scope::ALL {
        assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
    }
}

#[test]
fn test_scope_parsing_is_lenient_on_case_and_separator() {
    assert_eq!("USER_READ_EMAIL".parse::<Scope>().unwrap(), Scope::UserReadEmail);
    assert!("user-read-everything".parse::<Scope>().is_err());
}

#[test]
fn test_parse_and_join_scopes() {
    let scopes = parse_scopes("user-read-email, user-library-read user-read-email").unwrap();

    assert_eq!(scopes, vec![Scope::UserReadEmail, Scope::UserLibraryRead]);
    assert_eq!(join_scopes(&scopes), "user-read-email user-library-read");
    assert_eq!(join_scopes(&[]), "");

    let err = parse_scopes("user-read-email bogus").unwrap_err();
    assert!(err.contains("bogus"));
}

#[test]
fn test_scope_serializes_as_string() {
    let json = serde_json::to_string(&vec![Scope::Streaming]).unwrap();
    assert_eq!(json, r#"["streaming"]"#);

    let back: Vec<Scope> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![Scope::Streaming]);
}

#[tokio::test]
async fn test_unauthorized_becomes_insufficient_scope() {
    let result: spotifyapi::Res<()> = with_required_scopes(
        "Library::saved_tracks",
        &[Scope::UserLibraryRead],
        async {
            Err(Error::Unauthorized {
                message: "Permissions missing".to_string(),
            })
        },
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("user-library-read"));
    match err {
        Error::InsufficientScope { operation, scopes } => {
            assert_eq!(operation, "Library::saved_tracks");
            assert_eq!(scopes, vec![Scope::UserLibraryRead]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_guard_passes_other_outcomes_through() {
    const GUARD: RequiredScopes = RequiredScopes::new("Player::devices", &[Scope::UserReadPlaybackState]);

    assert_eq!(GUARD.guard(async { Ok(7) }).await.unwrap(), 7);

    let err = GUARD
        .guard(async {
            Err::<(), _>(Error::Api {
                status: 403,
                message: "Player command failed".to_string(),
            })
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 403, .. }));

    let err = GUARD
        .guard(async {
            Err::<(), _>(Error::ExpiredToken {
                access_token: "AT".to_string(),
            })
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ExpiredToken { .. }));
}
