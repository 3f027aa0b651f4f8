use std::time::Duration;

use notes_backend_lib::auth::{
    CookieCodec, Identity, SessionError, SessionService, TokenCodec, Username, MAX_COOKIE_BYTES,
};
use notes_backend_lib::config::{ConfigError, SessionSettings};
use time::OffsetDateTime;
use uuid::Uuid;

fn settings(secret: &str) -> SessionSettings {
    SessionSettings {
        jwt_secret: secret.to_string(),
        ..SessionSettings::default()
    }
}

fn identity(name: &str) -> Identity {
    Identity::new(Uuid::new_v4(), Username::parse(name).unwrap())
}

fn at(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(secs).unwrap()
}

#[test]
fn test_round_trip_for_many_identities_and_ttls() {
    for ttl in [1_u64, 2, 60, 300, 86_400] {
        let service = SessionService::new(&SessionSettings {
            jwt_ttl_secs: ttl,
            cookie_ttl_secs: ttl.max(600),
            ..settings("round-trip")
        })
        .unwrap();

        for name in ["alice", "bob", "c.d-e_f", "user123"] {
            let who = identity(name);
            let issued = at(1_700_000_000);
            let cookie = service.create_session_at(&who, issued).unwrap();

            let last_valid = issued + Duration::from_secs(ttl - 1);
            assert_eq!(service.validate_session_at(cookie.value(), last_valid), Ok(who.clone()));

            let expiry = issued + Duration::from_secs(ttl);
            assert_eq!(
                service.validate_session_at(cookie.value(), expiry),
                Err(SessionError::Expired)
            );
        }
    }
}

#[test]
fn test_secret_mismatch() {
    let issuer = SessionService::new(&settings("first-secret")).unwrap();
    let verifier = SessionService::new(&settings("second-secret")).unwrap();
    let cookie = issuer.create_session_at(&identity("alice"), at(100)).unwrap();

    assert_eq!(
        verifier.validate_session_at(cookie.value(), at(101)),
        Err(SessionError::BadSignature)
    );
}

#[test]
fn test_startup_fails_without_secret() {
    for secret in ["", " ", "\t\n"] {
        assert!(matches!(
            SessionService::new(&settings(secret)),
            Err(ConfigError::MissingSecret)
        ));
    }
}

#[test]
fn test_destroy_is_stable() {
    let service = SessionService::new(&settings("destroy")).unwrap();
    let cookies: Vec<String> = (0..5).map(|_| service.destroy_session().to_string()).collect();

    assert!(cookies.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(cookies[0].starts_with("jwt=;"));
    assert!(cookies[0].contains("1970"));
}

#[test]
fn test_logout_does_not_revoke_copied_tokens() {
    let service = SessionService::new(&settings("no-revocation")).unwrap();
    let who = identity("alice");
    let cookie = service.create_session_at(&who, at(1_000)).unwrap();

    let _ = service.destroy_session();
    assert_eq!(service.validate_session_at(cookie.value(), at(1_001)), Ok(who));
}

#[test]
fn test_layers_compose() {
    let tokens = TokenCodec::new(b"layers");
    let cookies = CookieCodec::new("jwt", Duration::from_secs(600));
    let who = identity("alice");

    let token = tokens.issue_at(&who, Duration::from_secs(60), at(0)).unwrap();
    let cookie = cookies.wrap_at(&token, at(0)).unwrap();
    assert!(cookie.to_string().len() <= MAX_COOKIE_BYTES);

    let unwrapped = cookies.unwrap(cookie.value()).unwrap();
    assert_eq!(unwrapped, token);
    assert_eq!(tokens.parse_at(&unwrapped, at(59)).unwrap().identity(), who);
}
