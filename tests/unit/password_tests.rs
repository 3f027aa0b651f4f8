use notes_backend_lib::auth::{HashError, PasswordHasher};

#[test]
fn test_verify_accepts_only_the_hashed_password() {
    let hasher = PasswordHasher::new(4).unwrap();

    for password in ["secret1", "correct horse battery staple", "ünïcödé-pass", "      "] {
        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &hash), "{password:?} should verify");
        assert!(!hasher.verify(&format!("{password}x"), &hash));
        assert!(!hasher.verify(&password[..password.len() - 1], &hash));
        // Hashes never contain the plaintext
        assert!(!hash.contains(password));
    }
}

#[test]
fn test_max_length_boundary() {
    let hasher = PasswordHasher::new(4).unwrap();
    let at_limit = "p".repeat(128);
    let hash = hasher.hash(&at_limit).unwrap();
    assert!(hasher.verify(&at_limit, &hash));

    assert!(matches!(
        hasher.hash(&"p".repeat(129)),
        Err(HashError::PasswordTooLong { max: 128 })
    ));
}

#[test]
fn test_hashes_from_different_hashers_interoperate() {
    let cheap = PasswordHasher::new(4).unwrap();
    let dearer = PasswordHasher::new(6).unwrap();

    let hash = dearer.hash("secret1").unwrap();
    assert!(cheap.verify("secret1", &hash));
}
