use chrono::Utc;
use fake_rest_api::config::JwtConfig;
use fake_rest_api::util::jwt::*;
use jsonwebtoken::{encode, EncodingKey, Header};

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

#[test]
fn test_issue_and_validate_access_token() {
    let jwt = create_test_jwt_utils();
    let tokens = jwt.issue_tokens("a1b2", "ada@example.com", "admin").unwrap();

    assert_eq!(tokens.token_type, "Bearer");
    assert_eq!(tokens.expires_in, 15 * 60);

    let claims = jwt.validate_access_token(&tokens.access_token).unwrap();
    assert_eq!(claims.sub, "a1b2");
    assert_eq!(claims.email, "ada@example.com");
    assert_eq!(claims.role, "admin");
    assert_eq!(claims.token_type, "access");
    assert!(claims.exp > claims.iat);
    assert!(claims.iat <= Utc::now().timestamp());
}

#[test]
fn test_tokens_are_unique() {
    let jwt = create_test_jwt_utils();
    let first = jwt.issue_tokens("u", "u@example.com", "ops").unwrap();
    let second = jwt.issue_tokens("u", "u@example.com", "ops").unwrap();
    let first = jwt.validate_access_token(&first.access_token).unwrap();
    let second = jwt.validate_access_token(&second.access_token).unwrap();
    assert_ne!(first.jti, second.jti);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let jwt = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "another_secret_key_that_is_also_long_enough".to_string(),
        access_token_expiration: 15,
    });
    let tokens = other.issue_tokens("u", "u@example.com", "super").unwrap();
    assert!(jwt.validate_access_token(&tokens.access_token).is_err());
}

#[test]
fn test_expired_token_is_rejected() {
    let jwt = create_test_jwt_utils();
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "u".to_string(),
        email: "u@example.com".to_string(),
        role: "admin".to_string(),
        iat: now - 7200,
        exp: now - 3600,
        token_type: "access".to_string(),
        jti: "expired".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.jwt_config.jwt_secret.as_bytes()),
    )
    .unwrap();
    assert!(matches!(jwt.validate_access_token(&token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_non_access_token_type_is_rejected() {
    let jwt = create_test_jwt_utils();
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "u".to_string(),
        email: "u@example.com".to_string(),
        role: "admin".to_string(),
        iat: now,
        exp: now + 600,
        token_type: "refresh".to_string(),
        jti: "r".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.jwt_config.jwt_secret.as_bytes()),
    )
    .unwrap();
    assert!(matches!(
        jwt.validate_access_token(&token),
        Err(JwtError::InvalidTokenType { .. })
    ));
}

#[test]
fn test_garbage_token_is_rejected() {
    let jwt = create_test_jwt_utils();
    assert!(jwt.validate_access_token("not.a.token").is_err());
    assert!(jwt.validate_access_token("").is_err());
}

#[test]
fn test_extract_token_from_header() {
    let jwt = create_test_jwt_utils();
    assert_eq!(jwt.extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    assert!(jwt.extract_token_from_header("Basic dXNlcjpwYXNz").is_err());
    assert!(jwt.extract_token_from_header("Bearer ").is_err());
    assert!(jwt.extract_token_from_header("abc.def.ghi").is_err());
}

#[test]
fn test_out_of_range_lifetime_is_an_error() {
    let jwt_utils = JwtTokenUtilsImpl::new(JwtConfig {
        access_token_expiration: i64::MAX,
        ..JwtConfig::default()
    });
    let result = jwt_utils.issue_tokens("user123", "user@example.com", "admin");
    assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
}
