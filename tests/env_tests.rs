//! Tests of credentials sourced from the process environment.
//!
//! Everything touching `NEPTUNE_API_TOKEN` lives in a single test so that no
//! two tests race on the variable.

mod common;

use base64::{engine::general_purpose, Engine};
use neptune_lib::credentials::{API_TOKEN_ENV_VAR, NAMESPACE_ENV_VAR};
use neptune_lib::{CredentialsError, NeptuneError, Session};

#[test]
fn test_session_from_env() {
    std::env::remove_var(NAMESPACE_ENV_VAR);

    // well-formed token
    let token = common::token("https://app.stage.neptune.ml", Some("neptune-ml"));
    std::env::set_var(API_TOKEN_ENV_VAR, &token);

    let session = Session::from_env().unwrap();
    assert_eq!(session.credentials().api_token(), token);
    assert_eq!(session.credentials().api_key(), common::API_KEY);
    assert_eq!(session.credentials().api_address(), "https://app.stage.neptune.ml");
    assert_eq!(session.credentials().namespace(), Some("neptune-ml"));

    // the environment is read again on every call
    let other = common::token("https://app.neptune.ml", None);
    std::env::set_var(API_TOKEN_ENV_VAR, &other);
    let session = Session::from_env().unwrap();
    assert_eq!(session.credentials().api_token(), other);
    assert_eq!(session.credentials().namespace(), None);

    // namespace override
    std::env::set_var(NAMESPACE_ENV_VAR, "override");
    let session = Session::from_env().unwrap();
    assert_eq!(session.credentials().namespace(), Some("override"));
    std::env::remove_var(NAMESPACE_ENV_VAR);

    // malformed base64
    std::env::set_var(API_TOKEN_ENV_VAR, "%%% not a token %%%");
    let error = Session::from_env().unwrap_err();
    assert!(error.is_missing_credentials());

    // valid base64, not JSON
    std::env::set_var(API_TOKEN_ENV_VAR, general_purpose::STANDARD.encode("hello"));
    let error = Session::from_env().unwrap_err();
    assert!(matches!(
        error,
        NeptuneError::MissingCredentials(CredentialsError::InvalidJson(_))
    ));

    // absent
    std::env::remove_var(API_TOKEN_ENV_VAR);
    let error = Session::from_env().unwrap_err();
    assert!(matches!(
        error,
        NeptuneError::MissingCredentials(CredentialsError::EnvVarNotSet(_))
    ));
}
