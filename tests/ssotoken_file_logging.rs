//! File logging integration test
//!
//! Loads a configuration from disk, initializes file based logging and checks
//! that token diagnostics end up in the log file.

use async_trait::async_trait;
use ssotoken::{
    BindOutcome, DirectoryBind, DirectoryError, Principal, SsoConfig, Token, init_observability,
};
use std::fs;
use std::io::Write;

struct AcceptAll;

#[async_trait]
impl DirectoryBind for AcceptAll {
    async fn authenticate(
        &self,
        principal: &Principal,
        _password: &str,
    ) -> Result<BindOutcome, DirectoryError> {
        Ok(BindOutcome::new(principal.clone()))
    }
}

#[tokio::test]
async fn test_token_diagnostics_reach_log_file() -> anyhow::Result<()> {
    // SAFETY: this test binary runs a single test
    unsafe { std::env::remove_var("RUST_LOG") };

    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    let config_path = dir.path().join("sso.toml");
    let mut f = fs::File::create(&config_path)?;
    writeln!(
        f,
        r#"
name = "sso-test"
env = "test"

[observability]
filter_level = "info"

[observability.log]
output = "file"
rotate = false
path = "{}"
"#,
        log_dir.display()
    )?;

    let config = SsoConfig::load(&config_path)?;

    let guard = init_observability(&config)?;
    assert!(guard.is_file_backed());

    let token = Token::bind(&Principal::new("svc-account"), "pw", &AcceptAll).await?;
    let err = token.time_left().await.unwrap_err();
    assert!(err.is_unsupported());

    drop(guard);

    let contents = fs::read_to_string(log_dir.join("ssotoken.log"))?;
    assert!(contents.contains("time_left is an unsupported operation"));
    assert!(contents.contains("Observability initialized for sso-test"));

    Ok(())
}
