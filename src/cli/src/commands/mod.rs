use saas_auth::AuthError;

pub mod check;
pub mod matrix;
pub mod policy;

/// Log an engine error and hand it on for reporting.
pub fn reject(err: impl Into<AuthError>) -> anyhow::Error {
    let err = err.into();
    err.log();
    anyhow::Error::new(err)
}
