use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotlightError>;

#[derive(Error, Debug)]
pub enum SpotlightError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Malformed response from {origin}: {detail}")]
    MalformedResponse { origin: String, detail: String },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },
}

impl SpotlightError {
    /// Process exit status for this failure class. Transport failures that
    /// never became a `SpotlightError` exit with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SpotlightError::Config(_) => 2,
            SpotlightError::MalformedResponse { .. } => 3,
            SpotlightError::Http { .. } => 1,
        }
    }
}

/// Exit status for any error bubbling out of a run.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SpotlightError>()
        .map(SpotlightError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_failure_classes() {
        let config = anyhow::Error::new(SpotlightError::Config("ORG_NAME not set".into()));
        let malformed = anyhow::Error::new(SpotlightError::MalformedResponse {
            origin: "ens-data".into(),
            detail: "expected an array".into(),
        });
        let transport = anyhow::anyhow!("connection reset");

        assert_eq!(exit_code_for(&config), 2);
        assert_eq!(exit_code_for(&malformed), 3);
        assert_eq!(exit_code_for(&transport), 1);
    }

    #[test]
    fn exit_code_survives_context() {
        let err = anyhow::Error::new(SpotlightError::Config("missing token".into()))
            .context("while loading configuration");
        assert_eq!(exit_code_for(&err), 2);
    }
}
