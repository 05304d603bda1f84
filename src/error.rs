pub type FrameryResult<T> = Result<T, FrameryError>;

#[derive(thiserror::Error, Debug)]
pub enum FrameryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("composition error: {0}")]
    Compose(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FrameryError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(FrameryError::parse("x").to_string().contains("parse error:"));
        assert!(
            FrameryError::compose("x")
                .to_string()
                .contains("composition error:")
        );
        assert!(
            FrameryError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FrameryError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
