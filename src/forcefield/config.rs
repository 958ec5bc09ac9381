/// Options for [`parameterize`](super::parameterize).
#[derive(Debug, Clone, Default)]
pub struct ParameterizeConfig {
    /// Custom parameter file contents (TOML). `None` uses the built-in set.
    pub params: Option<String>,
}

impl ParameterizeConfig {
    pub fn with_params(params: impl Into<String>) -> Self {
        Self {
            params: Some(params.into()),
        }
    }
}
