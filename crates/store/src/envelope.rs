use serde::Deserialize;

/// Body shape of every store response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> ServiceResponse<T> {
    /// The payload, or `None` when the store reported no result.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}
