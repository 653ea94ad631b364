use serde::de::DeserializeOwned;

use crate::error::JsonPathError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, JsonPathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| JsonPathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
