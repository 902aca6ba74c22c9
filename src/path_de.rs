use serde::de::DeserializeOwned;

use crate::error::GenError;

/// Deserialize with JSON-path context in error messages.
///
/// Grammar schemas run to thousands of lines; "missing field `types`" alone
/// is useless without the path of the offending node definition.
pub fn from_str_with_path<T: DeserializeOwned>(
    what: &'static str,
    src: &str,
) -> Result<T, GenError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(GenError::SchemaLoad {
                what,
                detail: format!("at JSON path {path} → {}", err.into_inner()),
            })
        }
    }
}
