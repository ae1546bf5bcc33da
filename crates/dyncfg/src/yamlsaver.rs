//! [Value] to YAML
//!
//! Map order is kept. Times are written with their original text.
use crate::error::Result;
use crate::value::Value;

pub fn save(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

pub fn write_yaml(writer: impl std::io::Write, value: &Value) -> Result<()> {
    serde_yaml::to_writer(writer, value)?;
    Ok(())
}
