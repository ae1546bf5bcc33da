use crate::error::Result;
use crate::path::Path;
use crate::value::Value;
use crate::visit::get_by_path;

/// Lookup that reads referenced values from `root`
pub fn default_lookup(root: Value) -> impl FnMut(&Path) -> Result<Value> {
    move |path: &Path| -> Result<Value> { get_by_path(&root, path) }
}
