/// Turns a host path into the form the container runtime expects for a
/// directory binding.
///
/// Drops the leading slash of `/C:/work` style paths and converts Windows
/// separators to `/`.
pub fn normalize_binding_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let path = if bytes.len() > 3 && bytes[0] == b'/' && bytes[2] == b':' {
        &path[1..]
    } else {
        path
    };
    path.replace('\\', "/")
}
