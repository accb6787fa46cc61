use std::{
    ffi::OsString,
    fs, io,
    path::Path,
};

/// Removes the directory at path recursively. Returns whether something was removed.
pub fn remove_dir_if_exists(dir: impl AsRef<Path>) -> io::Result<bool> {
    let dir = dir.as_ref();
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(dir)?;
            Ok(true)
        }
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "dir is not a dir",
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// The names of all entries directly inside `dir`, in the order the OS lists them.
pub fn entry_names(dir: impl AsRef<Path>) -> io::Result<Vec<OsString>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect()
}

/// Whether the name ends with `.ext` for any of `extensions`, ignoring ASCII case.
/// `extensions` are given without the dot. Names need not be valid UTF-8.
pub fn has_extension_ignore_case(name: impl AsRef<Path>, extensions: &[&str]) -> bool {
    let Some(name) = name.as_ref().file_name() else {
        return false;
    };
    let name = name.as_encoded_bytes();
    extensions.iter().any(|ext| {
        let ext = ext.as_bytes();
        name.len() > ext.len()
            && name[name.len() - ext.len() - 1] == b'.'
            && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
    })
}
