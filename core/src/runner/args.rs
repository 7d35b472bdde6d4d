use std::ffi::OsString;

use super::types::SourceFile;

/// `[language, path...]`, paths in input order. No reordering or dedup.
pub fn build_args(language: &str, files: &[SourceFile]) -> Vec<OsString> {
    let mut args = Vec::with_capacity(files.len() + 1);
    args.push(OsString::from(language));
    args.extend(files.iter().map(|f| f.path.clone().into_os_string()));
    args
}
