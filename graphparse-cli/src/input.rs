use crate::error::{CliError, CliResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Bytes a `file:` URL path cannot carry literally
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Where the input data comes from.
pub enum InputSource {
    /// From a file on disk.
    File(PathBuf),
    /// From stdin (piped).
    Stdin,
}

impl InputSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::File(path) => Some(path),
            InputSource::Stdin => None,
        }
    }

    /// How the input is named in messages
    pub fn describe(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Stdin => "stdin".to_string(),
        }
    }
}

/// Resolve the input source: a file argument, or stdin for `-` or no argument.
pub fn resolve_input(file: Option<&Path>) -> CliResult<InputSource> {
    match file {
        Some(path) if path != Path::new("-") => Ok(InputSource::File(path.to_path_buf())),
        Some(_) => Ok(InputSource::Stdin),
        None if !io::stdin().is_terminal() => Ok(InputSource::Stdin),
        None => Err(CliError::Input(format!(
            "no input provided\n  {} pass a file, or pipe via stdin",
            colored::Colorize::bold(colored::Colorize::cyan("help:"))
        ))),
    }
}

/// Read content from the resolved input source.
pub fn read_input(source: &InputSource) -> CliResult<String> {
    match source {
        InputSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("failed to read {}: {e}", path.display()))),
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// The `file://` URL of a file input; stdin has no base.
pub fn default_base(source: &InputSource) -> CliResult<String> {
    match source {
        InputSource::File(path) => {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            Ok(file_url(&absolute))
        }
        InputSource::Stdin => Ok(String::new()),
    }
}

fn file_url(absolute: &Path) -> String {
    let normalized = absolute.to_string_lossy().replace('\\', "/");
    let encoded = utf8_percent_encode(&normalized, PATH);
    if normalized.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_escapes_path() {
        assert_eq!(
            file_url(Path::new("/home/alice/my card.ttl")),
            "file:///home/alice/my%20card.ttl"
        );
        assert_eq!(
            file_url(Path::new("/data/50% [draft]#1.ttl")),
            "file:///data/50%25%20%5Bdraft%5D%231.ttl"
        );
        assert_eq!(
            file_url(Path::new("/data/caf\u{e9}.ttl")),
            "file:///data/caf%C3%A9.ttl"
        );
    }

    #[test]
    fn test_default_base_of_relative_file() {
        let base = default_base(&InputSource::File(PathBuf::from("notes/a b.ttl"))).unwrap();
        assert!(base.starts_with("file:///"), "{base}");
        assert!(base.ends_with("/notes/a%20b.ttl"), "{base}");
        assert_eq!(default_base(&InputSource::Stdin).unwrap(), "");
    }
}
