//! File I/O helpers shared by the commands.
//!
//! Hand histories are read whole: either plain UTF-8 text or a Zstandard
//! compressed file (detected by the `.zst` extension). A leading UTF-8 BOM,
//! which some clients write, is removed. Bytes that are not valid UTF-8 (chat
//! lines in a legacy code page) become U+FFFD instead of failing the read.

/// Read text file with automatic .zst decompression detection.
///
/// # Example
///
/// ```rust,no_run
/// # use potledger_cli::io_utils::read_text_auto;
/// let history = read_text_auto("friday.txt").unwrap();
/// let archived = read_text_auto("friday.txt.zst").unwrap();
/// ```
pub fn read_text_auto(path: &str) -> Result<String, String> {
    let raw = std::fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
    let bytes = if path.ends_with(".zst") {
        zstd::stream::decode_all(raw.as_slice()).map_err(|e| format!("{}: {}", path, e))?
    } else {
        raw
    };
    let mut content = decode_lossy(path, bytes);
    strip_utf8_bom(&mut content);
    Ok(content)
}

fn decode_lossy(path: &str, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path, valid_up_to = e.utf8_error().valid_up_to(), "invalid UTF-8 replaced");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Ensure parent directory exists for given path, creating if needed.
pub fn ensure_parent_dir(path: &std::path::Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
        }
    }
    Ok(())
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
