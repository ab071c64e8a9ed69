use std::fs;
use std::io;
use std::path::Path;

/// A beatmap loaded from disk.
#[derive(Debug, Clone)]
pub struct OpenedBeatmap {
    pub data: Vec<u8>,
}

fn check_ext(path: &Path) -> io::Result<()> {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Missing file extension (must be .osu)",
        ));
    };
    if ext.eq_ignore_ascii_case("osu") {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Unsupported file extension (must be .osu)",
        ))
    }
}

/// Reads a `.osu` beatmap from `path`.
pub fn open(path: impl AsRef<Path>) -> io::Result<OpenedBeatmap> {
    let path = path.as_ref();
    check_ext(path)?;
    let data = fs::read(path)?;
    Ok(OpenedBeatmap { data })
}
