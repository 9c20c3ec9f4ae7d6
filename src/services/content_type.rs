//! Content types assigned to uploads, keyed by file extension.

pub const FALLBACK: &str = "application/octet-stream";

const CONTENT_TYPES: [(&str, &str); 13] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mp3", "audio/mpeg"),
];

/// Content type for `filename`, falling back to generic binary.
///
/// The lookup uses whatever follows the last `.`, so a bare `.png` is a PNG.
/// A name without a dot is looked up whole and falls back.
pub fn for_filename(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or(filename);
    CONTENT_TYPES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        .map_or(FALLBACK, |&(_, content_type)| content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(for_filename("photo.png"), "image/png");
        assert_eq!(for_filename("scan.JPEG"), "image/jpeg");
        assert_eq!(for_filename("report.pdf"), "application/pdf");
        assert_eq!(for_filename("song.mp3"), "audio/mpeg");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(for_filename("data.unknownext"), FALLBACK);
        assert_eq!(for_filename("Makefile"), FALLBACK);
        assert_eq!(for_filename("trailing."), FALLBACK);
    }

    #[test]
    fn dotfile_named_after_an_extension_uses_it() {
        assert_eq!(for_filename(".png"), "image/png");
        assert_eq!(for_filename("archive.tar.zip"), "application/zip");
    }
}
