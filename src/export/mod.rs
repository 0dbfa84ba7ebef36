pub mod docx;

pub use docx::build_notes_docx;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Download filename for notes titled `title`.
///
/// Spaces become underscores, as does anything unsafe in a header value.
pub fn notes_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            // Separators would end the unquoted filename parameter early
            '"' | '\\' | '/' | ';' | ',' => '_',
            c if c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    if stem.is_empty() {
        return "Study_Notes.docx".to_string();
    }
    format!("{}.docx", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_filename() {
        assert_eq!(notes_filename("French Geography"), "French_Geography.docx");
        assert_eq!(notes_filename("  Cells 101 "), "Cells_101.docx");
        assert_eq!(notes_filename("a/b \"c\""), "a_b__c_.docx");
        assert_eq!(notes_filename("Études"), "_tudes.docx");
        assert_eq!(
            notes_filename("Cells; Energy, ATP"),
            "Cells__Energy__ATP.docx"
        );
        assert_eq!(notes_filename("   "), "Study_Notes.docx");
    }
}
