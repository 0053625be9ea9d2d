use lopdf::Document;

/// Pulls the text layer of one page. Empty when the page has no text operators.
pub fn extract_page_text(document: &Document, page_number: u32) -> Result<String, lopdf::Error> {
    let text = document.extract_text(&[page_number])?;
    Ok(normalize_line_endings(&text))
}

/// True when `text` holds anything besides whitespace.
pub fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
