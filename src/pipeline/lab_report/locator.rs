use super::types::{SectionSpan, Vocabulary};

/// Find the next section at or after byte offset `from`.
///
/// The section starts at the earliest vocabulary header found from `from`
/// and runs to the next header occurrence of any name (searched from one
/// character past the start), or to the end of the document. Headers are
/// accepted wherever they appear, mid-sentence included.
///
/// Returns `None` when no header remains, or when `from` is not a char
/// boundary of `text`.
pub fn locate(text: &str, vocabulary: &Vocabulary, from: usize) -> Option<SectionSpan> {
    if !text.is_char_boundary(from) {
        return None;
    }

    let (start, name) = vocabulary.find_from(text, from)?;
    let next_from = start + name.chars().next().map_or(1, char::len_utf8);
    let end = vocabulary
        .find_from(text, next_from)
        .map_or(text.len(), |(pos, _)| pos);

    Some(SectionSpan {
        name: name.to_string(),
        start,
        end,
    })
}

/// Iterate over every section span of a document, in document order.
pub fn section_spans<'a>(text: &'a str, vocabulary: &'a Vocabulary) -> SectionSpans<'a> {
    SectionSpans {
        text,
        vocabulary,
        offset: 0,
    }
}

/// Iterator returned by [`section_spans`].
pub struct SectionSpans<'a> {
    text: &'a str,
    vocabulary: &'a Vocabulary,
    offset: usize,
}

impl Iterator for SectionSpans<'_> {
    type Item = SectionSpan;

    fn next(&mut self) -> Option<SectionSpan> {
        let span = locate(self.text, self.vocabulary, self.offset)?;
        self.offset = span.end;
        Some(span)
    }
}
