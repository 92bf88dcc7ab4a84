/// One model token with its predicted tag and its byte span in the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedToken<'a> {
    pub tag: &'a str,
    pub start: usize,
    pub end: usize,
    /// Index of the word this token belongs to, shared by word pieces
    pub word: Option<u32>,
    /// [CLS], [SEP] and padding
    pub special: bool,
}

/// A decoded entity: label without its BIO prefix plus byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bio {
    Begin,
    Inside,
}

fn split_tag(tag: &str) -> Option<(Bio, &str)> {
    if tag.is_empty() || tag == "O" {
        return None;
    }
    if let Some(label) = tag.strip_prefix("B-") {
        return Some((Bio::Begin, label));
    }
    if let Some(label) = tag.strip_prefix("I-") {
        return Some((Bio::Inside, label));
    }
    // IO-style tags carry no prefix
    Some((Bio::Inside, tag))
}

/// Merge per-token BIO tags into entity spans.
///
/// The first piece of a word decides for the whole word; later pieces only
/// stretch an open span. An `I-X` with no open `X` span starts a new one.
pub fn decode_spans(tokens: &[TaggedToken<'_>]) -> Vec<RawSpan> {
    let mut spans = Vec::new();
    let mut current: Option<RawSpan> = None;
    let mut prev_word: Option<u32> = None;

    for token in tokens {
        if token.special || token.start == token.end {
            spans.extend(current.take());
            prev_word = None;
            continue;
        }

        let continuation = token.word.is_some() && token.word == prev_word;
        prev_word = token.word;
        if continuation {
            if let Some(span) = current.as_mut() {
                span.end = token.end;
            }
            continue;
        }

        match split_tag(token.tag) {
            Some((Bio::Inside, label)) if current.as_ref().is_some_and(|s| s.label == label) => {
                if let Some(span) = current.as_mut() {
                    span.end = token.end;
                }
            }
            Some((_, label)) => {
                spans.extend(current.take());
                current = Some(RawSpan {
                    label: label.to_string(),
                    start: token.start,
                    end: token.end,
                });
            }
            None => spans.extend(current.take()),
        }
    }

    spans.extend(current);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(tag: &str, start: usize, end: usize, word: u32) -> TaggedToken<'_> {
        TaggedToken {
            tag,
            start,
            end,
            word: Some(word),
            special: false,
        }
    }

    fn special() -> TaggedToken<'static> {
        TaggedToken {
            tag: "O",
            start: 0,
            end: 0,
            word: None,
            special: true,
        }
    }

    #[test]
    fn test_begin_inside_merge() {
        // "Joe Biden visited Washington"
        let tokens = vec![
            special(),
            tok("B-PER", 0, 3, 0),
            tok("I-PER", 4, 9, 1),
            tok("O", 10, 17, 2),
            tok("B-GPE", 18, 28, 3),
            special(),
        ];
        let spans = decode_spans(&tokens);
        assert_eq!(
            spans,
            vec![
                RawSpan {
                    label: "PER".to_string(),
                    start: 0,
                    end: 9
                },
                RawSpan {
                    label: "GPE".to_string(),
                    start: 18,
                    end: 28
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_begins_split() {
        let tokens = vec![tok("B-ORG", 0, 4, 0), tok("B-ORG", 5, 9, 1)];
        let spans = decode_spans(&tokens);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (0, 4));
        assert_eq!((spans[1].start, spans[1].end), (5, 9));
    }

    #[test]
    fn test_word_pieces_follow_first_piece() {
        // "Mobileye" split into three pieces, the last one mis-tagged
        let tokens = vec![
            tok("B-ORG", 0, 4, 0),
            tok("I-ORG", 4, 6, 0),
            tok("O", 6, 8, 0),
            tok("O", 9, 12, 1),
        ];
        let spans = decode_spans(&tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 8));
    }

    #[test]
    fn test_orphan_inside_opens_span() {
        let tokens = vec![tok("O", 0, 2, 0), tok("I-LOC", 3, 8, 1)];
        let spans = decode_spans(&tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, "LOC");
        assert_eq!(spans[0].start, 3);
    }

    #[test]
    fn test_label_change_inside_splits() {
        let tokens = vec![tok("B-PER", 0, 3, 0), tok("I-ORG", 4, 8, 1)];
        let spans = decode_spans(&tokens);
        let labels: Vec<&str> = spans.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["PER", "ORG"]);
    }

    #[test]
    fn test_no_entities() {
        let tokens = vec![special(), tok("O", 0, 5, 0), special()];
        assert!(decode_spans(&tokens).is_empty());
        assert!(decode_spans(&[]).is_empty());
    }
}
