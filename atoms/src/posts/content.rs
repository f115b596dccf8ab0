use serde::Serialize;

/// One block of a parsed post body, for the editor preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    Paragraph { text: String },
    Image { alt: String, src: String },
    Break,
}

/// `![alt](src)` when the whole line is one image reference.
fn parse_image_reference(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("![")?;
    let close = rest.find(']')?;
    let alt = &rest[..close];
    let src = rest[close + 1..].strip_prefix('(')?.strip_suffix(')')?;
    if src.is_empty() || src.contains(')') {
        return None;
    }
    Some((alt.to_string(), src.to_string()))
}

/// Split a markdown body into preview nodes: image-reference lines become
/// images, blank lines become breaks, everything else is a paragraph.
pub fn parse_content(content: &str) -> Vec<ContentNode> {
    content
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                ContentNode::Break
            } else if let Some((alt, src)) = parse_image_reference(trimmed) {
                ContentNode::Image { alt, src }
            } else {
                ContentNode::Paragraph {
                    text: trimmed.to_string(),
                }
            }
        })
        .collect()
}

/// Insert an `![name](src)` reference at the editor cursor, on its own
/// line. Returns the new body and the cursor position after the reference.
/// The cursor is clamped to the body and snapped back to a char boundary.
pub fn insert_image_reference(
    content: &str,
    cursor: usize,
    name: &str,
    src: &str,
) -> (String, usize) {
    let mut pos = cursor.min(content.len());
    while pos > 0 && !content.is_char_boundary(pos) {
        pos -= 1;
    }
    let reference = format!("\n![{}]({})\n", name, src);
    let mut body = String::with_capacity(content.len() + reference.len());
    body.push_str(&content[..pos]);
    body.push_str(&reference);
    body.push_str(&content[pos..]);
    (body, pos + reference.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paragraphs_images_and_breaks() {
        let body = "First paragraph\n\n![teapot](https://cdn.example.com/teapot.jpg)\nSecond";
        let nodes = parse_content(body);
        assert_eq!(
            nodes,
            vec![
                ContentNode::Paragraph {
                    text: "First paragraph".to_string()
                },
                ContentNode::Break,
                ContentNode::Image {
                    alt: "teapot".to_string(),
                    src: "https://cdn.example.com/teapot.jpg".to_string()
                },
                ContentNode::Paragraph {
                    text: "Second".to_string()
                },
            ]
        );
    }

    #[test]
    fn image_alt_may_be_empty() {
        let nodes = parse_content("![](data:image/jpeg;base64,abc)");
        assert_eq!(
            nodes,
            vec![ContentNode::Image {
                alt: String::new(),
                src: "data:image/jpeg;base64,abc".to_string()
            }]
        );
    }

    #[test]
    fn partial_references_stay_paragraphs() {
        let nodes = parse_content("![teapot](broken url) trailing");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0], ContentNode::Paragraph { .. }));

        let nodes = parse_content("see ![teapot](x.jpg)");
        assert!(matches!(nodes[0], ContentNode::Paragraph { .. }));
    }

    #[test]
    fn insert_places_reference_at_cursor() {
        let (body, cursor) = insert_image_reference("before after", 6, "pic", "x.jpg");
        assert_eq!(body, "before\n![pic](x.jpg)\n after");
        assert_eq!(&body[cursor..], " after");
    }

    #[test]
    fn insert_clamps_cursor_past_the_end() {
        let (body, cursor) = insert_image_reference("short", 999, "pic", "x.jpg");
        assert_eq!(body, "short\n![pic](x.jpg)\n");
        assert_eq!(cursor, body.len());
    }

    #[test]
    fn insert_snaps_to_char_boundary() {
        // "café" is 5 bytes; index 4 falls inside the accent.
        let (body, _) = insert_image_reference("café", 4, "pic", "x.jpg");
        assert!(body.starts_with("caf\n![pic](x.jpg)\né"));
    }

    #[test]
    fn parsed_nodes_serialize_tagged() {
        let json = serde_json::to_string(&ContentNode::Image {
            alt: "a".to_string(),
            src: "b".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"image","alt":"a","src":"b"}"#);
    }
}
