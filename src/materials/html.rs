// Anchor scanning for course web pages. Tag and attribute names match
// case-insensitively.

/// One `<a href=...>` found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// All anchors with a non-empty `href`, in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let lc = to_lowercase_fast(html);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(rel) = lc.get(from..).and_then(|s| s.find("<a")) {
        let start = from + rel;
        // `<abbr>`, `<area>` and friends
        let next = lc[start + 2..].chars().next();
        if !next.is_some_and(|c| c.is_whitespace()) {
            from = start + 2;
            continue;
        }

        let Some(open_end) = lc[start..].find('>').map(|i| start + i) else {
            break;
        };
        let close = lc[open_end..]
            .find("</a")
            .map(|i| open_end + i)
            .unwrap_or(lc.len());

        let tag = &html[start..open_end];
        if let Some(href) = attribute(tag, "href").filter(|h| !h.is_empty()) {
            let inner = &html[open_end + 1..close.max(open_end + 1)];
            out.push(Anchor {
                href: normalize_entities(&href),
                text: normalize_entities(&strip_tags(inner)),
            });
        }
        from = close.max(open_end + 1);
    }

    out
}

/// Value of `name=` inside an opening tag, quoted or bare.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let lc = to_lowercase_fast(tag);
    let pat = format!("{name}=");
    let mut from = 0;

    loop {
        let idx = from + lc.get(from..)?.find(&pat)?;
        // must be a whole attribute name, not e.g. `data-href=`
        let boundary = lc[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace());
        let value_start = idx + pat.len();
        if !boundary {
            from = value_start;
            continue;
        }

        let rest = &tag[value_start..];
        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &rest[1..];
                &body[..body.find(q).unwrap_or(body.len())]
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                &rest[..end]
            }
        };
        return Some(value.trim().to_string());
    }
}

/// Remove all tags, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
