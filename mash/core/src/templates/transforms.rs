//! Text-level markup transforms
//!
//! Each transform rewrites opening tags in template code. Tags that already
//! carry the attribute being added are left alone, so applying a transform
//! twice is the same as applying it once.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ICON_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)<([^>]*)(icon|svg)([^>]*?)(\s*/)?>").ok());

static LANDMARK_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)<(nav|header|footer|main)(\s[^>]*)?>").ok());

static BUTTON_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)<button(\s[^>]*)?>").ok());

static IMG_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)<img(\s[^>]*?)?(\s*/)?>").ok());

static CLICKABLE_DIV: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)<div(\s[^>]*\bonclick\b[^>]*?)(\s*/)?>").ok());

fn rewrite(re: &Lazy<Option<Regex>>, code: &str, f: impl Fn(&Captures<'_>) -> String) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(code, |caps: &Captures<'_>| f(caps)).into_owned(),
        None => code.to_string(),
    }
}

fn group<'a>(caps: &'a Captures<'_>, i: usize) -> &'a str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn landmark_role(tag: &str) -> &'static str {
    match tag.to_ascii_lowercase().as_str() {
        "nav" => "navigation",
        "header" => "banner",
        "footer" => "contentinfo",
        _ => "main",
    }
}

/// Hide icons from assistive tech, add landmark roles, label buttons
pub(crate) fn add_aria_attributes(code: &str) -> String {
    let code = rewrite(&ICON_TAG, code, |caps| {
        let tag = &caps[0];
        if tag.contains("aria-hidden") || tag.starts_with("</") {
            return tag.to_string();
        }
        format!(
            "<{}{}{} aria-hidden=\"true\"{}>",
            group(caps, 1),
            group(caps, 2),
            group(caps, 3),
            group(caps, 4)
        )
    });

    let code = rewrite(&LANDMARK_TAG, &code, |caps| {
        let tag = &caps[0];
        if tag.contains("role=") {
            return tag.to_string();
        }
        let name = group(caps, 1);
        format!("<{}{} role=\"{}\">", name, group(caps, 2), landmark_role(name))
    });

    rewrite(&BUTTON_TAG, &code, |caps| {
        let tag = &caps[0];
        if tag.contains("aria-label") {
            return tag.to_string();
        }
        format!("<button{} aria-label=\"Button\">", group(caps, 1))
    })
}

fn add_img_attribute(code: &str, skip: impl Fn(&str) -> bool, attribute: &str) -> String {
    rewrite(&IMG_TAG, code, |caps| {
        let tag = &caps[0];
        if skip(tag) {
            return tag.to_string();
        }
        format!("<img{} {}{}>", group(caps, 1), attribute, group(caps, 2))
    })
}

/// Give every image without one a placeholder `alt`
pub(crate) fn ensure_image_alt_text(code: &str) -> String {
    add_img_attribute(code, |tag| tag.contains("alt="), "alt=\"Image description\"")
}

/// Mark images for lazy loading
pub(crate) fn add_lazy_loading(code: &str) -> String {
    add_img_attribute(code, |tag| tag.contains("loading="), "loading=\"lazy\"")
}

/// Give images explicit dimensions, filling in whichever is missing
pub(crate) fn add_image_dimensions(code: &str) -> String {
    rewrite(&IMG_TAG, code, |caps| {
        let tag = &caps[0];
        let mut extra = String::new();
        if !tag.contains("width=") {
            extra.push_str(" width=\"100%\"");
        }
        if !tag.contains("height=") {
            extra.push_str(" height=\"auto\"");
        }
        format!("<img{}{}{}>", group(caps, 1), extra, group(caps, 2))
    })
}

/// Make clickable divs focusable and Enter-activated
pub(crate) fn add_keyboard_navigation(code: &str) -> String {
    rewrite(&CLICKABLE_DIV, code, |caps| {
        let tag = &caps[0];
        if tag.contains("tabIndex") || tag.contains("tabindex") {
            return tag.to_string();
        }
        format!(
            "<div{} tabIndex={{0}} onKeyDown={{(e) => e.key === 'Enter' && e.currentTarget.click()}}{}>",
            group(caps, 1),
            group(caps, 2)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_landmark_roles() {
        let out = add_aria_attributes("<header class=\"top\"><nav></nav></header><main>x</main><footer>");
        assert_eq!(
            out,
            "<header class=\"top\" role=\"banner\"><nav role=\"navigation\"></nav></header><main role=\"main\">x</main><footer role=\"contentinfo\">"
        );
    }

    #[test]
    fn test_button_label_kept_when_present() {
        let out = add_aria_attributes("<button aria-label=\"Close\">x</button><button type=\"submit\">");
        assert_eq!(
            out,
            "<button aria-label=\"Close\">x</button><button type=\"submit\" aria-label=\"Button\">"
        );
    }

    #[test]
    fn test_icons_hidden() {
        let out = add_aria_attributes("<svg class=\"i\"></svg><span className=\"icon-star\"/>");
        assert!(out.contains("<svg class=\"i\" aria-hidden=\"true\">"));
        assert!(out.contains("<span className=\"icon-star\" aria-hidden=\"true\"/>"));
        assert!(out.contains("</svg>"));
    }

    #[test]
    fn test_alt_text_preserves_self_closing() {
        let out = ensure_image_alt_text("<img src={a} className=\"card-image\" />");
        assert_eq!(
            out,
            "<img src={a} className=\"card-image\" alt=\"Image description\" />"
        );
        let kept = "<img src=\"a.png\" alt=\"A\">";
        assert_eq!(ensure_image_alt_text(kept), kept);
    }

    #[test]
    fn test_lazy_and_dimensions() {
        let out = add_lazy_loading("<img src=\"a.png\">");
        assert_eq!(out, "<img src=\"a.png\" loading=\"lazy\">");

        let out = add_image_dimensions("<img src=\"a.png\" width=\"10\">");
        assert_eq!(out, "<img src=\"a.png\" width=\"10\" height=\"auto\">");

        let sized = "<img src=\"a.png\" width=\"10\" height=\"10\">";
        assert_eq!(add_image_dimensions(sized), sized);
    }

    #[test]
    fn test_keyboard_navigation() {
        let out = add_keyboard_navigation("<div className=\"card\" onClick={onClick}>");
        assert!(out.starts_with("<div className=\"card\" onClick={onClick} tabIndex={0} onKeyDown="));
        assert_eq!(add_keyboard_navigation("<div className=\"x\">"), "<div className=\"x\">");
    }

    #[test]
    fn test_idempotent() {
        let code = "<nav><img src=\"a\"><button>b</button></nav>";
        let once = ensure_image_alt_text(&add_aria_attributes(code));
        let twice = ensure_image_alt_text(&add_aria_attributes(&once));
        assert_eq!(once, twice);
    }
}
