use super::{BACKUP_ATTR, gifify, srcset};
use crate::dom::{Dom, MemoryDom, NodeId, Selector};

fn doc(html: &str) -> MemoryDom {
    MemoryDom::parse(html).unwrap()
}

fn img(dom: &MemoryDom) -> NodeId {
    dom.query_all(&Selector::parse("img").unwrap())[0]
}

// ============================================================================
// srcset parsing
// ============================================================================

#[test]
fn candidates_take_first_token_per_entry() {
    let found = srcset::candidates("a.jpg 1x, b.gif 2x,c.png   480w");
    assert_eq!(found.as_slice(), ["a.jpg", "b.gif", "c.png"]);
}

#[test]
fn candidates_tolerate_malformed_entries() {
    // Empty entries and descriptor-only entries degrade to whatever
    // token is there; nothing errors.
    let found = srcset::candidates(",a.gif 1x,, 2x ,");
    assert_eq!(found.as_slice(), ["", "a.gif", "", "2x", ""]);
}

#[test]
fn first_gif_in_listed_order() {
    assert_eq!(
        srcset::first_gif("a.jpg 1x, b.gif 2x, c.gif 3x").as_deref(),
        Some("b.gif")
    );
    assert_eq!(srcset::first_gif("a.jpg 1x, b.jpg 2x"), None);
    assert_eq!(srcset::first_gif(""), None);
}

#[test]
fn first_gif_ignores_near_misses() {
    // Case and query-string suffixes don't count; the match is a
    // literal `.gif` suffix on the token.
    assert_eq!(srcset::first_gif("a.GIF 1x"), None);
    assert_eq!(srcset::first_gif("a.gif?v=2 1x"), None);
    assert_eq!(srcset::first_gif("a.gifv 1x"), None);
}

// ============================================================================
// Transformer
// ============================================================================

#[test]
fn selects_first_gif_and_rewrites() {
    let mut dom = doc(r#"<img src="x.png" srcset="a.jpg 1x, b.gif 2x, c.gif 3x">"#);
    gifify(&mut dom);

    let img = img(&dom);
    assert_eq!(dom.attr(img, "src").as_deref(), Some("b.gif"));
    assert_eq!(dom.attr(img, "srcset"), None);
    assert_eq!(
        dom.attr(img, BACKUP_ATTR).as_deref(),
        Some("a.jpg 1x, b.gif 2x, c.gif 3x")
    );
}

#[test]
fn leaves_images_without_gif_candidates_untouched() {
    let mut dom = doc(r#"<img src="x.png" srcset="a.jpg 1x, b.jpg 2x">"#);
    let before = dom.to_html();
    gifify(&mut dom);

    let img = img(&dom);
    assert_eq!(dom.attr(img, "src").as_deref(), Some("x.png"));
    assert_eq!(dom.attr(img, "srcset").as_deref(), Some("a.jpg 1x, b.jpg 2x"));
    assert_eq!(dom.attr(img, BACKUP_ATTR), None);
    assert_eq!(dom.to_html(), before);
}

#[test]
fn skips_images_already_displaying_a_gif() {
    let mut dom = doc(r#"<img src="x.gif" srcset="a.gif 1x, b.gif 2x">"#);
    gifify(&mut dom);

    let img = img(&dom);
    assert_eq!(dom.attr(img, "src").as_deref(), Some("x.gif"));
    assert_eq!(dom.attr(img, "srcset").as_deref(), Some("a.gif 1x, b.gif 2x"));
}

#[test]
fn uppercase_gif_src_is_not_treated_as_animated() {
    // The exclusion is a literal case-sensitive suffix check, so a
    // `.GIF` src does not exempt the image from conversion.
    let mut dom = doc(r#"<img src="x.GIF" srcset="a.gif 1x">"#);
    gifify(&mut dom);

    assert_eq!(dom.attr(img(&dom), "src").as_deref(), Some("a.gif"));
}

#[test]
fn skips_empty_or_whitespace_srcset() {
    let mut dom = doc(r#"<img src="x.png" srcset="">"#);
    gifify(&mut dom);
    let first = img(&dom);
    assert_eq!(dom.attr(first, "src").as_deref(), Some("x.png"));
    assert_eq!(dom.attr(first, "srcset").as_deref(), Some(""));
    assert_eq!(dom.attr(first, BACKUP_ATTR), None);

    let mut dom = doc(r#"<img src="x.png" srcset="   ">"#);
    gifify(&mut dom);
    let second = img(&dom);
    assert_eq!(dom.attr(second, "src").as_deref(), Some("x.png"));
    assert_eq!(dom.attr(second, "srcset").as_deref(), Some("   "));
}

#[test]
fn converts_images_with_no_src_at_all() {
    let mut dom = doc(r#"<img srcset="a.gif 1x">"#);
    gifify(&mut dom);

    assert_eq!(dom.attr(img(&dom), "src").as_deref(), Some("a.gif"));
}

#[test]
fn backup_preserves_the_srcset_verbatim() {
    // Outer whitespace survives in the backup even though the value is
    // trimmed for the emptiness check.
    let raw = "  a.jpg 1x,  b.gif 2x  ";
    let mut dom = doc(&format!(r#"<img src="x.png" srcset="{raw}">"#));
    gifify(&mut dom);

    assert_eq!(dom.attr(img(&dom), BACKUP_ATTR).as_deref(), Some(raw));
}

#[test]
fn converts_every_eligible_image_in_one_pass() {
    let mut dom = doc(concat!(
        r#"<div><img src="1.png" srcset="1.gif 1x"></div>"#,
        r#"<img src="2.png" srcset="2.jpg 1x">"#,
        r#"<img src="3.png" srcset="3a.jpg 1x, 3b.gif 2x">"#,
    ));
    gifify(&mut dom);

    let images = dom.query_all(&Selector::parse("img").unwrap());
    assert_eq!(dom.attr(images[0], "src").as_deref(), Some("1.gif"));
    assert_eq!(dom.attr(images[1], "src").as_deref(), Some("2.png"));
    assert_eq!(dom.attr(images[2], "src").as_deref(), Some("3b.gif"));
}

#[test]
fn repeated_runs_are_idempotent() {
    let mut dom = doc(concat!(
        r#"<img src="x.png" srcset="a.jpg 1x, b.gif 2x">"#,
        r#"<img src="y.png" srcset="c.jpg 1x">"#,
    ));

    gifify(&mut dom);
    let first_pass = dom.to_html();

    gifify(&mut dom);
    assert_eq!(dom.to_html(), first_pass);

    // The converted image keeps pointing at the first pass's choice;
    // its backup is not overwritten with a second copy.
    let converted = img(&dom);
    assert_eq!(dom.attr(converted, "src").as_deref(), Some("b.gif"));
    assert_eq!(
        dom.attr(converted, BACKUP_ATTR).as_deref(),
        Some("a.jpg 1x, b.gif 2x")
    );
}

#[test]
fn malformed_entries_do_not_block_conversion() {
    let mut dom = doc(r#"<img src="x.png" srcset=",, 2x, ok.gif 3x,">"#);
    gifify(&mut dom);

    assert_eq!(dom.attr(img(&dom), "src").as_deref(), Some("ok.gif"));
}
