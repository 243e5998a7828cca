#![cfg(test)]

use core::error::Error;
use css_orchestrator::Declaration;
use css_shorthand::{MergeOutcome, merge_shorthands};

fn declarations(list: &[(&str, &str)]) -> Vec<Declaration> {
    list.iter()
        .zip(0u32..)
        .map(|((name, value), order)| Declaration::new(name, value, false, order))
        .collect()
}

fn rendered(outcome: &MergeOutcome) -> Vec<String> {
    outcome
        .declarations
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Four margin sides become one `margin` declaration.
///
/// # Errors
/// Returns an error if the merged output differs.
#[test]
fn four_margins_merge() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        "p",
        declarations(&[
            ("margin-top", "1px"),
            ("margin-right", "2px"),
            ("margin-bottom", "3px"),
            ("margin-left", "4px"),
        ]),
    );
    if rendered(&outcome) != vec!["margin: 1px 2px 3px 4px;"] {
        return Err(format!("unexpected output {:?}", rendered(&outcome)).into());
    }
    let Some(merged) = outcome.declarations.first() else {
        return Err("no declaration".into());
    };
    if !merged.effective || merged.order != 3 || !outcome.warnings.is_empty() {
        return Err("merged margin should be effective with the last order".into());
    }
    Ok(())
}

/// Three margin sides are not enough and stay untouched, without a warning.
#[test]
fn three_margins_stay() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = declarations(&[
        ("margin-top", "1px"),
        ("margin-right", "2px"),
        ("margin-bottom", "3px"),
    ]);
    let outcome = merge_shorthands("p", input.clone());
    assert_eq!(outcome.declarations, input);
    assert!(outcome.warnings.is_empty());
}

/// A shorthand mixed into the four sides stops the merge and warns.
#[test]
fn shorthand_among_sides_is_a_warning() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = declarations(&[
        ("margin", "0"),
        ("margin-top", "1px"),
        ("margin-right", "2px"),
        ("margin-bottom", "3px"),
    ]);
    let outcome = merge_shorthands("p", input.clone());
    assert_eq!(outcome.declarations, input);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(
        outcome
            .warnings
            .iter()
            .all(|warning| warning.shorthand == "margin")
    );
}

/// Pass-through declarations come first, then the families in fixed order.
///
/// # Errors
/// Returns an error if the merged output differs.
#[test]
fn output_order() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        ".card",
        declarations(&[
            ("outline-style", "dashed"),
            ("color", "red"),
            ("padding-top", "1em"),
            ("outline-color", "blue"),
            ("padding-right", "2em"),
            ("outline-offset", "2px"),
            ("padding-bottom", "1em"),
            ("padding-left", "2em"),
            ("display", "block"),
        ]),
    );
    let expected = vec![
        "color: red;",
        "outline-offset: 2px;",
        "display: block;",
        "padding: 1em 2em;",
        "outline: dashed blue;",
    ];
    if rendered(&outcome) != expected {
        return Err(format!("unexpected output {:?}", rendered(&outcome)).into());
    }
    Ok(())
}

/// Side widths alone form the uniform `border-width`.
///
/// # Errors
/// Returns an error if the merged output differs.
#[test]
fn uniform_border_width() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        "div",
        declarations(&[
            ("border-top-width", "1px"),
            ("border-right-width", "1px"),
            ("border-bottom-width", "1px"),
            ("border-left-width", "1px"),
        ]),
    );
    if rendered(&outcome) != vec!["border-width: 1px;"] {
        return Err(format!("unexpected output {:?}", rendered(&outcome)).into());
    }
    Ok(())
}

/// Mixed side parts are merged per side; a lone part is left as authored.
///
/// # Errors
/// Returns an error if the merged output differs.
#[test]
fn border_sides_merge_independently() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        "div",
        declarations(&[
            ("border-left-color", "red"),
            ("border-top-style", "solid"),
            ("border-top-width", "2px"),
            ("border-top-color", "#000"),
        ]),
    );
    let expected = vec!["border-top: 2px solid #000;", "border-left-color: red;"];
    if rendered(&outcome) != expected {
        return Err(format!("unexpected output {:?}", rendered(&outcome)).into());
    }
    Ok(())
}

/// Bare border parts compose `border`, radius corners compose `border-radius`.
///
/// # Errors
/// Returns an error if the merged output differs.
#[test]
fn border_and_radius() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        "div",
        declarations(&[
            ("border-top-left-radius", "4px"),
            ("border-color", "red"),
            ("border-top-right-radius", "4px"),
            ("border-bottom-right-radius", "0"),
            ("border-width", "1px"),
            ("border-bottom-left-radius", "0"),
        ]),
    );
    let expected = vec!["border: 1px red;", "border-radius: 4px 4px 0 0;"];
    if rendered(&outcome) != expected {
        return Err(format!("unexpected output {:?}", rendered(&outcome)).into());
    }
    Ok(())
}

/// Background parts compose `background`; an unsupported member blocks it.
#[test]
fn background_family() {
    let _ = env_logger::builder().is_test(true).try_init();
    let outcome = merge_shorthands(
        "body",
        declarations(&[
            ("background-position", "center top"),
            ("background-color", "#fff"),
            ("background-image", "url(\"bg image.png\")"),
            ("background-repeat", "no-repeat"),
        ]),
    );
    assert_eq!(
        rendered(&outcome),
        vec!["background: #fff url(\"bg image.png\") no-repeat center top;"]
    );

    let blocked = declarations(&[("background-color", "#fff"), ("background-size", "cover")]);
    let outcome = merge_shorthands("body", blocked.clone());
    assert_eq!(outcome.declarations, blocked);
    assert_eq!(outcome.warnings.len(), 1);
}

/// Declarations with a parse error never join a family.
#[test]
fn parse_errors_pass_through() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut input = declarations(&[
        ("margin-top", "1px"),
        ("margin-right", "1px"),
        ("margin-bottom", "1px"),
        ("margin-left", ""),
    ]);
    if let Some(broken) = input.last_mut() {
        broken.parse_error = Some("empty value".to_owned());
    }
    let outcome = merge_shorthands("p", input.clone());
    let mut expected = input.clone();
    expected.rotate_right(1);
    assert_eq!(outcome.declarations, expected);
    assert!(outcome.warnings.is_empty());
}

/// `!important` is carried onto the merged declaration.
#[test]
fn importance_is_kept() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut input = declarations(&[("outline-width", "0"), ("outline-style", "none")]);
    for decl in &mut input {
        decl.important = true;
    }
    let outcome = merge_shorthands("a", input);
    assert_eq!(rendered(&outcome), vec!["outline: 0 none !important;"]);
}
