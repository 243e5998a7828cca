//! Value components and side collapsing.

/// Split a value into its top-level components.
///
/// Components are separated by whitespace outside parentheses and quoted
/// strings, so `url(a b) no-repeat` has two components.
pub fn split_components(value: &str) -> Vec<&str> {
    let mut components = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (index, character) in value.char_indices() {
        if let Some(open) = quote {
            if character == open {
                quote = None;
            }
            continue;
        }
        match character {
            '"' | '\'' => quote = Some(character),
            '(' => depth = depth.saturating_add(1),
            ')' => depth = depth.saturating_sub(1),
            _ if character.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    components.extend(value.get(begin..index));
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        components.extend(value.get(begin..));
    }
    components
}

/// Join four side values in `top right bottom left` order, dropping the
/// values CSS can infer from the others.
///
/// `left` is implied by `right`, `bottom` by `top`, and `right` by `top`.
pub fn minimize_sides(sides: [&str; 4]) -> String {
    let [top, right, bottom, left] = sides;
    let kept: &[&str] = if left != right {
        &[top, right, bottom, left]
    } else if bottom != top {
        &[top, right, bottom]
    } else if right != top {
        &[top, right]
    } else {
        &[top]
    };
    kept.join(" ")
}
