#![cfg(test)]

use core::error::Error;
use css_selectors::{
    ElementAdapter, matches_complex, matches_selector_list, parse_complex_selector,
    parse_selector_list, unsupported_component,
};

/// Minimal element tree: (tag, id, classes, attributes, parent).
struct Node {
    tag: &'static str,
    id: Option<&'static str>,
    classes: Vec<&'static str>,
    attrs: Vec<(&'static str, &'static str)>,
    parent: Option<usize>,
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn add(
        &mut self,
        parent: Option<usize>,
        tag: &'static str,
        id: Option<&'static str>,
        classes: &[&'static str],
    ) -> usize {
        self.nodes.push(Node {
            tag,
            id,
            classes: classes.to_vec(),
            attrs: Vec::new(),
            parent,
        });
        self.nodes.len() - 1
    }

    fn siblings(&self, element: usize) -> Vec<usize> {
        let parent = self.nodes[element].parent;
        (0..self.nodes.len())
            .filter(|&index| self.nodes[index].parent == parent)
            .collect()
    }
}

impl ElementAdapter for Tree {
    type Handle = usize;

    fn parent(&self, element: usize) -> Option<usize> {
        self.nodes[element].parent
    }

    fn previous_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|&other| other == element)?;
        position.checked_sub(1).map(|prev| siblings[prev])
    }

    fn next_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|&other| other == element)?;
        siblings.get(position + 1).copied()
    }

    fn tag_name(&self, element: usize) -> &str {
        self.nodes[element].tag
    }

    fn element_id(&self, element: usize) -> Option<&str> {
        self.nodes[element].id
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.nodes[element].classes.contains(&class)
    }

    fn attr(&self, element: usize, name: &str) -> Option<&str> {
        self.nodes[element]
            .attrs
            .iter()
            .find(|pair| pair.0 == name)
            .map(|pair| pair.1)
    }
}

/// `<div.outer><section><div.inner><ul><li/><li/><li.last/></ul></div></section></div>`
fn sample() -> (Tree, [usize; 3]) {
    let mut tree = Tree { nodes: Vec::new() };
    let outer = tree.add(None, "div", Some("root"), &["outer"]);
    let section = tree.add(Some(outer), "section", None, &[]);
    let inner = tree.add(Some(section), "div", None, &["inner"]);
    let list = tree.add(Some(inner), "ul", None, &[]);
    let first = tree.add(Some(list), "li", None, &[]);
    let second = tree.add(Some(list), "li", None, &[]);
    let last = tree.add(Some(list), "li", None, &["last"]);
    tree.nodes[last].attrs.push(("data-state", "open closed"));
    (tree, [first, second, last])
}

fn matches(tree: &Tree, element: usize, selector: &str) -> Result<bool, Box<dyn Error>> {
    let sel = parse_complex_selector(selector)?;
    Ok(matches_complex(tree, element, &sel))
}

/// Descendant matching must try every ancestor, not just the nearest one.
///
/// # Errors
/// Returns an error if a selector fails to parse or a match is wrong.
#[test]
fn descendant_backtracks_over_ancestors() -> Result<(), Box<dyn Error>> {
    let (tree, [first, _, _]) = sample();
    if !matches(&tree, first, "div > section div li")? {
        return Err("expected div > section div li to match".into());
    }
    if !matches(&tree, first, "#root ul > li")? {
        return Err("expected #root ul > li to match".into());
    }
    if matches(&tree, first, ".inner > li")? {
        return Err(".inner > li must not match a grandchild".into());
    }
    Ok(())
}

/// Sibling combinators and structural pseudo-classes.
///
/// # Errors
/// Returns an error if a selector fails to parse or a match is wrong.
#[test]
fn siblings_and_structure() -> Result<(), Box<dyn Error>> {
    let (tree, [first, second, last]) = sample();
    if !matches(&tree, second, "li:first-child + li")? {
        return Err("adjacent sibling failed".into());
    }
    if !matches(&tree, last, "li:first-child ~ .last:last-child")? {
        return Err("general sibling failed".into());
    }
    if !matches(&tree, second, "li:nth-child(2n)")? || matches(&tree, first, "li:nth-child(even)")? {
        return Err("nth-child failed".into());
    }
    if !matches(&tree, last, "li:nth-last-child(1)")? {
        return Err("nth-last-child failed".into());
    }
    if !matches(&tree, tree.nodes[first].parent.unwrap_or(0), "ul:only-child")? {
        return Err("only-child failed".into());
    }
    if !matches(&tree, 0, ":root")? || matches(&tree, first, ":root")? {
        return Err(":root failed".into());
    }
    Ok(())
}

/// Attribute selectors and pseudo-elements.
///
/// # Errors
/// Returns an error if a selector fails to parse or a match is wrong.
#[test]
fn attributes_and_pseudo_elements() -> Result<(), Box<dyn Error>> {
    let (tree, [first, _, last]) = sample();
    if !matches(&tree, last, "[data-state~=\"closed\"]")? {
        return Err("~= failed".into());
    }
    if matches(&tree, first, "[data-state]")? {
        return Err("attribute presence matched an element without it".into());
    }
    if !matches(&tree, last, "li.last::after")? {
        return Err("pseudo-element should match its host".into());
    }
    let list = parse_selector_list("p, .missing, li.last")?;
    if !matches_selector_list(&tree, last, &list) {
        return Err("selector list failed".into());
    }
    Ok(())
}

#[test]
fn unsupported_components_are_reported() {
    let sel = parse_complex_selector("a:hover > b").unwrap_or_default();
    assert_eq!(unsupported_component(&sel).as_deref(), Some(":hover"));
    let sel = parse_complex_selector("li:nth-child(foo)").unwrap_or_default();
    assert_eq!(
        unsupported_component(&sel).as_deref(),
        Some(":nth-child(foo)")
    );
    let sel = parse_complex_selector("ul li:first-child").unwrap_or_default();
    assert_eq!(unsupported_component(&sel), None);
}
