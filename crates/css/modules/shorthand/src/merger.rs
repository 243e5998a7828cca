//! Per-family merging.

use crate::components::{minimize_sides, split_components};
use crate::family::{CORNERS, Family, Side, classify};
use core::fmt;
use css_orchestrator::Declaration;
use std::collections::HashMap;

/// A family left unmerged because one of its declarations could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeWarning {
    /// Where the declarations came from, usually the selector text.
    pub context: String,
    /// Shorthand that could not be built.
    pub shorthand: String,
    pub reason: String,
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}: cannot merge `{}`: {}",
            self.context, self.shorthand, self.reason
        )
    }
}

/// Declarations after merging, plus a warning for every family left unmerged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub declarations: Vec<Declaration>,
    pub warnings: Vec<MergeWarning>,
}

/// How many declarations a family needs before it is merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Threshold {
    /// Exactly one per side.
    FourSides,
    /// Any two or more parts.
    Several,
}

impl Threshold {
    fn reached(self, count: usize) -> bool {
        match self {
            Self::FourSides => count == 4,
            Self::Several => count > 1,
        }
    }
}

/// Merge the longhands of one selector's declarations into shorthands.
///
/// Unrelated declarations and declarations with a parse error are kept in
/// author order first, followed by the families in the order margin,
/// padding, border, border sides, border-radius, outline, background. A
/// family that cannot be merged keeps its declarations in author order and
/// yields a [`MergeWarning`].
pub fn merge_shorthands(context: &str, declarations: Vec<Declaration>) -> MergeOutcome {
    let mut merger = Merger {
        context,
        outcome: MergeOutcome::default(),
    };
    let mut families: HashMap<Family, Vec<Declaration>> = HashMap::new();
    for decl in declarations {
        let family = if decl.parse_error.is_none() {
            classify(&decl.name)
        } else {
            None
        };
        match family {
            Some(family) => families.entry(family).or_default().push(decl),
            None => merger.outcome.declarations.push(decl),
        }
    }

    for family in [Family::Margin, Family::Padding] {
        if let Some(group) = families.remove(&family) {
            let shorthand = family.shorthand();
            let longhands = Side::ALL.map(|side| format!("{shorthand}-{side}"));
            merger.merge_sides(&shorthand, &longhands, group);
        }
    }
    if let Some(group) = families.remove(&Family::Border) {
        merger.merge_parts(
            "border",
            &["border-width", "border-style", "border-color"],
            false,
            group,
        );
    }

    let sides: Vec<(Side, Vec<Declaration>)> = Side::ALL
        .into_iter()
        .filter_map(|side| {
            families
                .remove(&Family::BorderSide(side))
                .map(|group| (side, group))
        })
        .collect();
    merger.merge_border_sides(sides);

    if let Some(group) = families.remove(&Family::BorderRadius) {
        let longhands = CORNERS.map(|corner| format!("border-{corner}-radius"));
        merger.merge_sides("border-radius", &longhands, group);
    }
    if let Some(group) = families.remove(&Family::Outline) {
        merger.merge_parts(
            "outline",
            &["outline-width", "outline-style", "outline-color"],
            false,
            group,
        );
    }
    if let Some(group) = families.remove(&Family::Background) {
        merger.merge_parts(
            "background",
            &[
                "background-color",
                "background-image",
                "background-repeat",
                "background-attachment",
                "background-position",
            ],
            true,
            group,
        );
    }

    merger.outcome
}

struct Merger<'ctx> {
    context: &'ctx str,
    outcome: MergeOutcome,
}

impl Merger<'_> {
    /// Merge four side longhands into `shorthand`, e.g. `margin-top` .. `margin-left`.
    fn merge_sides(&mut self, shorthand: &str, longhands: &[String; 4], group: Vec<Declaration>) {
        self.merge(shorthand, Threshold::FourSides, group, |group| {
            let mut values: [Option<&str>; 4] = [None; 4];
            for decl in group {
                let slot = values
                    .iter_mut()
                    .zip(longhands)
                    .find_map(|(slot, name)| (*name == decl.name).then_some(slot))
                    .ok_or_else(|| format!("`{}` is not a side of `{shorthand}`", decl.name))?;
                let value = single_component(decl)?;
                if slot.replace(value).is_some() {
                    return Err(format!("`{}` is declared twice", decl.name));
                }
            }
            let [Some(top), Some(right), Some(bottom), Some(left)] = values else {
                return Err("a side is missing".to_owned());
            };
            Ok(minimize_sides([top, right, bottom, left]))
        });
    }

    /// Compose `shorthand` from the values of `parts`, in `parts` order.
    fn merge_parts(
        &mut self,
        shorthand: &str,
        parts: &[&str],
        multi_component: bool,
        group: Vec<Declaration>,
    ) {
        self.merge(shorthand, Threshold::Several, group, |group| {
            let mut values: Vec<Option<&str>> = vec![None; parts.len()];
            for decl in group {
                let slot = values
                    .iter_mut()
                    .zip(parts)
                    .find_map(|(slot, name)| (*name == decl.name).then_some(slot))
                    .ok_or_else(|| format!("`{}` cannot be part of `{shorthand}`", decl.name))?;
                let value = if multi_component {
                    non_empty(decl)?
                } else {
                    single_component(decl)?
                };
                if slot.replace(value).is_some() {
                    return Err(format!("`{}` is declared twice", decl.name));
                }
            }
            Ok(values.into_iter().flatten().collect::<Vec<_>>().join(" "))
        });
    }

    /// Merge the `border-<side>*` declarations.
    ///
    /// When every one of them sets the same part (all widths, say) they form
    /// the uniform `border-width`; otherwise each side is merged on its own.
    fn merge_border_sides(&mut self, sides: Vec<(Side, Vec<Declaration>)>) {
        let total: usize = sides.iter().map(|(_, group)| group.len()).sum();
        if total == 0 {
            return;
        }
        for part in ["width", "style", "color"] {
            let count = sides
                .iter()
                .map(|(side, group)| {
                    let name = format!("border-{side}-{part}");
                    group.iter().filter(|decl| decl.name == name).count()
                })
                .sum::<usize>();
            if count == total {
                let mut group: Vec<Declaration> =
                    sides.into_iter().flat_map(|(_, group)| group).collect();
                group.sort_by_key(|decl| decl.order);
                let longhands = Side::ALL.map(|side| format!("border-{side}-{part}"));
                self.merge_sides(&format!("border-{part}"), &longhands, group);
                return;
            }
        }
        for (side, group) in sides {
            let names = ["width", "style", "color"].map(|part| format!("border-{side}-{part}"));
            let parts = names.each_ref().map(String::as_str);
            self.merge_parts(&format!("border-{side}"), &parts, false, group);
        }
    }

    /// Replace `group` by one `shorthand` declaration built by `build`, or
    /// keep it unchanged when it is too small or cannot be merged.
    fn merge<F>(&mut self, shorthand: &str, threshold: Threshold, group: Vec<Declaration>, build: F)
    where
        F: FnOnce(&[Declaration]) -> Result<String, String>,
    {
        if !threshold.reached(group.len()) {
            self.outcome.declarations.extend(group);
            return;
        }
        let merged = shared_importance(&group)
            .and_then(|important| build(group.as_slice()).map(|value| (important, value)));
        match merged {
            Ok((important, value)) => {
                let order = group.iter().map(|decl| decl.order).max().unwrap_or_default();
                let mut declaration = Declaration::new(shorthand, &value, important, order);
                declaration.effective = true;
                log::debug!(
                    "{}: merged {} declarations into {declaration}",
                    self.context,
                    group.len()
                );
                self.outcome.declarations.push(declaration);
            }
            Err(reason) => {
                let warning = MergeWarning {
                    context: self.context.to_owned(),
                    shorthand: shorthand.to_owned(),
                    reason,
                };
                log::warn!("{warning}");
                self.outcome.warnings.push(warning);
                self.outcome.declarations.extend(group);
            }
        }
    }
}

fn shared_importance(group: &[Declaration]) -> Result<bool, String> {
    let important = group.first().is_some_and(|decl| decl.important);
    if group.iter().any(|decl| decl.important != important) {
        return Err("declarations differ in !important".to_owned());
    }
    Ok(important)
}

fn single_component(decl: &Declaration) -> Result<&str, String> {
    match split_components(&decl.original_value).as_slice() {
        [value] => Ok(*value),
        [] => Err(format!("`{}` has an empty value", decl.name)),
        _ => Err(format!(
            "`{}: {}` has more than one component",
            decl.name, decl.original_value
        )),
    }
}

fn non_empty(decl: &Declaration) -> Result<&str, String> {
    if decl.original_value.is_empty() {
        return Err(format!("`{}` has an empty value", decl.name));
    }
    Ok(&decl.original_value)
}
