//! Grouping of longhand properties by the shorthand they belong to.

use core::fmt;

/// Box side, in the order shorthand values list them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|side| side.as_str() == name)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Corners of `border-radius`, in value order.
pub(crate) const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

/// Shorthand family of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Margin,
    Padding,
    /// `border`, `border-width|style|color` and `border-image*`.
    Border,
    /// `border-<side>` and its width, style and color.
    BorderSide(Side),
    BorderRadius,
    Outline,
    Background,
}

impl Family {
    /// Shorthand property the family merges into.
    pub fn shorthand(self) -> String {
        match self {
            Self::Margin => "margin".to_owned(),
            Self::Padding => "padding".to_owned(),
            Self::Border => "border".to_owned(),
            Self::BorderSide(side) => format!("border-{side}"),
            Self::BorderRadius => "border-radius".to_owned(),
            Self::Outline => "outline".to_owned(),
            Self::Background => "background".to_owned(),
        }
    }
}

/// Family of the lowercased property `name`, or `None` for properties that
/// are never merged.
pub fn classify(name: &str) -> Option<Family> {
    match name {
        "margin" => return Some(Family::Margin),
        "padding" => return Some(Family::Padding),
        "border" | "border-width" | "border-style" | "border-color" => {
            return Some(Family::Border);
        }
        "border-radius" => return Some(Family::BorderRadius),
        "outline" | "outline-width" | "outline-style" | "outline-color" => {
            return Some(Family::Outline);
        }
        "background" => return Some(Family::Background),
        _ => {}
    }
    if let Some(side) = name.strip_prefix("margin-") {
        return Side::from_name(side).map(|_| Family::Margin);
    }
    if let Some(side) = name.strip_prefix("padding-") {
        return Side::from_name(side).map(|_| Family::Padding);
    }
    if name.starts_with("background-") {
        return Some(Family::Background);
    }
    if name.starts_with("border-image") {
        return Some(Family::Border);
    }
    let rest = name.strip_prefix("border-")?;
    if let Some(corner) = rest.strip_suffix("-radius") {
        return CORNERS.contains(&corner).then_some(Family::BorderRadius);
    }
    let (side, part) = rest.split_once('-').unwrap_or((rest, ""));
    let side = Side::from_name(side)?;
    matches!(part, "" | "width" | "style" | "color").then_some(Family::BorderSide(side))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families() {
        assert_eq!(classify("margin-top"), Some(Family::Margin));
        assert_eq!(classify("padding"), Some(Family::Padding));
        assert_eq!(classify("margin-inline-start"), None);
        assert_eq!(classify("border-image-source"), Some(Family::Border));
        assert_eq!(classify("border-color"), Some(Family::Border));
        assert_eq!(classify("border-left"), Some(Family::BorderSide(Side::Left)));
        assert_eq!(
            classify("border-top-style"),
            Some(Family::BorderSide(Side::Top))
        );
        assert_eq!(classify("border-top-left-radius"), Some(Family::BorderRadius));
        assert_eq!(classify("border-top-radius"), None);
        assert_eq!(classify("border-collapse"), None);
        assert_eq!(classify("outline-offset"), None);
        assert_eq!(classify("background-size"), Some(Family::Background));
        assert_eq!(classify("color"), None);
    }

    #[test]
    fn shorthand_names() {
        assert_eq!(Family::BorderSide(Side::Bottom).shorthand(), "border-bottom");
        assert_eq!(Family::BorderRadius.shorthand(), "border-radius");
    }
}
