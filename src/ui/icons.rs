/// Icon registry for category chips
///
/// Categories store an icon by name; rendering maps the name to a glyph
/// through this table. Unknown names fall back to the default so documents
/// from older versions always render something.
pub const DEFAULT_ICON: &str = "Circle";

pub const ICONS: [(&str, &str); 20] = [
    ("Circle", "⚪"),
    ("Star", "⭐"),
    ("Heart", "❤️"),
    ("Music", "🎵"),
    ("Gamepad", "🎮"),
    ("Film", "🎬"),
    ("Camera", "📷"),
    ("Book", "📚"),
    ("Graduation", "🎓"),
    ("Wrench", "🔧"),
    ("Flask", "🧪"),
    ("Palette", "🎨"),
    ("Trophy", "🏆"),
    ("Car", "🚗"),
    ("Plane", "✈️"),
    ("Cooking", "🍳"),
    ("Leaf", "🌿"),
    ("Dumbbell", "🏋️"),
    ("Briefcase", "💼"),
    ("Sparkles", "✨"),
];

pub fn glyph(name: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(icon_name, _)| *icon_name == name)
        .map(|(_, glyph)| *glyph)
        .unwrap_or("⚪")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_icons_resolve() {
        assert_eq!(glyph("Music"), "🎵");
        assert_eq!(glyph(DEFAULT_ICON), "⚪");
    }

    #[test]
    fn test_unknown_icon_falls_back() {
        assert_eq!(glyph("NoSuchIcon"), "⚪");
        assert_eq!(glyph(""), "⚪");
    }

    #[test]
    fn test_icon_names_are_unique() {
        for (i, (name, _)) in ICONS.iter().enumerate() {
            assert!(
                !ICONS[i + 1..].iter().any(|(other, _)| other == name),
                "duplicate icon name {name}"
            );
        }
    }
}
