use colored::Color;

/// how a pending change is drawn in the change list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub letter: char,
    pub color: Option<Color>,
    pub strike_through: bool,
    pub tooltip: &'static str,
}

const NEUTRAL: Decoration = Decoration {
    letter: ' ',
    color: None,
    strike_through: false,
    tooltip: "",
};

// checked in order, so a combined kind like "Edit, Rename" shows as a rename
const DECORATIONS: &[(&str, Decoration)] = &[
    ("delete", decoration('D', Color::Red, true, "Deleted")),
    ("add", decoration('A', Color::Green, false, "Added")),
    ("undelete", decoration('U', Color::Green, false, "Undeleted")),
    ("branch", decoration('B', Color::Cyan, false, "Branched")),
    ("rename", decoration('R', Color::Blue, false, "Renamed")),
    ("sourcerename", decoration('R', Color::Blue, false, "Renamed")),
    ("merge", decoration('G', Color::Magenta, false, "Merged")),
    ("edit", decoration('M', Color::Yellow, false, "Modified")),
    ("encoding", decoration('E', Color::Yellow, false, "Encoding changed")),
    ("property", decoration('P', Color::Yellow, false, "Properties changed")),
    ("lock", decoration('L', Color::White, false, "Locked")),
];

const fn decoration(letter: char, color: Color, strike_through: bool, tooltip: &'static str) -> Decoration {
    Decoration {
        letter,
        color: Some(color),
        strike_through,
        tooltip,
    }
}

/// map a backend change kind (possibly a comma-separated combination) to its
/// decoration; unknown kinds get a neutral one
pub fn decoration_for(change_kind: &str) -> Decoration {
    let kinds: Vec<String> = change_kind
        .split(',')
        .map(|kind| kind.trim().to_lowercase())
        .filter(|kind| !kind.is_empty())
        .collect();

    DECORATIONS
        .iter()
        .find(|(name, _)| kinds.iter().any(|kind| kind == name))
        .map_or(NEUTRAL, |(_, decoration)| *decoration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_kinds() {
        assert_eq!(decoration_for("Edit").letter, 'M');
        assert_eq!(decoration_for("add").letter, 'A');
        assert!(decoration_for("Delete").strike_through);
    }

    #[test]
    fn test_combined_kinds_use_precedence() {
        assert_eq!(decoration_for("Edit, Rename").letter, 'R');
        assert_eq!(decoration_for("Add, Edit, Encoding").letter, 'A');
        assert_eq!(decoration_for("Lock,Delete").letter, 'D');
    }

    #[test]
    fn test_unknown_kind_is_neutral() {
        assert_eq!(decoration_for("Frobnicate"), NEUTRAL);
        assert_eq!(decoration_for(""), NEUTRAL);
        assert_eq!(decoration_for("").color, None);
    }
}
