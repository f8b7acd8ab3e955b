/// what a check-in or undo applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Workspace,
    Single(String),
    Many(Vec<String>),
}

impl Target {
    /// no paths means the whole workspace
    pub fn from_paths(mut paths: Vec<String>) -> Self {
        match paths.len() {
            0 => Self::Workspace,
            1 => Self::Single(paths.remove(0)),
            _ => Self::Many(paths),
        }
    }

    /// the path arguments passed to the backend
    pub fn paths(&self, root: &str) -> Vec<String> {
        match self {
            Self::Workspace => vec![root.to_string()],
            Self::Single(path) => vec![path.clone()],
            Self::Many(paths) => paths.clone(),
        }
    }

    /// human-readable description for confirmation and progress text
    pub fn description(&self) -> String {
        match self {
            Self::Workspace => "the entire workspace".to_string(),
            Self::Many(paths) if paths.len() > 1 => format!("{} files", paths.len()),
            Self::Many(paths) => match paths.first() {
                Some(path) => format!("\"{path}\""),
                None => "0 files".to_string(),
            },
            Self::Single(path) => format!("\"{path}\""),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(paths) if paths.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_target() {
        let target = Target::Workspace;
        assert_eq!(target.paths("/ws"), ["/ws"]);
        assert_eq!(target.description(), "the entire workspace");
    }

    #[test]
    fn test_single_path_is_quoted() {
        let single = Target::Single("/ws/a.txt".to_string());
        let list_of_one = Target::Many(vec!["/ws/a.txt".to_string()]);

        assert_eq!(single.description(), "\"/ws/a.txt\"");
        assert_eq!(list_of_one.description(), single.description());
        assert_eq!(list_of_one.paths("/ws"), ["/ws/a.txt"]);
    }

    #[test]
    fn test_multiple_paths_are_counted() {
        let target = Target::Many(vec!["/ws/a.txt".to_string(), "/ws/b.txt".to_string()]);
        assert_eq!(target.description(), "2 files");
        assert_eq!(target.paths("/ws"), ["/ws/a.txt", "/ws/b.txt"]);

        let target = Target::Many((0..12).map(|i| format!("/ws/{i}.txt")).collect());
        assert_eq!(target.description(), "12 files");
    }

    #[test]
    fn test_from_paths() {
        assert_eq!(Target::from_paths(vec![]), Target::Workspace);
        assert_eq!(
            Target::from_paths(vec!["a".to_string()]),
            Target::Single("a".to_string())
        );
        assert_eq!(
            Target::from_paths(vec!["a".to_string(), "b".to_string()]),
            Target::Many(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_empty_selection() {
        let target = Target::Many(Vec::new());
        assert!(target.is_empty());
        assert!(target.paths("/ws").is_empty());
        assert!(!Target::Workspace.is_empty());
    }
}
