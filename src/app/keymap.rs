//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings apply to the list-style screens (dashboard, users, detail).
//! Form screens handle their own keys so text can be typed freely.

use std::collections::HashMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Quit,
    OpenHelp,
    /// Start live search on the users list.
    StartSearch,
    /// all -> active -> inactive -> all.
    CycleStatusFilter,
    NewUser,
    EditSelection,
    DeleteSelection,
    /// Open the detail view for the selected record.
    OpenSelection,
    NextTab,
    PrevTab,
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    Refresh,
    Logout,
    /// Leave the current view (detail -> list).
    Back,
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 18] = [
    KeyAction::Quit,
    KeyAction::OpenHelp,
    KeyAction::StartSearch,
    KeyAction::CycleStatusFilter,
    KeyAction::NewUser,
    KeyAction::EditSelection,
    KeyAction::DeleteSelection,
    KeyAction::OpenSelection,
    KeyAction::NextTab,
    KeyAction::PrevTab,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PrevPage,
    KeyAction::NextPage,
    KeyAction::Refresh,
    KeyAction::Logout,
    KeyAction::Back,
    KeyAction::Ignore,
];

/// Maps `(modifiers, code)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Arrow keys plus vim-style hjkl for navigation, single letters for commands.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('f')), KeyAction::CycleStatusFilter);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewUser);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Enter), KeyAction::OpenSelection);
        bindings.insert((M::NONE, Tab), KeyAction::NextTab);
        // Shift+Tab is BackTab in crossterm; some terminals add SHIFT
        bindings.insert((M::NONE, BackTab), KeyAction::PrevTab);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevTab);
        bindings.insert((M::SHIFT, Tab), KeyAction::PrevTab);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('L')), KeyAction::Logout);
        bindings.insert((M::SHIFT, Char('L')), KeyAction::Logout);
        bindings.insert((M::NONE, Esc), KeyAction::Back);
        Self { bindings }
    }

    /// Load `path`, or write and return the defaults when it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Parse `<Action> = <KeySpec>` lines (or the reverse order) over the
    /// defaults. Unknown lines are skipped.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    /// Write every binding, grouped by action, one line per key.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-admin keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Shift+L, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete\n");
        buf.push_str("# Actions: ");
        buf.push_str(
            &ALL_ACTIONS
                .iter()
                .map(|a| format_action(*a))
                .collect::<Vec<_>>()
                .join(", "),
        );
        buf.push_str("\n\n");
        for action in ALL_ACTIONS {
            let mut keys: Vec<String> = self
                .bindings
                .iter()
                .filter(|(_, a)| **a == action)
                .map(|((m, c), _)| Self::format_key(*m, *c))
                .collect();
            keys.sort();
            keys.dedup();
            for k in keys {
                let _ = writeln!(&mut buf, "{} = {}", format_action(action), k);
            }
        }
        std::fs::write(path, buf)
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Keys bound to `action`, formatted for help text.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| match c {
                KeyCode::BackTab => "Shift+Tab".to_string(),
                _ => Self::format_key(*m, *c),
            })
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Format a key (modifiers + code) into a spec like "Ctrl+q" or "BackTab".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else if mods.contains(KeyModifiers::SHIFT) && !matches!(code, BackTab) {
            format!("Shift+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let mut rest = spec.trim();
    let mut mods = KeyModifiers::NONE;
    loop {
        if let Some(after) = rest.strip_prefix("Ctrl+") {
            mods |= KeyModifiers::CONTROL;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("Shift+") {
            mods |= KeyModifiers::SHIFT;
            rest = after;
        } else {
            break;
        }
    }
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    ALL_ACTIONS
        .iter()
        .copied()
        .find(|a| format_action(*a) == s.trim())
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::CycleStatusFilter => "CycleStatusFilter",
        KeyAction::NewUser => "NewUser",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::OpenSelection => "OpenSelection",
        KeyAction::NextTab => "NextTab",
        KeyAction::PrevTab => "PrevTab",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PrevPage => "PrevPage",
        KeyAction::NextPage => "NextPage",
        KeyAction::Refresh => "Refresh",
        KeyAction::Logout => "Logout",
        KeyAction::Back => "Back",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(mods: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_cover_core_keys() {
        let km = Keymap::default();
        assert_eq!(km.resolve(&ev(KeyModifiers::NONE, KeyCode::Char('/'))), Some(KeyAction::StartSearch));
        assert_eq!(km.resolve(&ev(KeyModifiers::NONE, KeyCode::Char('f'))), Some(KeyAction::CycleStatusFilter));
        assert_eq!(km.resolve(&ev(KeyModifiers::SHIFT, KeyCode::Char('L'))), Some(KeyAction::Logout));
        assert_eq!(km.resolve(&ev(KeyModifiers::NONE, KeyCode::Delete)), Some(KeyAction::DeleteSelection));
        assert_eq!(km.resolve(&ev(KeyModifiers::CONTROL, KeyCode::Char('z'))), None);
    }

    #[test]
    fn overrides_use_either_order() {
        let km = Keymap::parse("Quit = Ctrl+x\nz = Refresh\n# comment\nnonsense\n");
        assert_eq!(km.resolve(&ev(KeyModifiers::CONTROL, KeyCode::Char('x'))), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&ev(KeyModifiers::NONE, KeyCode::Char('z'))), Some(KeyAction::Refresh));
        // defaults survive
        assert_eq!(km.resolve(&ev(KeyModifiers::NONE, KeyCode::Char('q'))), Some(KeyAction::Quit));
    }

    #[test]
    fn written_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.conf");
        let km = Keymap::parse("NewUser = Ctrl+n");
        km.write_file(&path).unwrap();
        let back = Keymap::from_file(&path).unwrap();
        let mut a = km.all_pairs();
        let mut b = back.all_pairs();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn key_specs_format() {
        assert_eq!(Keymap::format_key(KeyModifiers::CONTROL, KeyCode::Char('q')), "Ctrl+q");
        assert_eq!(Keymap::format_key(KeyModifiers::SHIFT, KeyCode::BackTab), "BackTab");
        assert_eq!(parse_key("Shift+L"), Some((KeyModifiers::SHIFT, KeyCode::Char('L'))));
        assert_eq!(parse_key("F13"), None);
    }

    impl Keymap {
        fn all_pairs(&self) -> Vec<(String, &'static str)> {
            self.bindings
                .iter()
                .map(|((m, c), a)| (Keymap::format_key(*m, *c), format_action(*a)))
                .collect()
        }
    }
}
