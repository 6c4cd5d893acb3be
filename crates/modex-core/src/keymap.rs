//! Keyboard mapping and input handling.
//!
//! ## Learning: Data-Driven Bindings
//!
//! Normal-mode keys do not live in a big `match` inside the handler.
//! They live in a table of `KeyPress -> Action`, so a config file can
//! rebind them, and Visual mode can reuse the same table for its motions.
//!
//! Insert and Command mode keys are not in the table: there, every printable
//! key means "this character", which is not something users rebind.

use crate::config::Config;
use std::collections::HashMap;
use std::str::FromStr;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
    };

    /// Alt modifier.
    pub const ALT: Modifiers = Modifiers {
        ctrl: false,
        alt: true,
        shift: false,
    };

    /// Shift modifier.
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift
    }

    /// Parses modifiers from a string like "ctrl+alt".
    pub fn parse(s: &str) -> Self {
        let mut mods = Modifiers::NONE;
        let lower = s.to_lowercase();
        if lower.contains("ctrl") || lower.contains("control") {
            mods.ctrl = true;
        }
        if lower.contains("alt") || lower.contains("meta") {
            mods.alt = true;
        }
        if lower.contains("shift") {
            mods.shift = true;
        }
        mods
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
///
/// Space is `Char(' ')`: in Insert and Command mode it is just text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// Parses a key name such as `esc`, `cr`, `pgdn` or a single character.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(ch));
        }
        match s.to_lowercase().as_str() {
            "enter" | "return" | "cr" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "backspace" | "bs" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "escape" | "esc" => Some(Key::Escape),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdn" => Some(Key::PageDown),
            "space" => Some(Key::Char(' ')),
            "lt" => Some(Key::Char('<')),
            "bar" => Some(Key::Char('|')),
            _ => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "Space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Escape => write!(f, "Escape"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// An unmodified key.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// An unmodified character.
    pub fn char(ch: char) -> Self {
        Self::plain(Key::Char(ch))
    }

    /// Ctrl plus a character.
    pub fn ctrl(ch: char) -> Self {
        Self::new(Key::Char(ch), Modifiers::CTRL)
    }

    /// Folds Shift into a printable character, so `Shift+a` is `A`.
    ///
    /// Chords that also hold Ctrl or Alt are left alone.
    pub fn normalized(self) -> Self {
        match self.key {
            Key::Char(ch) if self.modifiers == Modifiers::SHIFT => {
                let mut upper = ch.to_uppercase();
                let ch = match (upper.next(), upper.next()) {
                    (Some(single), None) => single,
                    _ => ch,
                };
                Self::char(ch)
            }
            _ => self,
        }
    }

    /// The character this key types, if it types one.
    ///
    /// Shift upper-cases the character; Ctrl and Alt chords type nothing.
    pub fn text_char(&self) -> Option<char> {
        let key = self.normalized();
        match key.key {
            Key::Char(ch) if !key.modifiers.ctrl && !key.modifiers.alt => Some(ch),
            _ => None,
        }
    }

    /// Parses a key binding string like "ctrl+r" or "G".
    pub fn parse(s: &str) -> Option<Self> {
        // A lone "+" is the plus key, not an empty chord
        if s == "+" {
            return Some(Self::char('+'));
        }
        let parts: Vec<&str> = s.split('+').collect();
        let key_str = parts.last()?;
        let key = Key::parse(key_str)?;

        let mod_str = parts[..parts.len() - 1].join("+");
        let modifiers = Modifiers::parse(&mod_str);

        Some(Self { key, modifiers })
    }

    /// Parses a key sequence in Vim notation: `ihello<Esc>:w<CR>`.
    ///
    /// Recognized brackets are key names (`<Esc>`, `<CR>`, `<BS>`, `<Del>`,
    /// `<Tab>`, `<Up>`, `<Space>`, `<lt>`, ...) optionally prefixed with
    /// `C-`, `A-`/`M-` or `S-`. Anything else, including a `<` with no
    /// matching `>`, is taken literally.
    pub fn parse_sequence(s: &str) -> Vec<KeyPress> {
        let mut keys = Vec::new();
        let mut rest = s;
        while let Some(ch) = rest.chars().next() {
            if ch == '<' {
                if let Some(close) = rest.find('>') {
                    if let Some(key) = Self::parse_bracketed(&rest[1..close]) {
                        keys.push(key);
                        rest = &rest[close + 1..];
                        continue;
                    }
                }
            }
            keys.push(Self::char(ch));
            rest = &rest[ch.len_utf8()..];
        }
        keys
    }

    fn parse_bracketed(name: &str) -> Option<KeyPress> {
        let mut modifiers = Modifiers::NONE;
        let mut name = name;
        while let Some((prefix, rest)) = name.split_once('-') {
            if rest.is_empty() {
                break;
            }
            match prefix {
                "C" | "c" => modifiers.ctrl = true,
                "A" | "a" | "M" | "m" => modifiers.alt = true,
                "S" | "s" => modifiers.shift = true,
                _ => return None,
            }
            name = rest;
        }
        if name.chars().count() == 1 && modifiers.is_empty() {
            // `<x>` is not a key name
            return None;
        }
        let key = match Key::parse(name)? {
            Key::Char(ch) if modifiers.ctrl => Key::Char(ch.to_ascii_lowercase()),
            key => key,
        };
        Some(KeyPress::new(key, modifiers))
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

impl From<char> for KeyPress {
    fn from(ch: char) -> Self {
        Self::char(ch)
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

/// Normal-mode actions.
///
/// Motions are shared with Visual mode, where they extend the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Motions
    MoveLeft,
    MoveDown,
    MoveUp,
    MoveRight,
    WordForward,
    WordBackward,
    WordEnd,
    LineStart,
    LineEnd,
    FirstLine,
    LastLine,
    PageDown,
    PageUp,

    // Operators
    DeleteChar,
    DeleteLine,
    YankLine,
    PutAfter,
    PutBefore,
    Undo,
    Redo,

    // Mode entry
    InsertBefore,
    InsertLineStart,
    Append,
    AppendLineEnd,
    OpenBelow,
    OpenAbove,
    VisualMode,
    CommandMode,
}

impl Action {
    const ALL: &'static [Action] = &[
        Action::MoveLeft,
        Action::MoveDown,
        Action::MoveUp,
        Action::MoveRight,
        Action::WordForward,
        Action::WordBackward,
        Action::WordEnd,
        Action::LineStart,
        Action::LineEnd,
        Action::FirstLine,
        Action::LastLine,
        Action::PageDown,
        Action::PageUp,
        Action::DeleteChar,
        Action::DeleteLine,
        Action::YankLine,
        Action::PutAfter,
        Action::PutBefore,
        Action::Undo,
        Action::Redo,
        Action::InsertBefore,
        Action::InsertLineStart,
        Action::Append,
        Action::AppendLineEnd,
        Action::OpenBelow,
        Action::OpenAbove,
        Action::VisualMode,
        Action::CommandMode,
    ];

    /// Name used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Action::MoveLeft => "move_left",
            Action::MoveDown => "move_down",
            Action::MoveUp => "move_up",
            Action::MoveRight => "move_right",
            Action::WordForward => "word_forward",
            Action::WordBackward => "word_backward",
            Action::WordEnd => "word_end",
            Action::LineStart => "line_start",
            Action::LineEnd => "line_end",
            Action::FirstLine => "first_line",
            Action::LastLine => "last_line",
            Action::PageDown => "page_down",
            Action::PageUp => "page_up",
            Action::DeleteChar => "delete_char",
            Action::DeleteLine => "delete_line",
            Action::YankLine => "yank_line",
            Action::PutAfter => "put_after",
            Action::PutBefore => "put_before",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::InsertBefore => "insert",
            Action::InsertLineStart => "insert_line_start",
            Action::Append => "append",
            Action::AppendLineEnd => "append_line_end",
            Action::OpenBelow => "open_below",
            Action::OpenAbove => "open_above",
            Action::VisualMode => "visual_mode",
            Action::CommandMode => "command_mode",
        }
    }

    /// Returns true for cursor motions.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Action::MoveLeft
                | Action::MoveDown
                | Action::MoveUp
                | Action::MoveRight
                | Action::WordForward
                | Action::WordBackward
                | Action::WordEnd
                | Action::LineStart
                | Action::LineEnd
                | Action::FirstLine
                | Action::LastLine
                | Action::PageDown
                | Action::PageUp
        )
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A key binding maps a key to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub action: Action,
}

/// Normal-mode binding table.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyPress, Action>,
}

impl Keymap {
    /// Creates a keymap with the default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// Invalid entries are skipped with a warning; they never prevent the
    /// editor from starting.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (key_str, action_str) in &config.keyboard.bindings {
            let Some(key) = KeyPress::parse(key_str) else {
                tracing::warn!("Ignoring binding for unknown key {:?}", key_str);
                continue;
            };
            match action_str.parse::<Action>() {
                Ok(action) => keymap.bind(key, action),
                Err(e) => tracing::warn!("Ignoring binding {:?}: {}", key_str, e),
            }
        }

        keymap
    }

    /// Adds default key bindings.
    fn add_default_bindings(&mut self) {
        use Action::*;

        let chars = [
            ('h', MoveLeft),
            ('j', MoveDown),
            ('k', MoveUp),
            ('l', MoveRight),
            ('w', WordForward),
            ('b', WordBackward),
            ('e', WordEnd),
            ('0', LineStart),
            ('$', LineEnd),
            ('g', FirstLine),
            ('G', LastLine),
            ('x', DeleteChar),
            ('d', DeleteLine),
            ('y', YankLine),
            ('p', PutAfter),
            ('P', PutBefore),
            ('u', Undo),
            ('i', InsertBefore),
            ('I', InsertLineStart),
            ('a', Append),
            ('A', AppendLineEnd),
            ('o', OpenBelow),
            ('O', OpenAbove),
            ('v', VisualMode),
            (':', CommandMode),
        ];
        for (ch, action) in chars {
            self.bind(KeyPress::char(ch), action);
        }

        let keys = [
            (KeyPress::plain(Key::Left), MoveLeft),
            (KeyPress::plain(Key::Down), MoveDown),
            (KeyPress::plain(Key::Up), MoveUp),
            (KeyPress::plain(Key::Right), MoveRight),
            (KeyPress::plain(Key::Home), LineStart),
            (KeyPress::plain(Key::End), LineEnd),
            (KeyPress::plain(Key::PageDown), PageDown),
            (KeyPress::plain(Key::PageUp), PageUp),
            (KeyPress::ctrl('f'), PageDown),
            (KeyPress::ctrl('b'), PageUp),
            (KeyPress::ctrl('r'), Redo),
        ];
        for (key, action) in keys {
            self.bind(key, action);
        }
    }

    /// Binds a key, replacing any previous binding.
    pub fn bind(&mut self, key: KeyPress, action: Action) {
        self.bindings.insert(key.normalized(), action);
    }

    /// Removes a binding.
    pub fn unbind(&mut self, key: &KeyPress) -> Option<Action> {
        self.bindings.remove(&key.normalized())
    }

    /// Looks up the action bound to a key.
    pub fn action_for(&self, key: &KeyPress) -> Option<Action> {
        self.bindings.get(&key.normalized()).copied()
    }

    /// Returns all bindings, sorted by action then key for stable output.
    pub fn bindings(&self) -> Vec<KeyBinding> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(&key, &action)| KeyBinding { key, action })
            .collect();
        bindings.sort_by_key(|b| (b.action.name(), b.key.to_string()));
        bindings
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
