//! Text rendering: indented tree strings and the `Display` representation.

use super::{LeveledMap, Node};
use crate::config::{KeyMode, RenderConfig, ValueMode};
use crate::key::Key;
use std::fmt;

/// Type name with module paths stripped, e.g. `Vec<String>`
fn short_type_name<V>() -> String {
    let full = std::any::type_name::<V>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Quoted key form used by the `Display` representation
fn key_repr(key: &Key) -> String {
    match key {
        Key::Str(s) => format!("'{}'", s),
        Key::Tuple(t) => {
            let parts: Vec<String> = t.parts().iter().map(key_repr).collect();
            if parts.len() == 1 {
                format!("({},)", parts[0])
            } else {
                format!("({})", parts.join(", "))
            }
        }
        other => other.to_string(),
    }
}

fn render_key(key: &Key, mode: KeyMode) -> String {
    match mode {
        KeyMode::Str => key.to_string(),
        KeyMode::Repr => key_repr(key),
        KeyMode::Type => match key {
            Key::Bool(_) => "bool",
            Key::Int(_) => "int",
            Key::Str(_) => "str",
            Key::Tuple(_) => "tuple",
        }
        .to_string(),
    }
}

impl<V: fmt::Debug> LeveledMap<V> {
    /// Tree view with the default rendering options
    pub fn to_tree_string(&self) -> String {
        self.to_tree_string_with(&RenderConfig::default())
    }

    /// Tree view: one line per key, branches as `key:`, leaves as
    /// `key: value`. Keys below the top level are prefixed by
    /// `indent * (level - 1)` and the branch marker.
    ///
    /// `ValueMode::Str` needs `Display`; here it renders the `Debug` form.
    /// Use [`LeveledMap::to_tree_string_display`] for the plain text form.
    pub fn to_tree_string_with(&self, config: &RenderConfig) -> String {
        let mut out = String::new();
        self.render_level(0, config, &|value: &V| format!("{:?}", value), &mut out);
        out
    }

    fn render_level(
        &self,
        level: usize,
        config: &RenderConfig,
        as_str: &dyn Fn(&V) -> String,
        out: &mut String,
    ) {
        let prefix = if level > 0 {
            format!("{}{}", config.indent.repeat(level - 1), config.branch_marker)
        } else {
            String::new()
        };
        for (key, node) in self.entries.iter() {
            let key = render_key(key, config.key_mode);
            match node {
                Node::Branch(child) => {
                    out.push_str(&format!("{}{}:\n", prefix, key));
                    child.render_level(level + 1, config, as_str, out);
                }
                Node::Leaf(value) => {
                    let line = match config.value_mode {
                        ValueMode::Type => {
                            format!("{}{}: {}\n", prefix, key, short_type_name::<V>())
                        }
                        ValueMode::Debug => format!("{}{}: {:?}\n", prefix, key, value),
                        ValueMode::Hidden => format!("{}{}\n", prefix, key),
                        ValueMode::Str => format!("{}{}: {}\n", prefix, key, as_str(value)),
                    };
                    out.push_str(&line);
                }
            }
        }
    }

    fn fmt_entries(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, node)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: ", key_repr(key))?;
            match node {
                Node::Branch(child) => child.fmt_entries(f)?,
                Node::Leaf(value) => write!(f, "{:?}", value)?,
            }
        }
        f.write_str("}")
    }
}

impl<V: fmt::Debug + fmt::Display> LeveledMap<V> {
    /// Like [`LeveledMap::to_tree_string_with`], with `ValueMode::Str`
    /// rendering values through `Display`
    pub fn to_tree_string_display(&self, config: &RenderConfig) -> String {
        let mut out = String::new();
        self.render_level(0, config, &|value: &V| value.to_string(), &mut out);
        out
    }
}

impl<V: fmt::Debug> fmt::Display for LeveledMap<V> {
    /// `LeveledMap({...}, levels=N)`, plus `level_names=(...)` when names
    /// were set
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LeveledMap(")?;
        self.fmt_entries(f)?;
        write!(f, ", levels={}", self.levels())?;
        if let Some(names) = self.shape.names() {
            let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
            if quoted.len() == 1 {
                write!(f, ", level_names=({},)", quoted[0])?;
            } else {
                write!(f, ", level_names=({})", quoted.join(", "))?;
            }
        }
        f.write_str(")")
    }
}
