//! Declared structure of a leveled map: number of levels and level names.

use crate::error::MapError;
use std::collections::HashSet;
use std::sync::Arc;

/// Separator used when joining the names of flattened levels
pub const FLATTENED_LEVEL_NAME_SEPARATOR: &str = "___";

/// Number of levels plus optional level names.
///
/// Names are stored once in a shared slice; a descendant's shape points into
/// the same slice at a larger offset, so walking down a map never copies
/// names.
#[derive(Debug, Clone)]
pub struct Shape {
    levels: usize,
    names: Option<Arc<[String]>>,
    offset: usize,
}

impl Shape {
    /// Unnamed shape with the given number of levels
    pub fn new(levels: usize) -> Result<Self, MapError> {
        if levels == 0 {
            return Err(MapError::shape("levels must be at least 1"));
        }
        Ok(Self {
            levels,
            names: None,
            offset: 0,
        })
    }

    /// Named shape; the number of levels is the number of names
    pub fn named<I, S>(names: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::with_names(names.len(), Some(names))
    }

    /// Shape with explicit levels and optional names, validated together
    pub fn with_names(levels: usize, names: Option<Vec<String>>) -> Result<Self, MapError> {
        let mut shape = Self::new(levels)?;
        if let Some(names) = names {
            if names.len() != levels {
                return Err(MapError::shape(format!(
                    "{} level names given for {} levels",
                    names.len(),
                    levels
                )));
            }
            let mut seen = HashSet::new();
            for name in &names {
                if !seen.insert(name.as_str()) {
                    return Err(MapError::shape(format!(
                        "duplicate level name '{}'",
                        name
                    )));
                }
            }
            shape.names = Some(names.into());
        }
        Ok(shape)
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn has_names(&self) -> bool {
        self.names.is_some()
    }

    /// Explicitly set names, if any
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref().map(|names| &names[self.offset..])
    }

    /// Effective level names: explicit names, or `level0`, `level1`, ...
    pub fn level_names(&self) -> Vec<String> {
        match self.names() {
            Some(names) => names.to_vec(),
            None => (0..self.levels).map(|i| format!("level{}", i)).collect(),
        }
    }

    /// Effective name of one level
    pub fn level_name(&self, level: usize) -> Option<String> {
        if level >= self.levels {
            return None;
        }
        Some(match self.names() {
            Some(names) => names[level].clone(),
            None => format!("level{}", level),
        })
    }

    /// Shape of the maps one level down, `None` at the leaf level
    pub fn tail(&self) -> Option<Shape> {
        self.descend(1)
    }

    /// Shape of the maps `depth` levels down (`descend(0)` is a copy)
    pub fn descend(&self, depth: usize) -> Option<Shape> {
        if depth >= self.levels {
            return None;
        }
        Some(Shape {
            levels: self.levels - depth,
            names: self.names.clone(),
            offset: self.offset + depth,
        })
    }

    /// Wrap a possibly negative level index into `0..levels`
    pub fn wrap_level(&self, level: isize) -> Result<usize, MapError> {
        wrap_level(level, self.levels)
    }

    /// Index of a level by its effective name
    pub fn position(&self, name: &str) -> Result<usize, MapError> {
        (0..self.levels)
            .find(|&i| self.level_name(i).as_deref() == Some(name))
            .ok_or_else(|| MapError::UnknownLevelName(name.to_string()))
    }

    /// Effective names of the first `count` levels, shared for tuple keys
    pub(crate) fn prefix_names(&self, count: usize) -> Arc<[String]> {
        let names = self.level_names();
        names[..count.min(names.len())].to_vec().into()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels && self.names() == other.names()
    }
}

impl Eq for Shape {}

/// Wrap a level argument given the number of allowed levels.
///
/// Negative values count from the end (`-1` is `allowed - 1`). The result
/// must land in `0..allowed`.
pub fn wrap_level(level: isize, allowed: usize) -> Result<usize, MapError> {
    let wrapped = if level < 0 {
        allowed as isize + level
    } else {
        level
    };
    if wrapped < 0 || wrapped as usize >= allowed {
        return Err(MapError::Level { level, allowed });
    }
    Ok(wrapped as usize)
}
