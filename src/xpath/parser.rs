//! Path Parser
//!
//! Turns a `/`-separated path into a flat list of steps. `//` marks the step
//! after it as recursive (searched at every depth below the context node).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What a step selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepTest {
    /// `*` - any element
    Any,
    /// A literal element name
    Name(String),
    /// `@name` - an attribute of the context element
    Attribute(String),
}

/// One step of a compiled path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub test: StepTest,
    /// Set when the step was preceded by `//`
    pub recursive: bool,
}

impl Step {
    fn parse(segment: &str, recursive: bool) -> Self {
        let test = match segment {
            "*" => StepTest::Any,
            _ => match segment.strip_prefix('@') {
                Some(attr) => StepTest::Attribute(attr.to_string()),
                None => StepTest::Name(segment.to_string()),
            },
        };
        Step { test, recursive }
    }
}

/// Errors reported by strict path compilation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path has no steps")]
    Empty,

    #[error("attribute step {position} has no name")]
    EmptyName { position: usize },

    #[error("attribute step {position} must be the last step")]
    AttributeNotLast { position: usize },
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Compile a path, accepting any input
    ///
    /// Leading slashes are ignored, so `/a/b` and `a/b` are the same path
    /// relative to the node they are applied to.
    pub fn compile(path: &str) -> Self {
        let mut steps = Vec::new();
        let mut recursive = false;
        for (i, segment) in path.split('/').enumerate() {
            if segment.is_empty() {
                // An empty segment after the first comes from `//`
                recursive |= i > 0;
                continue;
            }
            steps.push(Step::parse(segment, recursive));
            recursive = false;
        }
        log::trace!("compiled path '{}' into {} steps", path, steps.len());
        Path { steps }
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True if any step searches below the direct children
    pub fn has_recursion(&self) -> bool {
        self.steps.iter().any(|s| s.recursive)
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Path::compile(path)
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Compile a path, rejecting paths that can never be meaningful
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = Path::compile(s);
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let last = path.steps.len() - 1;
        for (position, step) in path.steps.iter().enumerate() {
            if let StepTest::Attribute(name) = &step.test {
                if name.is_empty() {
                    return Err(PathError::EmptyName { position });
                }
                if position != last {
                    return Err(PathError::AttributeNotLast { position });
                }
            }
        }
        Ok(path)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            f.write_str(if step.recursive { "//" } else { "/" })?;
            match &step.test {
                StepTest::Any => f.write_str("*")?,
                StepTest::Name(name) => f.write_str(name)?,
                StepTest::Attribute(name) => write!(f, "@{}", name)?,
            }
        }
        Ok(())
    }
}
