use std::fmt;

/// Extension point implemented by query types that can carry a trace tag.
///
/// Generated dispatch code calls `tag_with` with either a `#xxxxxxxx` hash
/// tag or, for unmapped call sites, the raw location key.
pub trait TagWith: Sized {
    fn tag_with(self, tag: &str) -> Self;
}

/// Raw SQL text: the tag is prepended as a line comment
impl TagWith for String {
    fn tag_with(self, tag: &str) -> Self {
        let mut tagged = String::with_capacity(tag.len() + self.len() + 4);
        for line in tag.lines() {
            tagged.push_str("-- ");
            tagged.push_str(line);
            tagged.push('\n');
        }
        tagged.push_str(&self);
        tagged
    }
}

/// A query paired with the tags attached to it, in attachment order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedQuery<Q> {
    query: Q,
    tags: Vec<String>,
}

impl<Q> TaggedQuery<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            tags: Vec::new(),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn into_inner(self) -> Q {
        self.query
    }
}

impl<Q> TagWith for TaggedQuery<Q> {
    fn tag_with(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }
}

impl<Q: fmt::Display> fmt::Display for TaggedQuery<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            writeln!(f, "-- {}", tag)?;
        }
        write!(f, "{}", self.query)
    }
}
