use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt;

/// Separator between the module, type and method parts of a method's qualified name.
pub const METHOD_SEPARATOR: &str = "::";

/// A dot separated path such as `Standard.Base.Data.Vector`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct QualifiedName {
    segments: SmallVec<[SmolStr; 4]>,
}

/// Modules are addressed by their qualified path.
pub type ModuleName = QualifiedName;

impl QualifiedName {
    pub fn new(segments: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn simple(name: impl Into<SmolStr>) -> Self {
        Self::new([name])
    }

    pub fn parse(text: &str) -> Self {
        Self::new(text.split('.').filter(|segment| !segment.is_empty()))
    }

    /// The last segment of the path.
    pub fn item(&self) -> &str {
        self.segments.last().map(SmolStr::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<QualifiedName> {
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self {
                segments: rest.iter().cloned().collect(),
            }),
            _ => None,
        }
    }

    pub fn create_child(&self, name: impl Into<SmolStr>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for QualifiedName {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for QualifiedName {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Standard.Base", "Base", Some("Standard"))]
    #[case("Vector", "Vector", None)]
    #[case("Standard.Base.Data.Vector.Vector", "Vector", Some("Standard.Base.Data.Vector"))]
    fn test_parse(#[case] text: &str, #[case] item: &str, #[case] parent: Option<&str>) {
        let name = QualifiedName::parse(text);
        assert_eq!(name.to_string(), text);
        assert_eq!(name.item(), item);
        assert_eq!(name.parent().map(|p| p.to_string()).as_deref(), parent);
    }

    #[test]
    fn test_create_child() {
        let module = QualifiedName::parse("Standard.Base");
        assert_eq!(module.create_child("Time").to_string(), "Standard.Base.Time");
        assert_eq!(module.to_string(), "Standard.Base");
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let name = QualifiedName::parse("a..b.");
        assert_eq!(name.segments().len(), 2);
        assert_eq!(QualifiedName::parse("").item(), "");
    }
}
