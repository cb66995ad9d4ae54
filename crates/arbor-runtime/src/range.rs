use std::fmt;

use crate::qualified_name::ModuleName;

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Position {
    pub line: u32,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Position {
    pub fn new(line: u32, column: usize) -> Self {
        Position { line, column }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    pub fn contains(&self, position: &Position) -> bool {
        (self.start.line < position.line
            || (self.start.line == position.line && self.start.column <= position.column))
            && (self.end.line > position.line
                || (self.end.line == position.line && self.end.column >= position.column))
    }
}

/// A location inside the source of a module, attached to nodes and frames so that
/// faults raised while running them can be reported against the code that produced them.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct SourceSection {
    pub module: ModuleName,
    pub range: Range,
}

impl SourceSection {
    pub fn new(module: ModuleName, range: Range) -> Self {
        Self { module, range }
    }
}

impl fmt::Display for SourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.module, self.range.start.line, self.range.start.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::inside(Position::new(2, 5), true)]
    #[case::at_start(Position::new(1, 3), true)]
    #[case::at_end(Position::new(3, 1), true)]
    #[case::before(Position::new(1, 2), false)]
    #[case::after(Position::new(3, 2), false)]
    fn test_range_contains(#[case] position: Position, #[case] expected: bool) {
        let range = Range::new(Position::new(1, 3), Position::new(3, 1));
        assert_eq!(range.contains(&position), expected);
    }

    #[test]
    fn test_source_section_display() {
        let section = SourceSection::new(
            "Standard.Base".into(),
            Range::new(Position::new(4, 2), Position::new(4, 10)),
        );
        assert_eq!(section.to_string(), "Standard.Base:4:2");
    }
}
