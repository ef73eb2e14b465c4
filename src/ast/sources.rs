use crate::ast::SourceOp;

/// Selection predicate derived from the FROM clause.
///
/// Sources describe which notes a query ranges over before any WHERE
/// filtering applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Notes under a folder path
    ///
    /// # Example
    /// ```text
    /// FROM "projects/active"
    /// ```
    Folder(String),

    /// Notes carrying a tag (leading `#` already stripped)
    ///
    /// # Example
    /// ```text
    /// FROM #task
    /// ```
    Tag(String),

    /// Notes linking to a target note
    ///
    /// # Example
    /// ```text
    /// FROM [[Inbox]]
    /// ```
    Link(String),

    /// Negated source (`!` or `-` prefix)
    ///
    /// # Example
    /// ```text
    /// FROM #task and !#done
    /// ```
    Negated(Box<Source>),

    /// Two sources combined with `and`/`or`
    BinaryOp {
        op: SourceOp,
        left: Box<Source>,
        right: Box<Source>,
    },

    /// No source restriction
    ///
    /// Produced by a missing FROM clause or an empty folder path (`FROM ""`);
    /// contributes no predicate to the output configuration.
    Empty,
}
