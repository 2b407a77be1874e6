//! Logic concepts handed to the validation engine.
//!
//! Only the construction surface is modelled: environments that carry named
//! boolean attributes and ordered children, plus opaque expression leaves.

use std::collections::BTreeSet;

/// Named boolean attribute on a logic concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LcAttribute {
    Given,
    Rule,
    Theorem,
    Hint,
}

impl LcAttribute {
    /// Attribute name as the validation engine spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::Rule => "Rule",
            Self::Theorem => "theorem",
            Self::Hint => "hint",
        }
    }
}

/// Environment node with ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    attributes: BTreeSet<LcAttribute>,
    children: Vec<LogicConcept>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children(children: Vec<LogicConcept>) -> Self {
        Self {
            attributes: BTreeSet::new(),
            children,
        }
    }

    pub fn push_child(&mut self, child: LogicConcept) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[LogicConcept] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [LogicConcept] {
        &mut self.children
    }
}

/// Opaque expression leaf (the engine parses `text`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    pub text: String,
    attributes: BTreeSet<LcAttribute>,
}

impl Expression {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: BTreeSet::new(),
        }
    }
}

/// Logic concept tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicConcept {
    Environment(Environment),
    Expression(Expression),
}

impl LogicConcept {
    fn attributes(&self) -> &BTreeSet<LcAttribute> {
        match self {
            Self::Environment(env) => &env.attributes,
            Self::Expression(expr) => &expr.attributes,
        }
    }

    fn attributes_mut(&mut self) -> &mut BTreeSet<LcAttribute> {
        match self {
            Self::Environment(env) => &mut env.attributes,
            Self::Expression(expr) => &mut expr.attributes,
        }
    }

    /// Tags this concept with `attribute`. Idempotent.
    pub fn make_into_a(&mut self, attribute: LcAttribute) {
        self.attributes_mut().insert(attribute);
    }

    pub fn unmake_into_a(&mut self, attribute: LcAttribute) {
        self.attributes_mut().remove(&attribute);
    }

    pub fn is_a(&self, attribute: LcAttribute) -> bool {
        self.attributes().contains(&attribute)
    }

    /// Children of an environment; expressions have none.
    pub fn children(&self) -> &[LogicConcept] {
        match self {
            Self::Environment(env) => env.children(),
            Self::Expression(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [LogicConcept] {
        match self {
            Self::Environment(env) => env.children_mut(),
            Self::Expression(_) => &mut [],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Environment, Expression, LcAttribute, LogicConcept};

    #[test]
    fn attributes_are_idempotent_flags() {
        let mut lc = LogicConcept::Environment(Environment::new());
        lc.make_into_a(LcAttribute::Given);
        lc.make_into_a(LcAttribute::Given);
        assert!(lc.is_a(LcAttribute::Given));
        assert!(!lc.is_a(LcAttribute::Rule));

        lc.unmake_into_a(LcAttribute::Given);
        assert!(!lc.is_a(LcAttribute::Given));
    }

    #[test]
    fn expressions_have_no_children() {
        let lc = LogicConcept::Expression(Expression::new("x = 1"));
        assert!(lc.children().is_empty());
        assert_eq!(LcAttribute::Rule.as_str(), "Rule");
    }
}
