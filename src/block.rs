use std::fmt::{Display, Formatter};

/// Payload of a project tree node.
///
/// Objects (stage and sprites) carry only a name. Everything found inside a
/// scripts section carries a block name as well, which is what gets rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Object(String),
    Call(String),
    /// Single-character operator such as `=` or `+`. Sits beside its own
    /// arguments instead of above them.
    Primitive(String),
    Literal(String),
}

impl Block {
    /// Classifies the head string of a bracketed list.
    pub fn from_opcode(opcode: String) -> Self {
        if opcode.chars().count() == 1 {
            Block::Primitive(opcode)
        } else {
            Block::Call(opcode)
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Block::Object(name)
            | Block::Call(name)
            | Block::Primitive(name)
            | Block::Literal(name) => name,
        }
    }

    pub fn block_name(&self) -> Option<&str> {
        match self {
            Block::Object(_) => None,
            Block::Call(name) | Block::Primitive(name) | Block::Literal(name) => Some(name),
        }
    }

    /// True when this block opens a nesting level for its arguments.
    pub fn opens_scope(&self) -> bool {
        matches!(self, Block::Object(_) | Block::Call(_))
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.block_name().unwrap_or_else(|| self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_character_opcodes_are_primitives() {
        assert_eq!(Block::from_opcode("=".into()), Block::Primitive("=".into()));
        assert_eq!(Block::from_opcode("doIf".into()), Block::Call("doIf".into()));
        // one char, several bytes
        assert_eq!(Block::from_opcode("é".into()), Block::Primitive("é".into()));
    }

    #[test]
    fn objects_have_no_block_name() {
        let stage = Block::Object("Stage".into());
        assert_eq!(stage.block_name(), None);
        assert_eq!(stage.to_string(), "Stage");
        assert!(stage.opens_scope());

        let op = Block::Primitive("<".into());
        assert_eq!(op.block_name(), Some("<"));
        assert!(!op.opens_scope());
    }
}
