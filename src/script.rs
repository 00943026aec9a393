use crate::block::Block;
use crate::error::ScanError;
use crate::tree::{NodeId, Tree};

/// One open `[` and the node that calls found inside it hang from.
#[derive(Debug, Clone, Copy)]
struct Frame {
    attach: NodeId,
    awaiting_head: bool,
}

#[derive(Debug, Default)]
struct Capture {
    text: String,
    is_head: bool,
    escaped: bool,
}

/// Character-level walker over one balanced scripts section.
///
/// A quoted string in the first slot of a list names a call. Calls open a
/// level for whatever else that list holds, single-character operators
/// (`=`, `+`, `<`) do not. Lists without a head (script tuples, substacks,
/// argument lists) are transparent. Other strings are literal arguments.
struct ScriptScanner<'t> {
    tree: &'t mut Tree<Block>,
    owner: NodeId,
    frames: Vec<Frame>,
    capture: Option<Capture>,
    opened: bool,
    include_literals: bool,
    calls: usize,
}

impl<'t> ScriptScanner<'t> {
    fn new(tree: &'t mut Tree<Block>, owner: NodeId, include_literals: bool) -> Self {
        Self {
            tree,
            owner,
            frames: Vec::new(),
            capture: None,
            opened: false,
            include_literals,
            calls: 0,
        }
    }

    /// Returns true once the outermost list has closed.
    fn step(&mut self, ch: char) -> Result<bool, ScanError> {
        if let Some(capture) = self.capture.as_mut() {
            if capture.escaped {
                capture.text.push(ch);
                capture.escaped = false;
            } else if ch == '\\' {
                capture.text.push(ch);
                capture.escaped = true;
            } else if ch == '"' {
                self.finish_string()?;
            } else {
                capture.text.push(ch);
            }
            return Ok(false);
        }

        match ch {
            '[' => self.open(),
            ']' => {
                self.frames.pop();
                return Ok(self.opened && self.frames.is_empty());
            }
            '"' => self.begin_string(),
            c if c.is_whitespace() => {}
            _ => self.fill_head(),
        }
        Ok(false)
    }

    fn open(&mut self) {
        let attach = match self.frames.last_mut() {
            Some(parent) => {
                parent.awaiting_head = false;
                parent.attach
            }
            None => self.owner,
        };
        self.frames.push(Frame {
            attach,
            awaiting_head: true,
        });
        self.opened = true;
    }

    fn begin_string(&mut self) {
        let is_head = self
            .frames
            .last()
            .map(|frame| frame.awaiting_head)
            .unwrap_or(false);
        self.fill_head();
        self.capture = Some(Capture {
            is_head,
            ..Capture::default()
        });
    }

    fn fill_head(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.awaiting_head = false;
        }
    }

    fn finish_string(&mut self) -> Result<(), ScanError> {
        let Some(capture) = self.capture.take() else {
            return Ok(());
        };
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if capture.is_head {
            if capture.text.is_empty() {
                return Ok(());
            }
            let block = Block::from_opcode(capture.text);
            let opens_scope = block.opens_scope();
            let id = self.tree.add_leaf(frame.attach, block)?;
            if opens_scope {
                frame.attach = id;
            }
            self.calls += 1;
        } else if self.include_literals {
            self.tree.add_leaf(frame.attach, Block::Literal(capture.text))?;
        }
        Ok(())
    }
}

/// Rebuilds the calls of one scripts section under `owner`.
///
/// `text` must start at (or before) the opening bracket of the section;
/// anything after its closing bracket is ignored. `line` is only used for
/// error reporting. Returns the number of call-level nodes added.
pub fn attach_script(
    tree: &mut Tree<Block>,
    owner: NodeId,
    text: &str,
    line: usize,
    include_literals: bool,
) -> Result<usize, ScanError> {
    let mut scanner = ScriptScanner::new(tree, owner, include_literals);
    for ch in text.chars() {
        if scanner.step(ch)? {
            return Ok(scanner.calls);
        }
    }
    let object = tree
        .payload(owner)
        .map(|block| block.name().to_string())
        .unwrap_or_default();
    Err(ScanError::UnbalancedScript { object, line })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Tree<Block> {
        scan_with(text, false)
    }

    fn scan_with(text: &str, literals: bool) -> Tree<Block> {
        let mut tree = Tree::new(Block::Object("Stage".into()), "test.sb2");
        let root = tree.root();
        attach_script(&mut tree, root, text, 1, literals).unwrap();
        tree
    }

    fn rendered(tree: &Tree<Block>) -> Vec<String> {
        tree.render_with(0, "-").collect()
    }

    #[test]
    fn single_hat_block() {
        let tree = scan(r#"[["whenGreenFlagClicked"]]"#);
        assert_eq!(rendered(&tree), vec!["Stage", "-whenGreenFlagClicked"]);
    }

    #[test]
    fn one_node_per_top_level_call() {
        let tree = scan(r#"[["a", ["b"]], ["c", 1], ["d", "x", ["e", ["f"]]]]"#);
        let names: Vec<String> = tree
            .children(tree.root())
            .iter()
            .filter_map(|id| tree.payload(*id))
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn children_follow_source_order() {
        let tree = scan(r#"[["a",["b"],"c"]]"#);
        assert_eq!(rendered(&tree), vec!["Stage", "-a", "--b"]);
    }

    #[test]
    fn stack_blocks_of_a_script_tuple_sit_under_the_object() {
        let tree = scan(
            r#"[[10, 20, [["whenGreenFlagClicked"], ["doForever", [["turnRight:", 15], ["forward:", 10]]]]]]"#,
        );
        assert_eq!(
            rendered(&tree),
            vec![
                "Stage",
                "-whenGreenFlagClicked",
                "-doForever",
                "--turnRight:",
                "--forward:",
            ]
        );
    }

    #[test]
    fn primitive_operator_does_not_add_depth() {
        let tree = scan(r#"[["doIf", ["=", ["answer"], "5"], [["say:", "yes"]]]]"#);
        assert_eq!(
            rendered(&tree),
            vec!["Stage", "-doIf", "--=", "--answer", "--say:"]
        );
        let do_if = tree.children(tree.root())[0];
        let deepest = tree.max_depth();
        assert_eq!(deepest, tree.depth(do_if) + 1);
    }

    #[test]
    fn compound_reporter_nests_its_arguments() {
        let tree = scan(r#"[["say:", ["concatenate:with:", ["answer"], "!"]]]"#);
        assert_eq!(
            rendered(&tree),
            vec!["Stage", "-say:", "--concatenate:with:", "---answer"]
        );
    }

    #[test]
    fn primitives_in_earlier_scripts_do_not_leak_into_later_ones() {
        let tree = scan(
            r#"[[0, 0, [["whenGreenFlagClicked"], ["doIf", ["<", ["timer"], 5]]]],
                [0, 90, [["whenKeyPressed", "space"], ["doIf", [">", ["timer"], 5]]]]]"#,
        );
        assert_eq!(
            rendered(&tree),
            vec![
                "Stage",
                "-whenGreenFlagClicked",
                "-doIf",
                "--<",
                "--timer",
                "-whenKeyPressed",
                "-doIf",
                "-->",
                "--timer",
            ]
        );
    }

    #[test]
    fn counts_compound_names_in_head_position() {
        let mut tree = Tree::new(Block::Object("Stage".into()), "t");
        let root = tree.root();
        let calls = attach_script(
            &mut tree,
            root,
            r#"[["whenGreenFlagClicked"], ["forward:", 10], ["doRepeat", 4, [["turnRight:", 90]]]]"#,
            1,
            false,
        )
        .unwrap();
        assert_eq!(calls, 4);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn brackets_inside_strings_are_text() {
        let tree = scan(r#"[["say:", "[not a list]"], ["think:", "a \"]\" b"]]"#);
        assert_eq!(rendered(&tree), vec!["Stage", "-say:", "-think:"]);
    }

    #[test]
    fn empty_head_names_are_skipped() {
        let mut tree = Tree::new(Block::Object("Stage".into()), "t");
        let root = tree.root();
        let calls =
            attach_script(&mut tree, root, r#"[[""], ["", ["forward:", 10]]]"#, 1, false).unwrap();
        assert_eq!(calls, 1);
        assert_eq!(tree.render_to_string(0, "-"), "Stage\n-forward:\n");
    }

    #[test]
    fn literals_can_be_kept() {
        let tree = scan_with(r#"[["say:", "Hello!"], ["forward:", 10]]"#, true);
        assert_eq!(
            rendered(&tree),
            vec!["Stage", "-say:", "--Hello!", "-forward:"]
        );
    }

    #[test]
    fn stops_at_the_closing_bracket() {
        let tree = scan("[[\"a\"]],\n\t\"sounds\": [[\"pop\"]]");
        assert_eq!(rendered(&tree), vec!["Stage", "-a"]);
    }

    #[test]
    fn whitespace_between_bracket_and_name_is_allowed() {
        let tree = scan("[\n  [\n    \"whenGreenFlagClicked\"\n  ]\n]");
        assert_eq!(rendered(&tree), vec!["Stage", "-whenGreenFlagClicked"]);
    }

    #[test]
    fn unterminated_section_is_an_error() {
        let mut tree = Tree::new(Block::Object("Sprite1".into()), "t");
        let root = tree.root();
        let err = attach_script(&mut tree, root, r#"[["a", ["b"]"#, 7, false).unwrap_err();
        match err {
            ScanError::UnbalancedScript { object, line } => {
                assert_eq!(object, "Sprite1");
                assert_eq!(line, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
