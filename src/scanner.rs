use crate::block::Block;
use crate::error::ScanError;
use crate::script::attach_script;
use crate::tree::{NodeId, Tree};
use regex::Regex;
use std::io::BufRead;

pub const OBJECT_MARKER: &str = "\"objName\": \"";
pub const CHILDREN_MARKER: &str = "\"children\": ";
pub const SCRIPTS_MARKER: &str = "\"scripts\": ";

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Keep quoted argument values as leaf nodes.
    pub include_literals: bool,
}

/// Quote-aware bracket depth counter, fed one chunk at a time.
#[derive(Debug, Clone, Default)]
pub struct BracketBalance {
    depth: usize,
    opened: bool,
    in_string: bool,
    escaped: bool,
}

impl BracketBalance {
    /// Returns true once at least one bracket has opened and every opened
    /// bracket has closed again.
    pub fn feed(&mut self, text: &str) -> bool {
        for ch in text.chars() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match ch {
                '"' => self.in_string = true,
                '[' => {
                    self.depth += 1;
                    self.opened = true;
                }
                ']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.opened && self.depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        self.is_balanced()
    }

    pub fn is_balanced(&self) -> bool {
        self.opened && self.depth == 0
    }
}

#[derive(Debug)]
enum Mode {
    Objects,
    Script {
        buffer: String,
        balance: BracketBalance,
        start_line: usize,
    },
}

/// Line-driven builder for one project description.
///
/// Objects become tree nodes as their `objName` lines go by. A scripts
/// section is buffered until its brackets balance and then handed to
/// [`attach_script`] under the object that declared it.
pub struct ProjectScanner {
    name: String,
    options: ScanOptions,
    object_re: Regex,
    tree: Option<Tree<Block>>,
    current: Option<NodeId>,
    container: Option<NodeId>,
    mode: Mode,
    line_no: usize,
}

impl ProjectScanner {
    pub fn new(name: impl Into<String>, options: ScanOptions) -> Result<Self, ScanError> {
        let object_re = Regex::new(&format!(
            "{}(?P<name>.*)\"",
            regex::escape(OBJECT_MARKER)
        ))?;
        Ok(Self {
            name: name.into(),
            options,
            object_re,
            tree: None,
            current: None,
            container: None,
            mode: Mode::Objects,
            line_no: 0,
        })
    }

    pub fn push_line(&mut self, line: &str) -> Result<(), ScanError> {
        self.line_no += 1;
        if let Mode::Script {
            buffer, balance, ..
        } = &mut self.mode
        {
            buffer.push('\n');
            buffer.push_str(line);
            if balance.feed(line) {
                self.flush_script()?;
            }
            return Ok(());
        }

        if line.contains(OBJECT_MARKER) {
            self.declare_object(line)
        } else if line.contains(CHILDREN_MARKER) {
            self.container = Some(self.require_object("children")?);
            Ok(())
        } else if let Some(idx) = line.find(SCRIPTS_MARKER) {
            self.require_object("scripts")?;
            let seed = &line[idx + SCRIPTS_MARKER.len()..];
            let mut balance = BracketBalance::default();
            let done = balance.feed(seed);
            self.mode = Mode::Script {
                buffer: seed.to_string(),
                balance,
                start_line: self.line_no,
            };
            if done {
                self.flush_script()?;
            }
            Ok(())
        } else {
            Ok(())
        }
    }

    /// Ends the scan. `None` means the text declared no object at all.
    pub fn finish(self) -> Result<Option<Tree<Block>>, ScanError> {
        if let Mode::Script { start_line, .. } = self.mode {
            let object = self
                .tree
                .as_ref()
                .zip(self.current)
                .and_then(|(tree, id)| tree.payload(id))
                .map(|block| block.name().to_string())
                .unwrap_or_default();
            return Err(ScanError::UnbalancedScript {
                object,
                line: start_line,
            });
        }
        Ok(self.tree)
    }

    fn declare_object(&mut self, line: &str) -> Result<(), ScanError> {
        let name = self
            .object_re
            .captures(line)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ScanError::MalformedStructure {
                line: self.line_no,
                reason: "object name is not closed by a quote".to_string(),
            })?;
        let block = Block::Object(name);
        let id = match self.tree.as_mut() {
            None => {
                let tree = Tree::new(block, self.name.clone());
                let root = tree.root();
                self.tree = Some(tree);
                root
            }
            Some(tree) => {
                let parent = self.container.unwrap_or_else(|| tree.root());
                tree.add_leaf(parent, block)?
            }
        };
        self.current = Some(id);
        Ok(())
    }

    fn require_object(&self, section: &str) -> Result<NodeId, ScanError> {
        self.current.ok_or_else(|| ScanError::MalformedStructure {
            line: self.line_no,
            reason: format!("{} section appears before any object", section),
        })
    }

    fn flush_script(&mut self) -> Result<(), ScanError> {
        let Mode::Script {
            buffer, start_line, ..
        } = std::mem::replace(&mut self.mode, Mode::Objects)
        else {
            return Ok(());
        };
        let owner = self.require_object("scripts")?;
        let tree = self.tree.as_mut().ok_or_else(|| ScanError::MalformedStructure {
            line: start_line,
            reason: "scripts section appears before any object".to_string(),
        })?;
        attach_script(tree, owner, &buffer, start_line, self.options.include_literals)?;
        Ok(())
    }
}

pub fn scan_project(
    text: &str,
    name: &str,
    options: ScanOptions,
) -> Result<Option<Tree<Block>>, ScanError> {
    let mut scanner = ProjectScanner::new(name, options)?;
    for line in text.lines() {
        scanner.push_line(line)?;
    }
    scanner.finish()
}

pub fn scan_reader<R: BufRead>(
    reader: R,
    name: &str,
    options: ScanOptions,
) -> Result<Option<Tree<Block>>, ScanError> {
    let mut scanner = ProjectScanner::new(name, options)?;
    for line in reader.lines() {
        scanner.push_line(&line?)?;
    }
    scanner.finish()
}
