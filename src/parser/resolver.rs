//! Operator resolution: turns the flat run of operands and operator groups of
//! one segment into a nested operator tree.
//!
//! ```text
//! x  -  -  y  *  z        operands and groups as matched
//! x [-] [-]y [*] z        gap split: binary `-`, prefix `-` on y
//! -(x, *(-(y), z))        unary first, then binaries by priority
//! ```
use super::matcher::OperatorGroup;
use crate::ast::{ExpressionTree, ItemId, ItemKind, TokenKind, TreeError};
use crate::error::{ParseErrorData, ParseErrorItem, ParseErrorKind};
use crate::language::{CompiledLanguage, OperatorKind};

#[derive(Debug)]
pub(crate) enum Term {
    Operand(ItemId),
    Operators(OperatorGroup),
    /// An item error recovery could not place. It ends the operator run
    /// before it and lands in the segment's series.
    Stray(ItemId),
}

/// A group with the interpretation picked for it.
#[derive(Debug)]
struct Chosen {
    group: OperatorGroup,
    operator: usize,
}

#[derive(Debug)]
struct Slot {
    operand: ItemId,
    /// In text order; the last one is closest to the operand
    prefixes: Vec<Chosen>,
    /// In text order; the first one is closest to the operand
    postfixes: Vec<Chosen>,
    binary_before: Option<Chosen>,
    wall_before: bool,
}

impl Slot {
    fn new(operand: ItemId) -> Self {
        Slot {
            operand,
            prefixes: Vec::new(),
            postfixes: Vec::new(),
            binary_before: None,
            wall_before: false,
        }
    }
}

pub(crate) struct Resolver<'r> {
    language: &'r CompiledLanguage,
    tree: &'r mut ExpressionTree,
    errors: &'r mut ParseErrorData,
    strays: Vec<Chosen>,
    stray_items: Vec<ItemId>,
    failed: bool,
}

impl<'r> Resolver<'r> {
    pub fn new(
        language: &'r CompiledLanguage,
        tree: &'r mut ExpressionTree,
        errors: &'r mut ParseErrorData,
    ) -> Self {
        Resolver {
            language,
            tree,
            errors,
            strays: Vec::new(),
            stray_items: Vec::new(),
            failed: false,
        }
    }

    /// Resolves one segment. `None` when there was nothing to resolve.
    pub fn resolve(mut self, terms: Vec<Term>) -> Result<Option<ItemId>, TreeError> {
        let mut slots: Vec<Slot> = Vec::new();
        let mut groups: Vec<OperatorGroup> = Vec::new();
        // Slots before this index belong to runs closed by a stray item
        let mut run_start = 0;

        for term in terms {
            match term {
                Term::Operators(group) => groups.push(group),
                Term::Operand(operand) => {
                    let mut slot = Slot::new(operand);
                    let gap = std::mem::take(&mut groups);
                    if slots.len() == run_start {
                        slot.prefixes = self.leading(gap);
                        slot.wall_before = true;
                    } else if let Some(previous) = slots.last_mut() {
                        self.split_gap(previous, &mut slot, gap);
                    }
                    slots.push(slot);
                }
                Term::Stray(item) => {
                    let gap = std::mem::take(&mut groups);
                    self.close_run(&mut slots[run_start..], gap);
                    run_start = slots.len();
                    self.stray_items.push(item);
                }
            }
        }
        self.close_run(&mut slots[run_start..], groups);

        if slots.is_empty() && self.strays.is_empty() && self.stray_items.is_empty() {
            return Ok(None);
        }

        log::debug!(
            "resolving {} operand(s), {} stray operator(s), {} stray item(s)",
            slots.len(),
            self.strays.len(),
            self.stray_items.len()
        );

        // Unary operators first, then binaries chunk by chunk
        let mut chunks: Vec<Vec<(ItemId, Option<Chosen>)>> = Vec::new();
        for slot in slots {
            let node = self.apply_unary(slot.operand, slot.prefixes, slot.postfixes)?;
            if slot.wall_before || chunks.is_empty() {
                chunks.push(Vec::new());
            }
            if let Some(chunk) = chunks.last_mut() {
                chunk.push((node, slot.binary_before));
            }
        }

        let mut roots = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            roots.push(self.fold_binaries(chunk)?);
        }

        if roots.len() == 1 && self.strays.is_empty() && self.stray_items.is_empty() && !self.failed {
            return Ok(roots.pop());
        }

        self.series(roots).map(Some)
    }

    // ========================================================================
    // Group assignment
    // ========================================================================

    /// Groups after the last operand of a run must all be postfix operators.
    fn close_run(&mut self, run: &mut [Slot], groups: Vec<OperatorGroup>) {
        match run.last_mut() {
            Some(last) => {
                let postfixes = self.trailing(groups);
                last.postfixes.extend(postfixes);
            }
            None => {
                for group in groups {
                    self.stray_missing_operand(group);
                }
            }
        }
    }

    /// Groups before the first operand must all be prefix operators.
    fn leading(&mut self, groups: Vec<OperatorGroup>) -> Vec<Chosen> {
        let language = self.language;
        let keep = groups
            .iter()
            .rev()
            .take_while(|g| g.has_kind(language, OperatorKind::Prefix))
            .count();
        let split = groups.len() - keep;

        let mut prefixes = Vec::with_capacity(keep);
        for (i, group) in groups.into_iter().enumerate() {
            if i < split {
                self.stray_missing_operand(group);
            } else {
                prefixes.push(self.choose(group, OperatorKind::Prefix));
            }
        }
        prefixes
    }

    fn trailing(&mut self, groups: Vec<OperatorGroup>) -> Vec<Chosen> {
        let language = self.language;
        let keep = groups
            .iter()
            .take_while(|g| g.has_kind(language, OperatorKind::Postfix))
            .count();

        let mut postfixes = Vec::with_capacity(keep);
        for (i, group) in groups.into_iter().enumerate() {
            if i < keep {
                postfixes.push(self.choose(group, OperatorKind::Postfix));
            } else {
                self.stray_missing_operand(group);
            }
        }
        postfixes
    }

    /// Splits the groups between two operands into postfixes of the left
    /// operand, one binary operator and prefixes of the right operand.
    ///
    /// The postfix run is made as long as possible: `x ++ - y` with `++` both
    /// postfix and prefix resolves as `(x++) - y`.
    fn split_gap(&mut self, previous: &mut Slot, slot: &mut Slot, groups: Vec<OperatorGroup>) {
        let language = self.language;

        if groups.is_empty() {
            let position = self.tree.index_in_text(slot.operand);
            self.report(ParseErrorItem::new(
                position,
                0,
                ParseErrorKind::NoSeparationBetweenSymbols,
            ));
            slot.wall_before = true;
            return;
        }

        let count = groups.len();
        let split = (0..count).rev().find(|&b| {
            groups[..b]
                .iter()
                .all(|g| g.has_kind(language, OperatorKind::Postfix))
                && groups[b].has_kind(language, OperatorKind::Binary)
                && groups[b + 1..]
                    .iter()
                    .all(|g| g.has_kind(language, OperatorKind::Prefix))
        });

        match split {
            Some(binary) => {
                for (i, group) in groups.into_iter().enumerate() {
                    if i < binary {
                        previous.postfixes.push(self.choose(group, OperatorKind::Postfix));
                    } else if i == binary {
                        slot.binary_before = Some(self.choose(group, OperatorKind::Binary));
                    } else {
                        slot.prefixes.push(self.choose(group, OperatorKind::Prefix));
                    }
                }
            }
            None => {
                let start = groups[0].start();
                let end = groups[count - 1].end();
                self.report(ParseErrorItem::new(
                    start,
                    end - start,
                    ParseErrorKind::BinaryOperatorMissing,
                ));
                slot.wall_before = true;

                // Keep whatever unary reading is still possible
                let postfix_count = groups
                    .iter()
                    .take_while(|g| g.has_kind(language, OperatorKind::Postfix))
                    .count();
                let prefix_count = groups[postfix_count..]
                    .iter()
                    .rev()
                    .take_while(|g| g.has_kind(language, OperatorKind::Prefix))
                    .count();
                let prefix_start = count - prefix_count;

                for (i, group) in groups.into_iter().enumerate() {
                    if i < postfix_count {
                        previous.postfixes.push(self.choose(group, OperatorKind::Postfix));
                    } else if i >= prefix_start {
                        slot.prefixes.push(self.choose(group, OperatorKind::Prefix));
                    } else {
                        let operator = group.candidates.first().copied().unwrap_or(0);
                        self.strays.push(Chosen { group, operator });
                    }
                }
            }
        }
    }

    fn choose(&self, group: OperatorGroup, kind: OperatorKind) -> Chosen {
        let operator = group
            .candidate(self.language, kind)
            .or_else(|| group.candidates.first().copied())
            .unwrap_or(0);
        Chosen { group, operator }
    }

    fn stray_missing_operand(&mut self, group: OperatorGroup) {
        self.report(ParseErrorItem::new(
            group.start(),
            group.length(),
            ParseErrorKind::OperandMissing {
                operator: group.text(),
            },
        ));
        let operator = group.candidates.first().copied().unwrap_or(0);
        self.strays.push(Chosen { group, operator });
    }

    fn report(&mut self, error: ParseErrorItem) {
        self.failed = true;
        self.errors.add(error);
    }

    // ========================================================================
    // Tree building
    // ========================================================================

    fn priority(&self, chosen: &Chosen) -> i32 {
        self.language.operators[chosen.operator].priority
    }

    /// Applies unary operators from the operand outwards. When both sides
    /// still have operators, the lower priority number goes first; on a tie
    /// the postfix does.
    fn apply_unary(
        &mut self,
        operand: ItemId,
        prefixes: Vec<Chosen>,
        postfixes: Vec<Chosen>,
    ) -> Result<ItemId, TreeError> {
        let mut prefixes = prefixes;
        let mut postfixes = postfixes.into_iter().rev().collect::<Vec<_>>();
        let mut current = operand;

        loop {
            let take_prefix = match (prefixes.last(), postfixes.last()) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(prefix), Some(postfix)) => self.priority(prefix) < self.priority(postfix),
            };

            let chosen = if take_prefix {
                prefixes.pop()
            } else {
                postfixes.pop()
            };
            if let Some(chosen) = chosen {
                current = self.build_operator(&chosen, current, None)?;
            }
        }

        Ok(current)
    }

    fn fold_binaries(&mut self, chunk: Vec<(ItemId, Option<Chosen>)>) -> Result<ItemId, TreeError> {
        let mut nodes = Vec::with_capacity(chunk.len());
        // binaries[j] sits between nodes[j] and nodes[j + 1]
        let mut binaries = Vec::with_capacity(chunk.len());
        for (i, (node, binary)) in chunk.into_iter().enumerate() {
            nodes.push(node);
            if i > 0 {
                binaries.push(binary);
            }
        }

        let mut priorities: Vec<i32> = binaries
            .iter()
            .flatten()
            .map(|chosen| self.priority(chosen))
            .collect();
        priorities.sort_unstable();
        priorities.dedup();

        for priority in priorities {
            for j in 0..binaries.len() {
                let Some(chosen) = &binaries[j] else {
                    continue;
                };
                if self.priority(chosen) != priority {
                    continue;
                }
                let left = self.tree.topmost_ancestor(nodes[j]);
                let right = self.tree.topmost_ancestor(nodes[j + 1]);
                self.build_operator(chosen, left, Some(right))?;
            }
        }

        match nodes.first() {
            Some(first) => Ok(self.tree.topmost_ancestor(*first)),
            None => Err(TreeError::UnknownItem(ItemId(usize::MAX))),
        }
    }

    fn build_info(&mut self, chosen: &Chosen) -> Result<ItemId, TreeError> {
        let definition = &self.language.operators[chosen.operator];
        let info = self.tree.create(
            ItemKind::OperatorInfo {
                operator: definition.id,
                kind: definition.kind,
                name: definition.name(),
            },
            chosen.group.start(),
        );
        for (index, text) in &chosen.group.parts {
            let token = self
                .tree
                .create_token(TokenKind::OperatorNamePart, text, *index);
            self.tree.add_regular_item(info, token)?;
        }
        Ok(info)
    }

    fn build_operator(
        &mut self,
        chosen: &Chosen,
        operand1: ItemId,
        operand2: Option<ItemId>,
    ) -> Result<ItemId, TreeError> {
        let definition = &self.language.operators[chosen.operator];
        let (id, kind, priority) = (definition.id, definition.kind, definition.priority);
        let info = self.build_info(chosen)?;

        let operator = self.tree.create(
            ItemKind::Operator {
                operator: id,
                kind,
                priority,
                info,
                operand1,
                operand2,
            },
            chosen.group.start(),
        );

        match (kind, operand2) {
            (OperatorKind::Prefix, _) => {
                self.tree.add_regular_item(operator, info)?;
                self.tree.add_child(operator, operand1)?;
            }
            (OperatorKind::Postfix, _) => {
                self.tree.add_child(operator, operand1)?;
                self.tree.add_regular_item(operator, info)?;
            }
            (OperatorKind::Binary, operand2) => {
                self.tree.add_child(operator, operand1)?;
                self.tree.add_regular_item(operator, info)?;
                if let Some(operand2) = operand2 {
                    self.tree.add_child(operator, operand2)?;
                }
            }
        }

        log::trace!("built {} operator {}", kind, definition_name(self.language, chosen));
        Ok(operator)
    }

    fn series(&mut self, roots: Vec<ItemId>) -> Result<ItemId, TreeError> {
        let mut items = roots;
        for stray in std::mem::take(&mut self.strays) {
            items.push(self.build_info(&stray)?);
        }
        items.append(&mut self.stray_items);
        items.sort_by_key(|item| self.tree.index_in_text(*item));

        let start = items
            .first()
            .map(|item| self.tree.index_in_text(*item))
            .unwrap_or(0);
        let series = self.tree.create(ItemKind::SeriesWithErrors, start);
        for item in items {
            self.tree.add_child(series, item)?;
        }
        Ok(series)
    }
}

fn definition_name(language: &CompiledLanguage, chosen: &Chosen) -> String {
    language.operators[chosen.operator].name()
}
