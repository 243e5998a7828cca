//! Rules, selectors and declarations of the analysed stylesheets.
//!
//! Declarations live in an arena and selectors refer to them by id. Every
//! selector of a rule owns its own copy of the rule's declarations, because the
//! cascade can decide differently for each selector.

use crate::ElementRef;
use core::fmt;
use css_media_queries::MediaScope;
use css_selectors::{SelectorDescriptor, split_selector_list};

/// Index of a declaration in a [`DeclarationArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(pub usize);

/// Index of a selector in a [`StyleSheetSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(pub usize);

/// Index of a file in a [`StyleSheetSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// Whether a declaration lost a comparison during the current resolution run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DeclarationStatus {
    #[default]
    Unset,
    Overridden,
}

/// A single CSS declaration owned by one selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Value as authored.
    pub original_value: String,
    /// Value with whitespace collapsed and ASCII case folded outside strings.
    pub normalized_value: String,
    pub important: bool,
    pub status: DeclarationStatus,
    /// Decided by the cascade; false until some matched element lets it apply.
    pub effective: bool,
    /// Position inside the declaration block.
    pub order: u32,
    /// Set when the declaration could not be parsed.
    pub parse_error: Option<String>,
}

impl Declaration {
    pub fn new(name: &str, value: &str, important: bool, order: u32) -> Self {
        Self {
            name: name.trim().to_ascii_lowercase(),
            original_value: value.trim().to_owned(),
            normalized_value: normalize_value(value),
            important,
            status: DeclarationStatus::Unset,
            effective: false,
            order,
            parse_error: None,
        }
    }

    /// Convert a declaration from the stylesheet parser.
    pub fn from_parsed(parsed: &css_syntax::Declaration, order: u32) -> Self {
        Self {
            parse_error: parsed.parse_error.clone(),
            ..Self::new(&parsed.name, &parsed.value, parsed.important, order)
        }
    }

    #[inline]
    pub fn is_overridden(&self) -> bool {
        self.status == DeclarationStatus::Overridden
    }

    /// Mark the declaration as overridden. It can never become effective again.
    #[inline]
    pub fn mark_overridden(&mut self) {
        self.status = DeclarationStatus::Overridden;
        self.effective = false;
    }

    /// Same property name and same normalized value.
    #[inline]
    pub fn same_name_and_value(&self, other: &Self) -> bool {
        self.name == other.name && self.normalized_value == other.normalized_value
    }

    /// Bytes this declaration contributes to the output.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.name.len().saturating_add(self.original_value.len())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.important {
            write!(formatter, "{}: {} !important;", self.name, self.original_value)
        } else {
            write!(formatter, "{}: {};", self.name, self.original_value)
        }
    }
}

/// Collapse whitespace and fold ASCII case outside quoted strings.
pub fn normalize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    for character in value.trim().chars() {
        if quote.is_none() && character.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match quote {
            Some(open) if open == character => quote = None,
            Some(_) => {}
            None if matches!(character, '"' | '\'') => quote = Some(character),
            None => {}
        }
        if quote.is_none() {
            out.push(character.to_ascii_lowercase());
        } else {
            out.push(character);
        }
    }
    out
}

/// Arena of declarations addressed by [`DeclarationId`].
#[derive(Clone, Debug, Default)]
pub struct DeclarationArena {
    items: Vec<Declaration>,
}

impl DeclarationArena {
    /// Store a declaration and return its id.
    pub fn alloc(&mut self, declaration: Declaration) -> DeclarationId {
        self.items.push(declaration);
        DeclarationId(self.items.len().saturating_sub(1))
    }

    #[inline]
    pub fn get(&self, id: DeclarationId) -> Option<&Declaration> {
        self.items.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclarationId) -> Option<&mut Declaration> {
        self.items.get_mut(id.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One selector of a rule together with its declarations and match records.
#[derive(Clone, Debug)]
pub struct Selector {
    pub descriptor: SelectorDescriptor,
    /// File the selector was authored in.
    pub file: FileId,
    /// Index of the rule within its file.
    pub source_position: u32,
    /// One-based line of the rule, 0 for hand-built rules.
    pub line: u32,
    /// This selector's copy of the rule's declarations, in block order.
    pub declarations: Vec<DeclarationId>,
    /// Every element the selector matched, across all states.
    pub matched_elements: Vec<ElementRef>,
    /// Set once the selector matched anything, including the document itself.
    pub matched: bool,
}

impl Selector {
    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.descriptor.ignored
    }
}

/// Selectors sharing one declaration block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    pub selectors: Vec<SelectorId>,
}

/// One stylesheet file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssFile {
    pub name: String,
    /// Default load order; later-loaded files take precedence.
    pub load_order: u32,
    pub rules: Vec<Rule>,
}

/// All analysed stylesheets.
#[derive(Clone, Debug, Default)]
pub struct StyleSheetSet {
    pub files: Vec<CssFile>,
    pub selectors: Vec<Selector>,
    pub declarations: DeclarationArena,
}

impl StyleSheetSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty file and return its id.
    pub fn add_file(&mut self, name: &str, load_order: u32) -> FileId {
        self.files.push(CssFile {
            name: name.to_owned(),
            load_order,
            rules: Vec::new(),
        });
        FileId(self.files.len().saturating_sub(1))
    }

    /// Add a parsed stylesheet as a new file.
    pub fn add_stylesheet(
        &mut self,
        name: &str,
        load_order: u32,
        sheet: &css_syntax::Stylesheet,
    ) -> FileId {
        let file = self.add_file(name, load_order);
        for rule in &sheet.rules {
            let selectors = split_selector_list(&rule.prelude);
            if selectors.is_empty() {
                log::debug!("Skipping rule without selectors at {name}:{}", rule.line);
                continue;
            }
            let declarations: Vec<Declaration> = rule
                .declarations
                .iter()
                .zip(0u32..)
                .map(|(decl, order)| Declaration::from_parsed(decl, order))
                .collect();
            let media = MediaScope::from_preludes(&rule.media);
            self.push_rule(file, &selectors, &media, &declarations, rule.line);
        }
        log::debug!(
            "Loaded {name}: {} rules",
            self.files.get(file.0).map_or(0, |css_file| css_file.rules.len())
        );
        file
    }

    /// Add a hand-built rule to `file`. Every selector receives its own copy of
    /// `declarations`. Returns the new rule's index within the file.
    pub fn add_rule(
        &mut self,
        file: FileId,
        selectors: &[&str],
        media: &MediaScope,
        declarations: &[Declaration],
    ) -> usize {
        self.push_rule(file, selectors, media, declarations, 0)
    }

    fn push_rule(
        &mut self,
        file: FileId,
        selectors: &[&str],
        media: &MediaScope,
        declarations: &[Declaration],
        line: u32,
    ) -> usize {
        let position = self
            .files
            .get(file.0)
            .map_or(0, |css_file| css_file.rules.len());
        let mut rule = Rule::default();
        for raw in selectors {
            let ids = declarations
                .iter()
                .map(|decl| self.declarations.alloc(decl.clone()))
                .collect();
            self.selectors.push(Selector {
                descriptor: SelectorDescriptor::new(raw, media.clone()),
                file,
                source_position: u32::try_from(position).unwrap_or(u32::MAX),
                line,
                declarations: ids,
                matched_elements: Vec::new(),
                matched: false,
            });
            rule.selectors
                .push(SelectorId(self.selectors.len().saturating_sub(1)));
        }
        if let Some(css_file) = self.files.get_mut(file.0) {
            css_file.rules.push(rule);
        }
        position
    }

    #[inline]
    pub fn selector(&self, id: SelectorId) -> Option<&Selector> {
        self.selectors.get(id.0)
    }

    #[inline]
    pub fn selector_mut(&mut self, id: SelectorId) -> Option<&mut Selector> {
        self.selectors.get_mut(id.0)
    }

    #[inline]
    pub fn file(&self, id: FileId) -> Option<&CssFile> {
        self.files.get(id.0)
    }

    /// Id of the first file called `name`.
    pub fn file_id(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .position(|css_file| css_file.name == name)
            .map(FileId)
    }

    /// Ids of every selector still present in a rule of `file`, in source order.
    pub fn selector_ids_of_file(&self, file: FileId) -> Vec<SelectorId> {
        self.files
            .get(file.0)
            .map(|css_file| {
                css_file
                    .rules
                    .iter()
                    .flat_map(|rule| rule.selectors.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Declarations of a selector, in block order.
    pub fn declarations_of(&self, id: SelectorId) -> impl Iterator<Item = &Declaration> {
        self.selector(id)
            .into_iter()
            .flat_map(|sel| sel.declarations.iter())
            .filter_map(|decl_id| self.declarations.get(*decl_id))
    }

    /// Every selector still present in some rule.
    pub fn live_selectors(&self) -> impl Iterator<Item = (SelectorId, &Selector)> {
        self.files
            .iter()
            .flat_map(|css_file| css_file.rules.iter())
            .flat_map(|rule| rule.selectors.iter())
            .filter_map(|id| self.selector(*id).map(|sel| (*id, sel)))
    }

    pub fn rule_count(&self) -> usize {
        self.files.iter().map(|css_file| css_file.rules.len()).sum()
    }

    pub fn selector_count(&self) -> usize {
        self.live_selectors().count()
    }

    /// Effective declarations of live selectors.
    pub fn effective_declaration_count(&self) -> usize {
        self.live_selectors()
            .map(|(id, _)| self.declarations_of(id).filter(|decl| decl.effective).count())
            .sum()
    }

    /// Approximate output size: selector text without whitespace plus name and
    /// value of every declaration, for every live selector.
    pub fn size_bytes(&self) -> usize {
        self.live_selectors()
            .map(|(id, sel)| {
                let selector_bytes = sel
                    .descriptor
                    .raw_text
                    .chars()
                    .filter(|character| !character.is_whitespace())
                    .map(char::len_utf8)
                    .sum::<usize>();
                let declaration_bytes: usize =
                    self.declarations_of(id).map(Declaration::size_bytes).sum();
                selector_bytes.saturating_add(declaration_bytes)
            })
            .sum()
    }
}
