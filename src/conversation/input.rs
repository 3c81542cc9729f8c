//! Input modalities.
//!
//! Each prompt is answered through exactly one surface. Surfaces hold the
//! in-progress edit state (toggles, list entries, typed text) and check an
//! [`Answer`] against their options before anything reaches the document.

use std::fmt;

use serde::Serialize;

use super::error::{SubmitError, SubmitResult};
use crate::core::ProjectSummary;
use crate::document::PatchValue;

/// Maximum resumable projects surfaced next to the opening choices.
pub const MAX_RESUMABLE: usize = 3;

/// Value of the sentinel option that switches a multi-select to free entries.
pub const OTHER: &str = "other";

/// The kind of input currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    SingleSelectWithResume,
    OptionButtons,
    MultiSelectWithOther,
    DynamicList,
    DynamicSteps,
    FreeText,
    None,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleSelectWithResume => "single-select-with-resume",
            Self::OptionButtons => "option-buttons",
            Self::MultiSelectWithOther => "multi-select-with-other",
            Self::DynamicList => "dynamic-list",
            Self::DynamicSteps => "dynamic-steps",
            Self::FreeText => "free-text",
            Self::None => "none",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub enabled: bool,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into(), enabled: true }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

fn pick<'a>(options: &'a [ChoiceOption], value: &str) -> SubmitResult<&'a ChoiceOption> {
    let option = options
        .iter()
        .find(|o| o.value == value)
        .ok_or_else(|| SubmitError::UnknownOption(value.to_string()))?;
    if option.enabled {
        Ok(option)
    } else {
        Err(SubmitError::OptionDisabled(value.to_string()))
    }
}

/// A raw answer as submitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// One option of a single-select or option-buttons input
    Choice(String),
    /// A resumable project shortcut
    Resume(String),
    /// Toggled options plus free-form "other" entries
    Selection { toggled: Vec<String>, other: Vec<String> },
    /// Entries of a dynamic list
    Entries(Vec<String>),
    Text(String),
}

/// An answer checked against its surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Value(PatchValue),
    /// Load another project instead of answering.
    Resume(String),
}

/// Fixed options plus up to [`MAX_RESUMABLE`] prior projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleSelect {
    pub options: Vec<ChoiceOption>,
    pub resumable: Vec<ProjectSummary>,
}

impl SingleSelect {
    pub fn new(options: Vec<ChoiceOption>, mut resumable: Vec<ProjectSummary>) -> Self {
        resumable.truncate(MAX_RESUMABLE);
        Self { options, resumable }
    }

    fn resolve(&self, answer: Answer) -> SubmitResult<Resolved> {
        match answer {
            Answer::Choice(value) => {
                let option = pick(&self.options, &value)?;
                Ok(Resolved::Value(PatchValue::Text(option.value.clone())))
            }
            Answer::Resume(id) => {
                if self.resumable.iter().any(|p| p.id == id) {
                    Ok(Resolved::Resume(id))
                } else {
                    Err(SubmitError::UnknownOption(id))
                }
            }
            _ => Err(SubmitError::WrongShape { expected: InputKind::SingleSelectWithResume }),
        }
    }
}

/// A toggle set with an optional "other" escape into free entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiSelect {
    pub options: Vec<ChoiceOption>,
    toggled: Vec<bool>,
    allow_other: bool,
    other: Option<DynamicList>,
    /// The other entries are being edited
    editing_other: bool,
}

impl MultiSelect {
    pub fn new(options: Vec<ChoiceOption>, allow_other: bool) -> Self {
        let toggled = vec![false; options.len()];
        Self { options, toggled, allow_other, other: None, editing_other: false }
    }

    /// Pre-toggle the given values.
    pub fn with_selected(mut self, values: &[String]) -> Self {
        for (option, on) in self.options.iter().zip(self.toggled.iter_mut()) {
            *on = values.contains(&option.value);
        }
        self
    }

    pub fn allows_other(&self) -> bool {
        self.allow_other
    }

    pub fn is_other_active(&self) -> bool {
        self.editing_other
    }

    /// Flip an option. Toggling the sentinel switches into free entries.
    pub fn toggle(&mut self, value: &str) -> SubmitResult<bool> {
        if value == OTHER {
            self.select_other()?;
            return Ok(true);
        }
        let index = self
            .options
            .iter()
            .position(|o| o.value == value)
            .ok_or_else(|| SubmitError::UnknownOption(value.to_string()))?;
        if !self.options[index].enabled {
            return Err(SubmitError::OptionDisabled(value.to_string()));
        }
        self.toggled[index] = !self.toggled[index];
        Ok(self.toggled[index])
    }

    pub fn select_other(&mut self) -> SubmitResult<&mut DynamicList> {
        if !self.allow_other {
            return Err(SubmitError::UnknownOption(OTHER.to_string()));
        }
        self.editing_other = true;
        Ok(self.other.get_or_insert_with(|| DynamicList::new(false)))
    }

    /// Return to the options. Typed entries are kept for the answer.
    pub fn leave_other(&mut self) {
        self.editing_other = false;
    }

    pub fn other_list(&self) -> Option<&DynamicList> {
        self.other.as_ref()
    }

    pub fn other_list_mut(&mut self) -> Option<&mut DynamicList> {
        self.other.as_mut()
    }

    pub fn is_toggled(&self, value: &str) -> bool {
        self.options.iter().zip(&self.toggled).any(|(o, on)| *on && o.value == value)
    }

    /// Toggled values in option order.
    pub fn selected(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(&self.toggled)
            .filter(|(_, on)| **on)
            .map(|(o, _)| o.value.clone())
            .collect()
    }

    /// Snapshot of the current edit state as an answer.
    pub fn answer(&self) -> Answer {
        Answer::Selection {
            toggled: self.selected(),
            other: self.other.as_ref().map(DynamicList::values).unwrap_or_default(),
        }
    }

    /// Union of toggled options (in option order) and other entries (in entry
    /// order). Entries repeating an earlier item are dropped.
    fn resolve(&self, answer: Answer) -> SubmitResult<Resolved> {
        let Answer::Selection { toggled, other } = answer else {
            return Err(SubmitError::WrongShape { expected: InputKind::MultiSelectWithOther });
        };
        for value in &toggled {
            pick(&self.options, value)?;
        }

        let mut union: Vec<String> = self
            .options
            .iter()
            .filter(|o| toggled.contains(&o.value))
            .map(|o| o.value.clone())
            .collect();

        let other: Vec<String> = clean(other);
        if !other.is_empty() && !self.allow_other {
            return Err(SubmitError::UnknownOption(OTHER.to_string()));
        }
        for entry in other {
            if !union.contains(&entry) {
                union.push(entry);
            }
        }

        if union.is_empty() {
            return Err(SubmitError::Blank);
        }
        Ok(Resolved::Value(PatchValue::List(union)))
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// A variable-length ordered list of single-line entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicList {
    entries: Vec<String>,
    focus: usize,
    steps: bool,
    optional: bool,
}

impl DynamicList {
    /// A fresh list with one empty entry.
    pub fn new(steps: bool) -> Self {
        Self { entries: vec![String::new()], focus: 0, steps, optional: false }
    }

    /// A step list pre-seeded for editing.
    pub fn seeded(items: &[String]) -> Self {
        let mut list = Self::new(true);
        if !items.is_empty() {
            list.entries = items.to_vec();
            list.focus = items.len() - 1;
        }
        list
    }

    /// Allow submitting with no entries.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn kind(&self) -> InputKind {
        if self.steps {
            InputKind::DynamicSteps
        } else {
            InputKind::DynamicList
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Move focus to an existing entry.
    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(self.entries.len().saturating_sub(1));
    }

    /// Append an empty entry and focus it.
    pub fn add(&mut self) -> usize {
        self.entries.push(String::new());
        self.focus = self.entries.len() - 1;
        self.focus
    }

    /// Append an entry with content and focus it.
    pub fn push(&mut self, text: impl Into<String>) -> usize {
        let index = self.add();
        self.entries[index] = text.into();
        index
    }

    /// Single-line edit; line breaks are folded into spaces.
    pub fn set(&mut self, index: usize, text: &str) -> SubmitResult<()> {
        let slot = self.entries.get_mut(index).ok_or(SubmitError::UnknownEntry(index))?;
        *slot = text.replace(['\r', '\n'], " ");
        self.focus = index;
        Ok(())
    }

    /// Remove an entry. The last remaining entry is never removed.
    pub fn remove(&mut self, index: usize) -> SubmitResult<String> {
        if index >= self.entries.len() {
            return Err(SubmitError::UnknownEntry(index));
        }
        if self.entries.len() == 1 {
            return Err(SubmitError::LastEntry);
        }
        let removed = self.entries.remove(index);
        self.focus = self.focus.min(self.entries.len() - 1);
        Ok(removed)
    }

    /// Non-blank entries, trimmed.
    pub fn values(&self) -> Vec<String> {
        clean(self.entries.clone())
    }

    fn resolve(&self, answer: Answer) -> SubmitResult<Resolved> {
        let Answer::Entries(entries) = answer else {
            return Err(SubmitError::WrongShape { expected: self.kind() });
        };
        let entries = clean(entries);
        if entries.is_empty() && !self.optional {
            return Err(SubmitError::Blank);
        }
        Ok(Resolved::Value(PatchValue::List(entries)))
    }
}

/// A multi-line text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FreeText {
    buffer: String,
}

impl FreeText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn insert(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Explicit line break; never submits.
    pub fn line_break(&mut self) {
        self.buffer.push('\n');
    }

    /// Take the content for submission, clearing the field. Blank content is
    /// kept and nothing is returned.
    pub fn take(&mut self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    fn resolve(answer: Answer) -> SubmitResult<Resolved> {
        let Answer::Text(text) = answer else {
            return Err(SubmitError::WrongShape { expected: InputKind::FreeText });
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::Blank);
        }
        Ok(Resolved::Value(PatchValue::Text(text.to_string())))
    }
}

/// The input shown for the current prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputSurface {
    None,
    SingleSelect(SingleSelect),
    OptionButtons { options: Vec<ChoiceOption> },
    MultiSelect(MultiSelect),
    List(DynamicList),
    FreeText(FreeText),
}

impl InputSurface {
    /// The modality currently presented. A multi-select that switched to its
    /// "other" entries presents as a dynamic list.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::None => InputKind::None,
            Self::SingleSelect(_) => InputKind::SingleSelectWithResume,
            Self::OptionButtons { .. } => InputKind::OptionButtons,
            Self::MultiSelect(m) if m.is_other_active() => InputKind::DynamicList,
            Self::MultiSelect(_) => InputKind::MultiSelectWithOther,
            Self::List(list) => list.kind(),
            Self::FreeText(_) => InputKind::FreeText,
        }
    }

    /// Options shown on the surface, if it has any.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            Self::SingleSelect(s) => &s.options,
            Self::OptionButtons { options } => options,
            Self::MultiSelect(m) => &m.options,
            _ => &[],
        }
    }

    /// Disable every option, for read-only previews.
    pub fn disable_all(&mut self) {
        let options = match self {
            Self::SingleSelect(s) => &mut s.options,
            Self::OptionButtons { options } => options,
            Self::MultiSelect(m) => &mut m.options,
            _ => return,
        };
        for option in options {
            option.enabled = false;
        }
    }

    /// The list being edited: a plain list, or a multi-select's other entries.
    pub fn list_mut(&mut self) -> Option<&mut DynamicList> {
        match self {
            Self::List(list) => Some(list),
            Self::MultiSelect(m) => m.other_list_mut(),
            _ => None,
        }
    }

    /// Build an answer from the surface's edit state. Free text is taken
    /// (and cleared) only when it is non-blank.
    pub fn current_answer(&mut self) -> Option<Answer> {
        match self {
            Self::MultiSelect(m) => Some(m.answer()),
            Self::List(list) => Some(Answer::Entries(list.entries().to_vec())),
            Self::FreeText(text) => text.take().map(Answer::Text),
            _ => None,
        }
    }

    /// Check an answer against this surface.
    pub fn resolve(&self, answer: Answer) -> SubmitResult<Resolved> {
        match self {
            Self::None => Err(SubmitError::NoActivePrompt),
            Self::SingleSelect(s) => s.resolve(answer),
            Self::OptionButtons { options } => match answer {
                Answer::Choice(value) => {
                    let option = pick(options, &value)?;
                    Ok(Resolved::Value(PatchValue::Text(option.value.clone())))
                }
                _ => Err(SubmitError::WrongShape { expected: InputKind::OptionButtons }),
            },
            Self::MultiSelect(m) => m.resolve(answer),
            Self::List(list) => list.resolve(answer),
            Self::FreeText(_) => FreeText::resolve(answer),
        }
    }
}
