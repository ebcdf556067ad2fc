//! Ledger Service
//!
//! Warikan's projects, entries and categories. The active project's entries
//! are held in memory and the whole list is rewritten to storage after every
//! change.

use std::rc::Rc;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::domain::{DomainError, DomainResult, EntryDraft, LedgerEntry};
use crate::repository::{KeyValueStorage, ProjectRepository, CATEGORIES_KEY, LAST_PROJECT_KEY, PROJECT_LIST_KEY};
use super::csv_export::{export_csv, CsvExport};
use super::settlement::{category_totals, payer_totals, settle, PayerTotals, Settlement};

const REQUIRED_FIELDS: &str = "金額と支払い者のすべてを入力してください。";
const DUPLICATE_PROJECT: &str = "この案件名はすでに存在します。";
const RESERVED_PROJECT: &str = "この案件名は使用できません。";

/// Storage keys of their own; a project under one of these names would
/// overwrite them with its entries
const RESERVED_NAMES: [&str; 3] = [PROJECT_LIST_KEY, CATEGORIES_KEY, LAST_PROJECT_KEY];

pub struct LedgerService<K: KeyValueStorage> {
    repo: ProjectRepository<K>,
    clock: Rc<dyn Clock>,
    config: Rc<AppConfig>,
    current: String,
    entries: Vec<LedgerEntry>,
}

impl<K: KeyValueStorage> LedgerService<K> {
    /// Load the project list and select the last used project, else the
    /// first one, else the default.
    pub fn open(storage: Rc<K>, clock: Rc<dyn Clock>, config: Rc<AppConfig>) -> Self {
        let repo = ProjectRepository::new(storage);
        let projects = repo.project_names();
        let current = repo
            .last_project()
            .filter(|last| projects.contains(last))
            .or_else(|| projects.first().cloned())
            .unwrap_or_else(|| config.default_project.clone());
        let entries = repo.load_entries(&current);
        tracing::info!(project = %current, entries = entries.len(), "ledger opened");

        Self { repo, clock, config, current, entries }
    }

    pub fn projects(&self) -> Vec<String> {
        self.repo.project_names()
    }

    pub fn current_project(&self) -> &str {
        &self.current
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Distinct payers in order of first appearance
    pub fn payers(&self) -> Vec<String> {
        let mut payers: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !payers.contains(&entry.payer) {
                payers.push(entry.payer.clone());
            }
        }
        payers
    }

    pub fn settlement(&self) -> Settlement {
        settle(&self.entries)
    }

    pub fn totals(&self) -> PayerTotals {
        payer_totals(&self.entries)
    }

    pub fn category_totals(&self) -> Vec<(String, u64)> {
        category_totals(&self.entries)
    }

    pub fn export_csv(&self, payer: Option<&str>) -> DomainResult<CsvExport> {
        export_csv(&self.current, &self.entries, payer)
    }

    // ========================
    // Projects
    // ========================

    /// Create a project and switch to it
    pub fn create_project(&mut self, name: &str) -> DomainResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("案件名を入力してください。".into()));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(DomainError::InvalidInput(RESERVED_PROJECT.into()));
        }
        let mut projects = self.repo.project_names();
        if projects.iter().any(|p| p == name) {
            return Err(DomainError::Conflict(DUPLICATE_PROJECT.into()));
        }
        projects.push(name.to_string());
        self.repo.save_project_names(&projects)?;
        tracing::info!(project = name, "project created");
        self.select_project(name)
    }

    /// Switch the active project and remember it for the next visit
    pub fn select_project(&mut self, name: &str) -> DomainResult<()> {
        if name != self.config.default_project && !self.repo.project_names().iter().any(|p| p == name) {
            return Err(DomainError::NotFound(format!("project {}", name)));
        }
        self.current = name.to_string();
        self.entries = self.repo.load_entries(name);
        self.repo.set_last_project(name)
    }

    /// Remove a project and its entries. If it was active, the first
    /// remaining project (or the default) becomes active.
    pub fn delete_project(&mut self, name: &str) -> DomainResult<()> {
        let mut projects = self.repo.project_names();
        projects.retain(|p| p != name);
        self.repo.save_project_names(&projects)?;
        self.repo.remove_entries(name)?;
        tracing::info!(project = name, "project deleted");

        if self.current == name {
            self.current = projects
                .first()
                .cloned()
                .unwrap_or_else(|| self.config.default_project.clone());
            self.entries = self.repo.load_entries(&self.current);
            if self.repo.last_project().as_deref() == Some(name) {
                self.repo.set_last_project(&self.current)?;
            }
        }
        Ok(())
    }

    // ========================
    // Entries
    // ========================

    pub fn add_entry(&mut self, draft: EntryDraft) -> DomainResult<LedgerEntry> {
        let entry = self.validate(draft)?;
        let mut entries = self.entries.clone();
        entries.push(entry.clone());
        self.commit(entries)?;
        Ok(entry)
    }

    /// Replace the entry at `index`
    pub fn update_entry(&mut self, index: usize, draft: EntryDraft) -> DomainResult<LedgerEntry> {
        let entry = self.validate(draft)?;
        let mut entries = self.entries.clone();
        let slot = entries
            .get_mut(index)
            .ok_or_else(|| DomainError::NotFound(format!("entry {}", index)))?;
        *slot = entry.clone();
        self.commit(entries)?;
        Ok(entry)
    }

    pub fn remove_entry(&mut self, index: usize) -> DomainResult<()> {
        self.take_entry(index).map(|_| ())
    }

    /// Remove the entry at `index` and hand it back so the form can be
    /// refilled for editing
    pub fn take_entry(&mut self, index: usize) -> DomainResult<LedgerEntry> {
        if index >= self.entries.len() {
            return Err(DomainError::NotFound(format!("entry {}", index)));
        }
        let mut entries = self.entries.clone();
        let entry = entries.remove(index);
        self.commit(entries)?;
        Ok(entry)
    }

    fn validate(&self, draft: EntryDraft) -> DomainResult<LedgerEntry> {
        let amount = draft.amount.trim();
        let payer = draft.payer.trim();
        if amount.is_empty() || payer.is_empty() {
            return Err(DomainError::InvalidInput(REQUIRED_FIELDS.into()));
        }
        let amount: u64 = amount
            .parse()
            .map_err(|_| DomainError::InvalidInput("金額は0以上の整数で入力してください。".into()))?;
        let date = match draft.date.trim() {
            "" => self.clock.today().format("%Y-%m-%d").to_string(),
            d => d.to_string(),
        };

        Ok(LedgerEntry {
            date,
            text: draft.text.trim().to_string(),
            amount,
            payer: payer.to_string(),
            category: draft.category.filter(|c| !c.trim().is_empty()),
        })
    }

    /// Write the new list, then adopt it. A failed write leaves the
    /// in-memory list as it was.
    fn commit(&mut self, entries: Vec<LedgerEntry>) -> DomainResult<()> {
        self.repo.save_entries(&self.current, &entries)?;
        self.entries = entries;
        Ok(())
    }

    // ========================
    // Categories
    // ========================

    pub fn categories(&self) -> Vec<String> {
        self.repo
            .categories()
            .unwrap_or_else(|| self.config.default_ledger_categories.clone())
    }

    /// Returns `false` when the category already exists
    pub fn add_category(&mut self, name: &str) -> DomainResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("カテゴリ名を入力してください。".into()));
        }
        let mut categories = self.categories();
        if categories.iter().any(|c| c == name) {
            return Ok(false);
        }
        categories.push(name.to_string());
        self.repo.save_categories(&categories)?;
        Ok(true)
    }

    /// Remove a category unless an entry of any project uses it
    pub fn delete_category(&mut self, name: &str) -> DomainResult<()> {
        if self.category_in_use(name) {
            return Err(DomainError::Conflict(format!("「{}」は使用中のため削除できません。", name)));
        }
        let mut categories = self.categories();
        categories.retain(|c| c != name);
        self.repo.save_categories(&categories)
    }

    pub fn category_in_use(&self, name: &str) -> bool {
        let uses = |entries: &[LedgerEntry]| entries.iter().any(|e| e.category.as_deref() == Some(name));
        uses(&self.entries)
            || self
                .repo
                .project_names()
                .iter()
                .filter(|p| **p != self.current)
                .any(|p| uses(&self.repo.load_entries(p)))
    }
}
