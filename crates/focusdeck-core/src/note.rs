use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Split a comma separated tag field, dropping blanks. `None` if nothing is left.
pub fn parse_tags(input: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CoreError::validation("Note title is required"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_data() -> Self {
        let at = |y: i32, m: u32, d: u32| {
            Local
                .with_ymd_and_hms(y, m, d, 0, 0, 0)
                .earliest()
                .unwrap_or_else(Local::now)
        };
        let notes = vec![
            Note {
                id: "1".to_string(),
                title: "Meeting Notes".to_string(),
                content: "Discussed project timeline and resource allocation for Q3.".to_string(),
                created_at: at(2025, 6, 5),
                updated_at: at(2025, 6, 5),
                color: Some("#3b82f6".to_string()),
                tags: Some(vec!["meeting".to_string(), "project".to_string()]),
            },
            Note {
                id: "2".to_string(),
                title: "Ideas for Mobile App".to_string(),
                content: "Add dark mode support\nImplement push notifications\nOptimize performance"
                    .to_string(),
                created_at: at(2025, 6, 3),
                updated_at: at(2025, 6, 4),
                color: Some("#10b981".to_string()),
                tags: Some(vec!["ideas".to_string(), "development".to_string()]),
            },
        ];
        Self { notes }
    }

    pub fn add(&mut self, new_note: NewNote) -> Result<&Note> {
        require_title(&new_note.title)?;

        let now = Local::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: new_note.title,
            content: new_note.content,
            created_at: now,
            updated_at: now,
            color: new_note.color,
            tags: new_note.tags,
        };
        tracing::debug!(id = %note.id, "note added");
        self.notes.push(note);
        Ok(&self.notes[self.notes.len() - 1])
    }

    /// Replace the note sharing `note.id`; `updated_at` is always refreshed
    pub fn update(&mut self, mut note: Note) -> Result<()> {
        require_title(&note.title)?;
        let slot = self
            .notes
            .iter_mut()
            .find(|n| n.id == note.id)
            .ok_or_else(|| CoreError::not_found("Note", note.id.clone()))?;

        // The caller's copy may carry a stale created_at; the stored one wins.
        note.created_at = slot.created_at;
        note.updated_at = Local::now().max(note.created_at);
        tracing::debug!(id = %note.id, "note updated");
        *slot = note;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_add_sets_timestamps() {
        let mut store = NoteStore::new();
        let note = store.add(NewNote::new("Groceries", "milk")).unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.content, "milk");
    }

    #[test]
    fn test_add_requires_title() {
        let mut store = NoteStore::new();
        assert!(store.add(NewNote::new("", "body")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let mut store = NoteStore::with_sample_data();
        let original = store.get("1").unwrap().clone();

        let mut edited = original.clone();
        edited.content = "Timeline moved to Q4".to_string();
        edited.updated_at = original.created_at - Duration::days(30);
        store.update(edited).unwrap();

        let stored = store.get("1").unwrap();
        assert_eq!(stored.content, "Timeline moved to Q4");
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at >= stored.created_at);
        assert!(stored.updated_at > original.updated_at);
    }

    #[test]
    fn test_update_keeps_stored_created_at() {
        let mut store = NoteStore::with_sample_data();
        let mut edited = store.get("2").unwrap().clone();
        let real_created = edited.created_at;
        edited.created_at = Local::now() + Duration::days(365);
        store.update(edited).unwrap();

        let stored = store.get("2").unwrap();
        assert_eq!(stored.created_at, real_created);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[test]
    fn test_update_unknown_note() {
        let mut store = NoteStore::new();
        let ghost = Note {
            id: "ghost".to_string(),
            title: "Ghost".to_string(),
            content: String::new(),
            created_at: Local::now(),
            updated_at: Local::now(),
            color: None,
            tags: None,
        };
        assert!(matches!(
            store.update(ghost),
            Err(CoreError::NotFound { entity: "Note", .. })
        ));
    }

    #[test]
    fn test_delete_only_note() {
        let mut store = NoteStore::new();
        let id = store.add(NewNote::new("Only", "")).unwrap().id.clone();
        assert!(store.delete(&id));
        assert!(store.is_empty());
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(" work, ideas ,,  "),
            Some(vec!["work".to_string(), "ideas".to_string()])
        );
        assert_eq!(parse_tags(" , "), None);
        assert_eq!(parse_tags(""), None);
    }
}
