//! The document store - THE source of truth shared by every view.
//!
//! Map, code editor, table and property editor all read from one
//! [`DocumentStore`] and send their edits back through it. The store keeps
//! the mirrored JSON text in one of two states:
//!
//! - `Synced`: the text describes the current document (either the pretty
//!   serialization or the user's last valid input).
//! - `Diverged`: the user typed something that failed validation. The text
//!   is kept verbatim, the document is left alone and the error is exposed.
//!
//! Every successful mutation is written to the key-value storage.
//! Persistence failures are logged and otherwise ignored.

use std::sync::mpsc::{channel, Receiver, Sender};

use geoedit_core::{
    create_empty, serialize, validate, Feature, FeatureCollection, FeatureId, Properties,
    ValidationError,
};
use tracing::{debug, warn};

use crate::storage::{load_document, save_document, KeyValueStore};

/// Relationship between the mirrored text and the document
#[derive(Debug, Clone, PartialEq)]
pub enum TextState {
    Synced(String),
    Diverged { text: String, error: ValidationError },
}

impl TextState {
    pub fn text(&self) -> &str {
        match self {
            TextState::Synced(text) | TextState::Diverged { text, .. } => text,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            TextState::Synced(_) => None,
            TextState::Diverged { error, .. } => Some(error),
        }
    }

    pub fn is_diverged(&self) -> bool {
        matches!(self, TextState::Diverged { .. })
    }
}

/// Change notifications pushed to subscribers after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    DocumentChanged,
    TextChanged,
    TextErrorChanged,
    SelectionChanged,
}

/// Owned copy of everything a view needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: FeatureCollection,
    pub mirrored_text: String,
    pub text_error: Option<String>,
    pub selection: Option<Feature>,
}

/// Values compared before and after a mutation to decide which events fire
struct Before {
    text_error: Option<ValidationError>,
    selection: Option<Feature>,
}

pub struct DocumentStore<S: KeyValueStore> {
    document: FeatureCollection,
    text: TextState,
    /// Copy of the selected feature, kept in step with the document
    selection: Option<Feature>,
    storage: S,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Create the session store, restoring whatever `storage` holds
    pub fn open(storage: S) -> Self {
        let document = load_document(&storage);
        let text = TextState::Synced(serialize(&document));
        Self {
            document,
            text,
            selection: None,
            storage,
            subscribers: Vec::new(),
        }
    }

    pub fn document(&self) -> &FeatureCollection {
        &self.document
    }

    pub fn mirrored_text(&self) -> &str {
        self.text.text()
    }

    pub fn text_error(&self) -> Option<&ValidationError> {
        self.text.error()
    }

    pub fn text_state(&self) -> &TextState {
        &self.text
    }

    pub fn selection(&self) -> Option<&Feature> {
        self.selection.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            mirrored_text: self.mirrored_text().to_string(),
            text_error: self.text_error().map(ToString::to_string),
            selection: self.selection.clone(),
        }
    }

    /// Register for change events. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    // --- Mutations ---

    /// Apply an edit from the code editor.
    ///
    /// The text is stored verbatim whether or not it parses, so the editor
    /// never fights the cursor. Invalid text leaves the document untouched.
    pub fn set_text_value(&mut self, text: impl Into<String>) {
        let before = self.before();
        let text = text.into();

        let document_changed = match validate(&text) {
            Ok(doc) => {
                self.document = doc;
                self.text = TextState::Synced(text);
                self.reconcile_selection();
                self.persist();
                debug!(features = self.document.len(), "text edit applied");
                true
            }
            Err(error) => {
                debug!(%error, "text edit rejected");
                self.text = TextState::Diverged { text, error };
                false
            }
        };

        self.notify(before, document_changed, true);
    }

    /// Append a feature; it draws above every existing one.
    ///
    /// A feature with a NaN or infinite coordinate is refused and the
    /// call returns false; the document and storage are left as they were.
    pub fn add_feature(&mut self, feature: Feature) -> bool {
        if !feature.has_finite_coordinates() {
            warn!(id = ?feature.id, "refusing feature with non-finite coordinates");
            return false;
        }
        let before = self.before();
        self.document.features.push(feature);
        debug!(features = self.document.len(), "feature added");
        self.commit(before);
        true
    }

    /// Remove every feature sharing `feature`'s identity token.
    ///
    /// Returns how many features were removed.
    pub fn remove_feature(&mut self, feature: &Feature) -> usize {
        let before = self.before();
        let count = self.document.len();
        self.document.features.retain(|f| !f.same_identity(feature));
        let removed = count - self.document.len();
        debug!(removed, "feature removed");
        self.commit(before);
        removed
    }

    /// Replace (not merge) the properties of the features with token `id`,
    /// refreshing the selection when it is one of them. Re-serializes and
    /// persists.
    ///
    /// Returns how many features were updated. An id that matches nothing
    /// is a no-op: the text is not re-serialized (a diverged edit stays in
    /// the editor) and nothing is written to storage.
    pub fn update_feature_properties(&mut self, id: &FeatureId, properties: Properties) -> usize {
        let before = self.before();
        let mut updated = 0;
        for feature in self.document.features.iter_mut().filter(|f| f.id.as_ref() == Some(id)) {
            feature.properties = properties.clone();
            updated += 1;
        }
        if updated == 0 {
            return 0;
        }
        debug!(%id, "feature properties updated");
        self.commit(before);
        updated
    }

    /// Swap in a whole new document (import).
    ///
    /// The selection survives only if the new document holds a feature
    /// with the same identity token, in which case it follows that feature.
    /// Documents with NaN or infinite coordinates are refused (returns false).
    pub fn replace_document(&mut self, doc: FeatureCollection) -> bool {
        if !doc.has_finite_coordinates() {
            warn!("refusing document with non-finite coordinates");
            return false;
        }
        let before = self.before();
        self.document = doc;
        debug!(features = self.document.len(), "document replaced");
        self.commit(before);
        true
    }

    /// Start over with an empty document and no selection
    pub fn reset(&mut self) {
        let before = self.before();
        self.document = create_empty();
        self.selection = None;
        debug!("document reset");
        self.commit(before);
    }

    /// Select a feature of the document, or clear the selection.
    ///
    /// The document's own copy is stored. Asking for a feature that is not
    /// in the document clears the selection and returns false.
    pub fn set_selection(&mut self, feature: Option<&Feature>) -> bool {
        let before = self.before();
        self.selection = feature.and_then(|wanted| self.find_same(wanted)).cloned();
        let selected = self.selection.is_some();
        self.notify(before, false, false);
        selected
    }

    /// Select by identity token
    pub fn select_id(&mut self, id: &FeatureId) -> bool {
        match self.document.find(id).cloned() {
            Some(feature) => self.set_selection(Some(&feature)),
            None => self.set_selection(None),
        }
    }

    // --- Internals ---

    fn find_same(&self, wanted: &Feature) -> Option<&Feature> {
        self.document.features.iter().find(|f| f.same_identity(wanted))
    }

    /// Point the selection at the document's current copy, or drop it
    fn reconcile_selection(&mut self) {
        if let Some(selected) = self.selection.take() {
            self.selection = self.find_same(&selected).cloned();
        }
    }

    fn before(&self) -> Before {
        Before {
            text_error: self.text_error().cloned(),
            selection: self.selection.clone(),
        }
    }

    /// Finish a document mutation that did not come from the text view
    fn commit(&mut self, before: Before) {
        let text = serialize(&self.document);
        let text_changed = self.text.is_diverged() || self.text.text() != text;
        self.text = TextState::Synced(text);
        self.reconcile_selection();
        self.persist();
        self.notify(before, true, text_changed);
    }

    fn persist(&mut self) {
        if let Err(e) = save_document(&mut self.storage, &self.document) {
            warn!("Failed to persist document: {:#}", e);
        }
    }

    fn notify(&mut self, before: Before, document_changed: bool, text_changed: bool) {
        let mut events = Vec::new();
        if document_changed {
            events.push(StoreEvent::DocumentChanged);
        }
        if text_changed {
            events.push(StoreEvent::TextChanged);
        }
        if before.text_error.as_ref() != self.text_error() {
            events.push(StoreEvent::TextErrorChanged);
        }
        if before.selection != self.selection {
            events.push(StoreEvent::SelectionChanged);
        }

        // Drop subscribers whose receiver is gone
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(*event).is_ok()));
    }
}
