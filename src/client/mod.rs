//! Client side of VocabMaster: local persistence, the API client and the
//! learning session built on top of them.

pub mod api;
pub mod history;
pub mod identity;
pub mod queue;
pub mod saved_words;
pub mod session;
pub mod storage;

pub use api::{ApiClientError, VocabularyClient, WordGenerator};
pub use history::WordHistory;
pub use identity::anonymous_id;
pub use queue::{PendingOperation, PendingQueue, QueueItem};
pub use saved_words::{
    LocalSavedWords, SavedWord, SavedWordStore, SavedWordsError, SavedWordsRemote,
};
pub use session::{GenerationTicket, Mode, Notification, NotificationKind, VocabularySession};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, StorageError};
