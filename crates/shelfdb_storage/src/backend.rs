//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for ShelfDB.
///
/// Storage backends are **opaque byte stores** over one WAL, segment, or
/// index file. ShelfDB owns all format interpretation - backends never see
/// record frames, only bytes. The engine opens a backend as a scoped
/// handle per file operation and drops it when done.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `sync` ensures all appended data is durable
/// - Backends must be `Send + Sync`
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read would extend beyond the current size
    /// or an I/O error occurs.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Reads the entire contents of the storage.
    ///
    /// This is the engine's bulk read path: WAL replay, segment scans, and
    /// index loads all pull whole files through it.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined or the read fails.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        #[allow(clippy::cast_possible_truncation)]
        let len = size as usize;
        self.read_at(0, len)
    }

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// This is a stronger guarantee than `flush`: after this returns
    /// successfully, all previously appended data survives process
    /// termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
