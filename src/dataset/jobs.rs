//! Job enumeration and creation.

use std::io;
use std::path::Path;
use std::sync::Arc;

use web_time::{SystemTime, UNIX_EPOCH};

use super::record::{RecordError, read_json, write_json};
use crate::constants::{ANNOTATIONS_DIR, IMAGES_DIR, JOB_ID_PREFIX, JOB_META_FILE, JOBS_DIR};
use crate::model::{JobMeta, JobPaths, JobSummary};
use crate::storage::Storage;

/// Registry of jobs, one directory per job under `jobs/`.
///
/// Job ids are generated from the creation second. Two jobs created within
/// the same second share an id; the second creation rewrites the metadata of
/// the first and keeps its images and annotations.
#[derive(Clone)]
pub struct JobRegistry {
    storage: Arc<dyn Storage>,
}

impl JobRegistry {
    /// Create a registry over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn jobs_root() -> &'static Path {
        Path::new(JOBS_DIR)
    }

    /// Storage paths of a job. Does not check that the job exists.
    pub fn paths(&self, job_id: &str) -> JobPaths {
        let job_dir = Self::jobs_root().join(job_id);
        JobPaths {
            images_dir: job_dir.join(IMAGES_DIR),
            annotations_dir: job_dir.join(ANNOTATIONS_DIR),
            job_dir,
        }
    }

    /// Whether a job directory exists for `job_id`.
    ///
    /// Ids that are not a single plain path component never exist.
    pub fn exists(&self, job_id: &str) -> bool {
        is_valid_job_id(job_id) && self.storage.is_dir(&Self::jobs_root().join(job_id))
    }

    /// Ids of every job directory, sorted.
    pub fn ids(&self) -> io::Result<Vec<String>> {
        let entries = match self.storage.list(Self::jobs_root()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect())
    }

    /// Read a job's metadata record.
    pub fn meta(&self, job_id: &str) -> Result<JobMeta, RecordError> {
        let path = self.paths(job_id).job_dir.join(JOB_META_FILE);
        read_json(self.storage.as_ref(), &path)
    }

    /// List every job with its display name and image count.
    pub fn list(&self) -> io::Result<Vec<JobSummary>> {
        let mut jobs = Vec::new();
        for id in self.ids()? {
            let name = match self.meta(&id) {
                Ok(meta) => meta.name,
                Err(e) => {
                    if !matches!(e, RecordError::Missing { .. }) {
                        log::warn!("Ignoring metadata of job '{}': {}", id, e);
                    }
                    id.clone()
                }
            };
            let image_count = self.image_count(&id)?;
            jobs.push(JobSummary {
                id,
                name,
                image_count,
            });
        }
        Ok(jobs)
    }

    /// Number of non-hidden entries in a job's image directory (0 if absent).
    pub fn image_count(&self, job_id: &str) -> io::Result<usize> {
        match self.storage.list(&self.paths(job_id).images_dir) {
            Ok(entries) => Ok(entries.iter().filter(|e| !e.is_hidden()).count()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Create a job named `name` and return its id.
    pub fn create(&self, name: &str) -> io::Result<String> {
        self.create_at(name, SystemTime::now())
    }

    /// Create a job as if at time `now`.
    pub fn create_at(&self, name: &str, now: SystemTime) -> io::Result<String> {
        let created = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let job_id = format!("{}{}", JOB_ID_PREFIX, created.trunc() as u64);

        let paths = self.paths(&job_id);
        self.storage.create_dir_all(&paths.images_dir)?;
        self.storage.create_dir_all(&paths.annotations_dir)?;

        let meta = JobMeta {
            name: name.to_string(),
            created,
        };
        write_json(
            self.storage.as_ref(),
            &paths.job_dir.join(JOB_META_FILE),
            &meta,
        )?;

        log::info!("Created job '{}' ({})", job_id, name);
        Ok(job_id)
    }
}

/// A job id must be usable as exactly one directory name.
pub fn is_valid_job_id(job_id: &str) -> bool {
    !job_id.is_empty()
        && job_id != "."
        && job_id != ".."
        && !job_id.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryStorage;

    fn registry() -> (Arc<MemoryStorage>, JobRegistry) {
        let storage = Arc::new(MemoryStorage::new());
        let registry = JobRegistry::new(storage.clone());
        (storage, registry)
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(secs * 1000 + 250)
    }

    #[test]
    fn test_create_id_and_layout() {
        let (storage, registry) = registry();
        let id = registry.create_at("Cats", at(1_700_000_000)).unwrap();

        assert_eq!(id, "job_1700000000");
        assert!(registry.exists(&id));
        assert!(storage.is_dir(Path::new("jobs/job_1700000000/images")));
        assert!(storage.is_dir(Path::new("jobs/job_1700000000/annotations")));

        let meta = registry.meta(&id).unwrap();
        assert_eq!(meta.name, "Cats");
        assert!((meta.created - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn test_create_adds_one_empty_job() {
        let (_, registry) = registry();
        registry.create_at("first", at(10)).unwrap();
        let before = registry.list().unwrap().len();

        let id = registry.create_at("second", at(20)).unwrap();
        let jobs = registry.list().unwrap();

        assert_eq!(jobs.len(), before + 1);
        let created = jobs.iter().find(|j| j.id == id).unwrap();
        assert_eq!(created.name, "second");
        assert_eq!(created.image_count, 0);
    }

    #[test]
    fn test_same_second_creation_overwrites_metadata() {
        let (_, registry) = registry();
        let a = registry.create_at("a", at(5)).unwrap();
        let b = registry.create_at("b", at(5)).unwrap();

        assert_eq!(a, b);
        let jobs = registry.list().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "b");
    }

    #[test]
    fn test_list_falls_back_to_id_and_counts_visible_images() {
        let (storage, registry) = registry();
        storage.create_dir_all(Path::new("jobs/legacy/images")).unwrap();
        storage.write(Path::new("jobs/legacy/images/a.png"), b"x").unwrap();
        storage.write(Path::new("jobs/legacy/images/notes"), b"x").unwrap();
        storage.write(Path::new("jobs/legacy/images/.DS_Store"), b"x").unwrap();

        storage.create_dir_all(Path::new("jobs/broken")).unwrap();
        storage.write(Path::new("jobs/broken/meta.json"), b"{not json").unwrap();

        storage.write(Path::new("jobs/stray-file"), b"x").unwrap();

        let jobs = registry.list().unwrap();
        assert_eq!(
            jobs,
            vec![
                JobSummary {
                    id: "broken".into(),
                    name: "broken".into(),
                    image_count: 0
                },
                JobSummary {
                    id: "legacy".into(),
                    name: "legacy".into(),
                    image_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_list_without_jobs_dir() {
        let (_, registry) = registry();
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_ids_never_exist() {
        let (storage, registry) = registry();
        storage.create_dir_all(Path::new("jobs/real")).unwrap();
        assert!(registry.exists("real"));
        assert!(!registry.exists(""));
        assert!(!registry.exists(".."));
        assert!(!registry.exists("real/../real"));
        assert!(!registry.exists("missing"));
    }
}
