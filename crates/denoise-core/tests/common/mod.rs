//! Shared test utilities for denoise-core integration tests.

use async_trait::async_trait;
use denoise_core::{EnhanceError, EnhanceOutput, EnhanceParameters, Enhancer};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tempfile::TempDir;

/// What a scripted call does.
#[derive(Debug, Clone)]
pub enum Step {
    /// Fail with the given error.
    Fail(EnhanceError),
    /// Succeed with a denoised artifact holding these bytes, plus an
    /// enhanced artifact.
    Succeed(Vec<u8>),
    /// Succeed with a zero-length artifact.
    Empty,
    /// Succeed without any denoised artifact.
    NoArtifact,
}

/// One recorded `enhance` call.
#[derive(Debug, Clone)]
pub struct Call {
    /// Chunk file name.
    pub name: String,
    /// When the call started.
    pub at: Instant,
}

/// An `Enhancer` whose answers are scripted per chunk name.
///
/// Chunks without a script, or whose script is used up, fail with a
/// request error.
pub struct ScriptedEnhancer {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<Call>>,
    artifacts: TempDir,
}

impl ScriptedEnhancer {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            artifacts: TempDir::new().unwrap(),
        }
    }

    /// Script the answers for `name`, one step per call.
    pub fn script(self, name: &str, steps: Vec<Step>) -> Self {
        self.scripts.lock().unwrap().insert(name.to_string(), steps.into());
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Artifacts still present in the enhancer's scratch directory.
    pub fn artifact_count(&self) -> usize {
        std::fs::read_dir(self.artifacts.path()).unwrap().count()
    }

    /// Calls made for one chunk.
    pub fn calls_for(&self, name: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.name == name).collect()
    }
}

#[async_trait]
impl Enhancer for ScriptedEnhancer {
    async fn enhance(
        &self,
        input: &Path,
        _parameters: &EnhanceParameters,
    ) -> Result<EnhanceOutput, EnhanceError> {
        let name = input.file_name().unwrap().to_string_lossy().to_string();
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call { name: name.clone(), at: Instant::now() });
            calls.len()
        };

        let step = self.scripts.lock().unwrap().get_mut(&name).and_then(VecDeque::pop_front);
        let artifact = self.artifacts.path().join(format!("{}-{}", index, name));

        match step {
            Some(Step::Succeed(bytes)) => {
                let enhanced = self.artifacts.path().join(format!("{}-enhanced-{}", index, name));
                std::fs::write(&artifact, bytes).unwrap();
                std::fs::write(&enhanced, b"enhanced").unwrap();
                Ok(EnhanceOutput { denoised: Some(artifact), enhanced: Some(enhanced) })
            }
            Some(Step::Empty) => {
                std::fs::write(&artifact, b"").unwrap();
                Ok(EnhanceOutput { denoised: Some(artifact), enhanced: None })
            }
            Some(Step::NoArtifact) => Ok(EnhanceOutput { denoised: None, enhanced: None }),
            Some(Step::Fail(error)) => Err(error),
            None => Err(EnhanceError::RequestError("service unreachable".to_string())),
        }
    }

    fn endpoint_id(&self) -> &str {
        "scripted"
    }
}

/// Write `files` into a fresh input directory.
pub fn input_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, bytes) in files {
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }
    dir
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
