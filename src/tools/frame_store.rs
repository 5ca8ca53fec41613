use crate::tools::{load_yaml_or_default, save_yaml_atomic};
use anyhow::{Context, Result};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 已發布影格的描述資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameArtifact {
    pub title: String,
    pub season: String,
    pub episode: String,
    /// 可由外部人工修改，管線不會覆寫已存在的值
    #[serde(default = "default_include")]
    pub include: bool,
    pub url: String,
}

const fn default_include() -> bool {
    true
}

/// 影格描述資料庫（`frames.yaml`），所有執行結果的聯集
#[derive(Debug)]
pub struct FrameStore {
    path: PathBuf,
    frames: BTreeMap<String, FrameArtifact>,
}

impl FrameStore {
    pub fn load(path: &Path) -> Result<Self> {
        let frames = load_yaml_or_default(path)
            .with_context(|| format!("無法載入影格資料: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            frames,
        })
    }

    /// 只新增不覆寫，回傳是否為新鍵
    pub fn insert_if_absent(&mut self, key: &str, artifact: FrameArtifact) -> bool {
        if self.frames.contains_key(key) {
            return false;
        }
        self.frames.insert(key.to_string(), artifact);
        true
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FrameArtifact> {
        self.frames.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 下游發布流程可挑選的影格（`include == true`）
    pub fn eligible(&self) -> impl Iterator<Item = (&str, &FrameArtifact)> {
        self.frames
            .iter()
            .filter(|(_, frame)| frame.include)
            .map(|(key, frame)| (key.as_str(), frame))
    }

    pub fn pick_random_eligible<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Option<(&str, &FrameArtifact)> {
        let eligible: Vec<_> = self.eligible().collect();
        eligible.choose(rng).copied()
    }

    pub fn persist(&self) -> Result<()> {
        save_yaml_atomic(&self.frames, &self.path)
            .with_context(|| format!("無法儲存影格資料: {}", self.path.display()))
    }
}
