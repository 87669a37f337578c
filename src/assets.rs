//! Fish-kind registry: which fish images are usable right now.
//!
//! The scene never touches image elements; the host loads them and reports
//! back through `mark_ready` / `mark_failed`. Failed kinds are retried after
//! `IMAGE_RETRY_SECS` of scene time.

use crate::config::FishImage;

pub const IMAGE_RETRY_SECS: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageState {
    Pending,
    Ready,
    Failed { retry_at: f64 },
}

#[derive(Clone, Debug)]
pub struct FishKind {
    pub kind: String,
    pub src: String,
    pub state: ImageState,
    /// Failed loads so far; only the first one is logged as a warning.
    pub failures: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FishKinds {
    kinds: Vec<FishKind>,
    warned_empty: bool,
}

impl FishKinds {
    pub fn new(images: &[FishImage]) -> Self {
        let kinds = images
            .iter()
            .map(|img| FishKind {
                kind: img.kind.clone(),
                src: img.src.clone(),
                state: ImageState::Pending,
                failures: 0,
            })
            .collect();
        Self { kinds, warned_empty: false }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FishKind> {
        self.kinds.iter()
    }

    pub fn index_of(&self, kind: &str) -> Option<usize> {
        self.kinds.iter().position(|k| k.kind == kind)
    }

    pub fn get(&self, idx: usize) -> Option<&FishKind> {
        self.kinds.get(idx)
    }

    pub fn is_ready(&self, idx: usize) -> bool {
        matches!(self.kinds.get(idx).map(|k| k.state), Some(ImageState::Ready))
    }

    pub fn ready_kinds(&self) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| k.state == ImageState::Ready)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn mark_ready(&mut self, kind: &str) {
        if let Some(k) = self.kinds.iter_mut().find(|k| k.kind == kind) {
            k.state = ImageState::Ready;
        }
    }

    pub fn mark_failed(&mut self, kind: &str, now: f64) {
        if let Some(k) = self.kinds.iter_mut().find(|k| k.kind == kind) {
            k.failures += 1;
            if k.failures == 1 {
                log::warn!("fish image '{}' ({}) failed to load, retrying later", k.kind, k.src);
            } else {
                log::debug!("fish image '{}' still failing ({} attempts)", k.kind, k.failures);
            }
            k.state = ImageState::Failed { retry_at: now + IMAGE_RETRY_SECS };
        }
    }

    /// Kinds whose retry time has come; they are flipped back to `Pending`.
    pub fn due_retries(&mut self, now: f64) -> Vec<String> {
        let mut due = Vec::new();
        for k in &mut self.kinds {
            if let ImageState::Failed { retry_at } = k.state {
                if now >= retry_at {
                    k.state = ImageState::Pending;
                    due.push(k.kind.clone());
                }
            }
        }
        due
    }

    /// Logs the missing table the first time it is noticed; true if empty.
    pub fn warn_if_empty(&mut self) -> bool {
        if self.kinds.is_empty() {
            if !self.warned_empty {
                log::warn!("no fish image table supplied; fish are disabled");
                self.warned_empty = true;
            }
            return true;
        }
        false
    }
}
