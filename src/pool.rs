//! Tracker pool: one single-object tracker per seeded identity.

use std::marker::PhantomData;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::input::validate_seeds;
use crate::model::{SeedEntry, TrackedObject};
use crate::tracker::{SingleObjectTracker, TrackerFactory, TrackerKind};

/// How a lost tracker affects the frame's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePolicy {
    /// One lost tracker empties the whole frame's output.
    #[default]
    Grouped,
    /// Only the lost identities are left out of the frame's output.
    PerObject,
}

/// Result of one grouped update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolUpdate {
    /// Objects to render for this frame, in pool order
    pub objects: Vec<TrackedObject>,
    /// Identities whose tracker lost the target this frame
    pub lost: Vec<usize>,
}

impl PoolUpdate {
    pub fn is_degraded(&self) -> bool {
        !self.lost.is_empty()
    }
}

struct PoolMember<T> {
    identity: usize,
    tracker: T,
}

/// Seeds one tracker per ground-truth entry and advances them together.
///
/// The pool keeps the last known state of every identity. `members` and
/// `objects` are parallel and always the same length.
pub struct TrackerPool<F, K: TrackerFactory<F>> {
    factory: K,
    kind: TrackerKind,
    policy: UpdatePolicy,
    members: Vec<PoolMember<K::Tracker>>,
    objects: Vec<TrackedObject>,
    seeded: bool,
    _frame: PhantomData<fn(&F)>,
}

impl<F, K: TrackerFactory<F>> TrackerPool<F, K> {
    pub fn new(factory: K, kind: TrackerKind) -> Self {
        Self {
            factory,
            kind,
            policy: UpdatePolicy::default(),
            members: Vec::new(),
            objects: Vec::new(),
            seeded: false,
            _frame: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> TrackerKind {
        self.kind
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Number of trackers in the pool.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Last known state of every identity.
    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    /// Creates and initializes one tracker per seed entry.
    ///
    /// Identities are the entries' positions in `seeds`; the entries' own `id`
    /// fields are not used.
    pub fn seed(&mut self, frame: &F, seeds: &[SeedEntry]) -> Result<()> {
        if self.seeded {
            return Err(Error::AlreadySeeded);
        }
        validate_seeds(seeds)?;

        let mut members = Vec::with_capacity(seeds.len());
        let mut objects = Vec::with_capacity(seeds.len());
        for (identity, entry) in seeds.iter().enumerate() {
            let bbox = entry.bbox();
            let mut tracker =
                self.factory
                    .create(self.kind)
                    .map_err(|e| Error::TrackerInit {
                        index: identity,
                        message: e.to_string(),
                    })?;
            tracker
                .init(frame, bbox)
                .map_err(|e| Error::TrackerInit {
                    index: identity,
                    message: e.to_string(),
                })?;
            tracing::debug!(
                "Seeded {} tracker for object #{} ({}, seed id {})",
                self.kind,
                identity,
                entry.object,
                entry.id
            );
            members.push(PoolMember { identity, tracker });
            objects.push(TrackedObject::new(identity, entry.object.clone(), bbox));
        }

        self.members = members;
        self.objects = objects;
        self.seeded = true;
        Ok(())
    }

    /// Steps every tracker once on `frame`.
    pub fn advance(&mut self, frame: &F) -> Result<PoolUpdate> {
        if !self.seeded {
            return Err(Error::NotSeeded);
        }

        let mut boxes = Vec::with_capacity(self.members.len());
        for member in self.members.iter_mut() {
            boxes.push(member.tracker.step(frame)?);
        }

        let lost: Vec<usize> = self
            .members
            .iter()
            .zip(&boxes)
            .filter(|(_, bbox)| bbox.is_none())
            .map(|(member, _)| member.identity)
            .collect();

        if lost.is_empty() {
            let objects: Vec<TrackedObject> = self
                .objects
                .iter()
                .zip(boxes.into_iter().flatten())
                .map(|(obj, bbox)| obj.with_bbox(bbox))
                .collect();
            self.objects = objects.clone();
            return Ok(PoolUpdate { objects, lost });
        }

        match self.policy {
            UpdatePolicy::Grouped => {
                tracing::warn!(
                    "Tracker pool update failed, lost identities {:?}; frame output is empty",
                    lost
                );
                Ok(PoolUpdate {
                    objects: Vec::new(),
                    lost,
                })
            }
            UpdatePolicy::PerObject => {
                tracing::warn!("Lost identities {:?}, keeping their last known boxes", lost);
                let retained: Vec<TrackedObject> = self
                    .objects
                    .iter()
                    .zip(&boxes)
                    .map(|(obj, bbox)| match bbox {
                        Some(bbox) => obj.with_bbox(*bbox),
                        None => obj.clone(),
                    })
                    .collect();
                let objects = retained
                    .iter()
                    .zip(&boxes)
                    .filter(|(_, bbox)| bbox.is_some())
                    .map(|(obj, _)| obj.clone())
                    .collect();
                self.objects = retained;
                Ok(PoolUpdate { objects, lost })
            }
        }
    }
}
