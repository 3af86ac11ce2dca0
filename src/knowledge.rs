//! Knowledge store facade
//!
//! [`KnowledgeBase`] is what action handlers call. Each operation compiles
//! the phrases involved into one pattern, runs it as a single store round
//! trip and shapes the answer back into plain strings. A lookup that finds
//! nothing answers [`UNKNOWN`]; only store faults are errors.
//!
//! ```
//! use recall_kg::{InfoKind, KnowledgeBase, MemoryGraph, NounPhrase, SpecifierTag, UNKNOWN};
//!
//! # #[tokio::main]
//! # async fn main() -> recall_kg::Result<()> {
//! let kb = KnowledgeBase::new(MemoryGraph::new());
//! let my_keys = NounPhrase::new("cheile")
//!     .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele"));
//!
//! kb.set_value(&my_keys, NounPhrase::new("masă"), InfoKind::Loc).await?;
//!
//! assert_eq!(kb.get_value(&my_keys, InfoKind::Loc).await?, "masă");
//! assert_eq!(kb.get_value(&my_keys, InfoKind::Val).await?, UNKNOWN);
//! # Ok(())
//! # }
//! ```

use crate::compiler::{
    attach_fact, compile_into, probe_action, probe_fact, CompileContext, CompileMode, FactValue,
};
use crate::error::{KnowledgeError, Result};
use crate::schema::{AttachStrategy, InfoKind, NounPhrase};
use crate::store::{GraphStore, ReadRequest};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Answer given when nothing is known
pub const UNKNOWN: &str = "Nu știu";

/// A time fact of an action record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFact {
    pub value: String,
    pub kind: InfoKind,
}

/// Who did what, to what, where and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub subject: NounPhrase,
    /// Action name, usually the verb lemma
    pub action: String,
    #[serde(default)]
    pub direct_object: Option<NounPhrase>,
    #[serde(default)]
    pub locations: Vec<NounPhrase>,
    #[serde(default)]
    pub times: Vec<TimeFact>,
}

impl ActionRecord {
    pub fn new(subject: NounPhrase, action: impl Into<String>) -> Self {
        Self {
            subject,
            action: action.into(),
            direct_object: None,
            locations: Vec::new(),
            times: Vec::new(),
        }
    }

    pub fn with_direct_object(mut self, object: NounPhrase) -> Self {
        self.direct_object = Some(object);
        self
    }

    pub fn at(mut self, location: NounPhrase) -> Self {
        self.locations.push(location);
        self
    }

    pub fn when(mut self, value: impl Into<String>, kind: InfoKind) -> Self {
        self.times.push(TimeFact {
            value: value.into(),
            kind,
        });
        self
    }
}

/// Facade over a [`GraphStore`]
pub struct KnowledgeBase<S> {
    store: S,
    strict_tags: bool,
}

impl<S: GraphStore> KnowledgeBase<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            strict_tags: false,
        }
    }

    /// Fail on unrecognized specifier tags instead of dropping them
    pub fn with_strict_tags(mut self, strict: bool) -> Self {
        self.strict_tags = strict;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn context(&self, mode: CompileMode) -> CompileContext {
        CompileContext::new(mode).strict(self.strict_tags)
    }

    /// Record `value` as a `kind` fact of `entity`.
    ///
    /// Literal kinds take text, `LOC` takes a noun phrase. Facts accumulate:
    /// nothing stored earlier is replaced.
    pub async fn set_value(
        &self,
        entity: &NounPhrase,
        value: impl Into<FactValue>,
        kind: InfoKind,
    ) -> Result<()> {
        if kind.attach_strategy() == AttachStrategy::Structural {
            return Err(KnowledgeError::KindMismatch {
                kind,
                expected: "an action record",
            });
        }

        let value = value.into();
        let mut ctx = self.context(CompileMode::Create);
        let subject = compile_into(&mut ctx, entity)?;
        let mut pattern = subject.pattern;
        attach_fact(&mut ctx, &mut pattern, subject.root, kind, &value, &recorded_at())?;

        info!(entity = %subject.name, kind = %kind, "Storing fact");
        self.store.write(&pattern).await
    }

    /// Most recent `kind` fact of `entity`, if any
    pub async fn lookup_value(&self, entity: &NounPhrase, kind: InfoKind) -> Result<Option<String>> {
        Ok(self.read_facts(entity, kind, Some(1)).await?.into_iter().next())
    }

    /// Most recent `kind` fact of `entity`, or [`UNKNOWN`].
    ///
    /// Literal kinds answer the stored text; `LOC` answers the location's
    /// composite name.
    pub async fn get_value(&self, entity: &NounPhrase, kind: InfoKind) -> Result<String> {
        Ok(self
            .lookup_value(entity, kind)
            .await?
            .unwrap_or_else(|| UNKNOWN.to_string()))
    }

    /// Every `kind` fact of `entity`, newest first
    pub async fn get_values(&self, entity: &NounPhrase, kind: InfoKind) -> Result<Vec<String>> {
        self.read_facts(entity, kind, None).await
    }

    async fn read_facts(
        &self,
        entity: &NounPhrase,
        kind: InfoKind,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut ctx = self.context(CompileMode::Match);
        let subject = compile_into(&mut ctx, entity)?;
        let mut pattern = subject.pattern;
        let probe = probe_fact(&mut ctx, &mut pattern, subject.root, kind);

        let request = ReadRequest {
            pattern,
            target: probe.target,
            property: kind.attach_strategy().answer_property(),
            newest_by: Some(probe.edge),
            limit,
        };

        let answers = self.store.read(&request).await?;
        debug!(entity = %subject.name, kind = %kind, found = answers.len(), "Looked up facts");
        Ok(answers)
    }

    /// Record an action with its direct object, locations and times as one write
    pub async fn store_action(&self, record: &ActionRecord) -> Result<()> {
        if let Some(time) = record.times.iter().find(|t| !t.kind.is_time()) {
            return Err(KnowledgeError::KindMismatch {
                kind: time.kind,
                expected: "a time kind",
            });
        }

        let recorded_at = recorded_at();
        let mut ctx = self.context(CompileMode::Create);
        let subject = compile_into(&mut ctx, &record.subject)?;
        let mut pattern = subject.pattern;

        let action = attach_fact(
            &mut ctx,
            &mut pattern,
            subject.root,
            InfoKind::Action,
            &FactValue::Literal(record.action.clone()),
            &recorded_at,
        )?;

        if let Some(object) = &record.direct_object {
            let object = FactValue::Entity(object.clone());
            attach_fact(&mut ctx, &mut pattern, action, InfoKind::Ce, &object, &recorded_at)?;
        }
        for location in &record.locations {
            let location = FactValue::Entity(location.clone());
            attach_fact(&mut ctx, &mut pattern, action, InfoKind::Loc, &location, &recorded_at)?;
        }
        for time in &record.times {
            let value = FactValue::Literal(time.value.clone());
            attach_fact(&mut ctx, &mut pattern, action, time.kind, &value, &recorded_at)?;
        }

        info!(
            subject = %subject.name,
            action = %record.action,
            locations = record.locations.len(),
            times = record.times.len(),
            "Storing action"
        );
        self.store.write(&pattern).await
    }

    /// Most recent `kind` time of the action `record.action` by `record.subject`, if any
    pub async fn lookup_action_time(
        &self,
        record: &ActionRecord,
        kind: InfoKind,
    ) -> Result<Option<String>> {
        let mut ctx = self.context(CompileMode::Match);
        let subject = compile_into(&mut ctx, &record.subject)?;
        let mut pattern = subject.pattern;
        let action = probe_action(&mut ctx, &mut pattern, subject.root, &record.action);
        let probe = probe_fact(&mut ctx, &mut pattern, action, kind);

        let request = ReadRequest {
            pattern,
            target: probe.target,
            property: kind.attach_strategy().answer_property(),
            newest_by: Some(probe.edge),
            limit: Some(1),
        };

        Ok(self.store.read(&request).await?.into_iter().next())
    }

    /// Like [`lookup_action_time`](Self::lookup_action_time), answering [`UNKNOWN`] on a miss
    pub async fn get_action_time(&self, record: &ActionRecord, kind: InfoKind) -> Result<String> {
        Ok(self
            .lookup_action_time(record, kind)
            .await?
            .unwrap_or_else(|| UNKNOWN.to_string()))
    }
}

fn recorded_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}
