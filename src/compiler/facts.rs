//! Attaching facts to compiled entities
//!
//! One dispatch point per direction: [`attach_fact`] appends the structure
//! that records a fact, [`probe_fact`] appends the structure that finds one.
//! Both follow the kind's [`AttachStrategy`].

use crate::compiler::context::CompileContext;
use crate::compiler::pattern::{CompileMode, EdgeOp, EdgePattern, NodeOp, NodePattern, Pattern, VarId};
use crate::compiler::{compile_into, NAME, VALUE};
use crate::error::{KnowledgeError, Result};
use crate::schema::{AttachStrategy, InfoKind, NodeLabel, NounPhrase, Relation};
use uuid::Uuid;

/// Edge property recording when a fact was stored
pub const CREATED_AT: &str = "created_at";
/// Action record identity
pub const ID: &str = "id";

/// Payload of a fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactValue {
    /// Plain text (values, times, action names)
    Literal(String),
    /// A noun phrase compiled into its own sub-entity (locations, direct objects)
    Entity(NounPhrase),
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Literal(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Literal(value)
    }
}

impl From<NounPhrase> for FactValue {
    fn from(phrase: NounPhrase) -> Self {
        FactValue::Entity(phrase)
    }
}

/// Variables a fact lookup binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactProbe {
    /// Node holding the fact
    pub target: VarId,
    /// Fact edge, used to order accumulated facts
    pub edge: VarId,
}

/// Append the structure recording `value` as a `kind` fact of `owner`.
///
/// Returns the variable of the node holding the fact. The context must be in
/// [`CompileMode::Create`].
pub fn attach_fact(
    ctx: &mut CompileContext,
    pattern: &mut Pattern,
    owner: VarId,
    kind: InfoKind,
    value: &FactValue,
    recorded_at: &str,
) -> Result<VarId> {
    debug_assert_eq!(ctx.mode(), CompileMode::Create);

    let target = match (kind.attach_strategy(), kind, value) {
        (AttachStrategy::Literal, _, FactValue::Literal(text)) => {
            let var = ctx.fresh_var();
            pattern.push_node(
                NodePattern::new(var, NodeLabel::Literal, NodeOp::Create).with_property(VALUE, text.clone()),
            );
            var
        }
        (AttachStrategy::Structural, InfoKind::Action, FactValue::Literal(action)) => {
            let var = ctx.fresh_var();
            pattern.push_node(
                NodePattern::new(var, NodeLabel::Action, NodeOp::Create)
                    .with_property(NAME, action.clone())
                    .with_property(ID, Uuid::new_v4().to_string()),
            );
            var
        }
        (AttachStrategy::SubEntity, _, FactValue::Entity(phrase))
        | (AttachStrategy::Structural, InfoKind::Ce, FactValue::Entity(phrase)) => {
            let compiled = compile_into(ctx, phrase)?;
            pattern.extend(compiled.pattern);
            compiled.root
        }
        (_, kind, _) => {
            return Err(KnowledgeError::KindMismatch {
                kind,
                expected: expected_payload(kind),
            })
        }
    };

    pattern.push_edge(
        EdgePattern::new(owner, Relation::Fact(kind), target, EdgeOp::Create)
            .with_property(CREATED_AT, recorded_at),
    );
    Ok(target)
}

/// Append the structure finding any `kind` fact of `owner`.
///
/// The context must be in [`CompileMode::Match`].
pub fn probe_fact(
    ctx: &mut CompileContext,
    pattern: &mut Pattern,
    owner: VarId,
    kind: InfoKind,
) -> FactProbe {
    debug_assert_eq!(ctx.mode(), CompileMode::Match);

    let edge = ctx.fresh_var();
    let target = ctx.fresh_var();
    pattern.push_edge(EdgePattern::new(owner, Relation::Fact(kind), target, EdgeOp::Match).bound_to(edge));

    let node = match (kind.attach_strategy(), kind) {
        (AttachStrategy::Literal, _) => NodePattern::new(target, NodeLabel::Literal, NodeOp::Match),
        (AttachStrategy::Structural, InfoKind::Action) => {
            NodePattern::new(target, NodeLabel::Action, NodeOp::Match)
        }
        _ => NodePattern::any(target),
    };
    pattern.push_node(node);

    FactProbe { target, edge }
}

/// Append the structure finding the action `name` performed by `owner`.
pub fn probe_action(ctx: &mut CompileContext, pattern: &mut Pattern, owner: VarId, name: &str) -> VarId {
    debug_assert_eq!(ctx.mode(), CompileMode::Match);

    let action = ctx.fresh_var();
    pattern.push_edge(EdgePattern::new(owner, Relation::Fact(InfoKind::Action), action, EdgeOp::Match));
    pattern.push_node(NodePattern::new(action, NodeLabel::Action, NodeOp::Match).with_property(NAME, name));
    action
}

fn expected_payload(kind: InfoKind) -> &'static str {
    match kind {
        InfoKind::Loc | InfoKind::Ce => "a noun-phrase entity",
        _ => "a literal value",
    }
}
